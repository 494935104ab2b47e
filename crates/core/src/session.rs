//! Page-session controller.
//!
//! [`CourseSession`] owns the only mutable state of the engine: the learner,
//! the current canonical payload and the local progress map. It reacts to two
//! events, a new boundary read ([`CourseSession::apply_boundary`]) and a module
//! entry ([`CourseSession::enter_module`]), and builds read-only views by
//! passing snapshots of its state into the pure policy functions.

use serde::Serialize;

use crate::boundary::{BoundaryInput, KEY_USER_ID, KEY_USER_NAME};
use crate::catalog::{self, AdditionalSection};
use crate::course::{CoursePayload, ModuleIndex, User};
use crate::decoder::{self, DecodeStrategy};
use crate::playback::PlaybackPreferences;
use crate::policy::{self, LockReason};
use crate::progress::{self, ModuleProgress};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Entry outcome
// ---------------------------------------------------------------------------

/// Result of a module-entry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum EntryOutcome {
    /// Module is locked; nothing changed.
    Locked { reason: LockReason },
    /// The host owns this module's progress; nothing changed.
    HostManaged { progress: u8 },
    /// Local progress was already 100; nothing changed.
    AlreadyCompleted,
    /// Local progress moved forward.
    Advanced { from: u8, to: u8 },
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Everything the presentation layer needs to render one module card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleView {
    pub index: ModuleIndex,
    pub title: String,
    pub subtitle: &'static str,
    pub duration: &'static str,
    pub unlocked: bool,
    pub lock_reason: Option<LockReason>,
    pub progress: u8,
    pub completed: bool,
    pub url: Option<String>,
    /// Unlocked and has a destination to link to.
    pub linked: bool,
    pub section_number: Option<i64>,
    pub section_id: Option<i64>,
    pub playback: PlaybackPreferences,
}

/// Course header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseHeader {
    pub id: i64,
    pub name: String,
    pub shortname: String,
    pub first_open: Option<ModuleIndex>,
}

/// One additional section and its lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub section: AdditionalSection,
    pub label: &'static str,
    pub locked: bool,
}

/// Full page view at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub user: User,
    pub course: Option<CourseHeader>,
    pub modules: Vec<ModuleView>,
    pub sections: Vec<SectionView>,
    pub progress: ModuleProgress,
    pub all_modules_completed: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State of one learner's page session.
#[derive(Debug, Clone, Default)]
pub struct CourseSession {
    user: User,
    payload: Option<CoursePayload>,
    progress: ModuleProgress,
    playback: PlaybackPreferences,
}

impl CourseSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session from a boundary read.
    pub fn from_boundary(input: &BoundaryInput) -> Self {
        let mut session = Self::new();
        session.apply_boundary(input);
        session
    }

    /// Handle a (new) boundary read.
    ///
    /// Hydrates the user, then decodes the course. The payload and progress
    /// are always replaced wholesale: input without course data clears the
    /// payload and resets progress to zero.
    pub fn apply_boundary(&mut self, input: &BoundaryInput) -> Option<DecodeStrategy> {
        self.user
            .hydrate(input.get(KEY_USER_ID), input.get(KEY_USER_NAME));

        match decoder::decode(input) {
            Some(decoded) => {
                self.payload = Some(decoded.payload);
                self.progress = decoded.progress;
                Some(decoded.strategy)
            }
            None => {
                self.payload = None;
                self.progress = ModuleProgress::new();
                None
            }
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn payload(&self) -> Option<&CoursePayload> {
        self.payload.as_ref()
    }

    pub fn progress(&self) -> &ModuleProgress {
        &self.progress
    }

    pub fn playback(&self) -> &PlaybackPreferences {
        &self.playback
    }

    pub fn set_playback(&mut self, playback: PlaybackPreferences) {
        self.playback = playback;
    }

    pub fn is_unlocked(&self, index: ModuleIndex, now: Timestamp) -> bool {
        policy::is_unlocked(index, self.payload(), now)
    }

    /// Progress shown for a module (host value over local value).
    pub fn displayed_progress(&self, index: ModuleIndex) -> u8 {
        progress::displayed_progress(index, self.payload(), &self.progress)
    }

    pub fn all_modules_completed(&self) -> bool {
        progress::all_modules_completed(self.payload(), &self.progress)
    }

    /// Handle the learner entering a module.
    ///
    /// Locked modules and modules whose progress comes from the host are left
    /// alone. Otherwise local progress advances by one step, capped at 100.
    pub fn enter_module(&mut self, index: ModuleIndex, now: Timestamp) -> EntryOutcome {
        if let Some(reason) = policy::evaluate(index, self.payload(), now).lock_reason() {
            tracing::debug!(module = %index, ?reason, "Entry ignored, module locked");
            return EntryOutcome::Locked { reason };
        }

        if let Some(host) = self.payload().and_then(|p| p.host_progress(index)) {
            return EntryOutcome::HostManaged { progress: host };
        }

        let from = self.progress.get(index);
        if progress::is_completed(from) {
            return EntryOutcome::AlreadyCompleted;
        }

        let to = self.progress.advance(index);
        tracing::info!(module = %index, from, to, "Module progress advanced");
        EntryOutcome::Advanced { from, to }
    }

    /// View of one module at `now`.
    pub fn module_view(&self, index: ModuleIndex, now: Timestamp) -> ModuleView {
        let payload = self.payload();
        let module = payload.and_then(|p| p.module(index));
        let access = policy::evaluate(index, payload, now);
        let entry = catalog::module_entry(index);
        let progress = self.displayed_progress(index);
        let url = module.and_then(|m| m.url.clone()).filter(|u| !u.is_empty());

        ModuleView {
            index,
            title: policy::display_title(index, payload),
            subtitle: entry.subtitle,
            duration: entry.duration,
            unlocked: access.is_unlocked(),
            lock_reason: access.lock_reason(),
            progress,
            completed: progress::is_completed(progress),
            linked: access.is_unlocked() && url.is_some(),
            url,
            section_number: module.and_then(|m| m.section_number),
            section_id: module.and_then(|m| m.section_id),
            playback: self.playback,
        }
    }

    /// Lock state of the additional sections.
    pub fn sections(&self) -> Vec<SectionView> {
        let all_completed = self.all_modules_completed();
        AdditionalSection::ALL
            .into_iter()
            .map(|section| SectionView {
                section,
                label: section.label(),
                locked: section.is_locked(all_completed),
            })
            .collect()
    }

    /// Full page view at `now`.
    pub fn dashboard(&self, now: Timestamp) -> DashboardView {
        DashboardView {
            user: self.user.clone(),
            course: self.payload().map(|p| CourseHeader {
                id: p.id,
                name: p.name.clone(),
                shortname: p.shortname.clone(),
                first_open: p.first_open,
            }),
            modules: ModuleIndex::all()
                .map(|index| self.module_view(index, now))
                .collect(),
            sections: self.sections(),
            progress: self.progress,
            all_modules_completed: self.all_modules_completed(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    const NOW: i64 = 1_750_000_000;

    fn now() -> Timestamp {
        chrono::Utc.timestamp_opt(NOW, 0).unwrap()
    }

    fn idx(n: u8) -> ModuleIndex {
        ModuleIndex::new(n).unwrap()
    }

    fn all_modules_open() -> Vec<(String, String)> {
        ModuleIndex::all()
            .flat_map(|i| {
                [
                    (format!("m{i}e"), "1".to_string()),
                    (format!("m{i}o"), "1".to_string()),
                ]
            })
            .collect()
    }

    fn session(pairs: &[(&str, &str)]) -> CourseSession {
        CourseSession::from_boundary(&BoundaryInput::from_pairs(pairs.iter().copied()))
    }

    // -- Boundary -------------------------------------------------------------

    #[test]
    fn fresh_session_locks_everything() {
        let s = CourseSession::new();
        for index in ModuleIndex::all() {
            assert!(!s.is_unlocked(index, now()));
        }
        assert_eq!(s.user().name, crate::course::DEFAULT_USER_NAME);
    }

    #[test]
    fn user_hints_are_applied_without_course_data() {
        let mut s = CourseSession::new();
        let strategy =
            s.apply_boundary(&BoundaryInput::from_pairs([("userid", "7"), ("uname", "Ana")]));
        assert_eq!(strategy, None);
        assert!(s.user().is_logged_in);
        assert_eq!(s.user().name, "Ana");
        assert!(s.payload().is_none());
    }

    #[test]
    fn new_boundary_replaces_payload_and_progress() {
        let mut s = session(&[("m1e", "1"), ("m2e", "1")]);
        s.enter_module(idx(1), now());
        assert_eq!(s.progress().get(idx(1)), 25);

        let strategy = s.apply_boundary(&BoundaryInput::from_pairs([("m2e", "1"), ("m2p", "10")]));
        assert_eq!(strategy, Some(DecodeStrategy::FlatFields));
        assert!(s.payload().unwrap().module(idx(1)).is_none());
        assert_eq!(s.progress().get(idx(1)), 0);
        assert_eq!(s.progress().get(idx(2)), 10);
    }

    #[test]
    fn boundary_without_course_data_clears_previous_course() {
        let mut s = session(&[("m1e", "1"), ("m1o", "1"), ("m2e", "1"), ("m2p", "60")]);
        s.enter_module(idx(1), now());
        assert!(s.is_unlocked(idx(1), now()));

        let strategy = s.apply_boundary(&BoundaryInput::from_pairs([("userid", "7")]));
        assert_eq!(strategy, None);
        assert!(s.payload().is_none());
        assert_eq!(s.user().id.as_deref(), Some("7"));
        for index in ModuleIndex::all() {
            assert!(!s.is_unlocked(index, now()));
            assert_eq!(s.displayed_progress(index), 0);
        }
        assert_eq!(*s.progress(), ModuleProgress::new());
    }

    // -- Module entry ---------------------------------------------------------

    #[test]
    fn entering_local_module_steps_to_100() {
        let mut s = session(&[("m4e", "1")]);
        let seen: Vec<u8> = (0..4)
            .map(|_| {
                s.enter_module(idx(4), now());
                s.displayed_progress(idx(4))
            })
            .collect();
        assert_eq!(seen, vec![25, 50, 75, 100]);

        assert_eq!(s.enter_module(idx(4), now()), EntryOutcome::AlreadyCompleted);
        assert_eq!(s.displayed_progress(idx(4)), 100);
    }

    #[test]
    fn host_progress_is_never_incremented() {
        let mut s = session(&[("m3e", "1"), ("m3p", "40")]);
        for _ in 0..5 {
            assert_eq!(
                s.enter_module(idx(3), now()),
                EntryOutcome::HostManaged { progress: 40 }
            );
        }
        assert_eq!(s.displayed_progress(idx(3)), 40);
        assert_eq!(s.progress().get(idx(3)), 40);
    }

    #[test]
    fn entering_locked_module_is_a_no_op() {
        let end = (NOW - 1).to_string();
        let mut s = session(&[("m2e", "1"), ("m2o", "1"), ("m2te", end.as_str())]);
        assert_matches!(
            s.enter_module(idx(2), now()),
            EntryOutcome::Locked {
                reason: LockReason::Closed { .. }
            }
        );
        assert_matches!(
            s.enter_module(idx(5), now()),
            EntryOutcome::Locked {
                reason: LockReason::Missing
            }
        );
        assert_eq!(*s.progress(), ModuleProgress::new());
    }

    // -- Completion gate ------------------------------------------------------

    #[test]
    fn survey_unlocks_when_everything_is_complete() {
        let mut s = CourseSession::from_boundary(&BoundaryInput::from_pairs(all_modules_open()));
        let survey_locked = |s: &CourseSession| {
            s.sections()
                .iter()
                .find(|v| v.section == AdditionalSection::InstitutionalSurvey)
                .map(|v| v.locked)
                .unwrap()
        };
        assert!(survey_locked(&s));

        for index in ModuleIndex::all() {
            for _ in 0..4 {
                s.enter_module(index, now());
            }
        }
        assert!(s.all_modules_completed());
        assert!(!survey_locked(&s));
    }

    #[test]
    fn survey_relocks_when_host_progress_drops() {
        let mut pairs = all_modules_open();
        for i in ModuleIndex::all() {
            pairs.push((format!("m{i}p"), "100".to_string()));
        }
        let mut s = CourseSession::from_boundary(&BoundaryInput::from_pairs(pairs.clone()));
        assert!(s.all_modules_completed());

        pairs.retain(|(k, _)| k != "m6p");
        pairs.push(("m6p".to_string(), "99".to_string()));
        s.apply_boundary(&BoundaryInput::from_pairs(pairs));
        assert!(!s.all_modules_completed());
    }

    // -- Views ----------------------------------------------------------------

    #[test]
    fn module_view_fields() {
        let s = session(&[
            ("m1e", "1"),
            ("m1n", "Introdução"),
            ("m1u", "https://lms.example/s/1"),
            ("m1s", "1"),
            ("m1i", "301"),
            ("m1p", "100"),
            ("m2e", "1"),
        ]);

        let v1 = s.module_view(idx(1), now());
        assert_eq!(v1.title, "Introdução");
        assert!(v1.unlocked);
        assert!(v1.linked);
        assert!(v1.completed);
        assert_eq!(v1.section_id, Some(301));
        assert_eq!(v1.playback, PlaybackPreferences::default());

        let v2 = s.module_view(idx(2), now());
        assert_eq!(v2.title, "Módulo 2");
        assert!(v2.unlocked);
        assert!(!v2.linked);
        assert_eq!(v2.url, None);

        let v3 = s.module_view(idx(3), now());
        assert!(!v3.unlocked);
        assert_eq!(v3.lock_reason, Some(LockReason::Missing));
    }

    #[test]
    fn dashboard_covers_all_slots() {
        let s = session(&[("cid", "9"), ("cn", "Curso"), ("csn", "C9"), ("fo", "1")]);
        let view = s.dashboard(now());
        assert_eq!(view.modules.len(), 8);
        assert_eq!(view.sections.len(), 4);
        let course = view.course.unwrap();
        assert_eq!(course.id, 9);
        assert_eq!(course.first_open, Some(idx(1)));
        assert!(!view.all_modules_completed);
    }
}
