//! Boundary payload decoder.
//!
//! Hosts describe a course in one of two encodings:
//!
//! - **whole payload**: a JSON document under the `course` key, sometimes
//!   percent-encoded a second time by legacy sources;
//! - **flat fields**: `cid`/`cn`/`csn`/`fo` plus `m{i}*` keys per module.
//!
//! Decoding runs an ordered list of [`DecodeStrategy`] values and keeps the
//! first success; results are never merged across strategies. Decoding as a
//! whole never fails: a broken whole payload falls through to flat fields,
//! and a broken field becomes an absent value.

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::boundary::{
    BoundaryInput, ModuleField, FLAG_TRUE, KEY_COURSE, KEY_COURSE_ID, KEY_COURSE_NAME,
    KEY_COURSE_SHORTNAME, KEY_FIRST_OPEN,
};
use crate::course::{CoursePayload, ModuleIndex, ModuleInfo, ModuleSlots};
use crate::lenient;
use crate::progress::ModuleProgress;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single strategy could not produce a payload.
///
/// These errors never leave the decoder; they only decide whether the next
/// strategy is tried.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("boundary input has no '{0}' key")]
    MissingKey(&'static str),

    #[error("course payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("course payload is not valid UTF-8 after percent-decoding: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// One way of turning boundary input into a course payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// `course` parsed as JSON as-is.
    WholePayload,
    /// `course` percent-decoded, then parsed as JSON.
    PercentEncodedPayload,
    /// Flat course and per-module keys.
    FlatFields,
}

impl DecodeStrategy {
    /// Strategies in precedence order.
    pub const ORDER: [DecodeStrategy; 3] = [
        Self::WholePayload,
        Self::PercentEncodedPayload,
        Self::FlatFields,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WholePayload => "whole_payload",
            Self::PercentEncodedPayload => "percent_encoded_payload",
            Self::FlatFields => "flat_fields",
        }
    }

    /// Attempt to decode `input` with this strategy.
    pub fn decode(self, input: &BoundaryInput) -> Result<CoursePayload, DecodeError> {
        match self {
            Self::WholePayload => {
                let raw = input.course_param().ok_or(DecodeError::MissingKey(KEY_COURSE))?;
                Ok(serde_json::from_str(raw)?)
            }
            Self::PercentEncodedPayload => {
                let raw = input.course_param().ok_or(DecodeError::MissingKey(KEY_COURSE))?;
                let decoded = percent_decode_str(raw).decode_utf8()?;
                Ok(serde_json::from_str(&decoded)?)
            }
            Self::FlatFields => Ok(decode_flat(input)),
        }
    }
}

impl std::fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Decode entry point
// ---------------------------------------------------------------------------

/// A canonical payload together with the progress map seeded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub payload: CoursePayload,
    pub progress: ModuleProgress,
    pub strategy: DecodeStrategy,
}

/// Decode the boundary input.
///
/// Returns `None` only when the input carries no course data in either
/// encoding.
pub fn decode(input: &BoundaryInput) -> Option<Decoded> {
    if !input.has_course_data() {
        tracing::debug!("Boundary input carries no course data");
        return None;
    }

    let has_whole_payload = input.course_param().is_some();
    for strategy in DecodeStrategy::ORDER {
        match strategy.decode(input) {
            Ok(payload) => {
                tracing::debug!(
                    strategy = %strategy,
                    course_id = payload.id,
                    modules = payload.existing_count(),
                    "Decoded course payload"
                );
                let progress = ModuleProgress::seeded_from(&payload);
                return Some(Decoded {
                    payload,
                    progress,
                    strategy,
                });
            }
            Err(DecodeError::MissingKey(_)) => {}
            Err(err) => {
                tracing::debug!(strategy = %strategy, error = %err, "Decode strategy failed");
            }
        }

        if strategy == DecodeStrategy::PercentEncodedPayload && has_whole_payload {
            tracing::warn!("Could not decode 'course' as JSON; falling back to flat fields");
        }
    }

    // `FlatFields` cannot fail, so the loop always returns.
    None
}

// ---------------------------------------------------------------------------
// Flat-field decoding
// ---------------------------------------------------------------------------

fn decode_flat(input: &BoundaryInput) -> CoursePayload {
    let mut modules: ModuleSlots = Default::default();
    for index in ModuleIndex::all() {
        modules[index.slot()] = decode_flat_module(input, index);
    }

    CoursePayload {
        id: input
            .get(KEY_COURSE_ID)
            .and_then(lenient::parse_integer)
            .unwrap_or(0),
        name: input.get(KEY_COURSE_NAME).unwrap_or_default().to_string(),
        shortname: input
            .get(KEY_COURSE_SHORTNAME)
            .unwrap_or_default()
            .to_string(),
        modules,
        first_open: input
            .get(KEY_FIRST_OPEN)
            .and_then(lenient::parse_integer)
            .and_then(|n| ModuleIndex::try_from(n).ok()),
    }
}

/// Decode one slot. Fields are only read when `m{i}e` is exactly `"1"`.
fn decode_flat_module(input: &BoundaryInput, index: ModuleIndex) -> Option<ModuleInfo> {
    let field = |f: ModuleField| input.module_field(index, f);

    if field(ModuleField::Exists) != Some(FLAG_TRUE) {
        return None;
    }

    Some(ModuleInfo {
        exists: true,
        section_number: field(ModuleField::SectionNumber).and_then(lenient::parse_integer),
        section_id: field(ModuleField::SectionId).and_then(lenient::parse_integer),
        name: field(ModuleField::Name).map(str::to_string),
        open: field(ModuleField::Open).map(|raw| raw == FLAG_TRUE),
        available: None,
        available_info: None,
        url: field(ModuleField::Url).map(str::to_string),
        tstart: field(ModuleField::WindowStart).and_then(lenient::parse_epoch),
        tend: field(ModuleField::WindowEnd).and_then(lenient::parse_epoch),
        progress: field(ModuleField::Progress).and_then(lenient::parse_progress),
    })
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a payload as flat key/value pairs.
///
/// The flat encoding has no channel for `available`/`availableinfo`, and
/// modules reported with `exists = false` are omitted.
pub fn to_flat_pairs(payload: &CoursePayload) -> Vec<(String, String)> {
    let mut pairs = vec![
        (KEY_COURSE_ID.to_string(), payload.id.to_string()),
        (KEY_COURSE_NAME.to_string(), payload.name.clone()),
        (KEY_COURSE_SHORTNAME.to_string(), payload.shortname.clone()),
    ];
    if let Some(first_open) = payload.first_open {
        pairs.push((KEY_FIRST_OPEN.to_string(), first_open.to_string()));
    }

    for index in ModuleIndex::all() {
        let Some(module) = payload.module(index) else {
            continue;
        };
        let mut push = |field: ModuleField, value: String| pairs.push((field.key(index), value));

        push(ModuleField::Exists, FLAG_TRUE.to_string());
        if let Some(open) = module.open {
            push(ModuleField::Open, if open { "1" } else { "0" }.to_string());
        }
        if let Some(name) = &module.name {
            push(ModuleField::Name, name.clone());
        }
        if let Some(n) = module.section_number {
            push(ModuleField::SectionNumber, n.to_string());
        }
        if let Some(id) = module.section_id {
            push(ModuleField::SectionId, id.to_string());
        }
        if let Some(url) = &module.url {
            push(ModuleField::Url, url.clone());
        }
        if let Some(start) = module.tstart {
            push(ModuleField::WindowStart, start.to_string());
        }
        if let Some(end) = module.tend {
            push(ModuleField::WindowEnd, end.to_string());
        }
        if let Some(progress) = module.progress {
            push(ModuleField::Progress, progress.to_string());
        }
    }

    pairs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
