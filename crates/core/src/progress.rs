//! Session-local module progress and the host/local merge rule.
//!
//! The map starts at zero, is reseeded from host progress on every decode and
//! afterwards only moves through module-entry events. Host-supplied progress
//! always wins over the local value when the two are merged for display.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::course::{CoursePayload, ModuleIndex, MODULE_COUNT};
use crate::lenient::PROGRESS_MAX;

/// Percentage points added to local progress on each module entry.
pub const PROGRESS_STEP: u8 = 25;

/// Locally tracked completion percentage per module slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleProgress {
    values: [u8; MODULE_COUNT],
}

impl ModuleProgress {
    /// All slots at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fresh map from the host progress found in `payload`.
    ///
    /// Slots without a host value stay at zero; prior local progress is not
    /// carried over.
    pub fn seeded_from(payload: &CoursePayload) -> Self {
        let mut progress = Self::new();
        for index in ModuleIndex::all() {
            if let Some(value) = payload.host_progress(index) {
                progress.set(index, value);
            }
        }
        progress
    }

    pub fn get(&self, index: ModuleIndex) -> u8 {
        self.values[index.slot()]
    }

    /// Set a slot, clamping to 100.
    pub fn set(&mut self, index: ModuleIndex, value: u8) {
        self.values[index.slot()] = value.min(PROGRESS_MAX);
    }

    /// Advance a slot by [`PROGRESS_STEP`], capped at 100. Returns the new value.
    pub fn advance(&mut self, index: ModuleIndex) -> u8 {
        let next = self.get(index).saturating_add(PROGRESS_STEP).min(PROGRESS_MAX);
        self.set(index, next);
        next
    }

    /// Iterate `(index, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleIndex, u8)> + '_ {
        ModuleIndex::all().map(move |index| (index, self.get(index)))
    }
}

/// Serialized as `{ "1": 0, ..., "8": 0 }`, the key shape the host page uses.
impl Serialize for ModuleProgress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<String, u8> = self
            .iter()
            .map(|(index, value)| (index.to_string(), value))
            .collect();
        map.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Merge rule
// ---------------------------------------------------------------------------

/// Progress shown for a module: host value if supplied, else the local value.
pub fn displayed_progress(
    index: ModuleIndex,
    payload: Option<&CoursePayload>,
    local: &ModuleProgress,
) -> u8 {
    payload
        .and_then(|p| p.host_progress(index))
        .unwrap_or_else(|| local.get(index))
}

/// Whether a module counts as completed.
pub fn is_completed(progress: u8) -> bool {
    progress == PROGRESS_MAX
}

/// Whether every one of the eight modules shows 100%.
pub fn all_modules_completed(payload: Option<&CoursePayload>, local: &ModuleProgress) -> bool {
    ModuleIndex::all().all(|index| is_completed(displayed_progress(index, payload, local)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
