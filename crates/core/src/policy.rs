//! Module unlock policy.
//!
//! A pure decision over one module's canonical state and the current time.
//! Rules are evaluated in a fixed order and the first decisive rule wins:
//!
//! 1. Absent slot, or `exists = false`: locked.
//! 2. `now < tstart` or `now >= tend`: locked, even when `open = true`.
//! 3. `open = true`: unlocked.
//! 4. `open = false`: locked only when corroborated by a declared window
//!    (either bound, even one that passed rule 2) or an unavailability
//!    reason. An uncorroborated closed flag is ignored and the module is
//!    unlocked.
//! 5. `open` absent: unlocked.
//!
//! Rule 4 favours availability when the host is ambiguous. It is kept as is
//! pending a product decision; see DESIGN.md.

use serde::Serialize;

use crate::catalog;
use crate::course::{CoursePayload, ModuleIndex, ModuleInfo};
use crate::types::{EpochSeconds, Timestamp};

// ---------------------------------------------------------------------------
// Decision types
// ---------------------------------------------------------------------------

/// Why a module is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum LockReason {
    /// The host did not report the module.
    Missing,
    /// The access window has not started yet.
    NotYetOpen { opens_at: EpochSeconds },
    /// The access window has ended.
    Closed { closed_at: EpochSeconds },
    /// The host closed the module and backed it with a window or a reason.
    ClosedByHost,
}

/// Outcome of evaluating the unlock policy for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Access {
    Unlocked,
    Locked { reason: LockReason },
}

impl Access {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked)
    }

    pub fn lock_reason(&self) -> Option<LockReason> {
        match self {
            Self::Unlocked => None,
            Self::Locked { reason } => Some(*reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate the policy for one module's state at `now` (epoch seconds).
pub fn evaluate_module(module: Option<&ModuleInfo>, now: EpochSeconds) -> Access {
    let module = match module {
        Some(m) if m.exists => m,
        _ => {
            return Access::Locked {
                reason: LockReason::Missing,
            }
        }
    };

    if let Some(start) = module.tstart {
        if now < start {
            return Access::Locked {
                reason: LockReason::NotYetOpen { opens_at: start },
            };
        }
    }
    if let Some(end) = module.tend {
        if now >= end {
            return Access::Locked {
                reason: LockReason::Closed { closed_at: end },
            };
        }
    }

    match module.open {
        Some(true) | None => Access::Unlocked,
        Some(false) => {
            if module.has_window() || module.has_unavailability_reason() {
                Access::Locked {
                    reason: LockReason::ClosedByHost,
                }
            } else {
                Access::Unlocked
            }
        }
    }
}

/// Evaluate the policy for slot `index` of `payload` at `now`.
///
/// A missing payload locks every module.
pub fn evaluate(index: ModuleIndex, payload: Option<&CoursePayload>, now: Timestamp) -> Access {
    evaluate_module(payload.and_then(|p| p.module(index)), now.timestamp())
}

/// Whether slot `index` is open for entry at `now`.
pub fn is_unlocked(index: ModuleIndex, payload: Option<&CoursePayload>, now: Timestamp) -> bool {
    evaluate(index, payload, now).is_unlocked()
}

/// Title shown for a module: the host name when not blank, else the catalog title.
///
/// Has no bearing on unlock status.
pub fn display_title(index: ModuleIndex, payload: Option<&CoursePayload>) -> String {
    payload
        .and_then(|p| p.module(index))
        .and_then(ModuleInfo::display_name)
        .unwrap_or(catalog::module_entry(index).title)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
