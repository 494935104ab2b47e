//! Course module access engine.
//!
//! Decodes the key/value data a learning-management host hands to a course
//! page into a canonical [`course::CoursePayload`], and decides per module
//! whether the learner may enter it right now. The crate performs no I/O.

pub mod boundary;
pub mod catalog;
pub mod course;
pub mod decoder;
pub mod error;
pub mod lenient;
pub mod playback;
pub mod policy;
pub mod progress;
pub mod session;
pub mod types;

pub use boundary::BoundaryInput;
pub use course::{CoursePayload, ModuleIndex, ModuleInfo, User};
pub use decoder::{decode, DecodeStrategy, Decoded};
pub use policy::{is_unlocked, Access, LockReason};
pub use progress::ModuleProgress;
pub use session::{CourseSession, DashboardView, EntryOutcome, ModuleView};
