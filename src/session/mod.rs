//! # Sessions
//!
//! The state machine behind previews and exports:
//!
//! ```text
//! idle -> playing -> finished      (preview)
//! idle -> recording -> idle        (export)
//! any failure -> idle
//! ```
//!
//! At most one session runs at a time. A recording ignores every new
//! trigger until it completes or is cancelled.

pub mod clock;
pub mod driver;
pub mod engine;
pub mod status;

pub use clock::FrameClock;
pub use driver::{run_export, run_preview, DriveOutcome};
pub use engine::{RevealEngine, TickOutcome, TriggerOutcome};
pub use status::{AnimationStatus, StatusUpdate};
