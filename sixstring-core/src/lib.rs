// sixstring-core/src/lib.rs

//! The core logic for the Sixstring guitar tuner.
//! This crate is responsible for audio capture, pitch detection,
//! note matching and stability tracking. It is completely headless
//! and contains no GUI code.

pub mod audio;
pub mod pitch;
pub mod stability;
pub mod tuner;
pub mod tuning;

pub use stability::{ConfidenceTier, NoteEvent, StabilityTracker, STABILITY_THRESHOLD};
pub use tuner::Tuner;
pub use tuning::{standard_tuning, MatchResult, ReferenceNote};
