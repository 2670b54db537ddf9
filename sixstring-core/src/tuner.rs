//! # Tuner Orchestration Module
//!
//! Wires the per-frame pipeline together: pitch detection, nearest-note
//! matching and stability tracking. Holds no algorithmic logic of its own.

use anyhow::Result;

use crate::pitch::{self, SILENCE_RMS_THRESHOLD};
use crate::stability::{NoteEvent, StabilityTracker};
use crate::tuning::{self, ReferenceNote};

/// The complete detection pipeline for one audio stream.
///
/// The only state carried between frames is the stability tracker's, which
/// is bounded; the pitch and matching steps are pure functions of the
/// current frame. One `process_frame` call per display tick, driven by the
/// frontend.
pub struct Tuner {
    table: Vec<ReferenceNote>,
    tracker: StabilityTracker,
}

impl Tuner {
    /// Creates a tuner for the given reference table.
    ///
    /// The table is validated here so a bad configuration fails before the
    /// loop ever starts, distinctly from per-frame detection misses.
    pub fn new(table: Vec<ReferenceNote>) -> Result<Self> {
        tuning::validate_table(&table)?;
        Ok(Self {
            table,
            tracker: StabilityTracker::new(),
        })
    }

    /// Creates a tuner for standard guitar tuning.
    pub fn with_standard_tuning() -> Result<Self> {
        Self::new(tuning::standard_tuning().to_vec())
    }

    /// Runs the pipeline on one frame and returns the resulting event.
    ///
    /// Silence and degenerate frames flow through as a reset; a detected
    /// pitch is matched against the table and handed to the stability
    /// tracker, which decides whether anything user-visible happened.
    pub fn process_frame(&mut self, frame: &[f32], sample_rate: u32) -> NoteEvent {
        match pitch::detect_pitch(frame, sample_rate, SILENCE_RMS_THRESHOLD) {
            Some(freq) => {
                let matched = tuning::find_nearest_note(freq, &self.table);
                self.tracker.observe(Some(&matched))
            }
            None => self.tracker.observe(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stability::{ConfidenceTier, STABILITY_THRESHOLD};

    const SAMPLE_RATE: u32 = 44100;
    const FRAME_LEN: usize = 2048;

    fn sine_frame(frequency: f32) -> Vec<f32> {
        (0..FRAME_LEN)
            .map(|i| {
                0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32 / SAMPLE_RATE as f32)
                    .sin()
            })
            .collect()
    }

    fn silent_frame() -> Vec<f32> {
        vec![0.0; FRAME_LEN]
    }

    #[test]
    fn rejects_empty_reference_table() {
        assert!(Tuner::new(Vec::new()).is_err());
    }

    #[test]
    fn silence_then_note_then_silence() {
        let mut tuner = Tuner::with_standard_tuning().unwrap();

        // Silence keeps resetting the display.
        for _ in 0..3 {
            assert_eq!(
                tuner.process_frame(&silent_frame(), SAMPLE_RATE),
                NoteEvent::Reset
            );
        }

        // An open A string becomes stable on the threshold-th frame.
        let a_string = sine_frame(110.0);
        for _ in 0..STABILITY_THRESHOLD - 1 {
            assert_eq!(
                tuner.process_frame(&a_string, SAMPLE_RATE),
                NoteEvent::NoChange
            );
        }
        match tuner.process_frame(&a_string, SAMPLE_RATE) {
            NoteEvent::NoteChanged {
                symbol,
                deviation_hz,
                tier,
            } => {
                assert_eq!(symbol, "A");
                assert!(deviation_hz < 1.0, "deviation was {} Hz", deviation_hz);
                assert_eq!(tier, ConfidenceTier::Exact);
            }
            other => panic!("expected NoteChanged, got {:?}", other),
        }

        // Going quiet clears the display immediately.
        assert_eq!(
            tuner.process_frame(&silent_frame(), SAMPLE_RATE),
            NoteEvent::Reset
        );
    }

    #[test]
    fn detuned_string_reports_close_tier() {
        // 150 Hz sits between D (146.83 Hz) and G (196.0 Hz); it should
        // eventually report as a D roughly 3.2 Hz off.
        let mut tuner = Tuner::with_standard_tuning().unwrap();
        let frame = sine_frame(150.0);

        let mut changed = None;
        for _ in 0..STABILITY_THRESHOLD {
            if let NoteEvent::NoteChanged {
                symbol,
                deviation_hz,
                tier,
            } = tuner.process_frame(&frame, SAMPLE_RATE)
            {
                changed = Some((symbol, deviation_hz, tier));
            }
        }

        let (symbol, deviation_hz, tier) = changed.expect("note never became stable");
        assert_eq!(symbol, "D");
        assert!(
            (deviation_hz - 3.17).abs() < 0.5,
            "deviation was {} Hz",
            deviation_hz
        );
        assert_eq!(tier, ConfidenceTier::Close);
    }
}
