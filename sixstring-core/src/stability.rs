//! # Stability Tracking Module
//!
//! Raw per-frame pitch estimates flicker near note transitions and during
//! the attack of a plucked string. This module debounces them: a note is
//! only reported after it has been observed for a minimum number of
//! consecutive frames, while silence is reported immediately so the display
//! never shows a stale note.

use crate::tuning::MatchResult;

/// Number of consecutive identical matches required before a note is reported.
pub const STABILITY_THRESHOLD: u32 = 5;

/// How far the detected frequency may sit from the matched note's target,
/// expressed as a coarse confidence tier for the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    /// Deviation below 1 Hz: in tune.
    Exact,
    /// Deviation below 5 Hz: nearly in tune.
    Close,
    /// Deviation of 5 Hz or more: clearly off.
    Off,
}

impl ConfidenceTier {
    /// Maps an absolute deviation in Hz onto a tier.
    pub fn from_deviation(deviation_hz: f32) -> Self {
        if deviation_hz < 1.0 {
            ConfidenceTier::Exact
        } else if deviation_hz < 5.0 {
            ConfidenceTier::Close
        } else {
            ConfidenceTier::Off
        }
    }
}

/// Event emitted by the tracker for each observed frame.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEvent {
    /// Silence or no detectable pitch; the display should clear immediately.
    Reset,
    /// Nothing user-visible changed this frame.
    NoChange,
    /// A new note became stable. Emitted at most once per stable run.
    NoteChanged {
        symbol: String,
        deviation_hz: f32,
        tier: ConfidenceTier,
    },
}

/// Debounces a stream of per-frame note matches into stable note events.
///
/// Each tracker instance owns its own state, so independent trackers can be
/// constructed freely (one per audio stream, one per unit test). State is
/// bounded: one optional symbol pair and a counter, regardless of how long
/// the tracker runs.
#[derive(Debug)]
pub struct StabilityTracker {
    /// The note seen on the previous frame, if any.
    last_observed: Option<String>,
    /// Length of the current run of identical observations.
    consecutive: u32,
    /// The note currently reported to the display, if any.
    reported: Option<String>,
    threshold: u32,
}

impl StabilityTracker {
    /// Creates a tracker with the default stability threshold.
    pub fn new() -> Self {
        Self::with_threshold(STABILITY_THRESHOLD)
    }

    /// Creates a tracker requiring `threshold` consecutive identical
    /// observations before a note change is reported.
    pub fn with_threshold(threshold: u32) -> Self {
        Self {
            last_observed: None,
            consecutive: 0,
            reported: None,
            threshold,
        }
    }

    /// Feeds one frame's match result (or `None` for silence) to the tracker.
    ///
    /// Silence resets everything unconditionally and emits [`NoteEvent::Reset`].
    /// A matched note extends or restarts the current run; once the run
    /// reaches the threshold and the note differs from the one already
    /// reported, a single [`NoteEvent::NoteChanged`] is emitted.
    pub fn observe(&mut self, matched: Option<&MatchResult>) -> NoteEvent {
        let matched = match matched {
            Some(m) => m,
            None => {
                self.last_observed = None;
                self.consecutive = 0;
                self.reported = None;
                return NoteEvent::Reset;
            }
        };

        let symbol = matched.note.symbol.as_str();
        if self.last_observed.as_deref() == Some(symbol) {
            self.consecutive += 1;
        } else {
            self.last_observed = Some(symbol.to_string());
            self.consecutive = 1;
        }

        if self.consecutive >= self.threshold && self.reported.as_deref() != Some(symbol) {
            self.reported = Some(symbol.to_string());
            return NoteEvent::NoteChanged {
                symbol: symbol.to_string(),
                deviation_hz: matched.deviation_hz,
                tier: ConfidenceTier::from_deviation(matched.deviation_hz),
            };
        }

        NoteEvent::NoChange
    }
}
