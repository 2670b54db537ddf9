//! # Tuning Module
//!
//! This module defines the reference note table and nearest-note matching
//! for the tuner. The default table is standard guitar tuning (EADGBe),
//! but matching works against any validated table.
//!
//! ## Features
//! - Static standard-tuning reference table (6 strings, low to high)
//! - Startup validation of reference tables
//! - Nearest-note matching with absolute deviation in Hz

use anyhow::{bail, Result};
use once_cell::sync::Lazy;

/// A single reference note: a display symbol and its target frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceNote {
    /// Note symbol (e.g. "E", "A", "e")
    pub symbol: String,
    /// Target frequency in Hz
    pub frequency: f32,
}

/// The result of matching an estimated frequency against a reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The nearest reference note.
    pub note: ReferenceNote,
    /// Absolute deviation from the note's target frequency, in Hz.
    pub deviation_hz: f32,
}

/// Standard guitar tuning, lowest string to highest.
///
/// The lowercase "e" distinguishes the high E string from the low one,
/// matching how the strings are conventionally written.
static STANDARD_TUNING: Lazy<Vec<ReferenceNote>> = Lazy::new(|| {
    [
        ("E", 82.41),
        ("A", 110.0),
        ("D", 146.83),
        ("G", 196.0),
        ("B", 246.94),
        ("e", 329.63),
    ]
    .iter()
    .map(|&(symbol, frequency)| ReferenceNote {
        symbol: symbol.to_string(),
        frequency,
    })
    .collect()
});

/// Returns the standard guitar tuning reference table.
pub fn standard_tuning() -> &'static [ReferenceNote] {
    &STANDARD_TUNING
}

/// Validates a reference table before the tuner loop is allowed to start.
///
/// An empty table or a table whose frequencies are not strictly increasing
/// is a configuration error and must fail here, at startup, rather than
/// surface later as a bad per-frame match.
pub fn validate_table(table: &[ReferenceNote]) -> Result<()> {
    if table.is_empty() {
        bail!("reference note table is empty");
    }
    for pair in table.windows(2) {
        if pair[1].frequency <= pair[0].frequency {
            bail!(
                "reference note frequencies must be strictly increasing: {} ({} Hz) follows {} ({} Hz)",
                pair[1].symbol,
                pair[1].frequency,
                pair[0].symbol,
                pair[0].frequency
            );
        }
    }
    Ok(())
}

/// Finds the reference note closest to a given frequency.
///
/// Linear scan keeping the minimum absolute deviation; ties go to the
/// earlier table entry, so the result is deterministic. Callers only
/// invoke this with a finite positive frequency and a validated
/// (non-empty) table.
///
/// # Arguments
/// * `freq` - Estimated frequency in Hz
/// * `table` - Reference table to match against
pub fn find_nearest_note(freq: f32, table: &[ReferenceNote]) -> MatchResult {
    let mut closest = &table[0];
    let mut min_deviation = (freq - closest.frequency).abs();
    for note in &table[1..] {
        let deviation = (freq - note.frequency).abs();
        if deviation < min_deviation {
            closest = note;
            min_deviation = deviation;
        }
    }
    MatchResult {
        note: closest.clone(),
        deviation_hz: min_deviation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_frequency_matches_with_zero_deviation() {
        for note in standard_tuning() {
            let result = find_nearest_note(note.frequency, standard_tuning());
            assert_eq!(result.note.symbol, note.symbol);
            assert_eq!(result.deviation_hz, 0.0);
        }
    }

    #[test]
    fn matches_nearest_entry() {
        // 150 Hz sits between D (146.83) and G (196.0), closer to D.
        let result = find_nearest_note(150.0, standard_tuning());
        assert_eq!(result.note.symbol, "D");
        assert!((result.deviation_hz - 3.17).abs() < 1e-3);
    }

    #[test]
    fn ties_go_to_the_first_table_entry() {
        let table = vec![
            ReferenceNote {
                symbol: "X".to_string(),
                frequency: 100.0,
            },
            ReferenceNote {
                symbol: "Y".to_string(),
                frequency: 200.0,
            },
        ];
        // 150 Hz is equidistant from both entries.
        let result = find_nearest_note(150.0, &table);
        assert_eq!(result.note.symbol, "X");
        assert_eq!(result.deviation_hz, 50.0);
    }

    #[test]
    fn empty_table_fails_validation() {
        assert!(validate_table(&[]).is_err());
    }

    #[test]
    fn non_increasing_table_fails_validation() {
        let table = vec![
            ReferenceNote {
                symbol: "A".to_string(),
                frequency: 110.0,
            },
            ReferenceNote {
                symbol: "E".to_string(),
                frequency: 82.41,
            },
        ];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn standard_tuning_is_valid() {
        assert!(validate_table(standard_tuning()).is_ok());
    }
}
