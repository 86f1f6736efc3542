//! Rhythm pattern representation.
//!
//! A pattern is one measure of signed beat lengths: positive values are
//! notes, negative values are rests of the same length.

use super::{NoteValue, BEATS_PER_MEASURE};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors reported by opt-in pattern validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("pattern has no entries")]
    Empty,

    #[error("entry {index} has unsupported length {beats} beats")]
    UnsupportedValue { index: usize, beats: f64 },

    #[error("pattern spans {total} beats, expected {expected}")]
    WrongLength { total: f64, expected: u32 },

    #[error("unsupported subdivision {0}, expected 4, 8 or 16")]
    UnsupportedSubdivision(u32),
}

/// One decoded pattern entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternEntry {
    /// Length in beats (always non-negative).
    pub beats: f64,
    /// Whether the entry is silent.
    pub rest: bool,
}

impl PatternEntry {
    /// The note value for this entry, if its length is supported.
    pub fn note_value(&self) -> Option<NoteValue> {
        NoteValue::from_beats(self.beats)
    }
}

/// An ordered sequence of signed beat lengths describing one measure.
///
/// Construction never validates: out-of-budget patterns are accepted and
/// simply produce inconsistent notation or timing. Call
/// [`RhythmPattern::validate`] to check a pattern explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RhythmPattern(Vec<f64>);

impl RhythmPattern {
    /// Creates a pattern from signed beat lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhythmtui::rhythm::RhythmPattern;
    ///
    /// let pattern = RhythmPattern::new([1.0, 1.0, -1.0, 1.0]);
    /// assert_eq!(pattern.total_beats(), 4.0);
    /// ```
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self(values.into())
    }

    /// Raw signed values.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the pattern has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries as (length, rest) pairs.
    pub fn entries(&self) -> impl Iterator<Item = PatternEntry> + '_ {
        self.0.iter().map(|&value| PatternEntry {
            beats: value.abs(),
            rest: value < 0.0,
        })
    }

    /// Sum of the absolute lengths in beats.
    pub fn total_beats(&self) -> f64 {
        self.0.iter().map(|v| v.abs()).sum()
    }

    /// Checks that the pattern fills exactly one 4/4 measure with
    /// supported note values.
    pub fn validate(&self) -> Result<(), PatternError> {
        if self.0.is_empty() {
            return Err(PatternError::Empty);
        }

        if let Some((index, &beats)) = self
            .0
            .iter()
            .enumerate()
            .find(|(_, v)| NoteValue::from_beats(**v).is_none())
        {
            return Err(PatternError::UnsupportedValue { index, beats });
        }

        let total = self.total_beats();
        if total != BEATS_PER_MEASURE as f64 {
            return Err(PatternError::WrongLength {
                total,
                expected: BEATS_PER_MEASURE,
            });
        }

        Ok(())
    }
}

impl fmt::Display for RhythmPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_split_sign() {
        let pattern = RhythmPattern::new([1.0, -0.5, 0.5, 2.0]);
        let entries: Vec<_> = pattern.entries().collect();
        assert_eq!(entries.len(), 4);
        assert!(!entries[0].rest);
        assert!(entries[1].rest);
        assert_eq!(entries[1].beats, 0.5);
        assert_eq!(entries[1].note_value(), Some(NoteValue::Eighth));
    }

    #[test]
    fn test_total_counts_rests() {
        let pattern = RhythmPattern::new([1.0, -1.0, -1.0, 1.0]);
        assert_eq!(pattern.total_beats(), 4.0);
        assert!(pattern.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_patterns() {
        assert_eq!(RhythmPattern::new(Vec::<f64>::new()).validate(), Err(PatternError::Empty));
        assert_eq!(
            RhythmPattern::new([1.0, 1.0, 1.0]).validate(),
            Err(PatternError::WrongLength {
                total: 3.0,
                expected: 4
            })
        );
        assert_eq!(
            RhythmPattern::new([3.0, 1.0]).validate(),
            Err(PatternError::UnsupportedValue {
                index: 0,
                beats: 3.0
            })
        );
    }

    #[test]
    fn test_display_and_serde() {
        let pattern = RhythmPattern::new([0.5, 0.5, -1.0, 2.0]);
        assert_eq!(pattern.to_string(), "[0.5, 0.5, -1, 2]");
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, "[0.5,0.5,-1.0,2.0]");
    }
}
