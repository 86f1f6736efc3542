//! Rhythm data structures for one 4/4 measure.
//!
//! This module provides the note values, subdivision grids and patterns
//! the quiz is built from, plus the conversions into a playback schedule
//! and a MusicXML document.

mod musicxml;
mod pattern;
mod schedule;

pub use musicxml::{compile, compile_with, subdivision_demo, CompileOptions, MarkupDocument};
pub use pattern::{PatternEntry, PatternError, RhythmPattern};
pub use schedule::{EntryStart, Slot, SlotKind, SubBeatSchedule};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Fixed playback tempo in beats per minute.
pub const TEMPO_BPM: u32 = 100;

/// Beats in the only supported measure (4/4).
pub const BEATS_PER_MEASURE: u32 = 4;

/// MusicXML duration resolution: units per quarter-note beat.
pub const DIVISIONS: u32 = 8;

/// Returns the length of one quarter-note beat at the fixed tempo.
///
/// # Examples
///
/// ```
/// use rhythmtui::rhythm::beat_duration;
///
/// assert_eq!(beat_duration().as_millis(), 600);
/// ```
pub fn beat_duration() -> Duration {
    Duration::from_millis(60_000 / TEMPO_BPM as u64)
}

/// Note lengths the quiz patterns are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteValue {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl NoteValue {
    /// All supported values, longest first.
    pub const ALL: [NoteValue; 5] = [
        NoteValue::Whole,
        NoteValue::Half,
        NoteValue::Quarter,
        NoteValue::Eighth,
        NoteValue::Sixteenth,
    ];

    /// Maps a signed beat length to its note value.
    ///
    /// The sign (note vs rest) is ignored; only the magnitude decides.
    /// Returns None for lengths outside the supported set.
    pub fn from_beats(beats: f64) -> Option<Self> {
        let magnitude = beats.abs();
        Self::ALL.into_iter().find(|v| v.beats() == magnitude)
    }

    /// Length in quarter-note beats.
    pub fn beats(self) -> f64 {
        match self {
            NoteValue::Whole => 4.0,
            NoteValue::Half => 2.0,
            NoteValue::Quarter => 1.0,
            NoteValue::Eighth => 0.5,
            NoteValue::Sixteenth => 0.25,
        }
    }

    /// Length in MusicXML divisions.
    pub fn divisions(self) -> u32 {
        (self.beats() * DIVISIONS as f64) as u32
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            NoteValue::Whole => "whole",
            NoteValue::Half => "half",
            NoteValue::Quarter => "quarter",
            NoteValue::Eighth => "eighth",
            NoteValue::Sixteenth => "sixteenth",
        }
    }

    /// Token used in the MusicXML `<type>` element.
    pub fn musicxml_type(self) -> &'static str {
        match self {
            NoteValue::Whole => "whole",
            NoteValue::Half => "half",
            NoteValue::Quarter => "quarter",
            NoteValue::Eighth => "eighth",
            NoteValue::Sixteenth => "16th",
        }
    }

    /// Parses a MusicXML `<type>` token.
    pub fn from_musicxml_type(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.musicxml_type() == token)
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many equal slots one measure is split into for the metronome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Subdivision {
    Four,
    Eight,
    Sixteen,
}

impl Subdivision {
    /// All grids, coarsest first.
    pub const ALL: [Subdivision; 3] = [Subdivision::Four, Subdivision::Eight, Subdivision::Sixteen];

    /// Slots per measure.
    pub fn count(self) -> u32 {
        match self {
            Subdivision::Four => 4,
            Subdivision::Eight => 8,
            Subdivision::Sixteen => 16,
        }
    }

    /// Slots per quarter-note beat.
    pub fn per_beat(self) -> u32 {
        self.count() / BEATS_PER_MEASURE
    }

    /// Length of one slot at the fixed tempo.
    pub fn sub_beat_duration(self) -> Duration {
        beat_duration() / self.per_beat()
    }

    /// The note value that fills exactly one slot.
    pub fn note_value(self) -> NoteValue {
        match self {
            Subdivision::Four => NoteValue::Quarter,
            Subdivision::Eight => NoteValue::Eighth,
            Subdivision::Sixteen => NoteValue::Sixteenth,
        }
    }
}

impl TryFrom<u32> for Subdivision {
    type Error = PatternError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Subdivision::Four),
            8 => Ok(Subdivision::Eight),
            16 => Ok(Subdivision::Sixteen),
            other => Err(PatternError::UnsupportedSubdivision(other)),
        }
    }
}

impl From<Subdivision> for u32 {
    fn from(value: Subdivision) -> Self {
        value.count()
    }
}

impl fmt::Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-beat", self.count())
    }
}
