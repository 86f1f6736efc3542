//! Sub-beat schedule derived from a pattern for playback.
//!
//! Walks the pattern once, accumulating a running slot offset. Each entry
//! covers `|beats| * per_beat` slots starting at the current offset. The
//! measure is then split into `count()` slots and each slot is tagged with
//! what should sound on it.

use super::{RhythmPattern, Subdivision};
use serde::Serialize;

/// What sounds on a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Nothing plays (metronome disabled, no note onset).
    Silence,
    /// Metronome click only.
    Metronome,
    /// Metronome click plus the note tone, started together.
    MetronomeAndNote,
}

impl SlotKind {
    /// Whether a note onset falls on this slot.
    pub fn has_note(self) -> bool {
        self == SlotKind::MetronomeAndNote
    }
}

/// Where one pattern entry sits on the slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryStart {
    /// First slot covered by the entry. Fractional when the entry does not
    /// start on the grid.
    pub start: f64,
    /// Number of slots the entry covers.
    pub span: f64,
    /// Whether the entry is a rest.
    pub rest: bool,
}

/// One slot of the playback grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub index: u32,
    pub kind: SlotKind,
    /// True on the first slot of each quarter-note beat.
    pub accent: bool,
}

/// Per-playback slot grid for one pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubBeatSchedule {
    subdivision: Subdivision,
    entries: Vec<EntryStart>,
    slots: Vec<Slot>,
}

impl SubBeatSchedule {
    /// Builds the schedule for a pattern on the given grid.
    ///
    /// # Arguments
    ///
    /// * `pattern` - The rhythm to lay out
    /// * `subdivision` - Slot grid for the measure
    /// * `metronome` - Whether slots without a note onset still click
    pub fn build(pattern: &RhythmPattern, subdivision: Subdivision, metronome: bool) -> Self {
        let per_beat = subdivision.per_beat() as f64;

        let mut entries = Vec::with_capacity(pattern.len());
        let mut offset = 0.0;
        for entry in pattern.entries() {
            let span = entry.beats * per_beat;
            entries.push(EntryStart {
                start: offset,
                span,
                rest: entry.rest,
            });
            offset += span;
        }

        let slots = (0..subdivision.count())
            .map(|index| {
                // The first entry starting exactly on this slot decides it
                let onset = entries.iter().find(|e| e.start == index as f64);
                let kind = match onset {
                    Some(entry) if !entry.rest => SlotKind::MetronomeAndNote,
                    _ if metronome => SlotKind::Metronome,
                    _ => SlotKind::Silence,
                };
                Slot {
                    index,
                    kind,
                    accent: index % subdivision.per_beat() == 0,
                }
            })
            .collect();

        Self {
            subdivision,
            entries,
            slots,
        }
    }

    /// The grid this schedule was built on.
    pub fn subdivision(&self) -> Subdivision {
        self.subdivision
    }

    /// Entry positions in pattern order.
    pub fn entries(&self) -> &[EntryStart] {
        &self.entries
    }

    /// All slots in playback order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Number of slots (equal to the subdivision count).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the schedule has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Start slot of every entry, rests included.
    pub fn starts(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.start).collect()
    }

    /// Slots where a note onset sounds.
    pub fn note_slots(&self) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|s| s.kind.has_note())
            .map(|s| s.index)
            .collect()
    }
}
