//! Pattern playback.
//!
//! The player walks a [`SubBeatSchedule`] one slot at a time at the fixed
//! tempo, sounding a metronome click on every slot and the note tone where
//! a note starts. It is driven by the event loop: `play` starts a run and
//! `poll` fires whatever slots are due. At most one run is in flight.

use super::engine::ToneOutput;
use super::tone::{Tone, DEFAULT_GAIN};
use crate::rhythm::{RhythmPattern, SlotKind, SubBeatSchedule, Subdivision};
use crate::timer::{TimerId, Timers};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Represents the current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing playing; `play` will start a new run.
    Idle,
    /// A run is in flight; `play` is ignored.
    Playing,
}

/// Step events on the player's timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Sound slot `n`.
    Slot(u32),
    /// The last slot's sub-beat has elapsed.
    Finish,
}

/// Bookkeeping for the run in flight.
#[derive(Debug)]
struct ActiveRun {
    schedule: SubBeatSchedule,
    sub_beat: Duration,
    /// Last slot that has sounded.
    current: Option<u32>,
    /// Pending step, cancellable.
    pending: TimerId,
}

/// Player options taken from the settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerOptions {
    /// Starting amplitude of every tone.
    pub gain: f32,
    /// Click on every slot, not only on note onsets.
    pub metronome: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            metronome: true,
        }
    }
}

/// Plays rhythm patterns through a [`ToneOutput`].
pub struct Player {
    output: Box<dyn ToneOutput>,
    options: PlayerOptions,
    timers: Timers<Step>,
    run: Option<ActiveRun>,
}

impl Player {
    /// Creates an idle player.
    pub fn new(output: Box<dyn ToneOutput>, options: PlayerOptions) -> Self {
        Self {
            output,
            options,
            timers: Timers::new(),
            run: None,
        }
    }

    /// Returns the current playback state.
    pub fn state(&self) -> PlaybackState {
        if self.run.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    /// Returns whether a run is in flight.
    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Name of the output tones go to.
    pub fn output_name(&self) -> &'static str {
        self.output.name()
    }

    /// Last slot sounded and the slot count of the run in flight.
    pub fn progress(&self) -> Option<(u32, u32)> {
        let run = self.run.as_ref()?;
        Some((run.current?, run.schedule.subdivision().count()))
    }

    /// Starts playing a pattern. Slot 0 sounds immediately.
    ///
    /// # Returns
    ///
    /// `false` (and nothing changes) if a run is already in flight.
    pub fn play(&mut self, pattern: &RhythmPattern, subdivision: Subdivision, now: Instant) -> bool {
        if self.run.is_some() {
            debug!(%pattern, "Playback already in progress, ignoring play");
            return false;
        }

        let schedule = SubBeatSchedule::build(pattern, subdivision, self.options.metronome);
        let pending = self.timers.schedule(now, Step::Slot(0));
        self.run = Some(ActiveRun {
            schedule,
            sub_beat: subdivision.sub_beat_duration(),
            current: None,
            pending,
        });
        info!(%pattern, %subdivision, "Playback started");

        self.poll(now);
        true
    }

    /// Fires every step due at `now`, in slot order.
    pub fn poll(&mut self, now: Instant) {
        while let Some((deadline, step)) = self.timers.pop_due(now) {
            match step {
                Step::Slot(index) => self.sound_slot(index, deadline),
                Step::Finish => self.finish(),
            }
        }
    }

    /// When the next step is due, if a run is in flight.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Plays a pattern to completion, sleeping between slots.
    ///
    /// Returns `false` if a run was already in flight.
    pub fn play_blocking(&mut self, pattern: &RhythmPattern, subdivision: Subdivision) -> bool {
        if !self.play(pattern, subdivision, Instant::now()) {
            return false;
        }
        while let Some(deadline) = self.next_deadline() {
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
            }
            self.poll(Instant::now());
        }
        true
    }

    fn sound_slot(&mut self, index: u32, deadline: Instant) {
        let slot = self
            .run
            .as_ref()
            .and_then(|run| run.schedule.slots().get(index as usize).copied());
        let Some(slot) = slot else {
            self.finish();
            return;
        };
        let Some(run) = self.run.as_mut() else {
            return;
        };

        let gain = self.options.gain;
        let tones: Vec<Tone> = match slot.kind {
            SlotKind::MetronomeAndNote if self.options.metronome => {
                vec![Tone::click(slot.accent, gain), Tone::note(gain)]
            }
            SlotKind::MetronomeAndNote => vec![Tone::note(gain)],
            SlotKind::Metronome => vec![Tone::click(slot.accent, gain)],
            SlotKind::Silence => Vec::new(),
        };

        run.current = Some(index);
        let next = if index + 1 < run.schedule.len() as u32 {
            Step::Slot(index + 1)
        } else {
            Step::Finish
        };
        run.pending = self.timers.schedule(deadline + run.sub_beat, next);

        if !tones.is_empty() {
            if let Err(e) = self.output.play(&tones) {
                warn!(slot = index, error = %e, "Failed to sound slot");
            }
        }
    }

    fn finish(&mut self) {
        self.run = None;
        self.timers.clear();
        info!("Playback finished");
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            self.timers.cancel(run.pending);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::engine::RecordingOutput;
    use std::rc::Rc;

    fn player() -> (Player, Rc<RecordingOutput>) {
        let output = Rc::new(RecordingOutput::new());
        let player = Player::new(Box::new(Rc::clone(&output)), PlayerOptions::default());
        (player, output)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_slot_sounds_immediately() {
        let (mut player, output) = player();
        let start = Instant::now();
        assert!(player.play(&RhythmPattern::new([2.0, 2.0]), Subdivision::Four, start));
        assert_eq!(player.state(), PlaybackState::Playing);

        let calls = output.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![Tone::click(true, DEFAULT_GAIN), Tone::note(DEFAULT_GAIN)]);
        assert_eq!(player.progress(), Some((0, 4)));
    }

    #[test]
    fn test_slots_paced_by_sub_beat() {
        let (mut player, output) = player();
        let start = Instant::now();
        player.play(&RhythmPattern::new([2.0, 2.0]), Subdivision::Four, start);

        // Sub-beat at 100 BPM on a 4-grid is 600ms
        player.poll(start + ms(599));
        assert_eq!(output.calls().len(), 1);
        player.poll(start + ms(600));
        assert_eq!(output.calls().len(), 2);
        assert_eq!(output.calls()[1], vec![Tone::click(true, DEFAULT_GAIN)]);

        player.poll(start + ms(1200));
        assert_eq!(output.calls()[2].len(), 2);
        player.poll(start + ms(1800));
        assert_eq!(output.calls().len(), 4);
        assert!(player.is_playing());

        // Idle one sub-beat after the last slot
        player.poll(start + ms(2399));
        assert!(player.is_playing());
        player.poll(start + ms(2400));
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.next_deadline(), None);
    }

    #[test]
    fn test_second_play_is_ignored() {
        let (mut player, output) = player();
        let start = Instant::now();
        player.play(&RhythmPattern::new([1.0, 1.0, 1.0, 1.0]), Subdivision::Four, start);
        let deadline = player.next_deadline();

        assert!(!player.play(&RhythmPattern::new([4.0]), Subdivision::Sixteen, start + ms(10)));
        assert_eq!(player.next_deadline(), deadline);
        assert_eq!(output.calls().len(), 1);
        assert_eq!(player.progress(), Some((0, 4)));
    }

    #[test]
    fn test_overdue_slots_fire_in_order() {
        let (mut player, output) = player();
        let start = Instant::now();
        let pattern = RhythmPattern::new([0.5, 0.5, 1.0, 0.5, 0.5, 1.0]);
        player.play(&pattern, Subdivision::Eight, start);

        player.poll(start + ms(2400));
        let calls = output.calls();
        assert_eq!(calls.len(), 8);
        let with_note: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.len() == 2)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_note, vec![0, 1, 2, 4, 5, 6]);
        // Accent on every other slot of an 8-grid
        assert_eq!(calls[1][0].frequency, 440.0);
        assert_eq!(calls[2][0].frequency, 880.0);
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_play_again_after_finish() {
        let (mut player, output) = player();
        let start = Instant::now();
        player.play(&RhythmPattern::new([4.0]), Subdivision::Four, start);
        player.poll(start + ms(2400));
        assert!(!player.is_playing());

        assert!(player.play(&RhythmPattern::new([4.0]), Subdivision::Four, start + ms(3000)));
        assert_eq!(output.calls().len(), 5);
    }

    #[test]
    fn test_metronome_disabled() {
        let output = Rc::new(RecordingOutput::new());
        let options = PlayerOptions {
            metronome: false,
            ..PlayerOptions::default()
        };
        let mut player = Player::new(Box::new(Rc::clone(&output)), options);
        let start = Instant::now();
        player.play(&RhythmPattern::new([-1.0, 1.0, 2.0]), Subdivision::Four, start);
        player.poll(start + ms(2400));

        let calls = output.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![Tone::note(DEFAULT_GAIN)]);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_play_blocking_runs_to_idle() {
        let (mut player, output) = player();
        let pattern = RhythmPattern::new([0.25; 16]);
        assert!(player.play_blocking(&pattern, Subdivision::Sixteen));
        assert_eq!(output.calls().len(), 16);
        assert!(!player.is_playing());
    }
}
