//! Quiz progression: the current item, the user's selection and the
//! auto-advance after a correct answer.

use super::bank::{QuizError, QuizItem};
use crate::timer::{TimerId, Timers};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default delay before moving on after a correct answer.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(1000);

/// Outcome of [`Quiz::select_choice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Playback in progress, a choice already made, or index out of range.
    Ignored,
    /// The correct choice; the quiz will advance on its own.
    Correct,
    /// A wrong choice; the advance control is now visible.
    Incorrect,
}

/// How a choice should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceStatus {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AutoAdvance;

/// The quiz state machine.
#[derive(Debug)]
pub struct Quiz {
    items: Vec<QuizItem>,
    current: usize,
    selected: Option<usize>,
    show_advance: bool,
    auto_advance_delay: Duration,
    timers: Timers<AutoAdvance>,
    pending: Option<TimerId>,
}

impl Quiz {
    /// Starts a quiz at the first item.
    pub fn new(items: Vec<QuizItem>, auto_advance_delay: Duration) -> Result<Self, QuizError> {
        if items.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        Ok(Self {
            items,
            current: 0,
            selected: None,
            show_advance: false,
            auto_advance_delay,
            timers: Timers::new(),
            pending: None,
        })
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    /// Index of the current item.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The item being asked.
    pub fn current(&self) -> &QuizItem {
        &self.items[self.current]
    }

    /// The user's choice for the current item.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the explicit "next" control should be shown.
    pub fn show_advance(&self) -> bool {
        self.show_advance
    }

    /// Whether the selection made is the correct one.
    pub fn is_correct(&self) -> Option<bool> {
        self.selected.map(|i| i == self.current().correct())
    }

    /// Whether an auto-advance is scheduled.
    pub fn auto_advance_pending(&self) -> bool {
        self.pending.is_some_and(|id| self.timers.is_pending(id))
    }

    /// Records the user's answer.
    pub fn select_choice(&mut self, index: usize, playing: bool, now: Instant) -> Selection {
        if playing || self.selected.is_some() || self.current().choice(index).is_none() {
            debug!(index, playing, "Ignoring choice selection");
            return Selection::Ignored;
        }

        self.selected = Some(index);
        if index == self.current().correct() {
            info!(item = self.current, index, "Correct answer");
            self.pending = Some(self.timers.schedule(now + self.auto_advance_delay, AutoAdvance));
            Selection::Correct
        } else {
            info!(item = self.current, index, "Incorrect answer");
            self.show_advance = true;
            Selection::Incorrect
        }
    }

    /// Moves to the next item, wrapping after the last.
    ///
    /// Returns `false` (and nothing changes) while playback is in progress.
    pub fn advance(&mut self, playing: bool) -> bool {
        if playing {
            debug!("Ignoring advance during playback");
            return false;
        }
        self.next_item();
        true
    }

    /// Fires a due auto-advance. Returns true if the item changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let fired = !self.timers.poll(now).is_empty();
        if fired {
            self.pending = None;
            self.next_item();
        }
        fired
    }

    /// When the pending auto-advance is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Highlight for a choice. Everything is neutral until a selection is
    /// made; then the correct choice and a wrong selection are marked.
    pub fn choice_status(&self, index: usize) -> ChoiceStatus {
        let Some(selected) = self.selected else {
            return ChoiceStatus::Neutral;
        };
        if index == self.current().correct() {
            ChoiceStatus::Correct
        } else if index == selected {
            ChoiceStatus::Incorrect
        } else {
            ChoiceStatus::Neutral
        }
    }

    fn next_item(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timers.cancel(id);
        }
        self.current = (self.current + 1) % self.items.len();
        self.selected = None;
        self.show_advance = false;
        info!(item = self.current, "Advanced to next item");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::builtin_items;

    fn quiz() -> Quiz {
        Quiz::new(builtin_items().unwrap(), AUTO_ADVANCE_DELAY).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_correct_answer_auto_advances() {
        let mut quiz = quiz();
        let start = Instant::now();
        assert_eq!(quiz.select_choice(0, false, start), Selection::Correct);
        assert!(!quiz.show_advance());
        assert!(quiz.auto_advance_pending());

        assert!(!quiz.poll(start + ms(999)));
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.poll(start + ms(1000)));
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.selected(), None);
        assert!(!quiz.auto_advance_pending());
    }

    #[test]
    fn test_incorrect_answer_shows_advance() {
        let mut quiz = quiz();
        let start = Instant::now();
        assert_eq!(quiz.select_choice(2, false, start), Selection::Incorrect);
        assert!(quiz.show_advance());
        assert_eq!(quiz.is_correct(), Some(false));

        assert!(!quiz.poll(start + ms(5000)));
        assert_eq!(quiz.current_index(), 0);

        assert!(quiz.advance(false));
        assert_eq!(quiz.current_index(), 1);
        assert!(!quiz.show_advance());
        assert_eq!(quiz.selected(), None);
    }

    #[test]
    fn test_selection_ignored() {
        let mut quiz = quiz();
        let now = Instant::now();
        assert_eq!(quiz.select_choice(1, true, now), Selection::Ignored);
        assert_eq!(quiz.select_choice(5, false, now), Selection::Ignored);
        assert_eq!(quiz.selected(), None);

        quiz.select_choice(1, false, now);
        assert_eq!(quiz.select_choice(0, false, now), Selection::Ignored);
        assert_eq!(quiz.selected(), Some(1));
    }

    #[test]
    fn test_advance_ignored_while_playing() {
        let mut quiz = quiz();
        quiz.select_choice(3, false, Instant::now());
        assert!(!quiz.advance(true));
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.show_advance());
    }

    #[test]
    fn test_last_item_wraps_to_first() {
        let mut quiz = quiz();
        let start = Instant::now();
        for _ in 0..4 {
            quiz.advance(false);
        }
        assert_eq!(quiz.current_index(), 4);

        let correct = quiz.current().correct();
        assert_eq!(quiz.select_choice(correct, false, start), Selection::Correct);
        quiz.poll(start + AUTO_ADVANCE_DELAY);
        assert_eq!(quiz.current_index(), 0);
    }

    #[test]
    fn test_auto_advance_not_gated_by_playback() {
        let mut quiz = quiz();
        let start = Instant::now();
        quiz.select_choice(0, false, start);
        // Playback may start after selecting; the timer still fires
        assert!(quiz.poll(start + ms(1500)));
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn test_manual_advance_cancels_auto_advance() {
        let mut quiz = quiz();
        let start = Instant::now();
        quiz.select_choice(0, false, start);
        assert!(quiz.advance(false));
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.next_deadline(), None);

        assert!(!quiz.poll(start + ms(2000)));
        assert_eq!(quiz.current_index(), 1);
    }

    #[test]
    fn test_choice_status() {
        let mut quiz = quiz();
        assert_eq!(quiz.choice_status(0), ChoiceStatus::Neutral);

        quiz.select_choice(2, false, Instant::now());
        assert_eq!(quiz.choice_status(0), ChoiceStatus::Correct);
        assert_eq!(quiz.choice_status(2), ChoiceStatus::Incorrect);
        assert_eq!(quiz.choice_status(1), ChoiceStatus::Neutral);
    }

    #[test]
    fn test_empty_bank_rejected() {
        assert_eq!(
            Quiz::new(Vec::new(), AUTO_ADVANCE_DELAY).err(),
            Some(QuizError::EmptyBank)
        );
    }
}
