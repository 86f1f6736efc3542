//! Quiz items and the built-in bank.

use crate::rhythm::{RhythmPattern, Subdivision};
use serde::Serialize;
use thiserror::Error;

/// Choices offered for every item.
pub const CHOICE_COUNT: usize = 5;

/// Errors raised when building a quiz item.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    #[error("correct choice {index} is out of range (0..{CHOICE_COUNT})")]
    CorrectOutOfRange { index: usize },

    #[error("correct choice {index} is {choice}, prompt is {prompt}")]
    CorrectMismatch {
        index: usize,
        choice: RhythmPattern,
        prompt: RhythmPattern,
    },

    #[error("quiz bank is empty")]
    EmptyBank,
}

/// One question: a prompt pattern and five candidate patterns.
///
/// Only built through [`QuizItem::new`], so the correct choice always
/// matches the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizItem {
    prompt: RhythmPattern,
    choices: [RhythmPattern; CHOICE_COUNT],
    correct: usize,
    subdivision: Subdivision,
}

impl QuizItem {
    /// Builds an item, checking that the correct choice matches the prompt.
    pub fn new(
        prompt: RhythmPattern,
        choices: [RhythmPattern; CHOICE_COUNT],
        correct: usize,
        subdivision: Subdivision,
    ) -> Result<Self, QuizError> {
        let choice = choices
            .get(correct)
            .ok_or(QuizError::CorrectOutOfRange { index: correct })?;
        if *choice != prompt {
            return Err(QuizError::CorrectMismatch {
                index: correct,
                choice: choice.clone(),
                prompt,
            });
        }
        Ok(Self {
            prompt,
            choices,
            correct,
            subdivision,
        })
    }

    pub fn prompt(&self) -> &RhythmPattern {
        &self.prompt
    }

    pub fn choices(&self) -> &[RhythmPattern; CHOICE_COUNT] {
        &self.choices
    }

    /// Returns a choice, or None if the index is out of range.
    pub fn choice(&self, index: usize) -> Option<&RhythmPattern> {
        self.choices.get(index)
    }

    /// Index of the choice equal to the prompt.
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Metronome grid used when playing this item's patterns.
    pub fn subdivision(&self) -> Subdivision {
        self.subdivision
    }

    /// Every pattern in the item, prompt first.
    pub fn patterns(&self) -> impl Iterator<Item = &RhythmPattern> {
        std::iter::once(&self.prompt).chain(self.choices.iter())
    }
}

fn item(
    prompt: &[f64],
    choices: [&[f64]; CHOICE_COUNT],
    correct: usize,
    subdivision: Subdivision,
) -> Result<QuizItem, QuizError> {
    QuizItem::new(
        RhythmPattern::new(prompt.to_vec()),
        choices.map(|c| RhythmPattern::new(c.to_vec())),
        correct,
        subdivision,
    )
}

/// The items shipped with the quiz, easiest first.
pub fn builtin_items() -> Result<Vec<QuizItem>, QuizError> {
    Ok(vec![
        item(
            &[2.0, 2.0],
            [
                &[2.0, 2.0],
                &[1.0, 1.0, 1.0, 1.0],
                &[4.0],
                &[1.0, -1.0, 1.0, 1.0],
                &[-1.0, 1.0, 2.0],
            ],
            0,
            Subdivision::Four,
        )?,
        item(
            &[1.0, 1.0, -1.0, 1.0],
            [
                &[1.0, 1.0, -1.0, 1.0],
                &[1.0, -1.0, 1.0, 1.0],
                &[-1.0, 1.0, 1.0, 1.0],
                &[1.0, -1.0, 2.0],
                &[2.0, 2.0],
            ],
            0,
            Subdivision::Four,
        )?,
        item(
            &[0.5, 0.5, 1.0, 0.5, 0.5, 1.0],
            [
                &[0.5, 0.5, 1.0, 0.5, 0.5, 1.0],
                &[1.0, 0.5, 0.5, 0.5, 0.5, 1.0],
                &[0.5, 0.5, 0.5, 0.5, 1.0, 1.0],
                &[1.0, 1.0, 0.5, 0.5, 1.0],
                &[0.5, 1.0, 0.5, 1.0, 1.0],
            ],
            0,
            Subdivision::Eight,
        )?,
        item(
            &[0.25, 0.25, 0.5, 1.0, 0.25, 0.25, 0.5, 1.0],
            [
                &[0.25, 0.25, 0.5, 1.0, 0.25, 0.25, 0.5, 1.0],
                &[0.5, 0.25, 0.25, 1.0, 0.25, 0.25, 0.5, 1.0],
                &[0.25, 0.25, 0.25, 0.25, 0.5, 0.5, 1.0, 1.0],
                &[0.5, 0.5, 1.0, 0.25, 0.25, 0.5, 1.0],
                &[0.25, 0.25, 1.0, 0.25, 0.25, 1.0, 1.0],
            ],
            0,
            Subdivision::Sixteen,
        )?,
        item(
            &[0.25, -0.25, 0.5, 1.0, 0.5, 0.5, 1.0],
            [
                &[0.25, 0.25, 0.5, 1.0, 0.5, 0.5, 1.0],
                &[-0.25, 0.25, 0.5, 1.0, 0.5, 0.5, 1.0],
                &[0.5, 0.5, 1.0, -0.25, 0.25, 0.5, 1.0],
                &[0.25, -0.25, 0.5, 1.0, 0.5, 0.5, 1.0],
                &[0.25, -0.25, 0.5, 0.5, 0.5, 1.0, 1.0],
            ],
            3,
            Subdivision::Sixteen,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bank_shape() {
        let items = builtin_items().unwrap();
        assert_eq!(items.len(), 5);
        let grids: Vec<u32> = items.iter().map(|i| i.subdivision().count()).collect();
        assert_eq!(grids, vec![4, 4, 8, 16, 16]);
    }

    #[test]
    fn test_every_pattern_fills_one_measure() {
        for (n, item) in builtin_items().unwrap().iter().enumerate() {
            for pattern in item.patterns() {
                assert_eq!(pattern.total_beats(), 4.0, "item {n}: {pattern}");
                assert!(pattern.validate().is_ok(), "item {n}: {pattern}");
            }
        }
    }

    #[test]
    fn test_correct_choice_matches_prompt() {
        for item in builtin_items().unwrap() {
            assert_eq!(item.choice(item.correct()), Some(item.prompt()));
            let matches = item.choices().iter().filter(|c| *c == item.prompt()).count();
            assert_eq!(matches, 1);
        }
    }

    #[test]
    fn test_last_item_has_sixteenth_rest() {
        let items = builtin_items().unwrap();
        let last = items.last().unwrap();
        assert!(last.prompt().values().contains(&-0.25));
    }

    #[test]
    fn test_new_rejects_bad_correct_index() {
        let choices = [[4.0]; CHOICE_COUNT].map(|c| RhythmPattern::new(c.to_vec()));
        let err = QuizItem::new(RhythmPattern::new([4.0]), choices.clone(), 5, Subdivision::Four);
        assert_eq!(err, Err(QuizError::CorrectOutOfRange { index: 5 }));

        let err = QuizItem::new(RhythmPattern::new([2.0, 2.0]), choices, 1, Subdivision::Four);
        assert!(matches!(err, Err(QuizError::CorrectMismatch { index: 1, .. })));
    }

    #[test]
    fn test_item_serializes_for_export() {
        let items = builtin_items().unwrap();
        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["correct"], serde_json::json!(items[0].correct()));
        assert_eq!(json["choices"].as_array().map(Vec::len), Some(CHOICE_COUNT));
        assert_eq!(json["prompt"], serde_json::to_value(items[0].prompt()).unwrap());
    }
}
