//! The rhythm quiz: items, the built-in bank and the controller that walks
//! through them.

mod bank;
mod controller;

pub use bank::{builtin_items, QuizError, QuizItem, CHOICE_COUNT};
pub use controller::{ChoiceStatus, Quiz, Selection, AUTO_ADVANCE_DELAY};
