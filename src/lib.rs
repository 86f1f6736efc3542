//! rhythmtui - A terminal rhythm-reading quiz.
//!
//! This library provides the core functionality for the quiz app: rhythm
//! patterns and their MusicXML/schedule forms, tone playback, terminal
//! notation, and the quiz itself.

pub mod app;
pub mod audio;
pub mod config;
pub mod notation;
pub mod quiz;
pub mod rhythm;
pub mod timer;
pub mod ui;

// Re-export commonly used types
pub use app::{App, Screen};
pub use audio::{export_to_wav, PlaybackState, Player, PlayerOptions};
pub use config::Settings;
pub use notation::{fit_zoom, ScoreViewer, StaffRenderer};
pub use quiz::{builtin_items, Quiz, QuizItem};
pub use rhythm::{compile, RhythmPattern, SubBeatSchedule, Subdivision};
