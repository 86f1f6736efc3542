//! User settings, read from an optional TOML file.
//!
//! ```toml
//! [audio]
//! gain = 0.5
//! metronome = true
//!
//! [notation]
//! mark_rests = false
//!
//! [quiz]
//! auto_advance_ms = 1000
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use crate::audio::{PlayerOptions, DEFAULT_GAIN};
use crate::quiz::AUTO_ADVANCE_DELAY;
use crate::rhythm::CompileOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("audio.gain must be within 0.0..=1.0, got {0}")]
    Gain(f32),
}

/// Playback settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Starting amplitude of every tone.
    pub gain: f32,
    /// Click on every slot; when off only note onsets sound.
    pub metronome: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            gain: DEFAULT_GAIN,
            metronome: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotationSettings {
    /// Draw negative entries as rests instead of notes.
    pub mark_rests: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Delay before moving on after a correct answer.
    pub auto_advance_ms: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            auto_advance_ms: AUTO_ADVANCE_DELAY.as_millis() as u64,
        }
    }
}

/// All settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub notation: NotationSettings,
    pub quiz: QuizSettings,
}

impl Settings {
    /// Loads settings from a file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.audio.gain) {
            return Err(ConfigError::Gain(self.audio.gain));
        }
        Ok(())
    }

    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            gain: self.audio.gain,
            metronome: self.audio.metronome,
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            mark_rests: self.notation.mark_rests,
        }
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.quiz.auto_advance_ms)
    }
}
