//! Audio synthesis and playback for rhythm patterns.
//!
//! This module provides synthesized click and note tones played through
//! rodio. It supports:
//! - Sine tones with an exponential decay envelope
//! - Slot-by-slot pattern playback at the fixed tempo
//! - A silent fallback when no audio device is available
//! - WAV export of a pattern's playback

pub mod engine;
pub mod export;
pub mod player;
pub mod tone;

pub use engine::{open_output, AudioError, DeviceOutput, RecordingOutput, SilentOutput, ToneOutput};
pub use export::{export_to_wav, render_pattern};
pub use player::{PlaybackState, Player, PlayerOptions};
pub use tone::{Tone, ToneMix, ToneSource, DEFAULT_GAIN, SAMPLE_RATE};
