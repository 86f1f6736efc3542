//! Audio output for synthesized tones.
//!
//! Provides the [`ToneOutput`] seam the player drives, a rodio-backed
//! device output, and a silent fallback for machines without audio.

use super::tone::{Tone, ToneMix};
use rodio::{OutputStream, OutputStreamHandle};
use std::cell::RefCell;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised by an audio output.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio output: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("failed to start tone: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Something that can sound a group of tones.
///
/// All tones passed to one `play` call must start together.
pub trait ToneOutput {
    /// Starts the given tones and returns immediately.
    fn play(&self, tones: &[Tone]) -> Result<(), AudioError>;

    /// Short name for the status line.
    fn name(&self) -> &'static str;
}

/// Plays tones through the default audio device.
pub struct DeviceOutput {
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    /// Audio output handle for playback.
    handle: OutputStreamHandle,
}

impl DeviceOutput {
    /// Opens the default audio device.
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available.
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }
}

impl ToneOutput for DeviceOutput {
    fn play(&self, tones: &[Tone]) -> Result<(), AudioError> {
        if tones.is_empty() {
            return Ok(());
        }
        self.handle.play_raw(ToneMix::new(tones))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "audio device"
    }
}

/// Output used when no device can be opened: playback keeps its timing
/// but makes no sound.
#[derive(Debug, Default)]
pub struct SilentOutput;

impl ToneOutput for SilentOutput {
    fn play(&self, _tones: &[Tone]) -> Result<(), AudioError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

/// Records every group of tones it is asked to play. Used by tests and by
/// the dry-run playback command.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    calls: RefCell<Vec<Vec<Tone>>>,
}

impl RecordingOutput {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups of tones played so far, in order.
    pub fn calls(&self) -> Vec<Vec<Tone>> {
        self.calls.borrow().clone()
    }
}

impl ToneOutput for RecordingOutput {
    fn play(&self, tones: &[Tone]) -> Result<(), AudioError> {
        self.calls.borrow_mut().push(tones.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

impl<T: ToneOutput + ?Sized> ToneOutput for std::rc::Rc<T> {
    fn play(&self, tones: &[Tone]) -> Result<(), AudioError> {
        (**self).play(tones)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Opens the default device, falling back to silent output.
pub fn open_output() -> Box<dyn ToneOutput> {
    match DeviceOutput::open() {
        Ok(output) => {
            info!("Opened audio output");
            Box::new(output)
        }
        Err(e) => {
            warn!(error = %e, "Audio unavailable, playback will be silent");
            Box::new(SilentOutput)
        }
    }
}
