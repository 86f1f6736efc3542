//! Synthesized tones.
//!
//! A tone is a sine oscillator whose amplitude ramps exponentially from its
//! starting gain down to near silence over the tone's length, then stops.
//! Several tones that must start together are summed into one source.

use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

/// Sample rate for tone synthesis (44.1 kHz standard).
pub const SAMPLE_RATE: u32 = 44100;

/// Amplitude a tone decays to by the end of its length.
pub const SILENCE_FLOOR: f32 = 0.001;

/// Default starting amplitude.
pub const DEFAULT_GAIN: f32 = 0.5;

/// Accented metronome click (first slot of a beat).
pub const ACCENT_CLICK_HZ: f32 = 880.0;
/// Off-beat metronome click.
pub const CLICK_HZ: f32 = 440.0;
/// Click length.
pub const CLICK_DURATION: Duration = Duration::from_millis(30);
/// Note onset tone.
pub const NOTE_HZ: f32 = 660.0;
/// Note tone length.
pub const NOTE_DURATION: Duration = Duration::from_millis(100);

/// Parameters of one synthesized tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    pub duration: Duration,
    pub gain: f32,
}

impl Tone {
    /// Metronome click for a slot.
    pub fn click(accent: bool, gain: f32) -> Self {
        Self {
            frequency: if accent { ACCENT_CLICK_HZ } else { CLICK_HZ },
            duration: CLICK_DURATION,
            gain,
        }
    }

    /// Note onset tone.
    pub fn note(gain: f32) -> Self {
        Self {
            frequency: NOTE_HZ,
            duration: NOTE_DURATION,
            gain,
        }
    }

    /// Number of samples the tone lasts.
    pub fn sample_count(&self) -> usize {
        (self.duration.as_secs_f64() * SAMPLE_RATE as f64).round() as usize
    }

    /// Creates a playable source for this tone.
    pub fn source(&self) -> ToneSource {
        ToneSource::new(*self)
    }
}

/// Mono sample iterator for one tone.
/// Implements rodio's Source trait for playback.
#[derive(Debug, Clone)]
pub struct ToneSource {
    tone: Tone,
    /// Total samples to produce.
    length: usize,
    /// Index of the next sample.
    position: usize,
    /// Per-sample amplitude multiplier of the exponential ramp.
    decay: f32,
    /// Current amplitude.
    amplitude: f32,
}

impl ToneSource {
    fn new(tone: Tone) -> Self {
        let length = tone.sample_count();
        let gain = tone.gain.max(SILENCE_FLOOR);
        // gain * decay^length == SILENCE_FLOOR
        let decay = if length > 0 {
            (SILENCE_FLOOR / gain).powf(1.0 / length as f32)
        } else {
            1.0
        };

        Self {
            tone,
            length,
            position: 0,
            decay,
            amplitude: gain,
        }
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.length {
            return None;
        }

        let t = self.position as f32 / SAMPLE_RATE as f32;
        let sample = (TAU * self.tone.frequency * t).sin() * self.amplitude;

        self.amplitude *= self.decay;
        self.position += 1;

        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length - self.position;
        (remaining, Some(remaining))
    }
}

impl Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.length - self.position)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.tone.duration)
    }
}

/// Several tones summed sample by sample, all starting at sample zero.
#[derive(Debug, Clone)]
pub struct ToneMix {
    voices: Vec<ToneSource>,
    duration: Duration,
}

impl ToneMix {
    /// Creates a mix of the given tones.
    pub fn new(tones: &[Tone]) -> Self {
        let duration = tones
            .iter()
            .map(|t| t.duration)
            .max()
            .unwrap_or_default();

        Self {
            voices: tones.iter().map(Tone::source).collect(),
            duration,
        }
    }
}

impl Iterator for ToneMix {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let mut any = false;
        let mut sum = 0.0;
        for voice in &mut self.voices {
            if let Some(sample) = voice.next() {
                sum += sample;
                any = true;
            }
        }
        any.then_some(sum.clamp(-1.0, 1.0))
    }
}

impl Source for ToneMix {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_frequencies() {
        assert_eq!(Tone::click(true, DEFAULT_GAIN).frequency, 880.0);
        assert_eq!(Tone::click(false, DEFAULT_GAIN).frequency, 440.0);
        assert_eq!(Tone::click(false, DEFAULT_GAIN).duration.as_millis(), 30);
        assert_eq!(Tone::note(DEFAULT_GAIN).frequency, 660.0);
        assert_eq!(Tone::note(DEFAULT_GAIN).duration.as_millis(), 100);
    }

    #[test]
    fn test_tone_length_and_decay() {
        let tone = Tone::note(DEFAULT_GAIN);
        let samples: Vec<f32> = tone.source().collect();
        assert_eq!(samples.len(), 4410);

        let head = samples[..100].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = samples[samples.len() - 100..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head > 0.3);
        assert!(tail < 0.002);
    }

    #[test]
    fn test_mix_spans_longest_tone() {
        let mix = ToneMix::new(&[Tone::click(true, DEFAULT_GAIN), Tone::note(DEFAULT_GAIN)]);
        assert_eq!(mix.total_duration(), Some(Duration::from_millis(100)));
        let samples: Vec<f32> = mix.collect();
        assert_eq!(samples.len(), 4410);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_empty_mix_is_silent() {
        let mix = ToneMix::new(&[]);
        assert_eq!(mix.count(), 0);
    }
}
