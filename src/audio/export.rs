//! Audio export functionality.
//!
//! Renders one pattern's playback offline, slot by slot with the same tones
//! the live player uses, and writes the result to a WAV file.

use super::player::PlayerOptions;
use super::tone::{Tone, SAMPLE_RATE};
use crate::rhythm::{RhythmPattern, SlotKind, SubBeatSchedule, Subdivision};
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Renders a pattern's playback into mono samples.
///
/// Each slot starts at `index * sub_beat`; the buffer runs until the last
/// slot's sub-beat has elapsed (or the last tone has ended, if later).
pub fn render_pattern(
    pattern: &RhythmPattern,
    subdivision: Subdivision,
    options: &PlayerOptions,
) -> Vec<f32> {
    let schedule = SubBeatSchedule::build(pattern, subdivision, options.metronome);
    let slot_samples =
        (subdivision.sub_beat_duration().as_secs_f64() * SAMPLE_RATE as f64).round() as usize;
    let mut buffer = vec![0.0f32; slot_samples * schedule.len()];

    for slot in schedule.slots() {
        let offset = slot.index as usize * slot_samples;
        let mut tones = Vec::with_capacity(2);
        if slot.kind != SlotKind::Silence && options.metronome {
            tones.push(Tone::click(slot.accent, options.gain));
        }
        if slot.kind.has_note() {
            tones.push(Tone::note(options.gain));
        }

        for tone in tones {
            for (i, sample) in tone.source().enumerate() {
                let at = offset + i;
                if at >= buffer.len() {
                    buffer.resize(at + 1, 0.0);
                }
                buffer[at] += sample;
            }
        }
    }

    for sample in &mut buffer {
        *sample = sample.clamp(-1.0, 1.0);
    }
    buffer
}

/// Exports a pattern's playback to a 16-bit mono WAV file.
///
/// # Errors
///
/// Returns error if the output file cannot be created or written.
pub fn export_to_wav<P: AsRef<Path>>(
    pattern: &RhythmPattern,
    subdivision: Subdivision,
    options: &PlayerOptions,
    output_path: P,
) -> Result<()> {
    let samples = render_pattern(pattern, subdivision, options);

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output_path.as_ref(), spec).with_context(|| {
        format!(
            "Failed to create output WAV file: {}",
            output_path.as_ref().display()
        )
    })?;

    for sample in samples {
        let value = (sample * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .context("Failed to write sample")?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
