//! Audio normalization stage.
//!
//! Brings a decoded clip to the canonical pipeline format: 16 kHz mono,
//! peak amplitude at full scale, with a 16-bit PCM copy written to the
//! canonical on-disk path. At most one "current" processed clip exists at a
//! time; every call overwrites the previous file.

use crate::audio::decode::{decode_file, AudioClip};
use crate::audio::recorder::write_wav;
use crate::defaults::SAMPLE_RATE;
use crate::error::Result;
use std::path::Path;

/// Resample with simple linear interpolation.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx.min(samples.len() - 1)]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as f32
            }
        })
        .collect()
}

/// Scale samples so the peak absolute amplitude sits at full scale.
///
/// Silence (all-zero input) is returned unchanged rather than divided by zero.
pub fn peak_normalize(samples: &[f32]) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak == 0.0 {
        return samples.to_vec();
    }
    samples.iter().map(|&s| s / peak).collect()
}

/// Normalize a clip to the canonical format (16 kHz, peak at full scale).
///
/// Resampling only happens when the source rate differs from the target.
/// Normalizing an already-canonical clip is idempotent within float tolerance.
pub fn preprocess(clip: &AudioClip) -> AudioClip {
    let resampled = if clip.sample_rate == SAMPLE_RATE {
        clip.samples.clone()
    } else {
        resample(&clip.samples, clip.sample_rate, SAMPLE_RATE)
    };

    AudioClip {
        samples: peak_normalize(&resampled),
        sample_rate: SAMPLE_RATE,
    }
}

/// Write a normalized clip as 16-bit PCM WAV at `path`, overwriting any
/// previous file.
pub fn save_processed(clip: &AudioClip, path: &Path) -> Result<()> {
    let pcm: Vec<i16> = clip
        .samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect();
    write_wav(&pcm, clip.sample_rate, path)
}

/// Decode `input`, normalize it, and write the canonical copy to `output`.
///
/// Returns the in-memory normalized clip. Malformed input propagates as a
/// decoding error and no output is written.
pub fn normalize_file(input: &Path, output: &Path) -> Result<AudioClip> {
    let clip = decode_file(input)?;
    let processed = preprocess(&clip);
    save_processed(&processed, output)?;
    Ok(processed)
}
