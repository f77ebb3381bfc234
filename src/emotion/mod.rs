//! Caller emotion classification and triage priority.

pub mod classifier;
pub mod model;

pub use classifier::{Emotion, EmotionClassifier, EmotionReading, MockEmotionClassifier, Priority};
pub use model::CandleEmotionClassifier;

use crate::audio::decode::decode_file;
use crate::audio::normalize::preprocess;
use std::path::Path;

/// Classify the emotion of an audio file and derive its triage priority.
///
/// Decodes the file, resamples to the canonical rate if needed, and runs the
/// classifier. Every internal error (unreadable audio, inference failure) is
/// converted into [`EmotionReading::Failed`] — this function never returns an
/// error, so the caller always has a displayable reading.
pub fn detect_emotion(classifier: &dyn EmotionClassifier, audio_path: &Path) -> EmotionReading {
    match decode_file(audio_path) {
        Ok(clip) => {
            let canonical = preprocess(&clip);
            classifier.detect(&canonical.samples)
        }
        Err(_) => EmotionReading::Failed,
    }
}
