//! Speech-to-text transcription.

pub mod transcriber;
pub mod whisper;

pub use transcriber::{MockTranscriber, Transcriber, TranscriptOutcome};
pub use whisper::{WhisperConfig, WhisperTranscriber};

use crate::audio::decode::decode_file;
use crate::audio::normalize::preprocess;
use crate::defaults;
use std::path::{Path, PathBuf};

/// Audio handed to the transcription stage: either a file on disk or raw
/// bytes of an audio container.
#[derive(Debug, Clone)]
pub enum TranscribeInput {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// Scratch file that is removed on drop.
///
/// Guarantees the temporary audio written for byte input disappears on every
/// exit path: success, empty result, or error.
struct TempAudio {
    path: PathBuf,
}

impl TempAudio {
    fn create(path: &Path, bytes: &[u8]) -> std::io::Result<Self> {
        std::fs::write(path, bytes)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Transcribe a file or raw audio bytes.
///
/// Byte input is written to the fixed temporary path first
/// ([`defaults::TEMP_AUDIO_PATH`]) and the file is removed before returning,
/// whatever the outcome. Decode and inference failures become
/// [`TranscriptOutcome::Failed`]; an empty result becomes
/// [`TranscriptOutcome::NoSpeech`].
pub fn transcribe_input(transcriber: &dyn Transcriber, input: TranscribeInput) -> TranscriptOutcome {
    match input {
        TranscribeInput::File(path) => transcribe_path(transcriber, &path),
        TranscribeInput::Bytes(bytes) => {
            transcribe_bytes_at(transcriber, &bytes, Path::new(defaults::TEMP_AUDIO_PATH))
        }
    }
}

/// Transcribe raw bytes via a scratch file at `temp_path`.
///
/// The scratch file is removed on every exit path.
pub fn transcribe_bytes_at(
    transcriber: &dyn Transcriber,
    bytes: &[u8],
    temp_path: &Path,
) -> TranscriptOutcome {
    let temp = match TempAudio::create(temp_path, bytes) {
        Ok(temp) => temp,
        Err(e) => {
            return TranscriptOutcome::Failed(format!(
                "Failed to write temporary audio {}: {}",
                temp_path.display(),
                e
            ));
        }
    };
    transcribe_path(transcriber, temp.path())
    // temp dropped here — the scratch file is gone regardless of outcome
}

/// Transcribe an audio file.
fn transcribe_path(transcriber: &dyn Transcriber, path: &Path) -> TranscriptOutcome {
    let clip = match decode_file(path) {
        Ok(clip) => clip,
        Err(e) => return TranscriptOutcome::Failed(e.to_string()),
    };
    let canonical = preprocess(&clip);

    match transcriber.transcribe(&canonical.samples) {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                TranscriptOutcome::NoSpeech
            } else {
                TranscriptOutcome::Text(text.to_string())
            }
        }
        Err(e) => TranscriptOutcome::Failed(e.to_string()),
    }
}
