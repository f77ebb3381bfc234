use crate::error::{Result, HelplineError};
use std::path::PathBuf;
use std::sync::Arc;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real Whisper vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text.
    ///
    /// # Arguments
    /// * `audio` - Mono samples at 16kHz, normalized to [-1.0, 1.0]
    ///
    /// # Returns
    /// Transcribed text (possibly empty for silence) or error
    fn transcribe(&self, audio: &[f32]) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;

    /// Check if the transcriber is ready
    fn is_ready(&self) -> bool;
}

/// Implement Transcriber for Arc<T> to allow sharing across stages.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[f32]) -> Result<String> {
        (**self).transcribe(audio)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Outcome of one transcription request.
///
/// "No speech detected" and "transcription failed" are distinct variants so
/// callers can tell silence from breakage; both still display as empty text.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    /// Non-empty transcribed text.
    Text(String),
    /// The model ran but produced no words.
    NoSpeech,
    /// Decoding or inference failed.
    Failed(String),
}

impl TranscriptOutcome {
    /// Displayable text: the transcript, or empty for silence and failure.
    pub fn display_text(&self) -> &str {
        match self {
            TranscriptOutcome::Text(text) => text,
            TranscriptOutcome::NoSpeech | TranscriptOutcome::Failed(_) => "",
        }
    }

    /// True when the outcome carries usable text.
    pub fn has_text(&self) -> bool {
        matches!(self, TranscriptOutcome::Text(_))
    }
}

/// Configuration for transcriber initialization
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    pub model_path: PathBuf,
    pub language: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(""),
            language: crate::defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model_name: String,
    response: String,
    should_fail: bool,
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[f32]) -> Result<String> {
        if self.should_fail {
            Err(HelplineError::TranscriptionInferenceFailed {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        !self.should_fail
    }
}
