//! Error types for helpline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelplineError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Maps API key is not configured (set maps.api_key or HELPLINE_MAPS_API_KEY)")]
    MissingApiKey,

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Audio decoding/normalization errors
    #[error("Audio decode failed: {message}")]
    AudioDecode { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    // Emotion classifier errors
    #[error("Emotion model not found at {path}")]
    EmotionModelNotFound { path: String },

    #[error("Emotion inference failed: {message}")]
    EmotionInference { message: String },

    // Entity extraction errors
    #[error("Extractor model not found at {path}")]
    ExtractorModelNotFound { path: String },

    #[error("Entity extraction failed: {message}")]
    EntityExtraction { message: String },

    // External mapping service errors
    #[error("Geocoding request failed: {message}")]
    Geocoding { message: String },

    #[error("Nearby search request failed: {message}")]
    NearbySearch { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, HelplineError>;
