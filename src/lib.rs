//! helpline - Emergency call triage assistant
//!
//! Analyzes emergency-call audio: emotion-derived triage priority, speech
//! transcription, entity extraction, and nearby-facility map assistance.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod emotion;
pub mod entities;
pub mod error;
pub mod geo;
pub mod models;
pub mod session;
pub mod stt;

// Core traits (acquire → analyze → resolve)
pub use audio::recorder::AudioSource;
pub use emotion::{Emotion, EmotionClassifier, EmotionReading, Priority};
pub use entities::{EntityExtractor, EntityLabel, EntityMap};
pub use geo::{Coordinates, GeoProvider, Place};
pub use stt::{TranscribeInput, Transcriber, TranscriptOutcome};

// Session state
pub use session::SessionState;

// Error handling
pub use error::{HelplineError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
