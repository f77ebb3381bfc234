//! Default configuration constants for helpline.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech models and is the canonical rate every
/// stage of the pipeline operates at.
pub const SAMPLE_RATE: u32 = 16000;

/// Default microphone capture duration in seconds.
pub const RECORD_SECS: u64 = 10;

/// Fixed path for raw microphone captures.
pub const RECORDED_AUDIO_PATH: &str = "recorded_audio.wav";

/// Canonical path for normalized audio.
///
/// Overwritten by every normalization call; at most one "current" processed
/// clip exists at a time. Also used as the scratch file when transcription
/// receives raw bytes instead of a file.
pub const TEMP_AUDIO_PATH: &str = "temp_audio.wav";

/// Output path for the rendered assistance map document.
pub const MAP_OUTPUT_PATH: &str = "assistance_map.html";

/// Default Whisper model name.
pub const DEFAULT_MODEL: &str = "base";

/// Default language code forced during transcription.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Minimum span confidence for entity extraction.
///
/// Spans scoring below this are dropped by the extractor itself, not
/// post-filtered by callers.
pub const EXTRACTION_THRESHOLD: f32 = 0.5;

/// Search radius for nearby facilities in meters.
pub const NEARBY_RADIUS_M: u32 = 5000;

/// Maximum number of nearby facilities kept per query.
///
/// Whatever the mapping service returns is truncated to this many entries,
/// in the service's own ranking order.
pub const MAX_NEARBY_RESULTS: usize = 3;

/// Facility category queried for map assistance.
pub const PLACE_CATEGORY: &str = "hospital";

/// Request timeout for external mapping service calls, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Base URL of the forward-geocoding endpoint.
pub const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Base URL of the nearby-places endpoint.
pub const NEARBY_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_paths_are_wav_files() {
        assert!(RECORDED_AUDIO_PATH.ends_with(".wav"));
        assert!(TEMP_AUDIO_PATH.ends_with(".wav"));
    }

    #[test]
    fn nearby_results_cap_is_three() {
        assert_eq!(MAX_NEARBY_RESULTS, 3);
    }

    #[test]
    fn extraction_threshold_is_half() {
        assert_eq!(EXTRACTION_THRESHOLD, 0.5);
    }
}
