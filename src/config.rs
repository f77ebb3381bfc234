use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub emotion: EmotionConfig,
    pub entities: EntitiesConfig,
    pub maps: MapsConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub record_secs: u64,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
}

/// Emotion classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmotionConfig {
    /// Directory holding the classifier checkpoint (config.json + model.safetensors)
    pub model_dir: PathBuf,
}

/// Entity extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EntitiesConfig {
    /// Directory holding the span extractor checkpoint and tokenizer
    pub model_dir: PathBuf,
}

/// External mapping service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapsConfig {
    /// API key used for both geocoding and nearby search. Supplied here or
    /// via HELPLINE_MAPS_API_KEY; never built into the binary.
    pub api_key: Option<String>,
    pub geocode_url: String,
    pub nearby_url: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            record_secs: defaults::RECORD_SECS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("emotion_model"),
        }
    }
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("extractor_model"),
        }
    }
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_url: defaults::GEOCODE_URL.to_string(),
            nearby_url: defaults::NEARBY_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - HELPLINE_MODEL → stt.model
    /// - HELPLINE_LANGUAGE → stt.language
    /// - HELPLINE_AUDIO_DEVICE → audio.device
    /// - HELPLINE_MAPS_API_KEY → maps.api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("HELPLINE_MODEL") {
            if !model.is_empty() {
                self.stt.model = model;
            }
        }

        if let Ok(language) = std::env::var("HELPLINE_LANGUAGE") {
            if !language.is_empty() {
                self.stt.language = language;
            }
        }

        if let Ok(device) = std::env::var("HELPLINE_AUDIO_DEVICE") {
            if !device.is_empty() {
                self.audio.device = Some(device);
            }
        }

        if let Ok(key) = std::env::var("HELPLINE_MAPS_API_KEY") {
            if !key.is_empty() {
                self.maps.api_key = Some(key);
            }
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/helpline/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("helpline")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_helpline_env() {
        remove_env("HELPLINE_MODEL");
        remove_env("HELPLINE_LANGUAGE");
        remove_env("HELPLINE_AUDIO_DEVICE");
        remove_env("HELPLINE_MAPS_API_KEY");
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.record_secs, 10);

        assert_eq!(config.stt.model, "base");
        assert_eq!(config.stt.language, "en");

        assert_eq!(config.emotion.model_dir, PathBuf::from("emotion_model"));
        assert_eq!(config.entities.model_dir, PathBuf::from("extractor_model"));

        assert_eq!(config.maps.api_key, None);
        assert!(config.maps.geocode_url.contains("geocode"));
        assert!(config.maps.nearby_url.contains("nearbysearch"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let toml_content = r#"
            [audio]
            device = "hw:0,0"
            sample_rate = 48000
            record_secs = 5

            [stt]
            model = "small"
            language = "es"

            [emotion]
            model_dir = "/opt/helpline/emotion"

            [maps]
            api_key = "test-key"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.audio.device, Some("hw:0,0".to_string()));
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.audio.record_secs, 5);

        assert_eq!(config.stt.model, "small");
        assert_eq!(config.stt.language, "es");

        assert_eq!(
            config.emotion.model_dir,
            PathBuf::from("/opt/helpline/emotion")
        );
        assert_eq!(config.maps.api_key, Some("test-key".to_string()));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let toml_content = r#"
            [stt]
            model = "small.en"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.stt.model, "small.en");

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.stt.language, "en");
        assert_eq!(config.maps.api_key, None);
    }

    #[test]
    fn test_env_override_model() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_helpline_env();

        set_env("HELPLINE_MODEL", "tiny.en");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "tiny.en");
        assert_eq!(config.stt.language, "en"); // Not overridden

        clear_helpline_env();
    }

    #[test]
    fn test_env_override_api_key() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_helpline_env();

        set_env("HELPLINE_MAPS_API_KEY", "secret-from-env");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.maps.api_key, Some("secret-from-env".to_string()));

        clear_helpline_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_helpline_env();

        set_env("HELPLINE_MODEL", "medium");
        set_env("HELPLINE_LANGUAGE", "fr");
        set_env("HELPLINE_AUDIO_DEVICE", "pulse");
        set_env("HELPLINE_MAPS_API_KEY", "k");

        let config = Config::default().with_env_overrides();

        assert_eq!(config.stt.model, "medium");
        assert_eq!(config.stt.language, "fr");
        assert_eq!(config.audio.device, Some("pulse".to_string()));
        assert_eq!(config.maps.api_key, Some("k".to_string()));

        clear_helpline_env();
    }

    #[test]
    fn test_env_override_empty_string_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_helpline_env();

        set_env("HELPLINE_MAPS_API_KEY", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.maps.api_key, None);

        clear_helpline_env();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let invalid_toml = r#"
            [audio
            device = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        let result = Config::load(temp_file.path());

        assert!(result.is_err());
    }

    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path();
        let path_str = path.to_string_lossy();

        assert!(path_str.contains("helpline"));
        assert!(path_str.ends_with("config.toml"));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let missing_path = Path::new("/tmp/nonexistent_helpline_config_12345.toml");
        let config = Config::load_or_default(missing_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_errors_on_invalid_toml() {
        let invalid_toml = r#"
            [audio
            device = "broken
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(invalid_toml.as_bytes()).unwrap();

        assert!(Config::load_or_default(temp_file.path()).is_err());
    }
}
