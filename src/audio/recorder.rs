use crate::defaults;
use crate::error::{Result, HelplineError};
use std::path::Path;

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read audio samples captured since the last call.
    ///
    /// # Returns
    /// Vector of 16-bit PCM audio samples, or an error
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Record a fixed-duration mono clip from a source and write it as WAV.
///
/// Blocks for the full duration. A device error from the source aborts the
/// whole call; no partial capture is recovered.
///
/// # Arguments
/// * `source` - The audio source to capture from (already configured for `sample_rate`)
/// * `duration_secs` - Capture length in seconds
/// * `sample_rate` - Capture rate in Hz
/// * `output_path` - Destination WAV path (overwritten)
pub fn record_clip(
    source: &mut dyn AudioSource,
    duration_secs: u64,
    sample_rate: u32,
    output_path: &Path,
) -> Result<()> {
    let target_samples = (duration_secs * sample_rate as u64) as usize;
    let mut samples: Vec<i16> = Vec::with_capacity(target_samples);

    source.start()?;
    while samples.len() < target_samples {
        let chunk = source.read_samples()?;
        if chunk.is_empty() {
            // Device produced nothing this round; yield briefly and retry
            std::thread::sleep(std::time::Duration::from_millis(10));
            continue;
        }
        samples.extend_from_slice(&chunk);
    }
    source.stop()?;
    samples.truncate(target_samples);

    write_wav(&samples, sample_rate, output_path)
}

/// Write 16-bit mono PCM samples to a WAV file, overwriting any existing file.
pub fn write_wav(samples: &[i16], sample_rate: u32, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        HelplineError::AudioCapture {
            message: format!("Failed to create WAV file {}: {}", path.display(), e),
        }
    })?;
    for &s in samples {
        writer
            .write_sample(s)
            .map_err(|e| HelplineError::AudioCapture {
                message: format!("Failed to write WAV sample: {}", e),
            })?;
    }
    writer.finalize().map_err(|e| HelplineError::AudioCapture {
        message: format!("Failed to finalize WAV file: {}", e),
    })
}

/// Configuration for audio source initialization
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub sample_rate: u32,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// Mock audio source for testing
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    samples: Vec<i16>,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockAudioSource {
    /// Create a new mock audio source with default settings
    pub fn new() -> Self {
        Self {
            is_started: false,
            samples: vec![0i16; 160],
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure the mock to return specific samples
    pub fn with_samples(mut self, samples: Vec<i16>) -> Self {
        self.samples = samples;
        self
    }

    /// Configure the mock to fail on start
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail on read
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configure the error message for failures
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the audio source is started
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            Err(HelplineError::AudioCapture {
                message: self.error_message.clone(),
            })
        } else {
            self.is_started = true;
            Ok(())
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(HelplineError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        // Keep feeding the configured block so fixed-duration capture can
        // always fill its target length.
        Ok(self.samples.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn record_clip_writes_exact_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let mut source = MockAudioSource::new().with_samples(vec![100i16; 1600]);

        record_clip(&mut source, 1, 16000, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 16000);
    }

    #[test]
    fn record_clip_truncates_overshoot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        // Chunks of 7000 samples don't divide 16000 evenly
        let mut source = MockAudioSource::new().with_samples(vec![7i16; 7000]);

        record_clip(&mut source, 1, 16000, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 16000);
    }

    #[test]
    fn record_clip_aborts_on_device_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let mut source = MockAudioSource::new()
            .with_read_failure()
            .with_error_message("device unplugged");

        let result = record_clip(&mut source, 1, 16000, &path);

        match result {
            Err(HelplineError::AudioCapture { message }) => {
                assert_eq!(message, "device unplugged");
            }
            _ => panic!("Expected AudioCapture error"),
        }
        assert!(!path.exists(), "No partial output should be written");
    }

    #[test]
    fn record_clip_fails_when_start_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let mut source = MockAudioSource::new().with_start_failure();

        assert!(record_clip(&mut source, 1, 16000, &path).is_err());
    }

    #[test]
    fn write_wav_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let samples = vec![0i16, 1000, -1000, i16::MAX, i16::MIN];

        write_wav(&samples, 16000, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn write_wav_overwrites_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");

        write_wav(&[1i16; 100], 16000, &path).unwrap();
        write_wav(&[2i16; 50], 16000, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 50);
    }

    #[test]
    fn mock_source_tracks_started_state() {
        let mut source = MockAudioSource::new();
        assert!(!source.is_started());
        source.start().unwrap();
        assert!(source.is_started());
        source.stop().unwrap();
        assert!(!source.is_started());
    }

    #[test]
    fn audio_source_config_default_rate() {
        assert_eq!(AudioSourceConfig::default().sample_rate, 16000);
    }
}
