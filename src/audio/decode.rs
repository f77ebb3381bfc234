//! Audio container decoding.
//!
//! Accepts any of the supported upload containers (WAV/MP3/FLAC/M4A) and
//! produces mono floating-point samples at the source rate. Validation is
//! whatever the decoder reports; malformed input surfaces as a decode error.

use crate::error::{Result, HelplineError};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A decoded, single-channel clip at its source sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    /// Duration of the clip in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode an audio file into a mono [`AudioClip`].
///
/// The container/codec is probed from content (the file extension is only a
/// hint). Multi-channel sources are downmixed by averaging channels.
///
/// # Errors
/// Returns `HelplineError::AudioDecode` for unreadable, unsupported, or
/// malformed input. No partial clip is returned.
pub fn decode_file(path: &Path) -> Result<AudioClip> {
    let file = File::open(path).map_err(|e| HelplineError::AudioDecode {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| HelplineError::AudioDecode {
            message: format!("Unrecognized audio container: {}", e),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| HelplineError::AudioDecode {
            message: "No decodable audio track found".to_string(),
        })?;
    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| HelplineError::AudioDecode {
            message: "Source does not declare a sample rate".to_string(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| HelplineError::AudioDecode {
            message: format!("Unsupported codec: {}", e),
        })?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(HelplineError::AudioDecode {
                    message: format!("Failed to read audio packet: {}", e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| HelplineError::AudioDecode {
                message: format!("Failed to decode audio packet: {}", e),
            })?;

        let buf = sample_buf.get_or_insert_with(|| {
            SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
        });
        buf.copy_interleaved_ref(decoded);

        // Downmix interleaved frames by averaging channels
        if channels == 1 {
            samples.extend_from_slice(buf.samples());
        } else {
            samples.extend(
                buf.samples()
                    .chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }
    }

    Ok(AudioClip {
        samples,
        sample_rate,
    })
}
