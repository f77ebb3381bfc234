//! Candle-based emotion classifier.
//!
//! Loads a pretrained audio classification checkpoint (config.json +
//! model.safetensors) from a local directory once at construction, then runs
//! forward inference per call: conv feature extractor → mean pool → linear
//! head → softmax → argmax.

use crate::emotion::classifier::{Emotion, EmotionClassifier, EmotionReading};
use crate::error::{Result, HelplineError};

use candle_core::{D, DType, Device, Tensor};
use candle_nn::{Conv1d, Conv1dConfig, Linear, Module, VarBuilder};
use serde::Deserialize;
use std::path::Path;

/// Checkpoint architecture description, stored as `config.json` beside the
/// weights.
#[derive(Debug, Clone, Deserialize)]
pub struct EmotionModelConfig {
    /// Class labels in output-index order.
    pub labels: Vec<String>,
    /// Output channels of each feature-extractor conv layer.
    #[serde(default = "default_conv_dim")]
    pub conv_dim: Vec<usize>,
    #[serde(default = "default_kernel_size")]
    pub kernel_size: usize,
    #[serde(default = "default_stride")]
    pub stride: usize,
}

fn default_conv_dim() -> Vec<usize> {
    vec![64, 128]
}

fn default_kernel_size() -> usize {
    10
}

fn default_stride() -> usize {
    5
}

/// Emotion classifier that runs candle inference on a local checkpoint.
pub struct CandleEmotionClassifier {
    feature_extractor: Vec<Conv1d>,
    classifier: Linear,
    labels: Vec<String>,
    device: Device,
    model_name: String,
}

impl CandleEmotionClassifier {
    /// Load the checkpoint from a model directory.
    ///
    /// Expects `config.json` and `model.safetensors` inside `model_dir`.
    /// Loading happens once; the returned classifier is shared read-only for
    /// the life of the process.
    ///
    /// # Errors
    /// Returns `HelplineError::EmotionModelNotFound` if the directory or its
    /// files are missing, `HelplineError::EmotionInference` if the weights
    /// fail to load.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");
        if !config_path.exists() || !weights_path.exists() {
            return Err(HelplineError::EmotionModelNotFound {
                path: model_dir.to_string_lossy().to_string(),
            });
        }

        let config_bytes =
            std::fs::read(&config_path).map_err(|e| HelplineError::EmotionInference {
                message: format!("Read config {}: {}", config_path.display(), e),
            })?;
        let config: EmotionModelConfig =
            serde_json::from_slice(&config_bytes).map_err(|e| HelplineError::EmotionInference {
                message: format!("Parse classifier config: {}", e),
            })?;

        let device = Device::Cpu;
        // SAFETY: the checkpoint file is mmapped read-only and not mutated
        // while the classifier is alive.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.clone()], DType::F32, &device)
        }
        .map_err(|e| HelplineError::EmotionInference {
            message: format!("Load weights {}: {}", weights_path.display(), e),
        })?;

        let conv_cfg = Conv1dConfig {
            stride: config.stride,
            ..Default::default()
        };

        let mut feature_extractor = Vec::with_capacity(config.conv_dim.len());
        let mut in_channels = 1;
        for (i, &out_channels) in config.conv_dim.iter().enumerate() {
            let conv = candle_nn::conv1d(
                in_channels,
                out_channels,
                config.kernel_size,
                conv_cfg,
                vb.pp(format!("feature_extractor.{}", i)),
            )
            .map_err(|e| HelplineError::EmotionInference {
                message: format!("Init conv layer {}: {}", i, e),
            })?;
            feature_extractor.push(conv);
            in_channels = out_channels;
        }

        let classifier = candle_nn::linear(in_channels, config.labels.len(), vb.pp("classifier"))
            .map_err(|e| HelplineError::EmotionInference {
            message: format!("Init classifier head: {}", e),
        })?;

        let model_name = model_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("emotion")
            .to_string();

        Ok(Self {
            feature_extractor,
            classifier,
            labels: config.labels,
            device,
            model_name,
        })
    }

    /// Run the forward pass. Internal errors bubble up as Results here; the
    /// trait method converts them to the failure reading.
    fn infer(&self, samples: &[f32]) -> Result<EmotionReading> {
        if samples.is_empty() {
            return Err(HelplineError::EmotionInference {
                message: "empty audio input".to_string(),
            });
        }

        let map_err = |what: &str| {
            let what = what.to_string();
            move |e: candle_core::Error| HelplineError::EmotionInference {
                message: format!("{}: {}", what, e),
            }
        };

        let mut x = Tensor::from_slice(samples, (1, 1, samples.len()), &self.device)
            .map_err(map_err("Create input tensor"))?;

        for (i, conv) in self.feature_extractor.iter().enumerate() {
            x = conv
                .forward(&x)
                .map_err(map_err(&format!("Conv layer {} forward", i)))?;
            x = x.relu().map_err(map_err("ReLU"))?;
        }

        // Mean pool over time, then classify
        let pooled = x.mean(D::Minus1).map_err(map_err("Mean pool"))?;
        let logits = self
            .classifier
            .forward(&pooled)
            .map_err(map_err("Classifier forward"))?;
        let probabilities =
            candle_nn::ops::softmax(&logits, D::Minus1).map_err(map_err("Softmax"))?;

        let index = probabilities
            .argmax(D::Minus1)
            .map_err(map_err("Argmax"))?
            .squeeze(0)
            .map_err(map_err("Squeeze"))?
            .to_scalar::<u32>()
            .map_err(map_err("Read argmax"))? as usize;

        let reading = match self.labels.get(index) {
            Some(label) => match Emotion::from_label(label) {
                Some(emotion) => EmotionReading::Detected(emotion),
                None => EmotionReading::Unrecognized(label.clone()),
            },
            None => EmotionReading::Unrecognized(format!("LABEL_{}", index)),
        };

        Ok(reading)
    }
}

impl EmotionClassifier for CandleEmotionClassifier {
    fn detect(&self, samples: &[f32]) -> EmotionReading {
        // Inference errors become the failure reading, never an Err.
        self.infer(samples).unwrap_or(EmotionReading::Failed)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_directory_reports_model_not_found() {
        let result = CandleEmotionClassifier::load(Path::new("/nonexistent/emotion_model"));
        match result {
            Err(HelplineError::EmotionModelNotFound { path }) => {
                assert!(path.contains("emotion_model"));
            }
            _ => panic!("Expected EmotionModelNotFound error"),
        }
    }

    #[test]
    fn load_directory_without_weights_reports_model_not_found() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{\"labels\":[]}").unwrap();

        let result = CandleEmotionClassifier::load(dir.path());
        assert!(matches!(
            result,
            Err(HelplineError::EmotionModelNotFound { .. })
        ));
    }

    #[test]
    fn config_parses_with_defaults() {
        let json = r#"{"labels": ["Happy", "Neutral", "Sad", "Angry", "Fearful"]}"#;
        let config: EmotionModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.labels.len(), 5);
        assert_eq!(config.conv_dim, vec![64, 128]);
        assert_eq!(config.kernel_size, 10);
        assert_eq!(config.stride, 5);
    }

    #[test]
    fn config_honors_explicit_architecture() {
        let json = r#"{
            "labels": ["Happy", "Neutral"],
            "conv_dim": [32],
            "kernel_size": 5,
            "stride": 2
        }"#;
        let config: EmotionModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.conv_dim, vec![32]);
        assert_eq!(config.kernel_size, 5);
        assert_eq!(config.stride, 2);
    }

    #[test]
    fn classifier_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CandleEmotionClassifier>();
    }
}
