//! Candle-based span extractor.
//!
//! Loads a tokenizer, a BERT encoder, and a span-scoring head from a local
//! checkpoint directory once at construction. Extraction scores every
//! candidate span against an embedding of each target label and keeps spans
//! whose sigmoid score clears the fixed threshold; anything below is dropped
//! here, not post-filtered by callers.

use crate::defaults;
use crate::entities::{EntityExtractor, EntityLabel, EntityMap};
use crate::error::{Result, HelplineError};

use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use std::path::Path;
use tokenizers::Tokenizer;

/// Longest candidate span, in tokens.
const MAX_SPAN_TOKENS: usize = 8;

/// Token budget per input; longer transcripts are truncated.
const MAX_TOKENS: usize = 512;

/// A scored candidate span over byte offsets of the input text.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    start_byte: usize,
    end_byte: usize,
    label: EntityLabel,
    score: f32,
}

/// Entity extractor running BERT + span head inference via candle.
pub struct BertSpanExtractor {
    tokenizer: Tokenizer,
    encoder: BertModel,
    span_proj: Linear,
    label_vectors: Vec<(EntityLabel, Tensor)>,
    device: Device,
    threshold: f32,
    model_name: String,
}

impl BertSpanExtractor {
    /// Load the extractor checkpoint from a model directory.
    ///
    /// Expects `tokenizer.json`, `config.json`, and `model.safetensors`.
    /// The tokenizer, encoder, span head, and the per-label embeddings are
    /// all built here, once — extraction calls never reload anything.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let tokenizer_path = model_dir.join("tokenizer.json");
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");
        if !tokenizer_path.exists() || !config_path.exists() || !weights_path.exists() {
            return Err(HelplineError::ExtractorModelNotFound {
                path: model_dir.to_string_lossy().to_string(),
            });
        }

        let tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| HelplineError::EntityExtraction {
                message: format!("Load tokenizer {}: {}", tokenizer_path.display(), e),
            })?;

        let config_bytes =
            std::fs::read(&config_path).map_err(|e| HelplineError::EntityExtraction {
                message: format!("Read config {}: {}", config_path.display(), e),
            })?;
        let config: BertConfig =
            serde_json::from_slice(&config_bytes).map_err(|e| HelplineError::EntityExtraction {
                message: format!("Parse encoder config: {}", e),
            })?;

        let device = Device::Cpu;
        // SAFETY: the checkpoint file is mmapped read-only and not mutated
        // while the extractor is alive.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.clone()], DTYPE, &device)
        }
        .map_err(|e| HelplineError::EntityExtraction {
            message: format!("Load weights {}: {}", weights_path.display(), e),
        })?;

        let encoder = BertModel::load(vb.pp("encoder"), &config).map_err(|e| {
            HelplineError::EntityExtraction {
                message: format!("Init encoder: {}", e),
            }
        })?;

        let hidden = config.hidden_size;
        let span_proj = candle_nn::linear(hidden, hidden, vb.pp("span_head.span_proj")).map_err(
            |e| HelplineError::EntityExtraction {
                message: format!("Init span projection: {}", e),
            },
        )?;
        let label_proj = candle_nn::linear(hidden, hidden, vb.pp("span_head.label_proj")).map_err(
            |e| HelplineError::EntityExtraction {
                message: format!("Init label projection: {}", e),
            },
        )?;

        // Embed the three target labels through the encoder, once.
        let mut label_vectors = Vec::with_capacity(EntityLabel::ALL.len());
        for label in EntityLabel::ALL {
            let vector = embed_label(&tokenizer, &encoder, &label_proj, &device, label.as_str())?;
            label_vectors.push((label, vector));
        }

        let model_name = model_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("extractor")
            .to_string();

        Ok(Self {
            tokenizer,
            encoder,
            span_proj,
            label_vectors,
            device,
            threshold: defaults::EXTRACTION_THRESHOLD,
            model_name,
        })
    }

    fn score_spans(&self, text: &str) -> Result<Vec<Candidate>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| HelplineError::EntityExtraction {
                message: format!("Tokenize: {}", e),
            })?;

        let mut ids: Vec<u32> = encoding.get_ids().to_vec();
        let mut offsets: Vec<(usize, usize)> = encoding.get_offsets().to_vec();
        ids.truncate(MAX_TOKENS);
        offsets.truncate(MAX_TOKENS);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let map_err = |what: &str| {
            let what = what.to_string();
            move |e: candle_core::Error| HelplineError::EntityExtraction {
                message: format!("{}: {}", what, e),
            }
        };

        let input = Tensor::new(ids.as_slice(), &self.device)
            .map_err(map_err("Create input tensor"))?
            .unsqueeze(0)
            .map_err(map_err("Unsqueeze input"))?;
        let token_type = input.zeros_like().map_err(map_err("Token type ids"))?;

        let hidden = self
            .encoder
            .forward(&input, &token_type, None)
            .map_err(map_err("Encoder forward"))?
            .squeeze(0)
            .map_err(map_err("Squeeze hidden"))?;
        let projected = self
            .span_proj
            .forward(&hidden)
            .map_err(map_err("Span projection"))?;

        let token_count = ids.len();
        let mut candidates = Vec::new();

        for start in 0..token_count {
            // Special tokens carry zero-width offsets; they anchor no span.
            if offsets[start].0 == offsets[start].1 {
                continue;
            }
            for width in 1..=MAX_SPAN_TOKENS {
                let end = start + width;
                if end > token_count || offsets[end - 1].0 == offsets[end - 1].1 {
                    break;
                }

                let span_vec = projected
                    .narrow(0, start, width)
                    .map_err(map_err("Narrow span"))?
                    .mean(0)
                    .map_err(map_err("Mean span"))?;

                for (label, label_vec) in &self.label_vectors {
                    let dot = (&span_vec * label_vec)
                        .map_err(map_err("Span score mul"))?
                        .sum_all()
                        .map_err(map_err("Span score sum"))?
                        .to_scalar::<f32>()
                        .map_err(map_err("Span score scalar"))?;
                    let score = sigmoid(dot);
                    if score >= self.threshold {
                        candidates.push(Candidate {
                            start_byte: offsets[start].0,
                            end_byte: offsets[end - 1].1,
                            label: *label,
                            score,
                        });
                    }
                }
            }
        }

        Ok(candidates)
    }
}

impl EntityExtractor for BertSpanExtractor {
    fn extract(&self, text: &str) -> Result<EntityMap> {
        let mut map = EntityMap::new();
        if text.trim().is_empty() {
            return Ok(map);
        }

        let candidates = self.score_spans(text)?;
        for candidate in resolve_overlaps(candidates) {
            if let Some(span) = text.get(candidate.start_byte..candidate.end_byte) {
                map.push(candidate.label, span.to_string());
            }
        }
        Ok(map)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Embed one label name through the encoder and label projection.
fn embed_label(
    tokenizer: &Tokenizer,
    encoder: &BertModel,
    label_proj: &Linear,
    device: &Device,
    label: &str,
) -> Result<Tensor> {
    let map_err = |what: &str| {
        let what = what.to_string();
        move |e: candle_core::Error| HelplineError::EntityExtraction {
            message: format!("{}: {}", what, e),
        }
    };

    let encoding = tokenizer
        .encode(label, true)
        .map_err(|e| HelplineError::EntityExtraction {
            message: format!("Tokenize label: {}", e),
        })?;
    let input = Tensor::new(encoding.get_ids(), device)
        .map_err(map_err("Create label tensor"))?
        .unsqueeze(0)
        .map_err(map_err("Unsqueeze label"))?;
    let token_type = input.zeros_like().map_err(map_err("Label token types"))?;

    let pooled = encoder
        .forward(&input, &token_type, None)
        .map_err(map_err("Label encoder forward"))?
        .mean(1)
        .map_err(map_err("Label mean pool"))?;
    let projected = label_proj
        .forward(&pooled)
        .map_err(map_err("Label projection"))?
        .squeeze(0)
        .map_err(map_err("Squeeze label"))?;

    Ok(projected)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Keep the best-scoring candidates among overlapping spans, then restore
/// text order so the result lists follow extraction order.
fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut accepted: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|kept| candidate.start_byte < kept.end_byte && kept.start_byte < candidate.end_byte);
        if !overlaps {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|c| (c.start_byte, c.end_byte));
    accepted
}
