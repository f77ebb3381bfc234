//! Model download and installation management.
//!
//! Handles downloading Whisper models from HuggingFace, verifying their
//! integrity, and storing them in the user's cache directory.

use crate::error::{Result, HelplineError};
use crate::models::catalog::ModelInfo;
use std::fs;
use std::path::PathBuf;

#[cfg(feature = "model-download")]
use crate::models::catalog::get_model;
#[cfg(feature = "model-download")]
use futures_util::StreamExt;
#[cfg(feature = "model-download")]
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "model-download")]
use sha1::{Digest, Sha1};
#[cfg(feature = "model-download")]
use std::io::Write;
#[cfg(feature = "model-download")]
use std::path::Path;

/// Get the directory where models are stored.
///
/// Uses `~/.cache/helpline/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("helpline")
        .join("models")
}

/// Get the full path for a model file.
///
/// Always returns a path regardless of whether the model is in the catalog.
/// The file may or may not exist on disk.
pub fn model_path(name: &str) -> PathBuf {
    let filename = format!("ggml-{name}.bin");
    models_dir().join(filename)
}

/// Check if a model is installed.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

/// Find any installed model from the catalog.
///
/// Scans through all catalog models and returns the first one that is
/// installed. Useful as a fallback when the configured model is missing.
pub fn find_any_installed_model() -> Option<String> {
    crate::models::catalog::list_models()
        .iter()
        .find(|m| is_model_installed(m.name))
        .map(|m| m.name.to_string())
}

/// List all installed model names by scanning the models directory.
///
/// Discovers every `ggml-*.bin` file, not just catalog models.
/// Returns model names (with the `ggml-` prefix and `.bin` suffix stripped).
pub fn list_installed_models() -> Vec<String> {
    let dir = models_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name();
            let name = name.to_str()?;
            let model = name.strip_prefix("ggml-")?.strip_suffix(".bin")?;
            if entry.path().is_file() {
                Some(model.to_string())
            } else {
                None
            }
        })
        .collect();

    names.sort();
    names
}

/// Format model information for display.
pub fn format_model_info(model: &ModelInfo) -> String {
    let status = if is_model_installed(model.name) {
        "[installed]"
    } else {
        "[not installed]"
    };
    format!("{:12} {:5} MB   {}", model.name, model.size_mb, status)
}

/// Core download: fetch url, save to path, verify sha1 if non-empty.
#[cfg(feature = "model-download")]
async fn download_to_path(
    name: &str,
    url: &str,
    sha1: &str,
    size_mb: u32,
    output_path: &Path,
    progress: bool,
) -> Result<()> {
    // Create models directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| HelplineError::Other(format!("Failed to create models directory: {e}")))?;
    }

    if progress {
        eprintln!("Downloading {name} ({size_mb} MB)...");
    }

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| HelplineError::Other(format!("Failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(HelplineError::Other(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    // Set up progress bar
    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        // Hardcoded template string, always valid; fall back to the default bar
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    // Download with streaming and hash calculation
    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(output_path)
        .map_err(|e| HelplineError::Other(format!("Failed to create output file: {e}")))?;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| HelplineError::Other(format!("Failed to read download chunk: {e}")))?;

        file.write_all(&chunk)
            .map_err(|e| HelplineError::Other(format!("Failed to write to file: {e}")))?;

        hasher.update(&chunk);

        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    // Verify SHA-1 checksum
    if !sha1.is_empty() {
        let calculated_hash = format!("{:x}", hasher.finalize());
        if calculated_hash != sha1 {
            if let Err(e) = fs::remove_file(output_path) {
                eprintln!("helpline: failed to remove corrupted download: {e}");
            }
            return Err(HelplineError::Other(format!(
                "SHA-1 checksum mismatch. Expected: {sha1}, got: {calculated_hash}"
            )));
        }
        if progress {
            eprintln!("Checksum verified");
        }
    }

    if progress {
        eprintln!("Model installed to: {}", output_path.display());
    }

    Ok(())
}

/// Download a Whisper model from the catalog.
///
/// # Errors
///
/// Returns an error if:
/// - The model is not in the catalog
/// - The download fails
/// - The SHA-1 checksum doesn't match
/// - The file cannot be written
#[cfg(feature = "model-download")]
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);

    if path.exists() {
        if !progress {
            eprintln!(
                "Model '{}' is already installed at {}",
                name,
                path.display()
            );
        }
        return Ok(path);
    }

    let info = get_model(name).ok_or_else(|| {
        HelplineError::Other(format!(
            "Model '{name}' not found in catalog.\n\
             Run 'helpline models list' to see available models."
        ))
    })?;

    download_to_path(name, info.url, info.sha1, info.size_mb, &path, progress).await?;
    Ok(path)
}

#[cfg(not(feature = "model-download"))]
pub async fn download_model(name: &str, _progress: bool) -> Result<PathBuf> {
    Err(HelplineError::Other(format!(
        "Model '{name}' is not installed and this build cannot download models.\n\
         Rebuild with the model-download feature enabled."
    )))
}
