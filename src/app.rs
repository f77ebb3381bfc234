//! Helpline application entry point.
//!
//! Composition root for the triage pipeline:
//! acquire → normalize → {classify, transcribe} → extract → resolve location

use crate::audio::normalize::normalize_file;
use crate::config::Config;
use crate::defaults;
use crate::emotion::{detect_emotion, CandleEmotionClassifier, EmotionClassifier};
use crate::entities::{BertSpanExtractor, EntityExtractor, EntityMap};
use crate::error::{Result, HelplineError};
use crate::geo::{render_map, resolve_assistance, write_map, GeoClient, GeoProvider};
use crate::models::download::{download_model, find_any_installed_model, is_model_installed, model_path};
use crate::session::SessionState;
use crate::stt::{transcribe_input, TranscribeInput, Transcriber, WhisperConfig, WhisperTranscriber};
use owo_colors::OwoColorize;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "cpal-audio")]
use crate::audio::capture::{suppress_audio_warnings, CpalAudioSource};
#[cfg(feature = "cpal-audio")]
use crate::audio::recorder::{record_clip, AudioSource};

/// The four sections of the interactive surface.
const SECTIONS: &[&str] = &["Home", "Audio Input", "Emotion & Transcription", "Map Assistance"];

/// Analysis service objects, constructed once and passed into each stage.
///
/// No hidden globals: the two heavy models live here behind `Arc`, shared
/// read-only for the life of the process.
pub struct Services {
    pub emotion: Arc<dyn EmotionClassifier>,
    pub transcriber: Arc<dyn Transcriber>,
    pub extractor: Arc<dyn EntityExtractor>,
}

impl Services {
    /// Build all analysis services from configuration.
    ///
    /// Model loads happen here, once — the slow part is paid before any
    /// audio is touched, not per call.
    pub async fn init(config: &Config, quiet: bool, no_download: bool) -> Result<Self> {
        if !quiet {
            eprintln!("Loading emotion model from {}...", config.emotion.model_dir.display());
        }
        let emotion = CandleEmotionClassifier::load(&config.emotion.model_dir)?;

        if !quiet {
            eprintln!("Loading speech model '{}'...", config.stt.model);
        }
        let transcriber = create_transcriber(config, quiet, no_download).await?;

        if !quiet {
            eprintln!("Loading extractor model from {}...", config.entities.model_dir.display());
        }
        let extractor = BertSpanExtractor::load(&config.entities.model_dir)?;

        Ok(Self {
            emotion: Arc::new(emotion),
            transcriber,
            extractor: Arc::new(extractor),
        })
    }

    /// Build services from pre-constructed parts (used by tests).
    pub fn from_parts(
        emotion: Arc<dyn EmotionClassifier>,
        transcriber: Arc<dyn Transcriber>,
        extractor: Arc<dyn EntityExtractor>,
    ) -> Self {
        Self {
            emotion,
            transcriber,
            extractor,
        }
    }
}

/// Result of analyzing one normalized clip.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub emotion_label: String,
    pub priority: String,
    pub transcript: String,
    pub entities: EntityMap,
}

/// Run the full analysis over a normalized audio file.
///
/// Each stage runs strictly in sequence; a sentinel from one stage never
/// stops the next (an emotion failure still transcribes, an empty transcript
/// still produces the three empty entity lists).
pub fn analyze_audio(services: &Services, audio_path: &Path) -> Result<Analysis> {
    let reading = detect_emotion(services.emotion.as_ref(), audio_path);

    let outcome = transcribe_input(
        services.transcriber.as_ref(),
        TranscribeInput::File(audio_path.to_path_buf()),
    );
    let transcript = outcome.display_text().to_string();

    let entities = services.extractor.extract(&transcript)?;

    Ok(Analysis {
        emotion_label: reading.label(),
        priority: reading.priority().to_string(),
        transcript,
        entities,
    })
}

/// Run the record command: capture a fixed-duration clip and normalize it.
pub fn run_record(config: &Config, duration_secs: u64, output: Option<PathBuf>, quiet: bool) -> Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from(defaults::RECORDED_AUDIO_PATH));

    capture_clip(config, duration_secs, &output, quiet)?;

    let normalized = normalize_file(&output, Path::new(defaults::TEMP_AUDIO_PATH))?;
    if !quiet {
        eprintln!(
            "Recording complete: {} ({:.1}s), normalized copy at {}",
            output.display(),
            normalized.duration_secs(),
            defaults::TEMP_AUDIO_PATH
        );
    }
    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn capture_clip(config: &Config, duration_secs: u64, output: &Path, quiet: bool) -> Result<()> {
    suppress_audio_warnings();
    let mut source: Box<dyn AudioSource> =
        Box::new(CpalAudioSource::new(config.audio.device.as_deref())?);
    if !quiet {
        eprintln!("Recording {} seconds...", duration_secs);
    }
    record_clip(source.as_mut(), duration_secs, config.audio.sample_rate, output)
}

#[cfg(not(feature = "cpal-audio"))]
fn capture_clip(_config: &Config, _duration_secs: u64, _output: &Path, _quiet: bool) -> Result<()> {
    Err(HelplineError::AudioCapture {
        message: "This binary was built without microphone support (cpal-audio feature)."
            .to_string(),
    })
}

/// Run the analyze command: normalize a file and print the full analysis.
pub async fn run_analyze(
    config: &Config,
    file: &Path,
    quiet: bool,
    verbosity: u8,
    no_download: bool,
) -> Result<()> {
    let services = Services::init(config, quiet, no_download).await?;

    normalize_file(file, Path::new(defaults::TEMP_AUDIO_PATH))?;
    let analysis = analyze_audio(&services, Path::new(defaults::TEMP_AUDIO_PATH))?;

    print_analysis(&analysis, verbosity);
    Ok(())
}

/// Run the assist command: geocode, search nearby facilities, render the map.
pub async fn run_assist(config: &Config, location: &str, category: &str, quiet: bool) -> Result<()> {
    let geo = GeoClient::new(&config.maps)?;
    assist_and_render(&geo, location, category, Path::new(defaults::MAP_OUTPUT_PATH), quiet).await
}

/// Shared assist flow over any provider.
async fn assist_and_render(
    geo: &dyn GeoProvider,
    location: &str,
    category: &str,
    map_path: &Path,
    quiet: bool,
) -> Result<()> {
    let assistance = match resolve_assistance(geo, location, category).await? {
        Some(assistance) => assistance,
        None => {
            println!("No location data found for \"{}\".", location);
            return Ok(());
        }
    };

    println!("{}", "Nearby facilities:".bold());
    if assistance.places.is_empty() {
        println!("  No nearby facilities found.");
    } else {
        for place in &assistance.places {
            println!(
                "  - {}: {}",
                place.name.bold(),
                place.address.as_deref().unwrap_or("Address not available")
            );
        }
    }

    let html = render_map(assistance.origin, &assistance.places);
    write_map(&html, map_path)?;
    if !quiet {
        eprintln!("Map written to {}", map_path.display());
    }
    Ok(())
}

/// Open the interactive surface: four navigable sections over one session.
pub async fn run_surface(
    config: &Config,
    quiet: bool,
    verbosity: u8,
    no_download: bool,
) -> Result<()> {
    let services = Services::init(config, quiet, no_download).await?;
    let geo: Option<GeoClient> = GeoClient::new(&config.maps).ok();
    let mut session = SessionState::new();

    println!("{}", "Helpline: audio analysis and assistance".bold());

    loop {
        println!();
        for (i, section) in SECTIONS.iter().enumerate() {
            println!("  {}. {}", i + 1, section);
        }
        let choice = prompt("Go to (1-4, q to quit): ")?;
        match choice.trim() {
            "1" => section_home(),
            "2" => section_audio_input(config, &mut session, quiet)?,
            "3" => section_analysis(&services, &mut session, verbosity)?,
            "4" => section_map(&config.maps, geo.as_ref(), &session, quiet).await?,
            "q" | "Q" | "" => break,
            other => println!("Unknown section: {}", other),
        }
    }

    Ok(())
}

fn section_home() {
    println!("{}", "Welcome to Helpline!".bold());
    println!(
        "This assistant analyzes emergency-call audio:\n\
         - Record or load a call to analyze.\n\
         - Detect caller emotion and assign a priority level.\n\
         - Transcribe speech and extract entities.\n\
         - Locate nearby facilities based on extracted locations."
    );
}

fn section_audio_input(config: &Config, session: &mut SessionState, quiet: bool) -> Result<()> {
    let answer = prompt("Record live audio? (y/N, or enter a file path): ")?;
    let answer = answer.trim();

    let source_path = if answer.eq_ignore_ascii_case("y") {
        let path = PathBuf::from(defaults::RECORDED_AUDIO_PATH);
        capture_clip(config, config.audio.record_secs, &path, quiet)?;
        println!("Recording complete. File saved as {}.", path.display());
        path
    } else if !answer.is_empty() {
        PathBuf::from(answer)
    } else {
        println!("No audio selected.");
        return Ok(());
    };

    let clip = normalize_file(&source_path, Path::new(defaults::TEMP_AUDIO_PATH))?;
    session.set_audio(PathBuf::from(defaults::TEMP_AUDIO_PATH));
    println!(
        "Audio ready for analysis ({:.1}s at {} Hz).",
        clip.duration_secs(),
        clip.sample_rate
    );
    Ok(())
}

fn section_analysis(
    services: &Services,
    session: &mut SessionState,
    verbosity: u8,
) -> Result<()> {
    let Some(audio_path) = session.audio_path().cloned() else {
        println!("Please record or load an audio file in the Audio Input section first.");
        return Ok(());
    };

    let analysis = analyze_audio(services, &audio_path)?;
    print_analysis(&analysis, verbosity);
    session.set_entities(analysis.entities);
    Ok(())
}

async fn section_map(
    maps: &crate::config::MapsConfig,
    geo: Option<&GeoClient>,
    session: &SessionState,
    quiet: bool,
) -> Result<()> {
    let Some(entities) = session.entities() else {
        println!("No entities yet. Analyze audio in the Emotion & Transcription section first.");
        return Ok(());
    };
    if entities.locations().is_empty() {
        println!("No location entities detected in the last analysis.");
        return Ok(());
    }

    let Some(geo) = geo else {
        // Re-run construction for the error message (key missing at startup)
        return Err(GeoClient::new(maps).err().unwrap_or(HelplineError::MissingApiKey));
    };

    let location = entities.locations().join(", ");
    println!("Extracted location(s): {}", location);

    assist_and_render(
        geo,
        &location,
        defaults::PLACE_CATEGORY,
        Path::new(defaults::MAP_OUTPUT_PATH),
        quiet,
    )
    .await
}

fn print_analysis(analysis: &Analysis, verbosity: u8) {
    println!("{} {}", "Emotion:".bold(), analysis.emotion_label);
    println!("{} {}", "Priority:".bold(), analysis.priority);
    println!("{}", "Transcription:".bold());
    if analysis.transcript.is_empty() {
        println!("  (no transcription results)");
    } else {
        println!("  {}", analysis.transcript);
    }
    println!("{}", "Entities:".bold());
    println!("{}", indent(&analysis.entities.to_string(), "  "));
    if verbosity >= 2 {
        eprintln!("  [analysis complete]");
    }
}

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

/// Resolve the transcriber model, downloading it if needed.
async fn create_transcriber(
    config: &Config,
    quiet: bool,
    no_download: bool,
) -> Result<Arc<dyn Transcriber>> {
    let model_name = &config.stt.model;
    let model_to_use = if is_model_installed(model_name) {
        model_name.clone()
    } else if no_download {
        if let Some(fallback) = find_any_installed_model() {
            if !quiet {
                eprintln!(
                    "Model '{}' not installed (--no-download). Using '{}'.",
                    model_name, fallback
                );
            }
            fallback
        } else {
            return Err(HelplineError::TranscriptionModelNotFound {
                path: format!(
                    "{} (not installed and --no-download specified; run: helpline models install {})",
                    model_name, model_name
                ),
            });
        }
    } else {
        if !quiet {
            eprintln!("Downloading model '{}'...", model_name);
        }
        download_model(model_name, !quiet).await?;
        model_name.clone()
    };

    let whisper_config = WhisperConfig {
        model_path: build_model_path(&model_to_use),
        language: config.stt.language.clone(),
        threads: None,
    };

    Ok(Arc::new(WhisperTranscriber::new(whisper_config)?))
}

/// Build the full path to a Whisper model file.
///
/// Absolute or existing paths are used as-is; bare names resolve into the
/// model cache directory.
fn build_model_path(model: &str) -> PathBuf {
    let path = PathBuf::from(model);
    if path.is_absolute() || path.exists() {
        return path;
    }
    model_path(model)
}
