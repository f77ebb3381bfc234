//! Command-line interface for helpline
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Emergency helpline triage assistant
#[derive(Parser, Debug)]
#[command(
    name = "helpline",
    version,
    about = "Emergency helpline triage assistant"
)]
pub struct Cli {
    /// Subcommand to execute (default: open the interactive surface)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: stage results, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Audio input device (e.g., hw:0)
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Whisper model (default: base)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Language code transcription is forced to (default: en)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Prevent automatic model download if configured model is missing
    #[arg(long)]
    pub no_download: bool,
}

/// Parse a capture duration string into seconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (seconds), single-unit (`10s`, `1m`), and compound (`1m30s`).
pub fn parse_duration_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → seconds
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a fixed-duration clip from the microphone
    Record {
        /// Capture duration (default: 10s). Examples: 10s, 1m
        #[arg(long, short = 'd', value_name = "DURATION", default_value = "10s", value_parser = parse_duration_secs)]
        duration: u64,

        /// Output WAV path (default: recorded_audio.wav)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Analyze a call recording: emotion, transcription, entities
    Analyze {
        /// Audio file to analyze (WAV/MP3/FLAC/M4A)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Find nearby facilities for a location and render the assistance map
    Assist {
        /// Free-text location to geocode
        #[arg(value_name = "LOCATION")]
        location: String,

        /// Facility category to search for (default: hospital)
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,
    },

    /// List available audio input devices
    Devices,

    /// Manage Whisper models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List catalog models and their installation status
    List,

    /// Download and install a model
    Install {
        /// Model name (e.g., tiny.en, base, small)
        #[arg(value_name = "MODEL")]
        name: String,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_duration_accepts_bare_seconds() {
        assert_eq!(parse_duration_secs("10"), Ok(10));
    }

    #[test]
    fn parse_duration_accepts_humantime() {
        assert_eq!(parse_duration_secs("10s"), Ok(10));
        assert_eq!(parse_duration_secs("1m"), Ok(60));
        assert_eq!(parse_duration_secs("1m30s"), Ok(90));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration_secs("soon").is_err());
    }

    #[test]
    fn record_defaults_to_ten_seconds() {
        let cli = Cli::parse_from(["helpline", "record"]);
        match cli.command {
            Some(Commands::Record { duration, output }) => {
                assert_eq!(duration, 10);
                assert!(output.is_none());
            }
            _ => panic!("Expected Record command"),
        }
    }

    #[test]
    fn analyze_takes_a_file() {
        let cli = Cli::parse_from(["helpline", "analyze", "call.mp3"]);
        match cli.command {
            Some(Commands::Analyze { file }) => {
                assert_eq!(file, PathBuf::from("call.mp3"));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn assist_takes_location_and_optional_category() {
        let cli = Cli::parse_from(["helpline", "assist", "Springfield", "--category", "pharmacy"]);
        match cli.command {
            Some(Commands::Assist { location, category }) => {
                assert_eq!(location, "Springfield");
                assert_eq!(category.as_deref(), Some("pharmacy"));
            }
            _ => panic!("Expected Assist command"),
        }
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::parse_from(["helpline", "--quiet", "-vv", "devices"]);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Devices)));
    }
}
