use anyhow::Result;
use helpline::cli::{Cli, Commands, ConfigAction, ModelsAction};
use helpline::config::Config;
use helpline::defaults;
use helpline::models::catalog::list_models;
use helpline::models::download::{download_model, format_model_info};
use clap::Parser;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?.with_overrides(&cli);

    match cli.command {
        None => {
            helpline::app::run_surface(&config, cli.quiet, cli.verbose, cli.no_download).await?;
        }
        Some(Commands::Record { duration, output }) => {
            helpline::app::run_record(&config, duration, output, cli.quiet)?;
        }
        Some(Commands::Analyze { file }) => {
            helpline::app::run_analyze(&config, &file, cli.quiet, cli.verbose, cli.no_download)
                .await?;
        }
        Some(Commands::Assist { location, category }) => {
            let category = category.as_deref().unwrap_or(defaults::PLACE_CATEGORY);
            helpline::app::run_assist(&config, &location, category, cli.quiet).await?;
        }
        Some(Commands::Devices) => {
            list_audio_devices()?;
        }
        Some(Commands::Models { action }) => {
            handle_models_command(action).await?;
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, &config)?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/helpline/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    Ok(config.with_env_overrides())
}

/// Apply CLI flag overrides on top of file/env configuration.
trait WithCliOverrides {
    fn with_overrides(self, cli: &Cli) -> Self;
}

impl WithCliOverrides for Config {
    fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(device) = &cli.device {
            self.audio.device = Some(device.clone());
        }
        if let Some(model) = &cli.model {
            self.stt.model = model.clone();
        }
        if let Some(language) = &cli.language {
            self.stt.language = language.clone();
        }
        self
    }
}

fn list_audio_devices() -> Result<()> {
    #[cfg(feature = "cpal-audio")]
    {
        let devices = helpline::audio::capture::list_devices()?;
        if devices.is_empty() {
            println!("No audio input devices found.");
        } else {
            println!("{}", "Available audio input devices:".bold());
            for device in devices {
                println!("  {}", device);
            }
        }
        Ok(())
    }
    #[cfg(not(feature = "cpal-audio"))]
    {
        anyhow::bail!("This binary was built without microphone support (cpal-audio feature).")
    }
}

async fn handle_models_command(action: ModelsAction) -> Result<()> {
    match action {
        ModelsAction::List => {
            println!("{}", "Available models:".bold());
            for model in list_models() {
                println!("  {}", format_model_info(model));
            }
        }
        ModelsAction::Install { name } => {
            let path = download_model(&name, true).await?;
            println!("Installed: {}", path.display());
        }
    }
    Ok(())
}

fn handle_config_command(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(config)?;
            print!("{}", rendered);
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
    }
    Ok(())
}
