//! Tubeplay - resolve `YouTube` links into tracks and drive playback from the terminal.
//!
//! This is the main entry point for the `tubeplay` binary.

mod commands;
mod error;
mod logging;
mod widget;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tubeplay_core::{AppConfig, ConfigManager};

use crate::error::CliError;
use crate::logging::LoggingConfig;

#[derive(Debug, Parser)]
#[command(name = "tubeplay", version, about = "Play YouTube links as a music library")]
struct Cli {
    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true, env = "TUBEPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Print debug logs to the console.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the video identifier in a link.
    VideoId {
        /// Watch, short, or embed link.
        url: String,
    },
    /// Format an ISO-8601 duration such as PT3M33S.
    Duration {
        /// Duration string.
        iso: String,
    },
    /// Look up a link's title, channel, duration, and cover.
    Resolve {
        /// Watch, short, or embed link.
        url: String,
    },
    /// Print the embed URL and player variables for a video.
    Embed {
        /// 11-character video identifier.
        video_id: String,
    },
    /// Play links in order against a headless player.
    Play {
        /// One or more links.
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig, CliError> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path)?,
        None => ConfigManager::new()?,
    };
    debug!("Using config {}", manager.path().display());
    Ok(manager.config().clone())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::VideoId { url } => commands::video_id(&mut out, &url),
        Command::Duration { iso } => commands::duration(&mut out, &iso),
        Command::Resolve { url } => commands::resolve(&mut out, &config, &url).await,
        Command::Embed { video_id } => {
            commands::embed(&mut out, &config.player.options, &video_id)
        }
        Command::Play { urls } => {
            let transitions = commands::play(&mut out, &config, &urls).await?;
            info!("Played {} link(s), {} state change(s)", urls.len(), transitions.len());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LoggingConfig::auto();
    if cli.verbose {
        log_config = log_config.with_console_level(Level::DEBUG);
    }
    let _guard = match logging::init(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: {e}");
            None
        }
    };

    info!("Starting Tubeplay {}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tubeplay", "duration", "PT5S", "--verbose"]);
        assert!(cli.as_ref().is_ok_and(|c| c.verbose));
    }

    #[test]
    fn test_play_requires_links() {
        assert!(Cli::try_parse_from(["tubeplay", "play"]).is_err());
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("temp dir: {e}"));
        let path = temp_dir.path().join("config.json");
        let config = load_config(Some(path.clone()));
        assert!(config.is_ok_and(|c| c.player.initial_volume == 70));
        assert!(path.exists());
    }
}
