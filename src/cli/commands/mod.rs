//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `poll`: the unattended loop and single cycles
//! - `inspect`: resolver, detector and watermark inspection
//! - `tools`: external tool discovery

mod inspect;
mod poll;
mod tools;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::{Builder, Runtime};

pub use inspect::{cmd_check, cmd_resolve, cmd_status};
pub use poll::{cmd_once, cmd_run};
pub use tools::cmd_check_tools;

use crate::{config, logging};

/// Last.fm to music video poller
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to <APP_DATA_PATH>/config.toml, then the user config dir)
    #[arg(short, long, global = true, env = "FMTV_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll Last.fm and download videos until interrupted (default)
    Run,
    /// Run a single poll cycle and exit
    Once,
    /// Show which video would be picked for a track
    Resolve {
        /// Artist name
        artist: String,
        /// Track title
        title: String,
    },
    /// Check a downloaded file for static-image output and show its tags
    Check {
        /// Path to the video file
        file: PathBuf,
    },
    /// Check that yt-dlp and ffmpeg are installed
    CheckTools,
    /// Show the watermark and configured directories
    Status,
}

/// Single-threaded runtime: one cycle, one track, one subprocess at a time.
fn runtime() -> anyhow::Result<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

/// Load configuration, set up logging and run the selected command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config::Loaded { config, notes } = config::load(cli.config.as_deref());
    let default = Commands::Run;
    let command = cli.command.as_ref().unwrap_or(&default);

    // The poller logs to the rotating file as well; one-off commands only to the console
    let _guard = match command {
        Commands::Run | Commands::Once => {
            logging::init_with_file(&config.paths.app_data_dir, &config.logging)
        }
        _ => {
            logging::init_console();
            None
        }
    };
    for note in &notes {
        note.emit();
    }

    let rt = runtime()?;

    match command {
        Commands::Run => cmd_run(&rt, &config),
        Commands::Once => cmd_once(&rt, &config),
        Commands::Resolve { artist, title } => cmd_resolve(&rt, &config, artist, title),
        Commands::Check { file } => cmd_check(&rt, &config, file),
        Commands::CheckTools => cmd_check_tools(&rt, &config),
        Commands::Status => cmd_status(&config),
    }
}
