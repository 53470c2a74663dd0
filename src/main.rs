//! fmtv - turns Last.fm listening history into a local music video library.
//!
//! Polls the listener's recent plays, finds the matching music video, and
//! saves it as a tagged file named `<artist> - <title>.<ext>`. Runs
//! unattended by default; see `fmtv --help` for the one-off commands.

pub mod cli;
pub mod config;
pub mod error;
pub mod lastfm;
pub mod logging;
pub mod media;
pub mod model;
pub mod sync;
#[cfg(test)]
pub mod test_utils;
pub mod tools;
pub mod traits;
pub mod video;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    cli::run_command(&args)
}
