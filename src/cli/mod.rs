//! Command-line interface for fmtv.
//!
//! With no subcommand the poller runs unattended; the other commands run a
//! single cycle or inspect one piece of the pipeline in isolation.

mod commands;

pub use commands::{Cli, Commands, run_command};
