//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taglog::LogLevel;

// =============================================================================
// CLI Definition
// =============================================================================

/// Inspect and manage taglog log files
#[derive(Parser, Debug)]
#[command(name = "taglog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: platform config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a log generation
    Show {
        /// Print previous.log instead of current.log
        #[arg(long)]
        previous: bool,
    },

    /// List log files that currently have content
    Paths,

    /// Delete both log generations
    Clear,

    /// Move current.log to previous.log
    Rotate,

    /// Record one message into current.log
    Emit {
        #[arg(long)]
        tag: String,

        #[arg(long, default_value_t = LogLevel::Info)]
        level: LogLevel,

        message: String,
    },

    /// Print configured tag levels
    Tags,
}

// =============================================================================
// Tests
// =============================================================================
