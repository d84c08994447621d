//! taglog - inspect and manage recorded log files
//!
//! Usage:
//!   taglog show [--previous]          Print a log generation
//!   taglog paths                      List log files with content
//!   taglog clear                      Delete both generations
//!   taglog rotate                     Move current.log to previous.log
//!   taglog emit --tag T [--level L] M Record one message
//!   taglog tags                       Print configured tag levels

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use std::io::Write;
use taglog::config::{self, Config};
use taglog::{LogError, Logging, Result};

fn main() -> Result<()> {
    let cli = Cli::parse();
    taglog::init_tracing(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };

    run(cli.command, &cfg)
}

fn run(command: Command, cfg: &Config) -> Result<()> {
    let logging = Logging::from_config(cfg);

    match command {
        Command::Show { previous } => {
            let data = if previous {
                logging.previous_log()
            } else {
                logging.current_log()
            };
            if let Some(bytes) = data {
                std::io::stdout()
                    .write_all(&bytes)
                    .map_err(|e| LogError::Io {
                        path: logging.log_directory().to_path_buf(),
                        source: e,
                    })?;
            }
        }
        Command::Paths => {
            for path in logging.paths_for_existing_logs() {
                println!("{}", path.display());
            }
        }
        Command::Clear => logging.clear_logs(),
        Command::Rotate => logging.switch_current_to_previous(),
        Command::Emit {
            tag,
            level,
            message,
        } => {
            let logger = logging.tagged(&tag);
            logger.set_level(level);
            logging.start_recording(cfg.logging.internal_build);
            logger.log(level, || message);
            if !taglog::logging::should_record(level, cfg.logging.internal_build) {
                eprintln!("{} messages are not recorded outside internal builds", level);
            }
        }
        Command::Tags => {
            println!("default = {}", cfg.logging.default_level);
            for (tag, level) in &cfg.tags {
                println!("{} = {}", tag, level);
            }
        }
    }

    logging.sync();
    Ok(())
}
