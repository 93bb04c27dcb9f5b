// prosefix/src/main.rs
//! Prosefix entry point.
//!
//! Parses the command line, wires up logging, and maps any failure to a
//! non-zero exit code.
//!
//! License: MIT OR Apache-2.0

use clap::Parser;
use log::error;

use prosefix::cli::Cli;
use prosefix::commands;

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verify {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(err) = commands::run(&cli) {
        error!("command failed: {err:#}");
        std::process::exit(1);
    }
}
