// prosefix/src/cli.rs
//! This file defines the command-line interface (CLI) for the prosefix
//! application, including all available flags and their arguments.
//!
//! License: MIT OR Apache-2.0

use clap::Parser;
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "prosefix",
    version = env!("CARGO_PKG_VERSION"),
    about = "Normalize terminology in Markdown and Hugo documents",
    long_about = "Prosefix applies an ordered set of substitution rules to prose and \
documentation, unifying typos and terminology (e.g. \"jquery\" -> \"jQuery\") while \
leaving code blocks, Markdown links, and Hugo shortcodes untouched. Rules are loaded \
from a YAML document, which may import and override other rule documents.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Path to the rule file to use.
    #[arg(
        long = "rules",
        value_name = "FILE",
        help = "Path to the rule file (discovered by walking up from the current directory if omitted)."
    )]
    pub rules: Option<PathBuf>,

    /// Print the resolved rule set as YAML and exit.
    #[arg(long = "rules-yaml", help = "Print the fully resolved rule set as YAML and exit.")]
    pub rules_yaml: bool,

    /// Print the resolved rule set as JSON and exit.
    #[arg(
        long = "rules-json",
        conflicts_with = "rules_yaml",
        help = "Print the fully resolved rule set as JSON and exit."
    )]
    pub rules_json: bool,

    /// Print each file's replaced text to stdout.
    #[arg(long, help = "Print each file's replaced text to stdout.")]
    pub stdout: bool,

    /// Show a unified diff of the changes per file.
    #[arg(
        long,
        short = 'D',
        conflicts_with = "stdout",
        help = "Show a unified diff between each file and its replaced text."
    )]
    pub diff: bool,

    /// Rewrite files in place.
    #[arg(
        long = "replace",
        short = 'r',
        conflicts_with_all = ["stdout", "diff"],
        help = "Apply the rules and rewrite each file in place."
    )]
    pub replace: bool,

    /// Check files for structural Markdown issues instead of replacing.
    #[arg(long, help = "Check each file for structural Markdown issues instead of replacing.")]
    pub verify: bool,

    /// Suppress informational messages.
    #[arg(long, short = 'q', help = "Suppress all informational messages.")]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long, short = 'd', help = "Enable debug logging.")]
    pub debug: bool,

    /// Files to process.
    #[arg(value_name = "FILE", help = "Files to process.")]
    pub files: Vec<PathBuf>,
}
