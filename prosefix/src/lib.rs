// prosefix/src/lib.rs
//! Library surface of the `prosefix` binary crate.
//!
//! The CLI is a thin consumer of `prosefix-core`: it parses arguments, loads
//! and resolves the rule configuration, runs the replacement engine over the
//! requested files, and renders diffs and run statistics.
//!
//! License: MIT OR Apache-2.0

pub mod cli;
pub mod commands;
