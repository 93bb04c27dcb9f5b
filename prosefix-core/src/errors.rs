//! errors.rs - Custom error types for the prosefix-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use std::path::PathBuf;
use thiserror::Error;

/// This enum represents all possible error types in the `prosefix-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProsefixError {
    #[error("rule {index}: failed to compile pattern {pattern:?}: {source}")]
    PatternCompile {
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule {index}: no pattern, patterns, or expected value specified")]
    MissingPattern { index: usize },

    #[error("rule {index}: example {from:?} should produce {want:?}, but got {got:?}")]
    SpecMismatch {
        index: usize,
        from: String,
        want: String,
        got: String,
    },

    #[error("{}: {}", path.display(), source)]
    Document {
        path: PathBuf,
        #[source]
        source: Box<ProsefixError>,
    },

    #[error("failed to load imported rule file {}: {}", path.display(), source)]
    Import {
        path: PathBuf,
        #[source]
        source: Box<ProsefixError>,
    },

    #[error("failed to read {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule file {}: {}", path.display(), source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("rule file (prosefix.yml or prosefix.yaml) not found")]
    RuleFileNotFound,
}

impl ProsefixError {
    /// Attaches the owning document's path to a rule-level error.
    ///
    /// Errors that already carry a path (nested imports) are left as-is so
    /// the innermost document stays identifiable.
    pub(crate) fn in_document(self, path: &std::path::Path) -> Self {
        match self {
            err @ (ProsefixError::Document { .. } | ProsefixError::Import { .. }) => err,
            err => ProsefixError::Document {
                path: path.to_path_buf(),
                source: Box::new(err),
            },
        }
    }
}
