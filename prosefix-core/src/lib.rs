// prosefix-core/src/lib.rs
//! # Prosefix Core Library
//!
//! `prosefix-core` provides the platform-independent logic for normalizing
//! terminology in prose and documentation. It compiles declarative
//! substitution rules into executable matchers, masks structured markup
//! (code blocks, Markdown links, templating shortcodes) so the rules can
//! never corrupt it, and applies the rules in declared order while recording
//! every change.
//!
//! The library is synchronous and single-threaded per call. A `Config` and
//! its compiled rules are immutable after loading and may be shared
//! read-only across any number of threads; processing N buffers in parallel
//! against one `Config` needs no coordination.
//!
//! ## Modules
//!
//! * `config`: Rule document data model, loading, import resolution, and
//!   merging.
//! * `compiler`: Compilation of rule declarations into regex matchers,
//!   including the case/width-folding pattern generator.
//! * `protect`: Detection and reversible masking of structured markup spans.
//! * `engine`: The ordered replacement pipeline and its change log.
//! * `errors`: The structured error taxonomy for load-time failures.
//!
//! ## Usage Example
//!
//! ```no_run
//! use prosefix_core::{Config, Replacer};
//!
//! fn main() -> Result<(), prosefix_core::ProsefixError> {
//!     let config = Config::load_with_imports("prosefix.yml")?;
//!     let replacer = Replacer::new(config);
//!
//!     let result = replacer.replace("Using jquery inside `jquery code` stays safe.");
//!     if result.changed {
//!         println!("{}", result.result);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod compiler;
pub mod config;
pub mod engine;
pub mod errors;
pub mod protect;

/// Re-exports the public configuration types and functions.
pub use config::{
    find_rule_file, merge_configs, Config, Import, Rule, RuleExample, RULE_FILE_NAMES,
};

/// Re-exports the compiled matcher types.
pub use compiler::{compile_matcher, compile_rules, CompiledMatcher};

/// Re-exports the replacement engine and its result types.
pub use engine::{Change, ReplaceResult, Replacer};

/// Re-exports the markup protection types.
pub use protect::{PlaceholderMap, Shortcode, ShortcodeKind, SpanProtector};

/// Re-exports the custom error type for clear error reporting.
pub use errors::ProsefixError;
