//! engine.rs - The ordered replacement pipeline.
//!
//! A `Replacer` threads a buffer through every compiled rule of its `Config`,
//! in declared order, over a protector-masked copy of the text. Structured
//! markup spans are invisible to the rules and restored byte-for-byte before
//! the result is returned, together with a log of every change.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};

use crate::config::Config;
use crate::protect::SpanProtector;

/// One rule's effect on the working buffer.
///
/// The snapshots capture the masked working buffer before and after the rule
/// ran, so a change log replays the pipeline step by step.
#[derive(Debug, Clone)]
pub struct Change {
    /// Position of the rule in `Config.rules`.
    pub rule_index: usize,
    /// The rule's `expected` value, its identity.
    pub expected: String,
    pub before: String,
    pub after: String,
}

/// The outcome of running a full rule set over one buffer.
#[derive(Debug, Clone)]
pub struct ReplaceResult {
    pub original: String,
    pub result: String,
    pub changed: bool,
    pub changes: Vec<Change>,
}

/// Applies a compiled `Config` to text buffers.
///
/// Holds no mutable state beyond the per-call buffer and change log it
/// returns, so one `Replacer` may serve any number of concurrent callers.
#[derive(Debug)]
pub struct Replacer {
    config: Config,
    protector: SpanProtector,
}

impl Replacer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            protector: SpanProtector::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every rule, in declared order, against `text`.
    ///
    /// The buffer is masked by the span protector first and unmasked at the
    /// end, so rules only ever see prose. Rules that reached runtime without
    /// a compiled matcher are logged and skipped; they never abort the pass.
    pub fn replace(&self, text: &str) -> ReplaceResult {
        let (mut buffer, placeholders) = self.protector.protect(text);
        debug!(
            "Starting replacement: {} bytes, {} rules, {} protected spans.",
            text.len(),
            self.config.rules.len(),
            placeholders.len()
        );

        let mut changes = Vec::new();
        for (index, rule) in self.config.rules.iter().enumerate() {
            let Some(matcher) = &rule.compiled else {
                warn!(
                    "Rule {} ({:?}) has no compiled matcher, skipping.",
                    index, rule.expected
                );
                continue;
            };

            let after = matcher.apply(&buffer, &rule.expected);
            if after != buffer {
                debug!("Rule {} ({:?}) applied.", index, rule.expected);
                changes.push(Change {
                    rule_index: index,
                    expected: rule.expected.clone(),
                    before: buffer,
                    after: after.clone(),
                });
                buffer = after;
            }
        }

        let result = self.protector.restore(&buffer, &placeholders);
        debug!(
            "Replacement finished: {} changes, {} bytes out.",
            changes.len(),
            result.len()
        );

        ReplaceResult {
            original: text.to_string(),
            result,
            changed: !changes.is_empty(),
            changes,
        }
    }

    /// Structural Markdown lint of `text`; see `SpanProtector::validate`.
    pub fn validate(&self, text: &str) -> Vec<String> {
        self.protector.validate(text)
    }
}
