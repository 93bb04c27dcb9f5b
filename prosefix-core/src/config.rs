//! Configuration management for `prosefix-core`.
//!
//! This module defines the rule document data model, handles YAML
//! (de)serialization, and resolves a document's import graph into one
//! effective, fully compiled and validated `Config`.
//!
//! License: MIT OR Apache-2.0

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::compiler::{self, CompiledMatcher};
use crate::errors::ProsefixError;

/// File names probed when discovering a rule document near the working
/// directory.
pub const RULE_FILE_NAMES: [&str; 2] = ["prosefix.yml", "prosefix.yaml"];

/// A literal before/after example pair, used as a unit-test oracle for the
/// rule that declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleExample {
    pub from: String,
    pub to: String,
}

/// A single substitution rule.
///
/// Exactly one source of the primary matcher applies: an explicit `pattern`,
/// an ordered `patterns` alternation, or the case/width-folding pattern
/// synthesized from `expected` alone.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rule {
    /// The canonical replacement string, doubling as the rule's identity
    /// during merge.
    pub expected: String,
    /// A regular expression, optionally wrapped in a `/.../` delimiting pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Ordered alternative expressions; earlier entries win at a shared
    /// match start.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
    /// When this expression matches the text immediately preceding a
    /// candidate match, that occurrence is left unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_pattern_before: Option<String>,
    /// Example pairs replayed against the compiled matcher at load time.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specs: Vec<RuleExample>,

    /// Populated by the compiler; never serialized.
    #[serde(skip)]
    pub compiled: Option<CompiledMatcher>,
}

impl Rule {
    /// Applies this rule to `text`, returning the replaced buffer. A rule
    /// without a compiled matcher passes the text through unchanged.
    pub fn replace_text(&self, text: &str) -> String {
        match &self.compiled {
            Some(matcher) => matcher.apply(text, &self.expected),
            None => text.to_string(),
        }
    }

    /// Replays the rule's declared example pairs through its own compiled
    /// matcher. The rule file is its own regression test: any divergence is
    /// a load-time failure.
    pub fn validate_examples(&self, index: usize) -> Result<(), ProsefixError> {
        for example in &self.specs {
            let got = self.replace_text(&example.from);
            if got != example.to {
                return Err(ProsefixError::SpecMismatch {
                    index,
                    from: example.from.clone(),
                    want: example.to.clone(),
                    got,
                });
            }
        }
        Ok(())
    }
}

/// A reference to another rule document to merge into this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Import {
    /// Path to the imported document, resolved relative to the importing
    /// document's directory unless absolute.
    pub path: String,
    /// Suppresses the imported document's own imports.
    pub disable_imports: bool,
    /// Rules of the imported document whose `expected` value contains any of
    /// these substrings are dropped before merging.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_rules: Vec<String>,
}

/// An ordered rule set, as loaded from one document or merged from several.
///
/// Rule application order equals `rules` order and is never reordered
/// implicitly. Once loading completes the value is immutable and may be
/// shared read-only across threads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    pub rules: Vec<Rule>,
    /// Paths of the documents this config was assembled from. Introspection
    /// only; carries no semantics.
    #[serde(rename = "sourcePaths", skip_serializing_if = "Vec::is_empty")]
    pub source_paths: Vec<String>,
}

impl Config {
    /// Loads a single rule document, ignoring its imports.
    ///
    /// Every rule is compiled and its example pairs replayed; any failure
    /// aborts loading and names the offending document and rule index.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProsefixError> {
        let path = path.as_ref();
        info!("Loading rules from: {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| ProsefixError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path)
    }

    /// Parses, compiles, and validates a rule document from YAML text.
    /// `source` is recorded for introspection and used in error reports.
    pub fn from_yaml(text: &str, source: &Path) -> Result<Self, ProsefixError> {
        let mut config: Config =
            serde_yml::from_str(text).map_err(|err| ProsefixError::Parse {
                path: source.to_path_buf(),
                source: err,
            })?;
        config.source_paths = vec![source.display().to_string()];

        compiler::compile_rules(&mut config.rules).map_err(|e| e.in_document(source))?;
        for (index, rule) in config.rules.iter().enumerate() {
            rule.validate_examples(index)
                .map_err(|e| e.in_document(source))?;
        }

        debug!(
            "Loaded {} rules from {}.",
            config.rules.len(),
            source.display()
        );
        Ok(config)
    }

    /// Loads a rule document and resolves its import graph into one merged
    /// `Config`.
    ///
    /// Imports resolve relative to the importing document's directory unless
    /// absolute. An import with `disableImports` set is loaded without
    /// following its own imports; otherwise resolution recurses. Each
    /// import's `ignoreRules` substrings filter the imported rules before
    /// merging.
    pub fn load_with_imports<P: AsRef<Path>>(path: P) -> Result<Self, ProsefixError> {
        let path = path.as_ref();
        let config = Self::load(path)?;
        if config.imports.is_empty() {
            return Ok(config);
        }

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let imports = config.imports.clone();
        let mut documents = vec![config];

        for import in &imports {
            let import_path = if Path::new(&import.path).is_absolute() {
                PathBuf::from(&import.path)
            } else {
                base_dir.join(&import.path)
            };

            let loaded = if import.disable_imports {
                Self::load(&import_path)
            } else {
                Self::load_with_imports(&import_path)
            };
            let mut imported = loaded.map_err(|e| ProsefixError::Import {
                path: import_path.clone(),
                source: Box::new(e),
            })?;

            if !import.ignore_rules.is_empty() {
                let before = imported.rules.len();
                imported.rules.retain(|rule| {
                    !import
                        .ignore_rules
                        .iter()
                        .any(|needle| rule.expected.contains(needle.as_str()))
                });
                debug!(
                    "Filtered {} rules from {} via ignoreRules.",
                    before - imported.rules.len(),
                    import_path.display()
                );
            }

            documents.push(imported);
        }

        Ok(merge_configs(documents))
    }
}

/// Merges rule documents in order, later documents taking precedence.
///
/// Rule identity is the `expected` value: the first occurrence fixes a
/// rule's position in the merged order, and a later rule with the same
/// identity overwrites it in place. This keeps merged output stable and
/// reproducible across runs.
pub fn merge_configs(configs: Vec<Config>) -> Config {
    let mut merged = Config::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (i, config) in configs.into_iter().enumerate() {
        if i == 0 {
            merged.version = config.version;
        }
        merged.source_paths.extend(config.source_paths);
        for rule in config.rules {
            match positions.get(&rule.expected) {
                Some(&pos) => merged.rules[pos] = rule,
                None => {
                    positions.insert(rule.expected.clone(), merged.rules.len());
                    merged.rules.push(rule);
                }
            }
        }
    }

    debug!("Merged config holds {} rules.", merged.rules.len());
    merged
}

/// Walks from `start_dir` (the current directory when `None`) toward the
/// filesystem root looking for a rule document.
pub fn find_rule_file(start_dir: Option<&Path>) -> Result<PathBuf, ProsefixError> {
    let mut dir = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(|source| ProsefixError::Io {
            path: PathBuf::from("."),
            source,
        })?,
    };

    loop {
        for name in RULE_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        if !dir.pop() {
            return Err(ProsefixError::RuleFileNotFound);
        }
    }
}
