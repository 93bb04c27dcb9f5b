//! File processing for the prosefix CLI.
//!
//! Loads and resolves the rule configuration, runs the replacement engine
//! over the requested files, and renders the requested output: replaced
//! text, unified diffs, in-place rewrites, validation reports, or the
//! resolved configuration itself.
//!
//! License: MIT OR Apache-2.0

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use prosefix_core::{find_rule_file, Config, ReplaceResult, Replacer};

use crate::cli::Cli;

/// Aggregated statistics for one run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub files_processed: usize,
    pub files_modified: usize,
    pub total_replacements: usize,
    pub files: Vec<FileStats>,
}

/// Per-file statistics.
#[derive(Debug)]
pub struct FileStats {
    pub path: PathBuf,
    pub replacements: usize,
    pub modified: bool,
}

/// The main operation runner for the prosefix CLI.
pub fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    info!(
        "Loaded configuration: {} rules from {:?}.",
        config.rules.len(),
        config.source_paths
    );

    if cli.rules_yaml {
        print!("{}", serde_yml::to_string(&config)?);
        return Ok(());
    }
    if cli.rules_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if cli.files.is_empty() {
        bail!("no files specified");
    }

    let replacer = Replacer::new(config);
    let mut stats = RunStats::default();

    for path in &cli.files {
        let file_stats = process_file(cli, &replacer, path)
            .with_context(|| format!("failed to process file {}", path.display()))?;
        stats.files_processed += 1;
        if file_stats.modified {
            stats.files_modified += 1;
        }
        stats.total_replacements += file_stats.replacements;
        stats.files.push(file_stats);
    }

    // Statistics go to stdout only in modes that do not already own it.
    if !cli.verify && !cli.stdout && !cli.diff {
        print!("{}", render_stats(&stats));
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = match &cli.rules {
        Some(path) => path.clone(),
        None => find_rule_file(None).context("failed to find rule file")?,
    };
    Config::load_with_imports(&path)
        .with_context(|| format!("failed to load rule file {}", path.display()))
}

fn process_file(cli: &Cli, replacer: &Replacer, path: &Path) -> Result<FileStats> {
    info!("Processing file {}.", path.display());

    if cli.verify {
        verify_file(replacer, path)?;
        return Ok(FileStats {
            path: path.to_path_buf(),
            replacements: 0,
            modified: false,
        });
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let result = replacer.replace(&text);
    let file_stats = FileStats {
        path: path.to_path_buf(),
        replacements: result.changes.len(),
        modified: result.changed,
    };

    if cli.stdout {
        print!("{}", result.result);
    } else if cli.diff {
        if result.changed {
            print!("{}", render_diff(path, &result));
        }
    } else if cli.replace {
        write_result(path, &result)?;
    } else if result.changed {
        // Dry run: report what would change.
        info!(
            "File {} would change: {} rule(s) apply.",
            path.display(),
            result.changes.len()
        );
        for change in &result.changes {
            info!(
                "Rule {} ({:?}) would apply to {}.",
                change.rule_index,
                change.expected,
                path.display()
            );
        }
    } else {
        info!("No changes needed for {}.", path.display());
    }

    Ok(file_stats)
}

fn verify_file(replacer: &Replacer, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if !matches!(extension.as_deref(), Some("md" | "markdown")) {
        warn!("File {} does not look like a Markdown file.", path.display());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let issues = replacer.validate(&text);
    if issues.is_empty() {
        info!("Markdown validation passed for {}.", path.display());
    } else {
        for issue in &issues {
            warn!("{}: {}", path.display(), issue);
        }
    }
    Ok(())
}

fn write_result(path: &Path, result: &ReplaceResult) -> Result<()> {
    if !result.changed {
        info!("No changes to write for {}.", path.display());
        return Ok(());
    }
    fs::write(path, &result.result)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(
        "File {} updated, {} change(s) applied.",
        path.display(),
        result.changes.len()
    );
    Ok(())
}

/// Renders a unified diff with the file's path in both headers.
fn render_diff(path: &Path, result: &ReplaceResult) -> String {
    let patch = diffy::create_patch(&result.original, &result.result).to_string();
    let mut out = String::new();
    let _ = writeln!(out, "--- {}", path.display());
    let _ = writeln!(out, "+++ {}", path.display());
    // Skip diffy's generic "original"/"modified" headers.
    for line in patch.lines().skip(2) {
        let _ = writeln!(out, "{line}");
    }
    out
}

fn render_stats(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Processed {} file(s): {} modified, {} replacement(s).",
        stats.files_processed, stats.files_modified, stats.total_replacements
    );
    for file in stats.files.iter().filter(|f| f.modified) {
        let _ = writeln!(out, "  {}: {} replacement(s)", file.path.display(), file.replacements);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_list_modified_files_only() {
        let stats = RunStats {
            files_processed: 2,
            files_modified: 1,
            total_replacements: 3,
            files: vec![
                FileStats {
                    path: PathBuf::from("a.md"),
                    replacements: 3,
                    modified: true,
                },
                FileStats {
                    path: PathBuf::from("b.md"),
                    replacements: 0,
                    modified: false,
                },
            ],
        };
        let rendered = render_stats(&stats);
        assert!(rendered.contains("Processed 2 file(s): 1 modified, 3 replacement(s)."));
        assert!(rendered.contains("a.md: 3 replacement(s)"));
        assert!(!rendered.contains("b.md"));
    }
}
