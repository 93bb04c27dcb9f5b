//! compiler.rs - Turns declarative rule specifications into executable matchers.
//!
//! A rule may carry an explicit regex (`pattern`), an ordered list of
//! alternative regexes (`patterns`), or nothing but its canonical `expected`
//! spelling, in which case a case- and width-folding pattern is synthesized.
//! The optional `ignorePatternBefore` expression compiles into a secondary
//! matcher that suppresses substitutions based on the text preceding a match.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::Regex;

use crate::config::Rule;
use crate::errors::ProsefixError;

/// A rule's compiled matchers, built once at load time and reused for every
/// buffer processed against the owning `Config`.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    /// The primary expression that locates candidate substitutions.
    pub regex: Regex,
    /// Context-exclusion expression, evaluated against the text preceding a
    /// candidate match. A match here means "leave this occurrence alone".
    pub ignore_before: Option<Regex>,
}

impl CompiledMatcher {
    /// Applies this matcher to `text`, substituting `expected` for every
    /// accepted match.
    ///
    /// Without a context-exclusion matcher this is a plain replace-all, and
    /// `expected` may reference capture groups (`$1`). With one, the buffer is
    /// reassembled in a single left-to-right pass: each match is kept verbatim
    /// when the exclusion expression matches the entire prefix of the buffer
    /// before the match start, and substituted literally otherwise.
    pub fn apply(&self, text: &str, expected: &str) -> String {
        let ignore_before = match &self.ignore_before {
            Some(re) => re,
            None => return self.regex.replace_all(text, expected).into_owned(),
        };

        let mut out = String::with_capacity(text.len());
        let mut last_end = 0;
        for m in self.regex.find_iter(text) {
            out.push_str(&text[last_end..m.start()]);
            if ignore_before.is_match(&text[..m.start()]) {
                out.push_str(m.as_str());
            } else {
                out.push_str(expected);
            }
            last_end = m.end();
        }
        out.push_str(&text[last_end..]);
        out
    }
}

/// Compiles every rule in `rules`, populating each rule's `compiled` field.
///
/// Fails on the first malformed expression, naming the offending rule index
/// and the raw pattern text.
pub fn compile_rules(rules: &mut [Rule]) -> Result<(), ProsefixError> {
    debug!("Starting compilation of {} rules.", rules.len());
    for (index, rule) in rules.iter_mut().enumerate() {
        rule.compiled = Some(compile_matcher(rule, index)?);
    }
    debug!("Finished compiling {} rules.", rules.len());
    Ok(())
}

/// Compiles a single rule declaration into a `CompiledMatcher`.
pub fn compile_matcher(rule: &Rule, index: usize) -> Result<CompiledMatcher, ProsefixError> {
    let pattern = if let Some(pattern) = &rule.pattern {
        pattern.clone()
    } else if !rule.patterns.is_empty() {
        // Ordered alternation. The regex crate prefers the leftmost listed
        // alternative at a given start position, so callers list the more
        // specific variants first.
        rule.patterns.join("|")
    } else if !rule.expected.is_empty() {
        fold_case_width(&rule.expected)
    } else {
        return Err(ProsefixError::MissingPattern { index });
    };

    // A `/pattern/` delimiting pair is decoration, not part of the expression.
    let pattern = match pattern.strip_prefix('/').and_then(|p| p.strip_suffix('/')) {
        Some(inner) => inner.to_string(),
        None => pattern,
    };

    let regex = Regex::new(&pattern).map_err(|source| ProsefixError::PatternCompile {
        index,
        pattern: pattern.clone(),
        source,
    })?;

    let ignore_before = match &rule.ignore_pattern_before {
        Some(raw) if !raw.is_empty() => {
            let mut ignore = raw.clone();
            // Anchor to the end of the preceding context unless the pattern
            // already carries an anchor or an alternation of its own.
            if !ignore.ends_with('$') && !ignore.contains('$') && !ignore.contains('|') {
                ignore.push('$');
            }
            let compiled =
                Regex::new(&ignore).map_err(|source| ProsefixError::PatternCompile {
                    index,
                    pattern: raw.clone(),
                    source,
                })?;
            Some(compiled)
        }
        _ => None,
    };

    Ok(CompiledMatcher {
        regex,
        ignore_before,
    })
}

/// Synthesizes a case- and width-folding pattern from a canonical spelling.
///
/// Each Latin letter, half- or full-width, becomes a one-of class holding its
/// ASCII uppercase, ASCII lowercase, full-width uppercase, and full-width
/// lowercase forms. Every other character is emitted literally with regex
/// metacharacters escaped, so the rule recognizes the canonical spelling
/// regardless of case or East-Asian full-width rendering.
fn fold_case_width(expected: &str) -> String {
    let mut pattern = String::with_capacity(expected.len() * 4);
    for ch in expected.chars() {
        let half = if ch.is_ascii_alphabetic() {
            Some(ch)
        } else {
            to_halfwidth(ch)
        };
        match half {
            Some(letter) => {
                let upper = letter.to_ascii_uppercase();
                let lower = letter.to_ascii_lowercase();
                pattern.push('[');
                pattern.push(upper);
                pattern.push(lower);
                pattern.push(to_fullwidth(upper));
                pattern.push(to_fullwidth(lower));
                pattern.push(']');
            }
            None => pattern.push_str(&regex::escape(ch.encode_utf8(&mut [0u8; 4]))),
        }
    }
    pattern
}

/// Maps an ASCII Latin letter to its full-width form; other characters pass
/// through unchanged.
fn to_fullwidth(ch: char) -> char {
    match ch {
        'A'..='Z' => char::from_u32('Ａ' as u32 + (ch as u32 - 'A' as u32)).unwrap_or(ch),
        'a'..='z' => char::from_u32('ａ' as u32 + (ch as u32 - 'a' as u32)).unwrap_or(ch),
        _ => ch,
    }
}

/// Maps a full-width Latin letter back to its ASCII form. Returns `None` for
/// characters outside the full-width Latin letter ranges.
fn to_halfwidth(ch: char) -> Option<char> {
    match ch {
        'Ａ'..='Ｚ' => char::from_u32('A' as u32 + (ch as u32 - 'Ａ' as u32)),
        'ａ'..='ｚ' => char::from_u32('a' as u32 + (ch as u32 - 'ａ' as u32)),
        _ => None,
    }
}
