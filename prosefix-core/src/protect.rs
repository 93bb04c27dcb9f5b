//! protect.rs - Makes structured markup spans invisible to the replacement
//! pass, then restores them byte-for-byte.
//!
//! The protector detects fenced code blocks, inline code spans, Markdown
//! links, and templating shortcodes, swaps each span for a unique placeholder
//! token, and later substitutes the originals back. Rules running over the
//! masked buffer can therefore never corrupt markup they do not understand.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Prefix/suffix sentinel for placeholder tokens. A Unicode private use area
/// character keeps accidental collisions with prose out of reach.
const TOKEN_SENTINEL: char = '\u{E000}';

// The regex crate, like RE2, has no back-references, so paired shortcodes
// cannot be matched with a single expression. Start and end tags are scanned
// independently and paired by name in `pair_shortcodes`.
static ANGLE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{<\s*([a-zA-Z0-9_-]+)\s*(?:[^>]*)?\s*>\}\}").unwrap());
static ANGLE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{<\s*/([a-zA-Z0-9_-]+)\s*>\}\}").unwrap());
static PERCENT_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{%\s*([a-zA-Z0-9_-]+)\s*(?:[^%]*)?\s*%\}\}").unwrap());
static PERCENT_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{%\s*/([a-zA-Z0-9_-]+)\s*%\}\}").unwrap());
static ANGLE_SELF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{<\s*([a-zA-Z0-9_-]+)(?:\s+[^>]*)?\s*/?>\}\}").unwrap());
static PERCENT_SELF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{%\s*([a-zA-Z0-9_-]+)(?:\s+[^%]*)?\s*/?%\}\}").unwrap());

static CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n.*?```").unwrap());
static CODE_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\([^)]+\)").unwrap());
static REF_LINK_USE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\[[^\]]+\]").unwrap());
static REF_LINK_DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\[[^\]]+\]:\s*.+$").unwrap());

static SHORTCODE_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static LINK_CHECK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").unwrap());

/// Whether a shortcode has a matching closing tag or is self-contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcodeKind {
    Paired,
    SelfClosing,
}

/// A detected templating shortcode span.
///
/// Offsets refer to the working buffer the detection ran over and are
/// invalidated by any edit to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcode {
    pub kind: ShortcodeKind,
    pub name: String,
    /// Text strictly between the start and end tag. Empty for self-closing.
    pub content: String,
    /// Byte offset of the span's first character.
    pub start: usize,
    /// Byte length of the whole span, tags included.
    pub len: usize,
}

/// Bidirectional association between placeholder tokens and the original
/// spans they replace. Created fresh per protect/restore cycle.
///
/// Entries are kept in insertion order; restoration walks them newest-first
/// so a token nested inside a later-masked span (a code span inside a
/// shortcode body) resurfaces before its own entry is applied.
#[derive(Debug, Default)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the original text stored for `token`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, original)| original.as_str())
    }

    /// Tokens in insertion order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    fn insert(&mut self, token: String, original: String) {
        self.entries.push((token, original));
    }
}

fn placeholder_token(kind: &str, counter: usize) -> String {
    format!("{TOKEN_SENTINEL}{kind}_{counter}{TOKEN_SENTINEL}")
}

/// Locates and reversibly masks structured markup spans.
#[derive(Debug, Default)]
pub struct SpanProtector;

impl SpanProtector {
    pub fn new() -> Self {
        Self
    }

    /// Detects shortcodes of both syntaxes in `text`.
    ///
    /// Paired shortcodes are found first. A start tag pairs with the nearest
    /// subsequent end tag of the same name that has no other same-name start
    /// tag strictly between them, so a one-level same-name nesting defers
    /// matching to its own closer. Self-closing matches whose offset falls
    /// inside a paired span are part of that shortcode's content and are
    /// discarded.
    pub fn find_shortcodes(&self, text: &str) -> Vec<Shortcode> {
        let mut shortcodes = pair_shortcodes(text, &ANGLE_START_RE, &ANGLE_END_RE);
        shortcodes.extend(pair_shortcodes(text, &PERCENT_START_RE, &PERCENT_END_RE));

        for re in [&*ANGLE_SELF_RE, &*PERCENT_SELF_RE] {
            for caps in re.captures_iter(text) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                if inside_paired_span(whole.start(), &shortcodes) {
                    continue;
                }
                shortcodes.push(Shortcode {
                    kind: ShortcodeKind::SelfClosing,
                    name: name.as_str().to_string(),
                    content: String::new(),
                    start: whole.start(),
                    len: whole.len(),
                });
            }
        }

        shortcodes
    }

    /// Replaces every structured span in `text` with a unique placeholder
    /// token and returns the masked buffer together with the map needed to
    /// reverse the operation.
    ///
    /// Detection never fails; text without structured spans comes back
    /// unchanged with an empty map.
    pub fn protect(&self, text: &str) -> (String, PlaceholderMap) {
        let mut map = PlaceholderMap::default();
        let mut counter = 0usize;
        let mut masked = text.to_string();

        // Each pass operates on the previous pass's output, highest priority
        // first: fenced blocks, code spans, inline links, reference link
        // usages, reference link definitions.
        let passes: [(&str, &Regex); 5] = [
            ("CODE_BLOCK", &*CODE_BLOCK_RE),
            ("CODE_SPAN", &*CODE_SPAN_RE),
            ("LINK", &*LINK_RE),
            ("REF_LINK_USE", &*REF_LINK_USE_RE),
            ("REF_LINK_DEF", &*REF_LINK_DEF_RE),
        ];
        for (kind, re) in passes {
            masked = re
                .replace_all(&masked, |caps: &Captures| {
                    counter += 1;
                    let token = placeholder_token(kind, counter);
                    map.insert(token.clone(), caps[0].to_string());
                    token
                })
                .into_owned();
        }

        let mut shortcodes = self.find_shortcodes(&masked);
        // Substitute back-to-front so earlier replacements cannot shift the
        // offsets of spans not yet substituted.
        shortcodes.sort_by(|a, b| b.start.cmp(&a.start));
        for sc in shortcodes {
            let end = sc.start + sc.len;
            if end > masked.len() {
                continue;
            }
            counter += 1;
            let kind = match sc.kind {
                ShortcodeKind::Paired => "SHORTCODE_PAIRED",
                ShortcodeKind::SelfClosing => "SHORTCODE_SELF",
            };
            let token = placeholder_token(kind, counter);
            map.insert(token.clone(), masked[sc.start..end].to_string());
            masked.replace_range(sc.start..end, &token);
        }

        (masked, map)
    }

    /// Replaces every placeholder token in `text` with its stored original.
    ///
    /// A literal lookup-and-substitute with no structural validation; tokens
    /// absent from the map are left untouched.
    pub fn restore(&self, text: &str, placeholders: &PlaceholderMap) -> String {
        let mut restored = text.to_string();
        for (token, original) in placeholders.entries.iter().rev() {
            restored = restored.replace(token.as_str(), original);
        }
        restored
    }

    /// Shortcode-aware structural lint of a Markdown document.
    ///
    /// Returns human-readable issues: invalid shortcode names, empty paired
    /// shortcode bodies, empty link text or URL, and unclosed fenced code
    /// blocks. Nothing is modified.
    pub fn validate(&self, text: &str) -> Vec<String> {
        let mut issues = Vec::new();

        for sc in self.find_shortcodes(text) {
            if !SHORTCODE_NAME_RE.is_match(&sc.name) {
                issues.push(format!("invalid shortcode name: {}", sc.name));
            }
            if sc.kind == ShortcodeKind::Paired && sc.content.trim().is_empty() {
                issues.push(format!("empty paired shortcode: {}", sc.name));
            }
        }

        let (masked, _) = self.protect(text);
        issues.extend(validate_markdown_structure(&masked));
        issues
    }
}

struct TagMatch {
    name: String,
    start: usize,
    end: usize,
}

fn collect_tags(text: &str, re: &Regex) -> Vec<TagMatch> {
    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(TagMatch {
                name: name.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Pairs start and end tags of one shortcode syntax by name.
fn pair_shortcodes(text: &str, start_re: &Regex, end_re: &Regex) -> Vec<Shortcode> {
    let starts = collect_tags(text, start_re);
    let ends = collect_tags(text, end_re);

    let mut shortcodes = Vec::new();
    for start in &starts {
        for end in &ends {
            if end.start < start.end || end.name != start.name {
                continue;
            }
            // A same-name start tag strictly between the two defers this
            // closer to the nested occurrence.
            let shadowed = starts
                .iter()
                .any(|s| s.name == start.name && s.start >= start.end && s.start < end.start);
            if shadowed {
                continue;
            }
            shortcodes.push(Shortcode {
                kind: ShortcodeKind::Paired,
                name: start.name.clone(),
                content: text[start.end..end.start].to_string(),
                start: start.start,
                len: end.end - start.start,
            });
            break;
        }
    }
    shortcodes
}

fn inside_paired_span(position: usize, shortcodes: &[Shortcode]) -> bool {
    shortcodes.iter().any(|sc| {
        sc.kind == ShortcodeKind::Paired && position >= sc.start && position < sc.start + sc.len
    })
}

/// Line-oriented checks over a buffer whose well-formed spans have already
/// been masked out.
fn validate_markdown_structure(text: &str) -> Vec<String> {
    let mut issues = Vec::new();
    let mut fence: Option<&str> = None;

    for (i, line) in text.lines().enumerate() {
        let line_num = i + 1;

        if line.starts_with("```") || line.starts_with("~~~") {
            match fence {
                None => {
                    fence = Some(if line.starts_with("```") { "```" } else { "~~~" });
                }
                Some(open) if line.starts_with(open) => fence = None,
                Some(_) => {}
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }

        // Well-formed links were masked during protect; whatever still looks
        // like a link here failed the stricter detection pattern.
        if line.contains("](") {
            for caps in LINK_CHECK_RE.captures_iter(line) {
                let link_text = caps.get(1).map_or("", |m| m.as_str());
                let link_url = caps.get(2).map_or("", |m| m.as_str());
                if link_text.trim().is_empty() {
                    issues.push(format!("line {line_num}: empty link text"));
                }
                if link_url.trim().is_empty() {
                    issues.push(format!("line {line_num}: empty link URL"));
                }
            }
        }
    }

    if fence.is_some() {
        issues.push("unclosed code block".to_string());
    }
    issues
}
