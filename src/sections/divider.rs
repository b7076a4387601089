//! Divider name parsing
//!
//! Prompt names double as structure markers. A name like `=== World ===`
//! opens a top-level section, `<Details>` or `⭐─ Details ─⭐` opens a
//! sub-section, anything else is a plain entry.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::OrganizerError;

/// Section prefixes recognised without any user configuration
pub const BUILTIN_SECTION_PATTERNS: &[&str] = &[
    "=+",
    "-{3,}",
    "━+",
    "═+",
    "─{3,}",
    r"\*{3,}",
    "#{2,}",
];

/// Fallback display names when a marker carries no text
pub const DEFAULT_SECTION_NAME: &str = "Section";
pub const DEFAULT_SUB_SECTION_NAME: &str = "Sub-Section";

static ANGLE_SUB_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<\s*(.+?)\s*>\s*$").expect("Invalid regex"));

static STAR_SUB_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*⭐─+\s*(.*?)\s*─+⭐\s*$").expect("Invalid regex"));

/// Structural classification of one prompt name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividerInfo {
    /// True for both section and sub-section headers
    pub is_divider: bool,
    pub is_sub_header: bool,
    /// Display name with markers stripped
    pub clean_name: String,
    /// The unparsed input
    pub original_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerKind {
    Plain,
    Section,
    SubSection,
}

impl DividerInfo {
    fn plain(name: &str) -> Self {
        DividerInfo {
            is_divider: false,
            is_sub_header: false,
            clean_name: name.to_string(),
            original_text: name.to_string(),
        }
    }

    pub fn kind(&self) -> DividerKind {
        match (self.is_divider, self.is_sub_header) {
            (_, true) => DividerKind::SubSection,
            (true, false) => DividerKind::Section,
            (false, false) => DividerKind::Plain,
        }
    }
}

/// Split a comma-separated pattern string into trimmed, non-empty sources
pub fn split_custom_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compiled divider rules
#[derive(Debug, Clone)]
pub struct DividerParser {
    sources: Vec<String>,
    section_prefix: Regex,
}

impl Default for DividerParser {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DividerParser {
    /// Parser using only [`BUILTIN_SECTION_PATTERNS`]
    pub fn builtin() -> Self {
        let sources: Vec<String> = BUILTIN_SECTION_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        // Built-in sources are known-good
        let section_prefix = compile_prefix(&sources).expect("Invalid built-in divider pattern");
        DividerParser {
            sources,
            section_prefix,
        }
    }

    /// Parser using the built-ins plus the comma-separated `raw` patterns.
    ///
    /// If any custom pattern fails to compile, the parser falls back to the
    /// built-in set and the error is returned alongside it for display.
    pub fn with_custom_patterns(raw: &str) -> (Self, Option<OrganizerError>) {
        let custom = split_custom_patterns(raw);
        if custom.is_empty() {
            return (Self::builtin(), None);
        }

        for pattern in &custom {
            if let Err(e) = Regex::new(&format!("(?:{})", pattern)) {
                warn!(pattern = %pattern, error = %e, "Invalid custom divider pattern, using built-ins");
                return (Self::builtin(), Some(OrganizerError::invalid_pattern(pattern, e)));
            }
        }

        let mut sources: Vec<String> = BUILTIN_SECTION_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        for pattern in custom {
            if !sources.contains(&pattern) {
                sources.push(pattern);
            }
        }

        match compile_prefix(&sources) {
            Ok(section_prefix) => {
                debug!(pattern_count = sources.len(), "Compiled divider patterns");
                (
                    DividerParser {
                        sources,
                        section_prefix,
                    },
                    None,
                )
            }
            Err(e) => {
                warn!(error = %e, "Combined divider pattern failed to compile, using built-ins");
                (Self::builtin(), Some(OrganizerError::invalid_pattern(raw, e)))
            }
        }
    }

    /// De-duplicated pattern sources in match priority order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Classify one prompt name. Pure and deterministic.
    pub fn parse(&self, name: &str) -> DividerInfo {
        if let Some(clean) = parse_sub_header(name) {
            return DividerInfo {
                is_divider: true,
                is_sub_header: true,
                clean_name: clean,
                original_text: name.to_string(),
            };
        }

        let Some(m) = self.section_prefix.find(name) else {
            return DividerInfo::plain(name);
        };

        let token = m.as_str().trim();
        let rest = strip_trailing_token(&name[m.end()..], token).trim();
        let clean_name = if rest.is_empty() {
            DEFAULT_SECTION_NAME.to_string()
        } else {
            rest.to_string()
        };

        DividerInfo {
            is_divider: true,
            is_sub_header: false,
            clean_name,
            original_text: name.to_string(),
        }
    }
}

fn compile_prefix(sources: &[String]) -> Result<Regex, regex::Error> {
    let alternation = sources
        .iter()
        .map(|s| format!("(?:{})", s))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^\s*(?:{})", alternation))
}

fn parse_sub_header(name: &str) -> Option<String> {
    let caps = ANGLE_SUB_HEADER
        .captures(name)
        .or_else(|| STAR_SUB_HEADER.captures(name))?;
    let inner = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    Some(if inner.is_empty() {
        DEFAULT_SUB_SECTION_NAME.to_string()
    } else {
        inner.to_string()
    })
}

/// Remove a trailing run of `token` (e.g. the closing `===`) from `text`.
fn strip_trailing_token<'a>(text: &'a str, token: &str) -> &'a str {
    let mut rest = text.trim_end();
    if token.is_empty() {
        return rest;
    }

    // A token made of one repeated char closes with a run of that char. The
    // run must stand apart from the name or be as long as the opening token,
    // so a name like "C#" keeps its last char.
    let mut chars = token.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            let name = rest.trim_end_matches(first);
            let run_len = rest[name.len()..].chars().count();
            let closes = name.is_empty()
                || name.ends_with(char::is_whitespace)
                || run_len >= token.chars().count();
            return if closes { name } else { rest };
        }
    }

    while let Some(stripped) = rest.strip_suffix(token) {
        rest = stripped.trim_end();
    }
    rest
}
