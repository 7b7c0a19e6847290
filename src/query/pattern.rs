//! Placeholder patterns
//!
//! A pattern is literal text with placeholders:
//!
//! - `${name}` captures one or more characters
//! - `$name` captures one or more word characters (`[A-Za-z0-9_]`)
//! - `*` matches any run of characters, possibly empty
//!
//! `\n`, `\r`, `\t` typed in a pattern match the real control characters and
//! `\\` matches one backslash. Matching is case-insensitive and finds the
//! pattern anywhere in the value.

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use crate::core::error::{Error, Result};

/// Extracted `name → text` captures
pub type Captures = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Braced(String),
    Simple(String),
    Wildcard,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// Split a pattern into literal text, placeholders and wildcards
fn tokenize(pattern: &str) -> Vec<Segment> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '$' => {
                if chars.get(i + 1) == Some(&'{') {
                    let name: String = chars[i + 2..].iter().take_while(|c| is_word_char(**c)).collect();
                    let close = i + 2 + name.chars().count();
                    if !name.is_empty() && chars.get(close) == Some(&'}') {
                        flush(&mut literal, &mut segments);
                        segments.push(Segment::Braced(name));
                        i = close + 1;
                        continue;
                    }
                }
                let name: String = chars[i + 1..].iter().take_while(|c| is_word_char(**c)).collect();
                if !name.is_empty() {
                    flush(&mut literal, &mut segments);
                    i += 1 + name.chars().count();
                    segments.push(Segment::Simple(name));
                    continue;
                }
                literal.push(c);
            }
            '*' => {
                flush(&mut literal, &mut segments);
                segments.push(Segment::Wildcard);
            }
            '\\' => match chars.get(i + 1) {
                Some('\\') => {
                    literal.push('\\');
                    i += 1;
                }
                Some('n') => {
                    literal.push('\n');
                    i += 1;
                }
                Some('r') => {
                    literal.push('\r');
                    i += 1;
                }
                Some('t') => {
                    literal.push('\t');
                    i += 1;
                }
                _ => literal.push('\\'),
            },
            _ => literal.push(c),
        }
        i += 1;
    }
    flush(&mut literal, &mut segments);
    segments
}

/// Translate a pattern into regex source with named groups
///
/// The last placeholder is greedy when the pattern ends with it; other
/// `${name}` placeholders are lazy.
pub fn pattern_to_regex(pattern: &str) -> Result<String> {
    if pattern.is_empty() {
        return Err(Error::InvalidPattern("empty pattern".to_string()));
    }

    let segments = tokenize(pattern);
    let ends_with_placeholder = matches!(
        segments.last(),
        Some(Segment::Braced(_)) | Some(Segment::Simple(_))
    );
    let last = segments.len().saturating_sub(1);

    let mut source = String::new();
    for (idx, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Literal(text) => source.push_str(&regex::escape(text)),
            Segment::Wildcard => source.push_str(".*"),
            Segment::Braced(name) | Segment::Simple(name) if idx == last && ends_with_placeholder => {
                source.push_str(&format!("(?P<{}>.+)", name));
            }
            Segment::Braced(name) => source.push_str(&format!("(?P<{}>.+?)", name)),
            Segment::Simple(name) => source.push_str(&format!("(?P<{}>[A-Za-z0-9_]+)", name)),
        }
    }
    Ok(source)
}

/// Distinct placeholder names: `${name}` ones first, then `$name` ones
pub fn extract_pattern_fields(pattern: &str) -> Vec<String> {
    let segments = tokenize(pattern);
    let mut fields: Vec<String> = Vec::new();

    for segment in &segments {
        if let Segment::Braced(name) = segment {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
    }
    for segment in &segments {
        if let Segment::Simple(name) = segment {
            if !fields.contains(name) {
                fields.push(name.clone());
            }
        }
    }
    fields
}

/// Compiled placeholder pattern
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    regex: Regex,
    names: Vec<String>,
}

impl PatternMatcher {
    /// Compile a pattern, reporting why it is invalid
    pub fn try_compile(pattern: &str) -> Result<Self> {
        let source = pattern_to_regex(pattern)?;
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidPattern(format!("{}: {}", pattern, e)))?;
        let names = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            names,
        })
    }

    /// Compile a pattern; `None` when it is empty or invalid
    pub fn compile(pattern: &str) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        match Self::try_compile(pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                log::warn!("error creating pattern regex: {}", e);
                None
            }
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Placeholder names in pattern order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Captures of the first match; an empty map when the pattern has no placeholders
    pub fn match_value(&self, value: &str) -> Option<Captures> {
        let caps = self.regex.captures(value)?;
        Some(
            self.names
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

/// Compile `pattern` and match it against `value`
pub fn match_pattern(value: &str, pattern: &str) -> Option<Captures> {
    PatternMatcher::compile(pattern)?.match_value(value)
}

/// Newline separated alternatives tried in order
#[derive(Debug, Clone)]
pub struct MultiPattern {
    matchers: Vec<PatternMatcher>,
}

impl MultiPattern {
    /// Compile every non-blank line; `None` when no line compiles
    pub fn compile(patterns: &str) -> Option<Self> {
        let matchers: Vec<PatternMatcher> = patterns
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter_map(PatternMatcher::compile)
            .collect();

        if matchers.is_empty() {
            None
        } else {
            Some(Self { matchers })
        }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Captures of the first alternative that matches
    pub fn match_first(&self, value: &str) -> Option<Captures> {
        self.matchers.iter().find_map(|m| m.match_value(value))
    }
}
