//! Field query evaluation

use regex::RegexBuilder;

use super::pattern::PatternMatcher;
use super::FieldQuery;

#[derive(Debug, Clone)]
enum SubQuery {
    Regex(regex::Regex),
    Contains(String),
}

impl SubQuery {
    fn matches(&self, value: &str, lowered: &str) -> bool {
        match self {
            SubQuery::Regex(re) => re.is_match(value),
            SubQuery::Contains(needle) => lowered.contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    /// Empty query
    All,
    Pattern(Option<PatternMatcher>),
    Any(Vec<SubQuery>),
}

/// A [`FieldQuery`] compiled once and applied to many values
///
/// Regex and pattern compilation never fails outward: an invalid regex falls
/// back to substring containment and an invalid pattern matches nothing.
#[derive(Debug, Clone)]
pub struct FieldQueryMatcher {
    mode: Mode,
    negate: bool,
}

impl FieldQueryMatcher {
    pub fn new(fq: &FieldQuery) -> Self {
        let mode = if fq.query.is_empty() {
            Mode::All
        } else if fq.is_pattern {
            Mode::Pattern(PatternMatcher::compile(&fq.query))
        } else {
            let queries: Vec<&str> = if fq.is_array {
                fq.query
                    .split(',')
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .collect()
            } else {
                vec![fq.query.as_str()]
            };
            Mode::Any(
                queries
                    .into_iter()
                    .map(|q| compile_sub_query(q, fq.is_regex))
                    .collect(),
            )
        };

        Self {
            mode,
            negate: fq.is_negate,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        let matched = match &self.mode {
            // an empty query is no filter at all, negation included
            Mode::All => return true,
            Mode::Pattern(matcher) => matcher.as_ref().map_or(false, |m| m.is_match(value)),
            Mode::Any(queries) => {
                let lowered = value.to_lowercase();
                queries.iter().any(|q| q.matches(value, &lowered))
            }
        };
        matched != self.negate
    }
}

fn compile_sub_query(query: &str, is_regex: bool) -> SubQuery {
    if is_regex {
        match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(re) => return SubQuery::Regex(re),
            Err(e) => log::debug!("invalid regex '{}', using substring match: {}", query, e),
        }
    }
    SubQuery::Contains(query.to_lowercase())
}

/// Match one value against a field query
pub fn match_field_query(value: &str, fq: &FieldQuery) -> bool {
    FieldQueryMatcher::new(fq).matches(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(match_field_query("any value", &FieldQuery::default()));
        assert!(match_field_query("any value", &FieldQuery::default().negate()));
    }

    #[test]
    fn test_substring_case_insensitive() {
        let fq = FieldQuery::new("hello");
        assert!(match_field_query("Hello World", &fq));
        assert!(match_field_query("Say hello!", &fq));
        assert!(!match_field_query("Goodbye", &fq));
    }

    #[test]
    fn test_regex_and_fallback() {
        let fq = FieldQuery::new(r"^\d+$").regex();
        assert!(match_field_query("12345", &fq));
        assert!(!match_field_query("abc123", &fq));

        let invalid = FieldQuery::new("[invalid").regex();
        assert!(match_field_query("contains [invalid text", &invalid));
    }

    #[test]
    fn test_array_any_of() {
        let fq = FieldQuery::new("red, green, blue").array();
        assert!(match_field_query("red", &fq));
        assert!(match_field_query("blue", &fq));
        assert!(!match_field_query("yellow", &fq));
    }

    #[test]
    fn test_pattern_mode_and_negate() {
        let fq = FieldQuery::new("Order:${orderId}").pattern();
        assert!(match_field_query("Order:12345", &fq));
        assert!(!match_field_query("Something else", &fq));

        let negated = fq.clone().negate();
        assert!(!match_field_query("Order:12345", &negated));
        assert!(match_field_query("Something else", &negated));
    }
}
