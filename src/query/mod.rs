//! Query model and per-field matching
//!
//! A [`Query`] holds paging, sorting, a document-level expression and one
//! [`FieldQuery`] per column. Field and query names serialize in camelCase so
//! saved presets stay readable by other tools using the same format.

pub mod matcher;
pub mod pattern;
pub mod utils;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::store::colors::ValueColor;

pub use matcher::{match_field_query, FieldQueryMatcher};
pub use pattern::{extract_pattern_fields, match_pattern, pattern_to_regex, MultiPattern, PatternMatcher};

/// Filter and extraction settings of one column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldQuery {
    /// Substring, regex, comma list or pattern text
    pub query: String,
    pub is_regex: bool,
    pub is_negate: bool,
    pub is_array: bool,
    pub is_pattern: bool,
    pub is_disabled: bool,
    pub pattern_fields: Vec<String>,
    /// Newline separated extraction patterns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_extract: Option<String>,
    /// Drop rows that match no extraction pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_filter: Option<bool>,
    /// `name: expr, ...` derived fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_fields: Option<String>,
    /// Boolean expression over the cell value bound to `$`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js_expression: Option<String>,
    /// Highlight colors per cell value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_colors: Option<IndexMap<String, ValueColor>>,
}

impl FieldQuery {
    /// Substring filter
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn regex(mut self) -> Self {
        self.is_regex = true;
        self
    }

    pub fn negate(mut self) -> Self {
        self.is_negate = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn pattern(mut self) -> Self {
        self.is_pattern = true;
        self.pattern_fields = extract_pattern_fields(&self.query);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.is_disabled = true;
        self
    }

    pub fn with_extended_fields(mut self, expression: impl Into<String>) -> Self {
        self.extended_fields = Some(expression.into());
        self
    }

    pub fn with_pattern_extract(mut self, patterns: impl Into<String>, filter: bool) -> Self {
        self.pattern_extract = Some(patterns.into());
        self.pattern_filter = Some(filter);
        self
    }

    pub fn with_js_expression(mut self, expression: impl Into<String>) -> Self {
        self.js_expression = Some(expression.into());
        self
    }

    /// Non-empty extended-fields expression
    pub fn extended_fields_expr(&self) -> Option<&str> {
        non_empty(self.extended_fields.as_deref())
    }

    /// Non-empty extraction patterns
    pub fn pattern_extract_expr(&self) -> Option<&str> {
        non_empty(self.pattern_extract.as_deref())
    }

    /// Non-empty field expression
    pub fn js_expression_expr(&self) -> Option<&str> {
        non_empty(self.js_expression.as_deref())
    }

    pub fn drops_unmatched(&self) -> bool {
        self.pattern_filter.unwrap_or(false)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Sort direction; empty means unsorted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(rename = "")]
    None,
    Asc,
    Desc,
}

/// Default page size
pub const DEFAULT_LIMIT: usize = 100;

/// Document query that keeps every row
pub const IDENTITY_QUERY: &str = "$";

/// Table query state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    pub limit: usize,
    pub offset: usize,
    pub sort_field: String,
    pub sort_dir: SortDirection,
    /// Row predicate over the full row object; `$` keeps everything
    pub js_query: String,
    pub extended_fields: String,
    pub field_queries: IndexMap<String, FieldQuery>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_field: String::new(),
            sort_dir: SortDirection::None,
            js_query: IDENTITY_QUERY.to_string(),
            extended_fields: String::new(),
            field_queries: IndexMap::new(),
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_field_query(mut self, field: impl Into<String>, fq: FieldQuery) -> Self {
        self.field_queries.insert(field.into(), fq);
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, dir: SortDirection) -> Self {
        self.sort_field = field.into();
        self.sort_dir = dir;
        self
    }

    pub fn with_js_query(mut self, query: impl Into<String>) -> Self {
        self.js_query = query.into();
        self
    }

    /// Clamp `offset` into `[0, max(0, total - limit)]`
    pub fn clamp_offset(&mut self, total: usize) {
        let max_offset = total.saturating_sub(self.limit);
        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }

    pub fn field_query(&self, field: &str) -> Option<&FieldQuery> {
        self.field_queries.get(field)
    }

    pub fn field_query_mut(&mut self, field: &str) -> &mut FieldQuery {
        self.field_queries.entry(field.to_string()).or_default()
    }

    /// True when the document query is absent or the identity query
    pub fn has_identity_js_query(&self) -> bool {
        let q = self.js_query.trim();
        q.is_empty() || q == IDENTITY_QUERY
    }
}
