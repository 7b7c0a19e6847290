//! Filtering and derived-column extraction over table rows
//!
//! [`TableDataProcessor::process_data`] applies every configured field query
//! in passes. A pass may extract new derived columns, and those columns may
//! carry field queries of their own (for example an extraction over an
//! extracted value), so passes repeat until no new column appears or the
//! iteration cap is reached.
//!
//! Nothing in here fails outward. Bad regexes, patterns and expressions are
//! logged and degrade to "no effect"; per-row evaluation errors keep the row
//! for predicates and leave the key absent for extraction.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::core::row::Row;
use crate::core::value::{get_cell_object, value_to_string, CellValue};
use crate::expr::ExpressionEngine;
use crate::query::pattern::MultiPattern;
use crate::query::{FieldQuery, FieldQueryMatcher, IDENTITY_QUERY};

/// Default cap on fixed-point passes
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Inputs of one processing run
#[derive(Debug, Clone, Copy)]
pub struct ProcessingConfig<'a> {
    pub field_queries: &'a IndexMap<String, FieldQuery>,
    /// Current column order; fields are visited in this order first
    pub column_order: &'a [String],
    /// Row predicate applied last; `None` or the identity query keeps all rows
    pub js_query: Option<&'a str>,
}

impl<'a> ProcessingConfig<'a> {
    pub fn new(field_queries: &'a IndexMap<String, FieldQuery>, column_order: &'a [String]) -> Self {
        Self {
            field_queries,
            column_order,
            js_query: None,
        }
    }

    pub fn with_js_query(mut self, js_query: &'a str) -> Self {
        self.js_query = Some(js_query);
        self
    }
}

/// Output of one processing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingResult {
    pub data: Vec<Row>,
    /// Derived column names in discovery order
    pub derived_columns: Vec<String>,
    /// Derived column → field whose extraction first produced it
    pub derived_column_sources: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Operation {
    Extended,
    Pattern,
    Query,
    Expression,
}

/// Derived columns discovered during one run
#[derive(Debug, Default)]
struct Discovery {
    sources: IndexMap<String, String>,
}

impl Discovery {
    fn register(&mut self, column: &str, source: &str) {
        if !self.sources.contains_key(column) {
            log::trace!("derived column '{}' from '{}'", column, source);
            self.sources.insert(column.to_string(), source.to_string());
        }
    }

    fn contains(&self, column: &str) -> bool {
        self.sources.contains_key(column)
    }

    fn len(&self) -> usize {
        self.sources.len()
    }
}

/// Applies field queries, extraction and the document query to rows
#[derive(Debug, Clone)]
pub struct TableDataProcessor {
    engine: ExpressionEngine,
    max_iterations: usize,
    identity_query: String,
}

impl Default for TableDataProcessor {
    fn default() -> Self {
        Self::new(ExpressionEngine::default())
    }
}

impl TableDataProcessor {
    pub fn new(engine: ExpressionEngine) -> Self {
        Self {
            engine,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            identity_query: IDENTITY_QUERY.to_string(),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_identity_query(mut self, identity: impl Into<String>) -> Self {
        self.identity_query = identity.into();
        self
    }

    pub fn engine(&self) -> &ExpressionEngine {
        &self.engine
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run every configured field query to a fixed point, then the document query
    pub fn process_data(&self, rows: &[Row], config: &ProcessingConfig<'_>) -> ProcessingResult {
        let mut data: Vec<Row> = rows.to_vec();
        let mut discovery = Discovery::default();
        let mut applied: IndexSet<(String, Operation)> = IndexSet::new();

        let mut candidates: Vec<String> = config.column_order.to_vec();
        for field in config.field_queries.keys() {
            if !candidates.contains(field) {
                candidates.push(field.clone());
            }
        }

        for pass in 1..=self.max_iterations {
            let discovered_before = discovery.len();

            for field in &candidates {
                let Some(fq) = config.field_queries.get(field) else {
                    continue;
                };
                if fq.is_disabled || !data.iter().any(|row| row.contains(field)) {
                    continue;
                }

                if let Some(expression) = fq.extended_fields_expr() {
                    if applied.insert((field.clone(), Operation::Extended)) {
                        data = self.apply_extended_fields(data, field, expression, &mut discovery);
                    }
                }
                if let Some(patterns) = fq.pattern_extract_expr() {
                    if applied.insert((field.clone(), Operation::Pattern)) {
                        data = self.apply_pattern_extract(
                            data,
                            field,
                            patterns,
                            fq.drops_unmatched(),
                            &mut discovery,
                        );
                    }
                }
                if !fq.query.is_empty() && applied.insert((field.clone(), Operation::Query)) {
                    let is_derived = discovery.contains(field);
                    data = self.apply_query_filter(data, field, fq, is_derived);
                }
                if let Some(expression) = fq.js_expression_expr() {
                    if applied.insert((field.clone(), Operation::Expression)) {
                        data = self.apply_expression_filter(data, field, expression);
                    }
                }
            }

            let new_columns = discovery.len() - discovered_before;
            log::debug!(
                "pass {}: {} rows, {} new derived columns",
                pass,
                data.len(),
                new_columns
            );
            if new_columns == 0 {
                break;
            }

            for column in discovery.sources.keys() {
                if !candidates.contains(column) && config.field_queries.contains_key(column) {
                    candidates.push(column.clone());
                }
            }
        }

        if let Some(query) = config.js_query {
            data = self.apply_js_query(data, query);
        }

        ProcessingResult {
            data,
            derived_columns: discovery.sources.keys().cloned().collect(),
            derived_column_sources: discovery.sources,
        }
    }

    fn apply_extended_fields(
        &self,
        data: Vec<Row>,
        field: &str,
        expression: &str,
        discovery: &mut Discovery,
    ) -> Vec<Row> {
        let Some(fields) = self.engine.compile_extended_fields(expression) else {
            return data;
        };

        data.into_iter()
            .map(|mut row| {
                let Some(input) = row.get(field).and_then(get_cell_object) else {
                    return row;
                };
                for (key, value) in fields.extract(&input) {
                    // undefined still names a column, it just leaves this row without the key
                    discovery.register(&key, field);
                    if let Some(value) = value {
                        row.insert(key, CellValue::Plain(value));
                    }
                }
                row
            })
            .collect()
    }

    fn apply_pattern_extract(
        &self,
        data: Vec<Row>,
        field: &str,
        patterns: &str,
        drop_unmatched: bool,
        discovery: &mut Discovery,
    ) -> Vec<Row> {
        let Some(patterns) = MultiPattern::compile(patterns) else {
            return data;
        };

        data.into_iter()
            .filter_map(|mut row| {
                let captures = row
                    .get(field)
                    .map(value_to_string)
                    .and_then(|text| patterns.match_first(&text));
                match captures {
                    Some(captures) => {
                        for (key, value) in captures {
                            discovery.register(&key, field);
                            row.insert(key, CellValue::Plain(Value::String(value)));
                        }
                        Some(row)
                    }
                    None if drop_unmatched => None,
                    None => Some(row),
                }
            })
            .collect()
    }

    fn apply_query_filter(&self, data: Vec<Row>, field: &str, fq: &FieldQuery, is_derived: bool) -> Vec<Row> {
        let matcher = FieldQueryMatcher::new(fq);
        data.into_iter()
            .filter(|row| match row.get(field) {
                // absent base values pass; absent derived values mean no extraction
                None => !is_derived,
                Some(cell) => matcher.matches(&value_to_string(cell)),
            })
            .collect()
    }

    fn apply_expression_filter(&self, data: Vec<Row>, field: &str, expression: &str) -> Vec<Row> {
        let Some(predicate) = self.engine.compile_predicate(expression) else {
            log::warn!("invalid expression for field '{}', filter ignored", field);
            return data;
        };

        data.into_iter()
            .filter(|row| {
                let input = row.get(field).map(CellValue::to_plain);
                predicate.test_optional(input.as_ref())
            })
            .collect()
    }

    fn apply_js_query(&self, data: Vec<Row>, query: &str) -> Vec<Row> {
        let Some(predicate) = self
            .engine
            .compile_document_query(query, &self.identity_query)
        else {
            return data;
        };

        data.into_iter()
            .filter(|row| predicate.test(&row.to_object()))
            .collect()
    }
}
