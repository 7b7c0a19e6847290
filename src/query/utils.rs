//! Helpers for building and inspecting field queries

use indexmap::IndexMap;

use super::FieldQuery;

/// Expression that never filters anything
const ALWAYS_TRUE: &str = "true";

/// An empty field query
pub fn create_field_query() -> FieldQuery {
    FieldQuery {
        pattern_filter: Some(false),
        ..FieldQuery::default()
    }
}

/// True when the query has filter text or a real field expression
pub fn has_query_or_expression(fq: Option<&FieldQuery>) -> bool {
    let Some(fq) = fq else {
        return false;
    };
    let has_query = !fq.query.is_empty();
    let has_expression = fq
        .js_expression_expr()
        .map_or(false, |expr| expr != ALWAYS_TRUE);
    has_query || has_expression
}

pub fn is_filter_active(fq: Option<&FieldQuery>) -> bool {
    has_query_or_expression(fq) && !fq.map_or(false, |fq| fq.is_disabled)
}

pub fn is_filter_disabled(fq: Option<&FieldQuery>) -> bool {
    has_query_or_expression(fq) && fq.map_or(false, |fq| fq.is_disabled)
}

pub fn count_active_filters(field_queries: &IndexMap<String, FieldQuery>) -> usize {
    field_queries
        .values()
        .filter(|fq| is_filter_active(Some(fq)))
        .count()
}

/// Reset the filter part of a query, keeping its extraction settings
pub fn clear_filter_fields(fq: &FieldQuery) -> FieldQuery {
    FieldQuery {
        query: String::new(),
        is_regex: false,
        is_negate: false,
        is_array: false,
        is_pattern: false,
        is_disabled: false,
        js_expression: None,
        ..fq.clone()
    }
}

pub fn has_extended_fields_config(fq: &FieldQuery) -> bool {
    fq.pattern_extract_expr().is_some() || fq.extended_fields_expr().is_some()
}

/// Add `value` to a comma separated any-of filter
///
/// A filter with the other negate mode is replaced. A value already in the
/// list leaves the filter unchanged.
pub fn add_value_to_array_filter(current: Option<&FieldQuery>, value: &str, negate: bool) -> FieldQuery {
    let base = FieldQuery {
        query: value.to_string(),
        is_negate: negate,
        is_array: true,
        ..FieldQuery::default()
    };

    let Some(current) = current else {
        return base;
    };
    if !current.is_array || current.is_negate != negate || current.query.is_empty() {
        return base;
    }

    let mut values: Vec<&str> = current.query.split(',').map(str::trim).collect();
    if values.contains(&value) {
        return current.clone();
    }
    values.push(value);
    FieldQuery {
        query: values.join(","),
        ..current.clone()
    }
}
