use indexmap::IndexMap;
use serde_json::{json, Value};

use tdviewer::core::row::Row;
use tdviewer::expr::ExpressionEngine;
use tdviewer::query::FieldQuery;
use tdviewer::table::{materialize_rows, ProcessingConfig, TableDataProcessor, VALUE_FIELD};
use tdviewer::tree::TreeDoc;

fn rows(values: Vec<Value>) -> Vec<Row> {
    values.into_iter().map(Row::from_json).collect()
}

fn queries(pairs: Vec<(&str, FieldQuery)>) -> IndexMap<String, FieldQuery> {
    pairs.into_iter().map(|(f, q)| (f.to_string(), q)).collect()
}

fn people() -> Vec<Row> {
    rows(vec![
        json!({"name": "Alice", "age": 30}),
        json!({"name": "Bob", "age": 25}),
        json!({"name": "Charlie", "age": 35}),
    ])
}

#[test]
fn test_substring_filter() {
    let processor = TableDataProcessor::default();
    let fqs = queries(vec![("name", FieldQuery::new("ali"))]);
    let result = processor.process_data(&people(), &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.data, rows(vec![json!({"name": "Alice", "age": 30})]));
    assert!(result.derived_columns.is_empty());
}

#[test]
fn test_negated_filter() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![
        json!({"status": "active"}),
        json!({"status": "inactive"}),
        json!({"status": "active"}),
    ]);
    let fqs = queries(vec![("status", FieldQuery::new("inactive").negate())]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.data.len(), 2);
    assert!(result
        .data
        .iter()
        .all(|row| row.get_plain("status") == Some(&json!("active"))));
}

#[test]
fn test_extended_fields_create_derived_columns() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![json!({"payload": {"firstName": "John", "lastName": "Doe"}})]);
    let fqs = queries(vec![(
        "payload",
        FieldQuery::default().with_extended_fields("first: $.firstName, last: $.lastName"),
    )]);
    let order = vec!["payload".to_string()];
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &order));

    let row = &result.data[0];
    assert_eq!(row.get_plain("first"), Some(&json!("John")));
    assert_eq!(row.get_plain("last"), Some(&json!("Doe")));
    assert_eq!(result.derived_columns, vec!["first", "last"]);
    assert_eq!(result.derived_column_sources["first"], "payload");
    assert_eq!(result.derived_column_sources["last"], "payload");
}

#[test]
fn test_pattern_extract_with_filter_over_materialized_rows() {
    let doc = TreeDoc::from_value(json!(["Order:12345 shipped", "unrelated text"]), "root");
    let input = materialize_rows(&doc.root(), false);

    let processor = TableDataProcessor::default();
    let fqs = queries(vec![(
        VALUE_FIELD,
        FieldQuery::default().with_pattern_extract("Order:$orderId $status", true),
    )]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.data.len(), 1);
    let row = &result.data[0];
    assert_eq!(row.get_plain("orderId"), Some(&json!("12345")));
    assert_eq!(row.get_plain("status"), Some(&json!("shipped")));
    assert_eq!(result.derived_column_sources["orderId"], VALUE_FIELD);
}

#[test]
fn test_pattern_extract_without_filter_keeps_unmatched_rows() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![json!({"line": "id=7"}), json!({"line": "nothing"})]);
    let fqs = queries(vec![(
        "line",
        FieldQuery::default().with_pattern_extract("nope ${x}\nid=$id", false),
    )]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.data.len(), 2);
    assert_eq!(result.data[0].get_plain("id"), Some(&json!("7")));
    assert!(!result.data[1].contains("id"));
}

#[test]
fn test_recursive_derived_fields_reach_fixed_point() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![json!({"payload": {"inner": {"name": "test"}}})]);
    let fqs = queries(vec![
        ("payload", FieldQuery::default().with_extended_fields("inner: $.inner")),
        ("inner", FieldQuery::default().with_extended_fields("n: $.name")),
    ]);
    let order = vec!["payload".to_string()];
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &order));

    assert_eq!(result.data[0].get_plain("n"), Some(&json!("test")));
    assert!(result.derived_columns.contains(&"inner".to_string()));
    assert!(result.derived_columns.contains(&"n".to_string()));
    assert_eq!(result.derived_column_sources["n"], "inner");
}

#[test]
fn test_filter_on_derived_column_drops_rows_without_it() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![
        json!({"msg": "user=alice"}),
        json!({"msg": "user=bob"}),
        json!({"msg": "system"}),
    ]);
    let fqs = queries(vec![
        ("msg", FieldQuery::default().with_pattern_extract("user=$user", false)),
        ("user", FieldQuery::new("b")),
    ]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].get_plain("user"), Some(&json!("bob")));
}

#[test]
fn test_field_expression_and_document_query() {
    let processor = TableDataProcessor::default();
    let fqs = queries(vec![("age", FieldQuery::default().with_js_expression("$ >= 30"))]);
    let result = processor.process_data(&people(), &ProcessingConfig::new(&fqs, &[]));
    assert_eq!(result.data.len(), 2);

    let none = IndexMap::new();
    let config = ProcessingConfig::new(&none, &[]).with_js_query("$.name == 'Bob'");
    let result = processor.process_data(&people(), &config);
    assert_eq!(result.data, rows(vec![json!({"name": "Bob", "age": 25})]));
}

#[test]
fn test_invalid_expressions_keep_every_row() {
    let processor = TableDataProcessor::default();
    let fqs = queries(vec![("age", FieldQuery::default().with_js_expression("$ >>> ("))]);
    let config = ProcessingConfig::new(&fqs, &[]).with_js_query("(((");
    let result = processor.process_data(&people(), &config);
    assert_eq!(result.data.len(), 3);
}

#[test]
fn test_disabled_query_restores_row_count() {
    let processor = TableDataProcessor::default();
    let enabled = queries(vec![("name", FieldQuery::new("zzz"))]);
    let disabled = queries(vec![("name", FieldQuery::new("zzz").disabled())]);

    let filtered = processor.process_data(&people(), &ProcessingConfig::new(&enabled, &[]));
    let restored = processor.process_data(&people(), &ProcessingConfig::new(&disabled, &[]));

    assert!(filtered.data.is_empty());
    assert_eq!(restored.data.len(), 3);
}

#[test]
fn test_processing_is_idempotent() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![
        json!({"payload": {"a": 1, "b": "x"}}),
        json!({"payload": {"a": 2, "b": "y"}}),
    ]);
    let fqs = queries(vec![
        ("payload", FieldQuery::default().with_extended_fields("a: $.a, b: $.b")),
        ("b", FieldQuery::new("y")),
    ]);
    let config = ProcessingConfig::new(&fqs, &[]);

    let first = processor.process_data(&input, &config);
    let second = processor.process_data(&input, &config);
    assert_eq!(first, second);
    assert_eq!(first.data.len(), 1);
}

#[test]
fn test_cyclic_extraction_terminates() {
    let processor = TableDataProcessor::new(ExpressionEngine::default()).with_max_iterations(3);
    let input = rows(vec![json!({"a": {"x": 1}})]);
    let fqs = queries(vec![
        ("a", FieldQuery::default().with_extended_fields("b: $")),
        ("b", FieldQuery::default().with_extended_fields("a: $")),
    ]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    // every key an extraction writes is registered, even one that was a base field
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.derived_columns, vec!["b", "a"]);
}

#[test]
fn test_deeply_nested_expressions_are_rejected() {
    let processor = TableDataProcessor::default();
    let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let fqs = queries(vec![
        ("name", FieldQuery::default().with_extended_fields(format!("x: {}", nested))),
        ("age", FieldQuery::default().with_js_expression(format!("$ > {}", nested))),
    ]);
    let config = ProcessingConfig::new(&fqs, &[]).with_js_query(&nested);
    let result = processor.process_data(&people(), &config);

    assert_eq!(result.data, people());
    assert!(result.derived_columns.is_empty());
}

#[test]
fn test_oversized_padding_keeps_rows() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![json!({"s": "abc"})]);
    let fqs = queries(vec![(
        "s",
        FieldQuery::default().with_js_expression("$.padStart(1e12).length > 0"),
    )]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));
    assert_eq!(result.data, input);
}

#[test]
fn test_field_expression_sees_absent_cell_as_undefined() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![
        json!({"name": "Alice", "age": 30}),
        json!({"name": "Bob"}),
        json!({"name": "Carol", "age": null}),
    ]);
    let fqs = queries(vec![("age", FieldQuery::default().with_js_expression("$ === undefined"))]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.data, rows(vec![json!({"name": "Bob"})]));
}

#[test]
fn test_undefined_extraction_still_registers_column() {
    let processor = TableDataProcessor::default();
    let input = rows(vec![
        json!({"payload": {"a": 1}}),
        json!({"payload": {"b": 2}}),
    ]);
    let fqs = queries(vec![(
        "payload",
        FieldQuery::default().with_extended_fields("a: $.a, c: $.c"),
    )]);
    let result = processor.process_data(&input, &ProcessingConfig::new(&fqs, &[]));

    assert_eq!(result.derived_columns, vec!["a", "c"]);
    assert_eq!(result.derived_column_sources["c"], "payload");
    assert_eq!(result.data[0].get_plain("a"), Some(&json!(1)));
    assert!(!result.data[1].contains("a"));
    assert!(result.data.iter().all(|row| !row.contains("c")));
}
