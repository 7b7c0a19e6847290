use indexmap::IndexMap;
use serde_json::json;

use tdviewer::core::row::Row;
use tdviewer::query::{FieldQuery, Query, SortDirection};
use tdviewer::table::{
    collect_column_statistics, materialize_rows, row_to_object, should_expand_columns, Column,
    ColumnManager, PresetColumn, TableDataProcessor, TableView, KEY_FIELD, ROW_NUMBER_FIELD,
};
use tdviewer::tree::TreeDoc;

fn city_rows() -> Vec<Row> {
    let doc = TreeDoc::from_value(
        json!([
            {"name": "a", "meta": {"city": "Oslo", "zip": 1}},
            {"name": "b", "meta": {"city": "Rome", "zip": 3}},
            {"name": "c", "meta": {"city": "Lima", "zip": 2}}
        ]),
        "root",
    );
    let root = doc.root();
    assert!(should_expand_columns(&root, 0.5, 30));
    materialize_rows(&root, true)
}

fn fields(columns: &[Column]) -> Vec<&str> {
    columns.iter().map(|c| c.field.as_str()).collect()
}

fn city_query() -> Query {
    Query::new().with_field_query(
        "meta",
        FieldQuery::default().with_extended_fields("city: $.city, zip: $.zip"),
    )
}

#[test]
fn test_view_places_derived_columns_after_source() {
    let mut view = TableView::new(TableDataProcessor::default()).with_query(city_query());
    let page = view.refresh(&city_rows());

    assert_eq!(page.total, 3);
    assert_eq!(
        fields(&page.columns),
        vec![ROW_NUMBER_FIELD, KEY_FIELD, "name", "meta", "city", "zip"]
    );
    assert_eq!(view.columns().get_derived_column_source("zip"), Some("meta"));
    assert!(view.columns().find_column("city").unwrap().is_derived);
}

#[test]
fn test_view_filters_sorts_and_pages() {
    let query = city_query()
        .with_sort("zip", SortDirection::Desc)
        .with_limit(2);
    let mut view = TableView::new(TableDataProcessor::default()).with_query(query);

    let page = view.refresh(&city_rows());
    let cities: Vec<_> = page
        .rows
        .iter()
        .map(|r| r.get_plain("city").cloned())
        .collect();
    assert_eq!(cities, vec![Some(json!("Rome")), Some(json!("Lima"))]);

    view.query_mut().offset = 10;
    let page = view.refresh(&city_rows());
    assert_eq!(view.query().offset, 1);
    assert_eq!(page.rows.len(), 2);

    view.query_mut()
        .field_queries
        .insert("city".to_string(), FieldQuery::new("o"));
    let page = view.refresh(&city_rows());
    assert_eq!(page.total, 2);
    assert_eq!(view.query().offset, 0);
}

#[test]
fn test_stale_derived_columns_are_removed() {
    let mut view = TableView::new(TableDataProcessor::default()).with_query(city_query());
    view.refresh(&city_rows());
    assert!(view.columns().find_column("zip").is_some());

    view.query_mut().field_queries.insert(
        "meta".to_string(),
        FieldQuery::default().with_extended_fields("city: $.city"),
    );
    let page = view.refresh(&city_rows());
    assert!(view.columns().find_column("zip").is_none());
    assert_eq!(fields(&page.columns).last(), Some(&"city"));
}

#[test]
fn test_preset_order_and_visibility_apply_once() {
    let mut view = TableView::new(TableDataProcessor::default()).with_query(city_query());
    view.apply_preset_columns(&[
        PresetColumn::new("city", true),
        PresetColumn::new("name", false),
    ]);

    let page = view.refresh(&city_rows());
    assert_eq!(
        view.columns().get_column_order(),
        vec!["city", "name", ROW_NUMBER_FIELD, KEY_FIELD, "meta", "zip"]
    );
    assert!(!fields(&page.columns).contains(&"name"));
    assert!(!view.columns().has_preset());

    view.columns_mut().reorder_columns(&["meta".to_string()]);
    view.refresh(&city_rows());
    assert_eq!(view.columns().get_column_order()[0], "meta");
}

#[test]
fn test_column_manager_visibility_round_trip() {
    let mut manager = ColumnManager::new();
    assert!(manager.add_column(Column::new("a", "A")));
    assert!(!manager.add_column(Column::new("a", "again")));
    manager.add_column(Column::new("b", "B"));
    manager.hide_column("b");

    let saved = manager.get_column_visibility();
    manager.set_column_visibility("b", true);
    manager.update_visibility(&saved);

    let visible: Vec<_> = manager.get_visible_columns().iter().map(|c| c.field.clone()).collect();
    assert_eq!(visible, vec!["a"]);
}

#[test]
fn test_derived_columns_of_adjacent_sources_do_not_interleave() {
    let mut manager = ColumnManager::new();
    for field in ["x", "y", "z"] {
        manager.add_column(Column::new(field, field));
    }
    let discovered: Vec<String> = ["x1", "y1", "x2"].iter().map(|s| s.to_string()).collect();
    let sources: IndexMap<String, String> = [("x1", "x"), ("y1", "y"), ("x2", "x")]
        .iter()
        .map(|(c, s)| (c.to_string(), s.to_string()))
        .collect();

    assert!(manager.update_derived_columns(&discovered, &sources));
    assert_eq!(manager.get_column_order(), vec!["x", "x1", "x2", "y", "y1", "z"]);
    assert!(!manager.update_derived_columns(&discovered, &sources));
}

#[test]
fn test_row_to_object_and_statistics() {
    let mut view = TableView::new(TableDataProcessor::default()).with_query(city_query());
    let page = view.refresh(&city_rows());

    let object = row_to_object(&page.rows[0], &page.columns, false);
    assert_eq!(object["city"], json!("Oslo"));
    assert!(object.get(KEY_FIELD).is_none());
    assert!(object.get(ROW_NUMBER_FIELD).is_none());

    let stats = collect_column_statistics(&page.rows, &["zip".to_string(), "city".to_string()]);
    assert_eq!(stats["zip"].total, 3);
    assert_eq!(stats["zip"].sum, 6.0);
    assert_eq!(stats["city"].value_counts.len(), 3);
}
