//! Tabular projection of a tree node

use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::core::row::Row;
use crate::core::value::{CellValue, NodeType};
use crate::table::columns::Column;
use crate::tree::TreeNodeRef;

/// 1-based row number column
pub const ROW_NUMBER_FIELD: &str = "#";
/// Child key column
pub const KEY_FIELD: &str = "@key";
/// Whole-child column used when children are not expanded
pub const VALUE_FIELD: &str = "@value";

/// Default minimum fill rate for expanding grandchildren into columns
pub const DEFAULT_EXPAND_THRESHOLD: f64 = 0.5;
/// Default maximum number of expanded columns
pub const DEFAULT_MAX_EXPAND_COLUMNS: usize = 30;

/// True when the grandchildren of `node` fill a table densely enough
pub fn should_expand_columns(node: &TreeNodeRef, threshold: f64, max_columns: usize) -> bool {
    let children = node.children();
    if children.is_empty() {
        return false;
    }

    let mut columns: IndexSet<String> = IndexSet::new();
    let mut cells = 0usize;
    for child in &children {
        for grandchild in child.children() {
            columns.insert(grandchild.key().to_string());
            cells += 1;
        }
    }

    if columns.is_empty() || columns.len() > max_columns {
        return false;
    }
    let capacity = (children.len() * columns.len()) as f64;
    cells as f64 >= capacity * threshold
}

/// One row per child of `node`
///
/// Every row has a row number, the child key and a reference back to the
/// child. Expanded rows get one node cell per grandchild; the others hold the
/// child itself under [`VALUE_FIELD`].
pub fn materialize_rows(node: &TreeNodeRef, expand_columns: bool) -> Vec<Row> {
    node.children()
        .into_iter()
        .enumerate()
        .map(|(idx, child)| {
            let mut row = Row::new()
                .with(ROW_NUMBER_FIELD, idx + 1)
                .with(KEY_FIELD, child.key());

            let composite = child.node_type() != NodeType::Simple;
            if expand_columns && composite {
                for grandchild in child.children() {
                    let key = grandchild.key().to_string();
                    row.insert(key, CellValue::Node(grandchild.to_node_ref()));
                }
            } else {
                row.insert(VALUE_FIELD, CellValue::Node(child.to_node_ref()));
            }
            row.with_node(child.to_node_ref())
        })
        .collect()
}

/// Field names in first-appearance order
pub fn base_columns(rows: &[Row]) -> Vec<String> {
    let mut fields: IndexSet<String> = IndexSet::new();
    for row in rows {
        for field in row.fields() {
            if !fields.contains(field) {
                fields.insert(field.clone());
            }
        }
    }
    fields.into_iter().collect()
}

/// Plain object of the visible columns of a row
///
/// The row number column is never included and the key column only when
/// `include_key` is set.
pub fn row_to_object(row: &Row, columns: &[Column], include_key: bool) -> Value {
    let mut object = Map::new();
    for column in columns.iter().filter(|c| c.visible) {
        if column.field == ROW_NUMBER_FIELD || (column.field == KEY_FIELD && !include_key) {
            continue;
        }
        if let Some(cell) = row.get(&column.field) {
            object.insert(column.field.clone(), cell.to_plain());
        }
    }
    Value::Object(object)
}
