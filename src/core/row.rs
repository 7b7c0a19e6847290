//! Table rows
//!
//! A row is an ordered mapping from field name to cell. A field that is not
//! present in the mapping is "absent", which the engine treats differently
//! from a present `null`.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::value::{CellValue, NodeRef};

/// One record of the tabular projection of a document
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: IndexMap<String, CellValue>,
    node: Option<NodeRef>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from ordered cells
    pub fn from_cells(cells: IndexMap<String, CellValue>) -> Self {
        Self { cells, node: None }
    }

    /// Build a row from a plain JSON object; other values yield a single `@value` cell
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                cells: map
                    .into_iter()
                    .map(|(k, v)| (k, CellValue::Plain(v)))
                    .collect(),
                node: None,
            },
            other => {
                let mut row = Self::new();
                row.insert("@value", CellValue::Plain(other));
                row
            }
        }
    }

    /// Attach the originating document node
    pub fn with_node(mut self, node: NodeRef) -> Self {
        self.node = Some(node);
        self
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(field.into(), value.into());
        self
    }

    /// Originating document node, if any
    pub fn node(&self) -> Option<&NodeRef> {
        self.node.as_ref()
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.get(field)
    }

    /// Plain value of a field, `None` when absent or when the cell is a node
    pub fn get_plain(&self, field: &str) -> Option<&Value> {
        self.cells.get(field).and_then(CellValue::as_plain)
    }

    /// True when the field is present (even if `null`)
    pub fn contains(&self, field: &str) -> bool {
        self.cells.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Option<CellValue> {
        self.cells.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        self.cells.shift_remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.cells.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Full object view of the row used by document-level queries
    ///
    /// When the row came from a document node, the node's object is the base
    /// and cells it does not already have (row number, key, derived fields)
    /// are layered on top.
    pub fn to_object(&self) -> Value {
        let cells_view = || -> Map<String, Value> {
            self.cells
                .iter()
                .map(|(k, v)| (k.clone(), v.to_plain()))
                .collect()
        };

        match &self.node {
            Some(node) => match node.to_object(true) {
                Value::Object(mut map) => {
                    for (k, v) in cells_view() {
                        map.entry(k).or_insert(v);
                    }
                    Value::Object(map)
                }
                other => other,
            },
            None => Value::Object(cells_view()),
        }
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        let same_node = match (&self.node, &other.node) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_node && self.cells == other.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_from_json_preserves_order() {
        let row = Row::from_json(json!({"name": "Alice", "age": 30}));
        let fields: Vec<&String> = row.fields().collect();
        assert_eq!(fields, vec!["name", "age"]);
        assert_eq!(row.get_plain("age"), Some(&json!(30)));
    }

    #[test]
    fn test_absent_versus_null() {
        let row = Row::new().with("status", Value::Null);
        assert!(row.contains("status"));
        assert!(!row.contains("other"));
    }

    #[test]
    fn test_to_object_without_node() {
        let row = Row::new().with("a", 1).with("b", "x");
        assert_eq!(row.to_object(), json!({"a": 1, "b": "x"}));
    }
}
