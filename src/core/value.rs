//! Cell values and the structured-node capability
//!
//! A table cell is either a plain JSON value (primitives, null, plain objects
//! and arrays) or a reference to a node of a parsed document. The engine only
//! depends on the small [`StructuredNode`] surface, never on a concrete
//! document type.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Kind of a structured node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Map,
    Array,
    Simple,
}

/// Minimal capability a document node exposes to the table engine
pub trait StructuredNode: fmt::Debug + Send + Sync {
    /// Node kind
    fn node_type(&self) -> NodeType;

    /// Key of this node inside its parent, if any
    fn key(&self) -> Option<String>;

    /// Inner scalar of a `Simple` node; `None` when absent or for composites
    fn value(&self) -> Option<Value>;

    /// Number of direct children
    fn child_count(&self) -> usize;

    /// Convert the node (and, when `deep`, its descendants) to a plain value
    fn to_object(&self, deep: bool) -> Value;
}

/// Shared handle to a structured node
pub type NodeRef = Arc<dyn StructuredNode>;

/// A single table cell
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Primitive, null, plain object or plain array
    Plain(Value),
    /// Reference to a node of a parsed document
    Node(NodeRef),
}

impl CellValue {
    /// Explicit discriminator for document-node cells
    pub fn is_structured_node(&self) -> bool {
        matches!(self, CellValue::Node(_))
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            CellValue::Plain(v) => Some(v),
            CellValue::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            CellValue::Node(n) => Some(n),
            CellValue::Plain(_) => None,
        }
    }

    /// Plain view of the cell; document nodes are converted deeply
    pub fn to_plain(&self) -> Value {
        match self {
            CellValue::Plain(v) => v.clone(),
            CellValue::Node(n) => n.to_object(true),
        }
    }

    /// Numeric view used for sorting and statistics
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Plain(Value::Number(n)) => n.as_f64(),
            CellValue::Node(n) if n.node_type() == NodeType::Simple => match n.value() {
                Some(Value::Number(num)) => num.as_f64(),
                _ => None,
            },
            _ => None,
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Plain(a), CellValue::Plain(b)) => a == b,
            (CellValue::Node(a), CellValue::Node(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        CellValue::Plain(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Plain(Value::String(value.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Plain(Value::String(value))
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Plain(Value::from(value))
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Plain(Value::from(value))
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Plain(Value::from(value))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Plain(Value::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Plain(Value::Bool(value))
    }
}

impl From<NodeRef> for CellValue {
    fn from(node: NodeRef) -> Self {
        CellValue::Node(node)
    }
}

/// Compact canonical text of a plain value, keys in insertion order
pub fn canonical_text(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// Natural string form of a plain value
pub fn plain_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => canonical_text(value),
    }
}

/// Canonical value-to-string conversion used by filtering and pattern extraction
pub fn value_to_string(cell: &CellValue) -> String {
    match cell {
        CellValue::Plain(v) => plain_to_string(v),
        CellValue::Node(node) => match node.node_type() {
            NodeType::Simple => node.value().map(|v| plain_to_string(&v)).unwrap_or_default(),
            NodeType::Map | NodeType::Array => canonical_text(&node.to_object(true)),
        },
    }
}

/// Same as [`value_to_string`] for an optional cell (absent → empty)
pub fn optional_value_to_string(cell: Option<&CellValue>) -> String {
    cell.map(value_to_string).unwrap_or_default()
}

/// Object view of a cell for extended-field extraction
///
/// Plain objects and arrays pass through, strings that look like a JSON
/// object or array are parsed, document nodes are converted with
/// `to_object`. Anything else yields `None`.
pub fn get_cell_object(cell: &CellValue) -> Option<Value> {
    match cell {
        CellValue::Plain(v) => plain_object(v),
        CellValue::Node(node) => {
            let converted = node.to_object(true);
            match converted {
                Value::Null => None,
                Value::Object(_) | Value::Array(_) => Some(converted),
                Value::String(ref s) => parse_json_like(s).or(Some(converted)),
                other => Some(other),
            }
        }
    }
}

fn plain_object(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) | Value::Array(_) => Some(value.clone()),
        Value::String(s) => parse_json_like(s),
        _ => None,
    }
}

/// Parse a string that is shaped like a JSON object or array
pub fn parse_json_like(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let object_like = trimmed.starts_with('{') && trimmed.ends_with('}');
    let array_like = trimmed.starts_with('[') && trimmed.ends_with(']');
    if !object_like && !array_like {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
