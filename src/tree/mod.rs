//! Tree document model
//!
//! A [`TreeDoc`] is an immutable arena built from a parsed value. Nodes are
//! addressed through [`TreeNodeRef`] handles, which are cheap to clone and
//! compare by identity. The handles implement [`StructuredNode`] so they can
//! be stored directly in table cells.

pub mod history;
pub mod pointer;
pub mod resolver;

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::core::value::{NodeRef, NodeType, StructuredNode};

pub use history::NavigationHistory;
pub use pointer::JsonPointer;
pub use resolver::PathResolver;

/// Index of a node inside its document
pub type NodeId = usize;

#[derive(Debug)]
struct NodeData {
    key: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Debug)]
enum NodeKind {
    Map(Vec<NodeId>),
    Array(Vec<NodeId>),
    Simple(Value),
}

/// Immutable parsed document
#[derive(Debug)]
pub struct TreeDoc {
    nodes: Vec<NodeData>,
}

impl TreeDoc {
    /// Build a document from a plain value; the root node gets `root_label` as key
    pub fn from_value(value: Value, root_label: &str) -> Arc<TreeDoc> {
        let mut doc = TreeDoc { nodes: Vec::new() };
        doc.build(root_label.to_string(), None, value);
        Arc::new(doc)
    }

    fn build(&mut self, key: String, parent: Option<NodeId>, value: Value) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            key,
            parent,
            kind: NodeKind::Simple(Value::Null),
        });

        let kind = match value {
            Value::Object(map) => {
                let children = map
                    .into_iter()
                    .map(|(k, v)| self.build(k, Some(id), v))
                    .collect();
                NodeKind::Map(children)
            }
            Value::Array(items) => {
                let children = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| self.build(i.to_string(), Some(id), v))
                    .collect();
                NodeKind::Array(children)
            }
            scalar => NodeKind::Simple(scalar),
        };
        self.nodes[id].kind = kind;
        id
    }

    /// Handle to the root node
    pub fn root(self: &Arc<Self>) -> TreeNodeRef {
        TreeNodeRef {
            doc: Arc::clone(self),
            id: 0,
        }
    }

    /// Number of nodes in the document
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Path to a node: a `/`-separated string or explicit segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePath {
    Text(String),
    Segments(Vec<String>),
}

impl NodePath {
    /// Segments of the path; text paths are split on `/`
    pub fn segments(&self) -> Vec<String> {
        match self {
            NodePath::Text(text) if text.is_empty() => Vec::new(),
            NodePath::Text(text) => text.split('/').map(str::to_string).collect(),
            NodePath::Segments(segments) => segments.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodePath::Text(text) => Some(text),
            NodePath::Segments(_) => None,
        }
    }
}

impl From<&str> for NodePath {
    fn from(text: &str) -> Self {
        NodePath::Text(text.to_string())
    }
}

impl From<String> for NodePath {
    fn from(text: String) -> Self {
        NodePath::Text(text)
    }
}

impl From<Vec<String>> for NodePath {
    fn from(segments: Vec<String>) -> Self {
        NodePath::Segments(segments)
    }
}

impl From<&[&str]> for NodePath {
    fn from(segments: &[&str]) -> Self {
        NodePath::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

/// Handle to one node of a [`TreeDoc`]
#[derive(Clone)]
pub struct TreeNodeRef {
    doc: Arc<TreeDoc>,
    id: NodeId,
}

impl TreeNodeRef {
    fn data(&self) -> &NodeData {
        &self.doc.nodes[self.id]
    }

    fn with_id(&self, id: NodeId) -> TreeNodeRef {
        TreeNodeRef {
            doc: Arc::clone(&self.doc),
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn doc(&self) -> &Arc<TreeDoc> {
        &self.doc
    }

    pub fn key(&self) -> &str {
        &self.data().key
    }

    pub fn node_type(&self) -> NodeType {
        match self.data().kind {
            NodeKind::Map(_) => NodeType::Map,
            NodeKind::Array(_) => NodeType::Array,
            NodeKind::Simple(_) => NodeType::Simple,
        }
    }

    /// Scalar of a simple node
    pub fn value(&self) -> Option<&Value> {
        match &self.data().kind {
            NodeKind::Simple(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.child_ids().is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.id == 0
    }

    pub fn parent(&self) -> Option<TreeNodeRef> {
        self.data().parent.map(|id| self.with_id(id))
    }

    pub fn root(&self) -> TreeNodeRef {
        self.with_id(0)
    }

    fn child_ids(&self) -> &[NodeId] {
        match &self.data().kind {
            NodeKind::Map(ids) | NodeKind::Array(ids) => ids,
            NodeKind::Simple(_) => &[],
        }
    }

    pub fn children(&self) -> Vec<TreeNodeRef> {
        self.child_ids().iter().map(|&id| self.with_id(id)).collect()
    }

    pub fn child_count(&self) -> usize {
        self.child_ids().len()
    }

    /// Direct child by key
    pub fn child(&self, key: &str) -> Option<TreeNodeRef> {
        self.child_ids()
            .iter()
            .find(|&&id| self.doc.nodes[id].key == key)
            .map(|&id| self.with_id(id))
    }

    /// Scalar value of a direct simple child
    pub fn child_value(&self, key: &str) -> Option<Value> {
        self.child(key).and_then(|c| c.value().cloned())
    }

    /// Keys from the root (excluded) down to this node
    pub fn path(&self) -> Vec<String> {
        let mut keys = Vec::new();
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.is_root() {
                break;
            }
            keys.push(node.key().to_string());
            current = node.parent();
        }
        keys.reverse();
        keys
    }

    pub fn path_as_string(&self) -> String {
        format!("/{}", self.path().join("/"))
    }

    /// Walk `path` from this node
    ///
    /// A leading empty segment jumps to the root, `.` stays, `..` goes to the
    /// parent and any other segment selects a child by key.
    pub fn get_by_path(&self, path: &NodePath) -> Option<TreeNodeRef> {
        self.get_by_segments(&path.segments())
    }

    pub fn get_by_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<TreeNodeRef> {
        let mut node = self.clone();
        for (i, segment) in segments.iter().enumerate() {
            node = match segment.as_ref() {
                "" if i == 0 => node.root(),
                "" | "." => node,
                ".." => node.parent()?,
                key => node.child(key)?,
            };
        }
        Some(node)
    }

    /// Plain value of this node and its descendants
    pub fn to_value(&self) -> Value {
        match &self.data().kind {
            NodeKind::Simple(v) => v.clone(),
            NodeKind::Array(ids) => Value::Array(ids.iter().map(|&id| self.with_id(id).to_value()).collect()),
            NodeKind::Map(ids) => {
                let map: Map<String, Value> = ids
                    .iter()
                    .map(|&id| {
                        let child = self.with_id(id);
                        (child.key().to_string(), child.to_value())
                    })
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Type-erased handle for storage in table cells
    pub fn to_node_ref(&self) -> NodeRef {
        Arc::new(self.clone())
    }
}

impl PartialEq for TreeNodeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.doc, &other.doc) && self.id == other.id
    }
}

impl Eq for TreeNodeRef {}

impl fmt::Debug for TreeNodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNodeRef")
            .field("path", &self.path_as_string())
            .field("type", &self.node_type())
            .finish()
    }
}

impl StructuredNode for TreeNodeRef {
    fn node_type(&self) -> NodeType {
        TreeNodeRef::node_type(self)
    }

    fn key(&self) -> Option<String> {
        Some(TreeNodeRef::key(self).to_string())
    }

    fn value(&self) -> Option<Value> {
        TreeNodeRef::value(self).cloned()
    }

    fn child_count(&self) -> usize {
        TreeNodeRef::child_count(self)
    }

    fn to_object(&self, _deep: bool) -> Value {
        self.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Arc<TreeDoc> {
        TreeDoc::from_value(
            json!({"a": {"b": [10, {"c": "x"}]}, "schemas": {"Foo": {"type": "object"}}}),
            "root",
        )
    }

    #[test]
    fn test_children_and_keys() {
        let doc = sample();
        let root = doc.root();
        assert_eq!(root.key(), "root");
        assert_eq!(root.child_count(), 2);
        let b = root.get_by_path(&"a/b".into()).unwrap();
        assert_eq!(b.node_type(), NodeType::Array);
        let keys: Vec<String> = b.children().iter().map(|c| c.key().to_string()).collect();
        assert_eq!(keys, vec!["0", "1"]);
    }

    #[test]
    fn test_get_by_path_relative_segments() {
        let doc = sample();
        let c = doc.root().get_by_path(&"a/b/1/c".into()).unwrap();
        assert_eq!(c.value(), Some(&json!("x")));
        assert_eq!(c.path_as_string(), "/a/b/1/c");

        let parent = c.get_by_path(&"..".into()).unwrap();
        assert_eq!(parent.path_as_string(), "/a/b/1");

        let from_root = c.get_by_path(&"/schemas/Foo".into()).unwrap();
        assert_eq!(from_root.key(), "Foo");

        assert!(doc.root().get_by_path(&"a/missing".into()).is_none());
    }

    #[test]
    fn test_identity_equality() {
        let doc = sample();
        let a1 = doc.root().child("a").unwrap();
        let a2 = doc.root().get_by_path(&"a".into()).unwrap();
        assert_eq!(a1, a2);

        let other = sample();
        assert_ne!(a1, other.root().child("a").unwrap());
    }

    #[test]
    fn test_to_value_round_trip() {
        let value = json!({"z": 1, "a": [true, null, "s"]});
        let doc = TreeDoc::from_value(value.clone(), "root");
        assert_eq!(doc.root().to_value(), value);
    }
}
