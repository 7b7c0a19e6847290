//! Best-effort path resolution for navigation
//!
//! Resolution never fails: when no strategy finds a node the starting node is
//! returned so navigation always has somewhere to land.

use super::{JsonPointer, NodePath, TreeNodeRef};

/// Default prefix tried for bare schema names (`Foo` → `/schemas/Foo`)
pub const DEFAULT_SCHEMA_PREFIX: &str = "/schemas/";

/// Resolves user-entered paths and references against a tree
#[derive(Debug, Clone)]
pub struct PathResolver {
    schema_prefix: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            schema_prefix: DEFAULT_SCHEMA_PREFIX.to_string(),
        }
    }
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_prefix(prefix: impl Into<String>) -> Self {
        Self {
            schema_prefix: prefix.into(),
        }
    }

    /// Resolve `path` starting at `from` (or `root`)
    ///
    /// Order: direct structural lookup, schema-prefix lookup, local JSON
    /// pointer lookup, then the starting node itself.
    pub fn resolve(&self, root: &TreeNodeRef, from: Option<&TreeNodeRef>, path: &NodePath) -> TreeNodeRef {
        let start = from.unwrap_or(root);

        if let Some(node) = start.get_by_path(path) {
            return node;
        }

        let text = match path.as_text() {
            Some(text) => text,
            None => return start.clone(),
        };

        let schema_path = NodePath::Text(format!("{}{}", self.schema_prefix, text));
        if let Some(node) = start.get_by_path(&schema_path) {
            log::debug!("resolved '{}' through schema prefix", text);
            return node;
        }

        match JsonPointer::parse(text) {
            Ok(pointer) if pointer.is_local() => {
                if let Some(node) = start.get_by_segments(&pointer.local_path()) {
                    return node;
                }
            }
            Ok(pointer) => {
                log::warn!(
                    "cross document reference is not supported: {} (document {})",
                    text,
                    pointer.doc_path.unwrap_or_default()
                );
            }
            Err(e) => log::debug!("'{}' is not a JSON pointer: {}", text, e),
        }

        start.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeDoc;
    use serde_json::json;

    fn doc() -> std::sync::Arc<TreeDoc> {
        TreeDoc::from_value(
            json!({
                "schemas": {"Image": {"id": "Image"}},
                "definitions": {"Pet": {"type": "object"}},
                "items": [{"name": "a"}]
            }),
            "root",
        )
    }

    #[test]
    fn test_direct_lookup() {
        let doc = doc();
        let root = doc.root();
        let node = PathResolver::new().resolve(&root, None, &"items/0/name".into());
        assert_eq!(node.value(), Some(&json!("a")));
    }

    #[test]
    fn test_schema_prefix_fallback() {
        let doc = doc();
        let root = doc.root();
        let items = root.child("items").unwrap();
        let node = PathResolver::new().resolve(&root, Some(&items), &"Image".into());
        assert_eq!(node.path_as_string(), "/schemas/Image");
    }

    #[test]
    fn test_json_pointer_fallback() {
        let doc = doc();
        let root = doc.root();
        let node = PathResolver::new().resolve(&root, None, &"#/definitions/Pet".into());
        assert_eq!(node.path_as_string(), "/definitions/Pet");
    }

    #[test]
    fn test_unresolved_returns_start() {
        let doc = doc();
        let root = doc.root();
        let items = root.child("items").unwrap();
        let resolver = PathResolver::new();

        assert_eq!(resolver.resolve(&root, Some(&items), &"nope".into()), items);
        assert_eq!(resolver.resolve(&root, None, &"other.json#/definitions/Pet".into()), root);
        let segments: Vec<String> = vec!["missing".into()];
        assert_eq!(resolver.resolve(&root, None, &segments.into()), root);
    }
}
