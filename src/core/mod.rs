// Core data structures shared by every tdviewer module
pub mod error;
pub mod row;
pub mod value;

// Re-exports for convenience
pub use error::{Error, Result};
pub use row::Row;
pub use value::{
    canonical_text, get_cell_object, plain_to_string, value_to_string, CellValue, NodeRef,
    NodeType, StructuredNode,
};
