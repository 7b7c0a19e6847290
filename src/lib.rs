//! tdviewer: query, filter and column projection over semi-structured data
//!
//! Text is parsed by a [`parsers::ParserPlugin`] into an immutable
//! [`tree::TreeDoc`]. The children of a selected node become [`Row`]s, and a
//! [`table::TableView`] runs them through the [`table::TableDataProcessor`]:
//! derived-field extraction, pattern extraction, per-field filters and a
//! document-level expression, repeated until no new derived fields appear.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_lifetimes)]

// Core module with fundamental data structures
pub mod core;

pub mod config;
pub mod expr;
pub mod parsers;
pub mod query;
pub mod store;
pub mod table;
pub mod tree;

// Re-export core types
pub use core::error::{Error, Result};
pub use core::row::Row;
pub use core::value::{CellValue, NodeRef, NodeType, StructuredNode};

pub use config::ViewerConfig;
pub use expr::{ExpressionEngine, ExtendedFields, Predicate};
pub use parsers::{default_plugins, detect_parser, ParseResult, ParseStatus, ParserPlugin};
pub use query::{FieldQuery, FieldQueryMatcher, PatternMatcher, Query, SortDirection};
pub use store::{PresetStore, QueryPreset, ValueColorStore};
pub use table::{
    Column, ColumnManager, ProcessingConfig, ProcessingResult, TableDataProcessor, TablePage,
    TableView,
};
pub use tree::{NavigationHistory, NodePath, PathResolver, TreeDoc, TreeNodeRef};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
