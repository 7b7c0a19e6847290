//! Input format plugins
//!
//! A plugin turns text into a [`TreeDoc`]. The table engine never sees the
//! plugins; it only works on the resulting document.

pub mod delimited;
pub mod json;
pub mod yaml;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::error::Result;
use crate::tree::{TreeDoc, TreeNodeRef};

pub use delimited::CsvParserPlugin;
pub use json::JsonParserPlugin;
pub use yaml::YamlParserPlugin;

/// Label of the root node of parsed documents
pub const ROOT_LABEL: &str = "root";

/// Source syntax of a plugin, used for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserSyntax {
    Json,
    Yaml,
    Csv,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParseStatus {
    Success,
    Warn,
    Error,
}

/// Outcome of parsing one input
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub result: Option<Arc<TreeDoc>>,
    pub status: ParseStatus,
    pub message: String,
}

impl ParseResult {
    pub fn success(doc: Arc<TreeDoc>, message: impl Into<String>) -> Self {
        Self {
            result: Some(doc),
            status: ParseStatus::Success,
            message: message.into(),
        }
    }

    pub fn warn(doc: Arc<TreeDoc>, message: impl Into<String>) -> Self {
        Self {
            result: Some(doc),
            status: ParseStatus::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            status: ParseStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ParseStatus::Success
    }

    /// Root of the parsed document
    pub fn root(&self) -> Option<TreeNodeRef> {
        self.result.as_ref().map(|doc| doc.root())
    }
}

/// A text format the viewer can open
pub trait ParserPlugin: fmt::Debug + Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    fn syntax(&self) -> ParserSyntax;

    /// Cheap guess whether `text` is in this format
    fn looks_like(&self, text: &str) -> bool;

    /// Parse `text`; failures are reported in the result, not raised
    fn parse(&self, text: &str) -> ParseResult;

    /// Render a node back to text in this plugin's output format
    fn stringify(&self, node: &TreeNodeRef) -> Result<String>;
}

/// Bundled plugins in detection order
pub fn default_plugins() -> Vec<Box<dyn ParserPlugin>> {
    vec![
        Box::new(JsonParserPlugin::new()),
        Box::new(YamlParserPlugin::new()),
        Box::new(CsvParserPlugin::new()),
    ]
}

/// First plugin that recognizes `text`, else the first plugin
pub fn detect_parser<'a>(plugins: &'a [Box<dyn ParserPlugin>], text: &str) -> Option<&'a dyn ParserPlugin> {
    plugins
        .iter()
        .find(|p| p.looks_like(text))
        .or_else(|| plugins.first())
        .map(|p| p.as_ref())
}

/// Plugin by case-insensitive name
pub fn find_parser<'a>(plugins: &'a [Box<dyn ParserPlugin>], name: &str) -> Option<&'a dyn ParserPlugin> {
    plugins
        .iter()
        .find(|p| p.name().eq_ignore_ascii_case(name))
        .map(|p| p.as_ref())
}
