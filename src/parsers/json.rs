//! JSON plugin

use serde_json::Value;

use super::{ParseResult, ParserPlugin, ParserSyntax, ROOT_LABEL};
use crate::core::error::Result;
use crate::tree::{TreeDoc, TreeNodeRef};

/// Inputs larger than this are not test-parsed during detection
const DETECT_PARSE_LIMIT: usize = 1_000_000;

/// JSON documents; several concatenated values become one array
#[derive(Debug, Clone)]
pub struct JsonParserPlugin {
    name: String,
}

impl Default for JsonParserPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonParserPlugin {
    pub fn new() -> Self {
        Self {
            name: "JSON".to_string(),
        }
    }

    fn parse_values(text: &str) -> std::result::Result<Vec<Value>, serde_json::Error> {
        serde_json::Deserializer::from_str(text)
            .into_iter::<Value>()
            .collect()
    }
}

impl ParserPlugin for JsonParserPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn syntax(&self) -> ParserSyntax {
        ParserSyntax::Json
    }

    fn looks_like(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.starts_with("---") || (trimmed.starts_with('-') && !trimmed.starts_with("-{")) {
            return false;
        }
        if !(trimmed.ends_with('}') || trimmed.ends_with(']')) {
            return false;
        }
        if text.len() < DETECT_PARSE_LIMIT && !self.parse(text).is_success() {
            return false;
        }

        let colon = text.find(':').unwrap_or(usize::MAX);
        let equal = text.find('=').unwrap_or(usize::MAX);
        colon <= equal
    }

    fn parse(&self, text: &str) -> ParseResult {
        match Self::parse_values(text) {
            Ok(mut values) => {
                let value = match values.len() {
                    0 => return ParseResult::error("Error: empty input"),
                    1 => values.remove(0),
                    _ => Value::Array(values),
                };
                ParseResult::success(TreeDoc::from_value(value, ROOT_LABEL), "serde_json")
            }
            Err(e) => {
                log::debug!("JSON parse failed: {}", e);
                ParseResult::error(format!("Error: {}", e))
            }
        }
    }

    fn stringify(&self, node: &TreeNodeRef) -> Result<String> {
        Ok(serde_json::to_string_pretty(&node.to_value())?)
    }
}
