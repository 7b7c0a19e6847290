//! YAML plugin

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

use super::{ParseResult, ParserPlugin, ParserSyntax, ROOT_LABEL};
use crate::core::error::{Error, Result};
use crate::tree::{TreeDoc, TreeNodeRef};

/// YAML documents; a multi-document stream becomes an array
#[derive(Debug, Clone)]
pub struct YamlParserPlugin {
    name: String,
}

static KEY_LINE: OnceLock<Option<Regex>> = OnceLock::new();

/// `key:` at the start of a line
fn key_line() -> Option<&'static Regex> {
    KEY_LINE
        .get_or_init(|| Regex::new(r"^\s*[\w-]+:\s*").ok())
        .as_ref()
}

impl Default for YamlParserPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl YamlParserPlugin {
    pub fn new() -> Self {
        Self {
            name: "YAML".to_string(),
        }
    }

    fn parse_documents(text: &str) -> Result<Vec<Value>> {
        serde_yaml::Deserializer::from_str(text)
            .map(|document| Value::deserialize(document).map_err(Error::from))
            .collect()
    }
}

impl ParserPlugin for YamlParserPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn syntax(&self) -> ParserSyntax {
        ParserSyntax::Yaml
    }

    fn looks_like(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.starts_with("---") {
            return true;
        }
        if trimmed.starts_with('-') && !trimmed.starts_with("-{") {
            return true;
        }
        let Some(key_line) = key_line() else {
            return false;
        };
        trimmed
            .lines()
            .take(5)
            .any(|line| key_line.is_match(line) && !line.contains('{') && !line.contains('['))
    }

    fn parse(&self, text: &str) -> ParseResult {
        match Self::parse_documents(text) {
            Ok(mut documents) => {
                let value = match documents.len() {
                    0 => Value::Null,
                    1 => documents.remove(0),
                    _ => Value::Array(documents),
                };
                ParseResult::success(TreeDoc::from_value(value, ROOT_LABEL), "serde_yaml")
            }
            Err(e) => {
                log::debug!("YAML parse failed: {}", e);
                ParseResult::error(format!("Error: {}", e))
            }
        }
    }

    fn stringify(&self, node: &TreeNodeRef) -> Result<String> {
        Ok(serde_yaml::to_string(&node.to_value())?)
    }
}
