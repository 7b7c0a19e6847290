//! CSV plugin

use serde_json::{Map, Value};

use super::{ParseResult, ParserPlugin, ParserSyntax, ROOT_LABEL};
use crate::core::error::{Error, Result};
use crate::core::value::plain_to_string;
use crate::tree::{TreeDoc, TreeNodeRef};

/// Delimited text; each record becomes a map keyed by header
#[derive(Debug, Clone)]
pub struct CsvParserPlugin {
    name: String,
    delimiter: u8,
    has_header: bool,
}

impl Default for CsvParserPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvParserPlugin {
    pub fn new() -> Self {
        Self {
            name: "CSV".to_string(),
            delimiter: b',',
            has_header: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }

    fn read_records(&self, text: &str) -> Result<Vec<Vec<String>>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.trim().as_bytes());

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok(records)
    }

    fn to_value(&self, mut records: Vec<Vec<String>>) -> Value {
        let rows: Vec<Value> = if self.has_header && records.len() > 1 {
            let header = records.remove(0);
            records
                .into_iter()
                .map(|record| {
                    let object: Map<String, Value> = header
                        .iter()
                        .enumerate()
                        .map(|(i, name)| {
                            let cell = record.get(i).cloned().unwrap_or_default();
                            (name.clone(), Value::String(cell))
                        })
                        .collect();
                    Value::Object(object)
                })
                .collect()
        } else {
            records
                .into_iter()
                .map(|record| {
                    let object: Map<String, Value> = record
                        .into_iter()
                        .enumerate()
                        .map(|(i, cell)| (format!("col{}", i + 1), Value::String(cell)))
                        .collect();
                    Value::Object(object)
                })
                .collect()
        };
        Value::Array(rows)
    }
}

impl ParserPlugin for CsvParserPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn syntax(&self) -> ParserSyntax {
        ParserSyntax::Csv
    }

    fn looks_like(&self, text: &str) -> bool {
        let delimiter = char::from(self.delimiter);
        let mut lines = text.trim().lines();
        let (Some(first), Some(second)) = (lines.next(), lines.next()) else {
            return false;
        };
        let first_count = first.matches(delimiter).count();
        if first_count == 0 {
            return false;
        }
        let second_count = second.matches(delimiter).count();
        first_count.abs_diff(second_count) <= 1
    }

    fn parse(&self, text: &str) -> ParseResult {
        match self.read_records(text) {
            Ok(records) if records.is_empty() => ParseResult::warn(
                TreeDoc::from_value(Value::Array(Vec::new()), ROOT_LABEL),
                "Empty CSV",
            ),
            Ok(records) => {
                let value = self.to_value(records);
                let count = value.as_array().map_or(0, Vec::len);
                ParseResult::success(
                    TreeDoc::from_value(value, ROOT_LABEL),
                    format!("Parsed {} rows", count),
                )
            }
            Err(e) => ParseResult::error(format!("Error: {}", e)),
        }
    }

    /// Rows of an array node as CSV, header from first-appearance keys
    fn stringify(&self, node: &TreeNodeRef) -> Result<String> {
        let rows: Vec<Value> = match node.to_value() {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut header: Vec<String> = Vec::new();
        for row in &rows {
            if let Value::Object(map) = row {
                for key in map.keys() {
                    if !header.contains(key) {
                        header.push(key.clone());
                    }
                }
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer.write_record(&header)?;
        for row in &rows {
            let cells: Vec<String> = header
                .iter()
                .map(|key| row.get(key).map(plain_to_string).unwrap_or_default())
                .collect();
            writer.write_record(&cells)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::IoError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::IoError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_header() {
        let plugin = CsvParserPlugin::new();
        let result = plugin.parse("name, age\nAlice, 30\n\"Bob, Jr\",\n");
        assert!(result.is_success());
        assert_eq!(result.message, "Parsed 2 rows");
        assert_eq!(
            result.root().unwrap().to_value(),
            json!([
                {"name": "Alice", "age": "30"},
                {"name": "Bob, Jr", "age": ""}
            ])
        );
    }

    #[test]
    fn test_parse_without_header() {
        let plugin = CsvParserPlugin::new().without_header();
        let result = plugin.parse("a,b\nc,d");
        assert_eq!(
            result.root().unwrap().to_value(),
            json!([{"col1": "a", "col2": "b"}, {"col1": "c", "col2": "d"}])
        );
    }

    #[test]
    fn test_empty_input_warns() {
        let result = CsvParserPlugin::new().parse("   ");
        assert_eq!(result.status, crate::parsers::ParseStatus::Warn);
        assert_eq!(result.root().unwrap().child_count(), 0);
    }

    #[test]
    fn test_looks_like_and_stringify() {
        let plugin = CsvParserPlugin::new();
        assert!(plugin.looks_like("a,b\n1,2"));
        assert!(!plugin.looks_like("a,b"));
        assert!(!plugin.looks_like("a\nb"));

        let root = plugin.parse("a,b\n1,2").root().unwrap();
        assert_eq!(plugin.stringify(&root).unwrap(), "a,b\n1,2\n");
    }
}
