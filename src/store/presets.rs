//! Saved query presets
//!
//! A preset captures column order and visibility together with the field
//! queries and the document query of a table, so a view can be restored
//! later or shared as JSON.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::core::error::{Error, Result};
use crate::query::{FieldQuery, IDENTITY_QUERY};
use crate::table::columns::PresetColumn;

fn default_js_query() -> String {
    IDENTITY_QUERY.to_string()
}

/// A named, saved table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPreset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<PresetColumn>,
    #[serde(default)]
    pub extended_fields: String,
    #[serde(default)]
    pub field_queries: IndexMap<String, FieldQuery>,
    #[serde(default = "default_js_query")]
    pub js_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_level: Option<u32>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Preset content without identity and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub columns: Vec<PresetColumn>,
    #[serde(default)]
    pub extended_fields: String,
    #[serde(default)]
    pub field_queries: IndexMap<String, FieldQuery>,
    #[serde(default = "default_js_query")]
    pub js_query: String,
    #[serde(default)]
    pub expand_level: Option<u32>,
}

impl PresetDraft {
    pub fn new(name: impl Into<String>, columns: Vec<PresetColumn>) -> Self {
        Self {
            name: name.into(),
            description: None,
            columns,
            extended_fields: String::new(),
            field_queries: IndexMap::new(),
            js_query: default_js_query(),
            expand_level: None,
        }
    }
}

/// Partial update of a preset; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct PresetUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub columns: Option<Vec<PresetColumn>>,
    pub extended_fields: Option<String>,
    pub field_queries: Option<IndexMap<String, FieldQuery>>,
    pub js_query: Option<String>,
    pub expand_level: Option<Option<u32>>,
}

/// In-memory preset collection with JSON persistence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetStore {
    presets: Vec<QueryPreset>,
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// All presets, most recently updated first
    pub fn all(&self) -> Vec<&QueryPreset> {
        let mut presets: Vec<&QueryPreset> = self.presets.iter().collect();
        presets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        presets
    }

    pub fn get(&self, id: &str) -> Option<&QueryPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// First preset with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&QueryPreset> {
        self.all().into_iter().find(|p| p.name == name)
    }

    /// Store a new preset under a fresh id
    pub fn save(&mut self, draft: PresetDraft) -> QueryPreset {
        let now = Utc::now();
        let preset = QueryPreset {
            id: format!("preset-{}", uuid::Uuid::new_v4()),
            name: draft.name,
            description: draft.description,
            columns: draft.columns,
            extended_fields: draft.extended_fields,
            field_queries: draft.field_queries,
            js_query: draft.js_query,
            expand_level: draft.expand_level,
            created_at: now,
            updated_at: now,
        };
        log::debug!("saved preset '{}' ({})", preset.name, preset.id);
        self.presets.push(preset.clone());
        preset
    }

    pub fn update(&mut self, id: &str, update: PresetUpdate) -> Result<QueryPreset> {
        let preset = self
            .presets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::PresetNotFound(id.to_string()))?;

        if let Some(name) = update.name {
            preset.name = name;
        }
        if let Some(description) = update.description {
            preset.description = description;
        }
        if let Some(columns) = update.columns {
            preset.columns = columns;
        }
        if let Some(extended_fields) = update.extended_fields {
            preset.extended_fields = extended_fields;
        }
        if let Some(field_queries) = update.field_queries {
            preset.field_queries = field_queries;
        }
        if let Some(js_query) = update.js_query {
            preset.js_query = js_query;
        }
        if let Some(expand_level) = update.expand_level {
            preset.expand_level = expand_level;
        }
        preset.updated_at = Utc::now();
        Ok(preset.clone())
    }

    /// Remove a preset; false when the id is unknown
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        self.presets.len() != before
    }

    pub fn export_preset(preset: &QueryPreset) -> Result<String> {
        Ok(serde_json::to_string_pretty(preset)?)
    }

    /// Import an exported preset as a new one
    ///
    /// `name` and `columns` are required; everything else falls back to
    /// defaults. The imported preset always gets a fresh id.
    pub fn import_preset(&mut self, json: &str) -> Result<QueryPreset> {
        let data: Value = serde_json::from_str(json)?;
        let has_name = data
            .get("name")
            .and_then(Value::as_str)
            .map_or(false, |n| !n.is_empty());
        if !has_name || data.get("columns").map_or(true, Value::is_null) {
            return Err(Error::InvalidPreset(
                "missing required fields: name, columns".to_string(),
            ));
        }

        let draft: PresetDraft =
            serde_json::from_value(data).map_err(|e| Error::InvalidPreset(e.to_string()))?;
        Ok(self.save(draft))
    }

    /// Copy a preset under a new name
    pub fn duplicate(&mut self, id: &str, new_name: &str) -> Result<QueryPreset> {
        let original = self
            .get(id)
            .ok_or_else(|| Error::PresetNotFound(id.to_string()))?;
        let draft = PresetDraft {
            name: new_name.to_string(),
            description: original.description.clone(),
            columns: original.columns.clone(),
            extended_fields: original.extended_fields.clone(),
            field_queries: original.field_queries.clone(),
            js_query: original.js_query.clone(),
            expand_level: original.expand_level,
        };
        Ok(self.save(draft))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let presets: Vec<QueryPreset> = serde_json::from_str(json)?;
        Ok(Self { presets })
    }

    /// Load from a file; a missing file gives an empty store
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
