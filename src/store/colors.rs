//! Value highlight colors per field

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::query::FieldQuery;

/// Background and text color of a highlighted value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueColor {
    pub bg: String,
    pub text: String,
}

impl ValueColor {
    pub fn new(bg: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            bg: bg.into(),
            text: text.into(),
        }
    }
}

/// Named palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetColor {
    pub name: &'static str,
    pub bg: &'static str,
    pub text: &'static str,
}

impl PresetColor {
    pub fn to_color(&self) -> ValueColor {
        ValueColor::new(self.bg, self.text)
    }
}

/// Palette with readable contrast; `None` clears a color
pub const PRESET_COLORS: [PresetColor; 8] = [
    PresetColor { name: "None", bg: "", text: "" },
    PresetColor { name: "Yellow", bg: "#fef08a", text: "#713f12" },
    PresetColor { name: "Red", bg: "#fecaca", text: "#7f1d1d" },
    PresetColor { name: "Green", bg: "#bbf7d0", text: "#14532d" },
    PresetColor { name: "Blue", bg: "#bfdbfe", text: "#1e3a8a" },
    PresetColor { name: "Orange", bg: "#fed7aa", text: "#7c2d12" },
    PresetColor { name: "Purple", bg: "#e9d5ff", text: "#581c87" },
    PresetColor { name: "Gray", bg: "#e5e7eb", text: "#1f2937" },
];

/// Palette entry by case-insensitive name
pub fn preset_color(name: &str) -> Option<&'static PresetColor> {
    PRESET_COLORS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

type FieldColors = IndexMap<String, ValueColor>;

/// `field → value → color` store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueColorStore {
    colors: IndexMap<String, FieldColors>,
}

impl ValueColorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str, value: &str) -> Option<&ValueColor> {
        self.colors.get(field)?.get(value)
    }

    /// Set or clear a color; a color with an empty background clears it
    pub fn set(&mut self, field: &str, value: &str, color: Option<ValueColor>) {
        match color.filter(|c| !c.bg.is_empty()) {
            Some(color) => {
                self.colors
                    .entry(field.to_string())
                    .or_default()
                    .insert(value.to_string(), color);
            }
            None => {
                if let Some(field_colors) = self.colors.get_mut(field) {
                    field_colors.shift_remove(value);
                    if field_colors.is_empty() {
                        self.colors.shift_remove(field);
                    }
                }
            }
        }
    }

    /// Copy of a field's colors, `None` when it has none
    pub fn field_colors(&self, field: &str) -> Option<FieldColors> {
        self.colors
            .get(field)
            .filter(|colors| !colors.is_empty())
            .cloned()
    }

    pub fn set_field_colors(&mut self, field: &str, colors: Option<FieldColors>) {
        match colors.filter(|colors| !colors.is_empty()) {
            Some(colors) => {
                self.colors.insert(field.to_string(), colors);
            }
            None => {
                self.colors.shift_remove(field);
            }
        }
    }

    /// Replace every color with the ones saved in `field_queries`
    pub fn apply_from_field_queries(&mut self, field_queries: &IndexMap<String, FieldQuery>) {
        self.colors.clear();
        for (field, fq) in field_queries {
            if let Some(colors) = fq.value_colors.as_ref().filter(|c| !c.is_empty()) {
                self.colors.insert(field.clone(), colors.clone());
            }
        }
    }

    /// Copy the colors back into `field_queries` before saving a preset
    pub fn store_into_field_queries(&self, field_queries: &mut IndexMap<String, FieldQuery>) {
        for (field, fq) in field_queries.iter_mut() {
            fq.value_colors = self.field_colors(field);
        }
    }

    /// `(background-color, color)` style pair for a cell
    pub fn style_for(&self, field: &str, value: &str) -> Option<(String, String)> {
        self.get(field, value)
            .map(|c| (c.bg.clone(), c.text.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file; a missing file gives an empty store
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        match Self::from_json(&contents) {
            Ok(store) => Ok(store),
            Err(e) => {
                log::warn!("ignoring unreadable color store {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear_prunes_fields() {
        let mut store = ValueColorStore::new();
        let yellow = preset_color("yellow").unwrap().to_color();
        store.set("status", "WARN", Some(yellow.clone()));
        assert_eq!(store.get("status", "WARN"), Some(&yellow));

        store.set("status", "WARN", Some(PRESET_COLORS[0].to_color()));
        assert!(store.get("status", "WARN").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_apply_from_field_queries_replaces_all() {
        let mut store = ValueColorStore::new();
        store.set("old", "x", Some(ValueColor::new("#fff", "#000")));

        let mut colors = IndexMap::new();
        colors.insert("ERROR".to_string(), ValueColor::new("#fecaca", "#7f1d1d"));
        let mut fqs = IndexMap::new();
        fqs.insert(
            "level".to_string(),
            FieldQuery {
                value_colors: Some(colors),
                ..FieldQuery::default()
            },
        );
        fqs.insert("other".to_string(), FieldQuery::default());

        store.apply_from_field_queries(&fqs);
        assert!(store.get("old", "x").is_none());
        assert_eq!(
            store.style_for("level", "ERROR"),
            Some(("#fecaca".to_string(), "#7f1d1d".to_string()))
        );
        assert!(store.field_colors("other").is_none());
    }

    #[test]
    fn test_json_shape() {
        let mut store = ValueColorStore::new();
        store.set("status", "WARN", Some(ValueColor::new("#fef08a", "#713f12")));
        assert_eq!(
            store.to_json().unwrap(),
            r##"{"status":{"WARN":{"bg":"#fef08a","text":"#713f12"}}}"##
        );
        assert_eq!(ValueColorStore::from_json(&store.to_json().unwrap()).unwrap(), store);
    }
}
