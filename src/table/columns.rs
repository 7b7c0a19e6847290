//! Column tracking, ordering and visibility

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A table column; `field` is its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub field: String,
    pub header: String,
    pub sortable: bool,
    pub filterable: bool,
    pub visible: bool,
    #[serde(default)]
    pub is_derived: bool,
}

impl Column {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            sortable: true,
            filterable: true,
            visible: true,
            is_derived: false,
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn derived(mut self) -> Self {
        self.is_derived = true;
        self
    }
}

/// Visibility entry exchanged with a column chooser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnVisibility {
    pub field: String,
    pub header: String,
    pub visible: bool,
}

/// Column entry of a preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetColumn {
    pub field: String,
    pub visible: bool,
}

impl PresetColumn {
    pub fn new(field: impl Into<String>, visible: bool) -> Self {
        Self {
            field: field.into(),
            visible,
        }
    }
}

/// Ordered column set of one table
///
/// Base columns are only ever hidden. Derived columns follow whatever the
/// latest processing run discovered: new ones are inserted next to their
/// source column and stale ones are removed.
#[derive(Debug, Clone, Default)]
pub struct ColumnManager {
    columns: Vec<Column>,
    derived_sources: IndexMap<String, String>,
    preset_order: Option<Vec<String>>,
    preset_visibility: Option<IndexMap<String, bool>>,
}

impl ColumnManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replace every column
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.derived_sources.clear();
    }

    /// Add a column unless one with the same field exists; true when inserted
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.find_column(&column.field).is_some() {
            return false;
        }
        self.columns.push(column);
        true
    }

    pub fn find_column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    fn find_column_mut(&mut self, field: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.field == field)
    }

    pub fn get_column_index(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    pub fn set_column_visibility(&mut self, field: &str, visible: bool) {
        if let Some(column) = self.find_column_mut(field) {
            column.visible = visible;
        }
    }

    pub fn hide_column(&mut self, field: &str) {
        self.set_column_visibility(field, false);
    }

    /// Queue an order and visibility to apply on the next derived-column update
    pub fn set_preset(&mut self, columns: &[PresetColumn]) {
        self.preset_order = Some(columns.iter().map(|c| c.field.clone()).collect());
        self.preset_visibility = Some(
            columns
                .iter()
                .map(|c| (c.field.clone(), c.visible))
                .collect(),
        );
    }

    pub fn clear_preset(&mut self) {
        self.preset_order = None;
        self.preset_visibility = None;
    }

    pub fn has_preset(&self) -> bool {
        self.preset_order.as_ref().map_or(false, |o| !o.is_empty())
    }

    pub fn get_preset_visibility(&self, field: &str) -> Option<bool> {
        self.preset_visibility.as_ref()?.get(field).copied()
    }

    /// Reconcile derived columns with the latest discovery
    ///
    /// A pending preset is applied here and then dropped. Returns true when
    /// a column was added or removed.
    pub fn update_derived_columns(
        &mut self,
        discovered: &[String],
        sources: &IndexMap<String, String>,
    ) -> bool {
        let live: HashSet<&str> = discovered.iter().map(String::as_str).collect();
        let mut changed = false;

        for (column, source) in sources {
            self.derived_sources.insert(column.clone(), source.clone());
        }
        self.derived_sources.retain(|column, _| live.contains(column.as_str()));

        let before = self.columns.len();
        self.columns
            .retain(|c| !c.is_derived || live.contains(c.field.as_str()));
        if self.columns.len() != before {
            changed = true;
        }

        for field in discovered {
            if self.find_column(field).is_some() {
                continue;
            }
            let visible = self.get_preset_visibility(field).unwrap_or(true);
            let column = Column::new(field.clone(), field.clone())
                .visible(visible)
                .derived();
            let source = self.derived_sources.get(field).cloned();
            match self.find_insert_position(field, source.as_deref()) {
                Some(index) => self.columns.insert(index, column),
                None => self.columns.push(column),
            }
            changed = true;
        }

        if let Some(order) = self.preset_order.take() {
            if !order.is_empty() {
                self.sort_by_preset_order(&order);
            }
        }
        if let Some(visibility) = self.preset_visibility.take() {
            for column in &mut self.columns {
                if let Some(visible) = visibility.get(&column.field) {
                    column.visible = *visible;
                }
            }
        }

        changed
    }

    fn find_insert_position(&self, field: &str, source: Option<&str>) -> Option<usize> {
        if let Some(order) = &self.preset_order {
            if let Some(preset_index) = order.iter().position(|f| f == field) {
                let mut index = 0;
                for (i, column) in self.columns.iter().enumerate() {
                    let earlier = order
                        .iter()
                        .position(|f| *f == column.field)
                        .map_or(false, |p| p < preset_index);
                    if earlier {
                        index = i + 1;
                    }
                }
                return Some(index);
            }
        }

        let source = source?;
        let mut index = self.get_column_index(source)? + 1;
        while let Some(column) = self.columns.get(index) {
            let same_source = column.is_derived
                && self.derived_sources.get(&column.field).map(String::as_str) == Some(source);
            if !same_source {
                break;
            }
            index += 1;
        }
        Some(index)
    }

    fn sort_by_preset_order(&mut self, order: &[String]) {
        let rank: IndexMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, f)| (f.as_str(), i))
            .collect();
        // stable: unknown columns keep their relative order at the end
        self.columns
            .sort_by_key(|c| rank.get(c.field.as_str()).copied().unwrap_or(usize::MAX));
    }

    /// Move the listed fields to the front in the given order
    pub fn reorder_columns(&mut self, order: &[String]) {
        let mut remaining = std::mem::take(&mut self.columns);
        let mut reordered = Vec::with_capacity(remaining.len());

        for field in order {
            if let Some(pos) = remaining.iter().position(|c| &c.field == field) {
                reordered.push(remaining.remove(pos));
            }
        }
        reordered.extend(remaining);
        self.columns = reordered;
    }

    pub fn get_column_visibility(&self) -> Vec<ColumnVisibility> {
        self.columns
            .iter()
            .map(|c| ColumnVisibility {
                field: c.field.clone(),
                header: c.header.clone(),
                visible: c.visible,
            })
            .collect()
    }

    pub fn update_visibility(&mut self, visibility: &[ColumnVisibility]) {
        for entry in visibility {
            self.set_column_visibility(&entry.field, entry.visible);
        }
    }

    pub fn get_derived_column_source(&self, field: &str) -> Option<&str> {
        self.derived_sources.get(field).map(String::as_str)
    }

    pub fn derived_column_sources(&self) -> &IndexMap<String, String> {
        &self.derived_sources
    }

    pub fn set_derived_column_sources(&mut self, sources: IndexMap<String, String>) {
        self.derived_sources = sources;
    }

    pub fn get_visible_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.visible).collect()
    }

    pub fn get_column_order(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.field.clone()).collect()
    }
}
