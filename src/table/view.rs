//! Sorting, paging and the stateful table view

use std::cmp::Ordering;

use crate::core::error::{Error, Result};
use crate::core::row::Row;
use crate::core::value::{value_to_string, CellValue};
use crate::query::{Query, SortDirection};
use crate::table::columns::{Column, ColumnManager, PresetColumn};
use crate::table::processor::{ProcessingConfig, ProcessingResult, TableDataProcessor};
use crate::table::rows::base_columns;

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
    Absent,
}

impl SortKey {
    fn of(cell: Option<&CellValue>) -> Self {
        match cell {
            None => SortKey::Absent,
            Some(cell) => match cell.as_f64() {
                Some(n) => SortKey::Number(n),
                None => SortKey::Text(value_to_string(cell)),
            },
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Stable sort by one field
///
/// Numbers sort before text and compare numerically. Rows without the field
/// come last when ascending.
pub fn sort_rows(rows: &mut [Row], field: &str, dir: SortDirection) {
    match dir {
        _ if field.is_empty() => {}
        SortDirection::None => {}
        SortDirection::Asc => {
            rows.sort_by(|a, b| SortKey::of(a.get(field)).compare(&SortKey::of(b.get(field))))
        }
        SortDirection::Desc => {
            rows.sort_by(|a, b| SortKey::of(b.get(field)).compare(&SortKey::of(a.get(field))))
        }
    }
}

/// Clamp the query offset to `rows` and return the current window
pub fn paginate<'a>(rows: &'a [Row], query: &mut Query) -> &'a [Row] {
    query.clamp_offset(rows.len());
    let start = query.offset.min(rows.len());
    let end = start.saturating_add(query.limit).min(rows.len());
    &rows[start..end]
}

/// Write rows as CSV using the given columns
pub fn rows_to_csv(rows: &[Row], columns: &[&Column]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(|c| c.header.as_str()))?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|c| row.get(&c.field).map(value_to_string).unwrap_or_default()),
        )?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::IoError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::IoError(e.to_string()))
}

/// One page of processed rows
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage {
    pub rows: Vec<Row>,
    /// Row count after filtering, before paging
    pub total: usize,
    /// Visible columns in display order
    pub columns: Vec<Column>,
}

/// Column state, query and processor of one table
#[derive(Debug, Clone, Default)]
pub struct TableView {
    columns: ColumnManager,
    processor: TableDataProcessor,
    query: Query,
    last_result: Option<ProcessingResult>,
}

impl TableView {
    pub fn new(processor: TableDataProcessor) -> Self {
        Self {
            processor,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    pub fn columns(&self) -> &ColumnManager {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut ColumnManager {
        &mut self.columns
    }

    pub fn processor(&self) -> &TableDataProcessor {
        &self.processor
    }

    /// Result of the latest refresh, before sorting and paging
    pub fn last_result(&self) -> Option<&ProcessingResult> {
        self.last_result.as_ref()
    }

    /// Apply a preset's columns on the next refresh
    pub fn apply_preset_columns(&mut self, columns: &[PresetColumn]) {
        self.columns.set_preset(columns);
    }

    /// Run the full pipeline over freshly materialized rows
    pub fn refresh(&mut self, rows: &[Row]) -> TablePage {
        for field in base_columns(rows) {
            self.columns.add_column(Column::new(field.clone(), field));
        }

        let column_order = self.columns.get_column_order();
        let mut config = ProcessingConfig::new(&self.query.field_queries, &column_order);
        if !self.query.js_query.trim().is_empty() {
            config = config.with_js_query(&self.query.js_query);
        }
        let result = self.processor.process_data(rows, &config);

        if self
            .columns
            .update_derived_columns(&result.derived_columns, &result.derived_column_sources)
        {
            log::debug!("columns changed: {:?}", self.columns.get_column_order());
        }

        let mut data = result.data.clone();
        sort_rows(&mut data, &self.query.sort_field, self.query.sort_dir);
        let total = data.len();
        let page = paginate(&data, &mut self.query).to_vec();
        self.last_result = Some(result);

        TablePage {
            rows: page,
            total,
            columns: self
                .columns
                .get_visible_columns()
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}
