//! Table engine: row materialization, processing, columns and paging

pub mod columns;
pub mod processor;
pub mod rows;
pub mod stats;
pub mod view;

pub use columns::{Column, ColumnManager, ColumnVisibility, PresetColumn};
pub use processor::{ProcessingConfig, ProcessingResult, TableDataProcessor, DEFAULT_MAX_ITERATIONS};
pub use rows::{
    base_columns, materialize_rows, row_to_object, should_expand_columns, DEFAULT_EXPAND_THRESHOLD,
    DEFAULT_MAX_EXPAND_COLUMNS, KEY_FIELD, ROW_NUMBER_FIELD, VALUE_FIELD,
};
pub use stats::{collect_column_statistics, ColumnStatistics, StatValue};
pub use view::{paginate, rows_to_csv, sort_rows, TablePage, TableView};
