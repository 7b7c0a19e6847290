//! Configuration management for tdviewer
//!
//! Settings come from three places, lowest precedence first:
//! - built-in defaults
//! - a YAML or TOML configuration file
//! - `TDV_*` environment variables

use crate::core::error::{Error, Result};
use crate::expr::{ExpressionEngine, DEFAULT_MAX_EVAL_STEPS};
use crate::query::{DEFAULT_LIMIT, IDENTITY_QUERY};
use crate::table::{
    TableDataProcessor, DEFAULT_EXPAND_THRESHOLD, DEFAULT_MAX_EXPAND_COLUMNS,
    DEFAULT_MAX_ITERATIONS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod loader;
pub mod validation;

/// Main configuration structure for tdviewer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Fixed-point processing and expression limits
    pub processing: EngineConfig,
    /// Table materialization and paging
    pub table: TableConfig,
    /// Where presets and value colors are persisted
    pub presets: PresetStorageConfig,
    pub logging: LoggingConfig,
}

/// Processing section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on fixed-point passes per refresh
    pub max_iterations: usize,
    /// Step budget of a single expression evaluation
    pub max_eval_steps: usize,
    /// Document query that means "no filter"
    pub identity_query: String,
}

/// Table section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page when a query does not set a limit
    pub default_limit: usize,
    /// Minimum fill rate of a child key before it becomes a column
    pub expand_threshold: f64,
    /// Children with more distinct keys than this stay collapsed
    pub max_expand_columns: usize,
}

/// Preset section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetStorageConfig {
    /// JSON file backing the preset store
    pub storage_path: Option<PathBuf>,
    /// JSON file backing the value-color store
    pub colors_path: Option<PathBuf>,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (text, json)
    pub format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_eval_steps: DEFAULT_MAX_EVAL_STEPS,
            identity_query: IDENTITY_QUERY.to_string(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            expand_threshold: DEFAULT_EXPAND_THRESHOLD,
            max_expand_columns: DEFAULT_MAX_EXPAND_COLUMNS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl EngineConfig {
    /// Processor honoring the configured limits
    pub fn build_processor(&self) -> TableDataProcessor {
        TableDataProcessor::new(ExpressionEngine::with_max_steps(self.max_eval_steps))
            .with_max_iterations(self.max_iterations)
            .with_identity_query(self.identity_query.clone())
    }
}

impl ViewerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load configuration from a file (YAML or TOML)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_from_file(path.as_ref())
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        loader::load_from_yaml(yaml)
    }

    pub fn from_toml(toml: &str) -> Result<Self> {
        loader::load_from_toml(toml)
    }

    /// Load configuration with precedence: defaults -> file -> env
    pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        loader::load_with_precedence(config_file)
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        loader::save_to_file(self, path.as_ref())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to YAML: {}", e))
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            Error::ConfigurationError(format!("Failed to serialize config to TOML: {}", e))
        })
    }

    /// Merge another configuration into this one
    ///
    /// Only settings that `other` changed from their defaults are taken, so
    /// merging a mostly-default layer keeps what earlier layers set.
    pub fn merge(&mut self, other: &Self) {
        let engine = EngineConfig::default();
        if other.processing.max_iterations != engine.max_iterations {
            self.processing.max_iterations = other.processing.max_iterations;
        }
        if other.processing.max_eval_steps != engine.max_eval_steps {
            self.processing.max_eval_steps = other.processing.max_eval_steps;
        }
        if other.processing.identity_query != engine.identity_query {
            self.processing.identity_query = other.processing.identity_query.clone();
        }

        let table = TableConfig::default();
        if other.table.default_limit != table.default_limit {
            self.table.default_limit = other.table.default_limit;
        }
        if other.table.expand_threshold != table.expand_threshold {
            self.table.expand_threshold = other.table.expand_threshold;
        }
        if other.table.max_expand_columns != table.max_expand_columns {
            self.table.max_expand_columns = other.table.max_expand_columns;
        }

        if other.presets.storage_path.is_some() {
            self.presets.storage_path = other.presets.storage_path.clone();
        }
        if other.presets.colors_path.is_some() {
            self.presets.colors_path = other.presets.colors_path.clone();
        }

        let logging = LoggingConfig::default();
        if other.logging.level != logging.level {
            self.logging.level = other.logging.level.clone();
        }
        if other.logging.format != logging.format {
            self.logging.format = other.logging.format.clone();
        }
    }

    pub fn build_processor(&self) -> TableDataProcessor {
        self.processing.build_processor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.processing.max_iterations, 10);
        assert_eq!(config.processing.identity_query, "$");
        assert_eq!(config.table.default_limit, 100);
        assert!(config.presets.storage_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_keeps_earlier_layers() {
        let mut base = ViewerConfig::default();
        base.processing.max_iterations = 20;
        base.logging.level = "debug".to_string();

        let mut other = ViewerConfig::default();
        other.table.default_limit = 25;

        base.merge(&other);
        assert_eq!(base.processing.max_iterations, 20);
        assert_eq!(base.logging.level, "debug");
        assert_eq!(base.table.default_limit, 25);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ViewerConfig::from_yaml("table:\n  default_limit: 5\n").unwrap();
        assert_eq!(config.table.default_limit, 5);
        assert_eq!(config.table.max_expand_columns, 30);
        assert_eq!(config.processing, EngineConfig::default());
    }

    #[test]
    fn test_build_processor() {
        let mut config = ViewerConfig::default();
        config.processing.max_iterations = 3;
        assert_eq!(config.build_processor().max_iterations(), 3);
    }
}
