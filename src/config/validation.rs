//! Configuration validation utilities

use super::*;
use crate::core::error::{Error, Result};

/// Hard ceiling on fixed-point passes
pub const MAX_ITERATIONS_LIMIT: usize = 100;

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 2] = ["text", "json"];

/// Validate the entire configuration
pub fn validate_config(config: &ViewerConfig) -> Result<()> {
    validate_engine_config(&config.processing)?;
    validate_table_config(&config.table)?;
    validate_preset_storage_config(&config.presets)?;
    validate_logging_config(&config.logging)?;

    Ok(())
}

/// Whether `level` names one of the supported log levels
pub fn is_log_level(level: &str) -> bool {
    VALID_LEVELS.contains(&level.trim().to_lowercase().as_str())
}

/// Validate processing configuration
pub fn validate_engine_config(config: &EngineConfig) -> Result<()> {
    if config.max_iterations == 0 || config.max_iterations > MAX_ITERATIONS_LIMIT {
        return Err(Error::ConfigurationError(format!(
            "max_iterations must be between 1 and {}, got {}",
            MAX_ITERATIONS_LIMIT, config.max_iterations
        )));
    }

    if config.max_eval_steps == 0 {
        return Err(Error::ConfigurationError(
            "max_eval_steps must be greater than 0".to_string(),
        ));
    }

    if config.identity_query.trim().is_empty() {
        return Err(Error::ConfigurationError(
            "identity_query cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validate table configuration
pub fn validate_table_config(config: &TableConfig) -> Result<()> {
    if config.default_limit == 0 {
        return Err(Error::ConfigurationError(
            "default_limit must be greater than 0".to_string(),
        ));
    }

    if !(config.expand_threshold > 0.0 && config.expand_threshold <= 1.0) {
        return Err(Error::ConfigurationError(format!(
            "expand_threshold must be in (0, 1], got {}",
            config.expand_threshold
        )));
    }

    if config.max_expand_columns == 0 {
        log::warn!("max_expand_columns is 0; rows will never be expanded into columns");
    }

    Ok(())
}

fn validate_preset_storage_config(config: &PresetStorageConfig) -> Result<()> {
    for (path, context) in [
        (&config.storage_path, "preset storage"),
        (&config.colors_path, "value color storage"),
    ] {
        if let Some(path) = path {
            if path.is_dir() {
                return Err(Error::ConfigurationError(format!(
                    "{} path {} is a directory",
                    context,
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if !VALID_LEVELS.contains(&config.level.as_str()) {
        return Err(Error::ConfigurationError(format!(
            "Invalid log level '{}'. Valid levels: {}",
            config.level,
            VALID_LEVELS.join(", ")
        )));
    }

    if !VALID_FORMATS.contains(&config.format.as_str()) {
        return Err(Error::ConfigurationError(format!(
            "Invalid log format '{}'. Valid formats: {}",
            config.format,
            VALID_FORMATS.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_engine_config() {
        let mut config = EngineConfig::default();
        assert!(validate_engine_config(&config).is_ok());

        config.max_iterations = 0;
        assert!(validate_engine_config(&config).is_err());

        config.max_iterations = 101;
        assert!(validate_engine_config(&config).is_err());

        config.max_iterations = 100;
        config.max_eval_steps = 0;
        assert!(validate_engine_config(&config).is_err());
    }

    #[test]
    fn test_validate_table_config() {
        let mut config = TableConfig::default();
        assert!(validate_table_config(&config).is_ok());

        config.expand_threshold = 1.0;
        assert!(validate_table_config(&config).is_ok());

        config.expand_threshold = 0.0;
        assert!(validate_table_config(&config).is_err());

        config.expand_threshold = f64::NAN;
        assert!(validate_table_config(&config).is_err());

        config.expand_threshold = 0.5;
        config.default_limit = 0;
        assert!(validate_table_config(&config).is_err());
    }

    #[test]
    fn test_validate_logging_config() {
        let mut config = LoggingConfig::default();
        assert!(validate_logging_config(&config).is_ok());

        config.level = "verbose".to_string();
        assert!(validate_logging_config(&config).is_err());

        config.level = "warn".to_string();
        config.format = "compact".to_string();
        assert!(validate_logging_config(&config).is_err());
    }

    #[test]
    fn test_is_log_level() {
        assert!(is_log_level("Debug"));
        assert!(!is_log_level("off"));
        assert!(!is_log_level("tdviewer=info"));
    }
}
