//! Configuration loading utilities
//!
//! This module handles loading configuration from various sources with proper
//! precedence and validation.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Environment variable naming an explicit configuration file
pub const CONFIG_FILE_ENV: &str = "TDV_CONFIG_FILE";

fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

/// Load configuration from environment variables
pub fn load_from_env() -> Result<ViewerConfig> {
    let mut config = ViewerConfig::default();

    // Processing limits
    if let Some(max_iterations) = parse_env("TDV_MAX_ITERATIONS")? {
        config.processing.max_iterations = max_iterations;
    }
    if let Some(max_eval_steps) = parse_env("TDV_MAX_EVAL_STEPS")? {
        config.processing.max_eval_steps = max_eval_steps;
    }

    if let Some(limit) = parse_env("TDV_DEFAULT_LIMIT")? {
        config.table.default_limit = limit;
    }

    // Storage locations
    if let Ok(path) = env::var("TDV_PRESETS_PATH") {
        config.presets.storage_path = Some(path.into());
    }
    if let Ok(path) = env::var("TDV_COLORS_PATH") {
        config.presets.colors_path = Some(path.into());
    }

    // Logging configuration; RUST_LOG only counts when it is a bare level
    if let Ok(log_level) = env::var("TDV_LOG_LEVEL") {
        config.logging.level = log_level;
    } else if let Ok(filter) = env::var("RUST_LOG") {
        if validation::is_log_level(&filter) {
            config.logging.level = filter.trim().to_lowercase();
        }
    }

    Ok(config)
}

/// Load configuration from a file (YAML or TOML based on extension)
pub fn load_from_file(path: &Path) -> Result<ViewerConfig> {
    if !path.exists() {
        return Err(Error::ConfigurationError(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => load_from_yaml(&contents),
        Some("toml") => load_from_toml(&contents),
        Some(ext) => Err(Error::ConfigurationError(format!(
            "Unsupported config file format: {}",
            ext
        ))),
        None => load_from_yaml(&contents).or_else(|_| load_from_toml(&contents)),
    }
}

/// Load configuration from YAML string
pub fn load_from_yaml(yaml: &str) -> Result<ViewerConfig> {
    // An empty document is a config with every default
    if yaml.trim().is_empty() {
        return Ok(ViewerConfig::default());
    }
    serde_yaml::from_str(yaml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse YAML config: {}", e)))
}

/// Load configuration from TOML string
pub fn load_from_toml(toml: &str) -> Result<ViewerConfig> {
    toml::from_str(toml)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse TOML config: {}", e)))
}

/// Load configuration with precedence: defaults -> file -> environment
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<ViewerConfig> {
    let mut config = ViewerConfig::default();

    if let Some(file_path) = config_file {
        let file_config = load_from_file(file_path.as_ref())?;
        config.merge(&file_config);
    }

    // Environment has the highest precedence
    let env_config = load_from_env()?;
    config.merge(&env_config);

    config.validate()?;

    Ok(config)
}

/// Save configuration to a file
pub fn save_to_file(config: &ViewerConfig, path: &Path) -> Result<()> {
    let contents = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => config.to_yaml()?,
        Some("toml") => config.to_toml()?,
        Some(ext) => {
            return Err(Error::ConfigurationError(format!(
                "Unsupported config file format: {}",
                ext
            )))
        }
        None => config.to_yaml()?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    fs::write(path, contents).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to write config file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Get configuration file paths in order of precedence
pub fn get_config_file_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec!["tdv.yml".into(), "tdv.yaml".into(), "tdv.toml".into()];

    if let Some(config_dir) = dirs::config_dir() {
        let tdv_dir = config_dir.join("tdviewer");
        paths.push(tdv_dir.join("config.yml"));
        paths.push(tdv_dir.join("config.yaml"));
        paths.push(tdv_dir.join("config.toml"));
    }

    if let Ok(config_path) = env::var(CONFIG_FILE_ENV) {
        paths.insert(0, config_path.into());
    }

    paths
}

/// Auto-discover and load configuration file
pub fn auto_load() -> Result<ViewerConfig> {
    match get_config_file_paths().into_iter().find(|path| path.exists()) {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            load_with_precedence(Some(path))
        }
        None => load_with_precedence::<&Path>(None),
    }
}

/// Write a sample configuration with every default spelled out
pub fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut config = ViewerConfig::default();
    if let Some(config_dir) = dirs::config_dir() {
        let tdv_dir = config_dir.join("tdviewer");
        config.presets.storage_path = Some(tdv_dir.join("presets.json"));
        config.presets.colors_path = Some(tdv_dir.join("colors.json"));
    }
    save_to_file(&config, path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Serializes tests that modify environment variables
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const TOUCHED: [&str; 7] = [
        "TDV_MAX_ITERATIONS",
        "TDV_MAX_EVAL_STEPS",
        "TDV_DEFAULT_LIMIT",
        "TDV_COLORS_PATH",
        "TDV_LOG_LEVEL",
        "TDV_PRESETS_PATH",
        "RUST_LOG",
    ];

    fn with_clean_env<F: FnOnce()>(f: F) {
        let _lock = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<(&str, Option<String>)> =
            TOUCHED.iter().map(|name| (*name, env::var(name).ok())).collect();
        for name in TOUCHED {
            env::remove_var(name);
        }

        f();

        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }

    #[test]
    fn test_load_from_env() {
        with_clean_env(|| {
            env::set_var("TDV_MAX_ITERATIONS", "4");
            env::set_var("TDV_DEFAULT_LIMIT", " 50 ");
            env::set_var("TDV_LOG_LEVEL", "debug");
            env::set_var("TDV_PRESETS_PATH", "/tmp/presets.json");

            let config = load_from_env().unwrap();
            assert_eq!(config.processing.max_iterations, 4);
            assert_eq!(config.table.default_limit, 50);
            assert_eq!(config.logging.level, "debug");
            assert_eq!(
                config.presets.storage_path,
                Some(PathBuf::from("/tmp/presets.json"))
            );
        });
    }

    #[test]
    fn test_rust_log_fallback() {
        with_clean_env(|| {
            env::set_var("RUST_LOG", "tdviewer=trace");
            assert_eq!(load_from_env().unwrap().logging.level, "info");

            env::set_var("RUST_LOG", "WARN");
            assert_eq!(load_from_env().unwrap().logging.level, "warn");
        });
    }

    #[test]
    fn test_invalid_env_value() {
        with_clean_env(|| {
            env::set_var("TDV_MAX_ITERATIONS", "many");
            match load_from_env() {
                Err(Error::ConfigurationError(msg)) => assert!(msg.contains("TDV_MAX_ITERATIONS")),
                other => panic!("expected configuration error, got {:?}", other),
            }
        });
    }

    #[test]
    fn test_load_from_toml() {
        let toml = r#"
[processing]
max_iterations = 5

[logging]
level = "warn"
format = "json"
"#;
        let config = load_from_toml(toml).unwrap();
        assert_eq!(config.processing.max_iterations, 5);
        assert_eq!(config.processing.max_eval_steps, 100_000);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempdir().unwrap();
        for name in ["nested/config.yml", "config.toml"] {
            let path = dir.path().join(name);
            let mut original = ViewerConfig::default();
            original.table.max_expand_columns = 12;
            original.presets.colors_path = Some("colors.json".into());
            save_to_file(&original, &path).unwrap();

            assert_eq!(load_from_file(&path).unwrap(), original);
        }
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        let dir = tempdir().unwrap();
        let ini = dir.path().join("config.ini");
        fs::write(&ini, "x=1").unwrap();
        assert!(load_from_file(&ini).is_err());
        assert!(load_from_file(&dir.path().join("absent.yml")).is_err());
        assert!(save_to_file(&ViewerConfig::default(), &ini).is_err());
    }

    #[test]
    fn test_precedence() {
        with_clean_env(|| {
            let dir = tempdir().unwrap();
            let path = dir.path().join("precedence.yml");
            fs::write(
                &path,
                "processing:\n  max_iterations: 30\ntable:\n  default_limit: 20\n",
            )
            .unwrap();

            env::set_var("TDV_DEFAULT_LIMIT", "40");
            let config = load_with_precedence(Some(&path)).unwrap();

            assert_eq!(config.processing.max_iterations, 30);
            assert_eq!(config.table.default_limit, 40);
        });
    }

    #[test]
    fn test_precedence_validates() {
        with_clean_env(|| {
            let dir = tempdir().unwrap();
            let path = dir.path().join("bad.yml");
            fs::write(&path, "processing:\n  max_iterations: 500\n").unwrap();
            assert!(load_with_precedence(Some(&path)).is_err());
        });
    }

    #[test]
    fn test_config_file_paths() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved = env::var(CONFIG_FILE_ENV).ok();

        env::set_var(CONFIG_FILE_ENV, "/custom/tdv.yml");
        let paths = get_config_file_paths();
        assert_eq!(paths[0], PathBuf::from("/custom/tdv.yml"));
        assert_eq!(paths[1], PathBuf::from("tdv.yml"));

        match saved {
            Some(value) => env::set_var(CONFIG_FILE_ENV, value),
            None => env::remove_var(CONFIG_FILE_ENV),
        }
    }
}
