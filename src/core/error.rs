use thiserror::Error;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("YAML error")]
    Yaml(#[source] serde_yaml::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Expression parse error: {0}")]
    ExpressionParse(String),

    #[error("Expression evaluation error: {0}")]
    ExpressionEval(String),

    #[error("Expression exceeded its evaluation budget of {limit} steps")]
    EvaluationBudgetExceeded { limit: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(String),

    #[error("Invalid JSON pointer: {0}")]
    InvalidPointer(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidRegex(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
