//! Error types for ForecastEval

use thiserror::Error;

/// ForecastEval error type.
///
/// The first four variants are the task-level taxonomy: any of them aborts
/// the task it was raised in and nothing else. `Reshape` only ever escapes a
/// row when a caller asks for a single cell to be coerced.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid task / batch configuration field
    #[error("Config error: {0}")]
    Config(String),

    /// Model-result source missing, unreadable or undecodable
    #[error("Load error: {0}")]
    Load(String),

    /// Required column absent or entirely null
    #[error("Schema error: {0}")]
    Schema(String),

    /// Cell could not be coerced to the evaluation grid shape
    #[error("Reshape error: {0}")]
    Reshape(String),

    /// Malformed domain value (grid shape, day index, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl Error {
    /// Short, stable name of the error kind, used in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Load(_) => "load",
            Error::Schema(_) => "schema",
            Error::Reshape(_) => "reshape",
            Error::Validation(_) => "validation",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
