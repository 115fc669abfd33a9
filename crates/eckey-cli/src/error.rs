//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Key validation or encoding error
    #[error("Key error: {0}")]
    Key(#[from] eckey::KeyError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl CliError {
    /// Category reported as `kind` in JSON error output
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Key(e) if e.is_validation() => "validation",
            CliError::Key(_) => "key",
            CliError::InvalidInput(_) => "input",
            CliError::Io(_) => "io",
            CliError::Json(_) => "json",
            CliError::Config(_) => "config",
        }
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(e: toml::ser::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(e.to_string())
    }
}
