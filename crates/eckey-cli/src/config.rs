//! CLI configuration management

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use eckey::Curve;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::CliError;

/// Output format for generated keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    /// Raw JSON record (`type`, `prvKeyHex`, `pubKeyHex`, ...)
    #[default]
    Raw,
    /// PEM block
    Pem,
}

impl FromStr for KeyFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "json" => Ok(KeyFormat::Raw),
            "pem" => Ok(KeyFormat::Pem),
            other => Err(CliError::InvalidInput(format!("unknown key format: {}", other))),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFormat::Raw => f.write_str("raw"),
            KeyFormat::Pem => f.write_str("pem"),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Curve used when none is given on the command line
    #[serde(default)]
    pub default_curve: Curve,
    /// Format used by `generate` when none is given
    #[serde(default)]
    pub default_format: KeyFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_curve: Curve::Secp256r1,
            default_format: KeyFormat::Raw,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".eckey"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from `path` (or the default path) or return default
    ///
    /// A file that cannot be read or parsed is logged and ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .filter(|path| path.exists())
        else {
            return Self::default();
        };

        match Self::read(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring config file, using defaults");
                Self::default()
            }
        }
    }

    /// Read and parse the config file at `path`
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to `path` (or the default path)
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, CliError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| CliError::Config("Cannot determine config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
