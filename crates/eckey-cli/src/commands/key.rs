//! Commands over existing keys: inspect, export, import

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use eckey::KeyHandle;
use serde_json::Value;

use super::read_input;
use crate::{CliError, Output};

/// Key subcommands
#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Show type, curve, privacy and SKI of a raw JSON key
    Inspect {
        /// Raw key file, `-` for stdin
        path: PathBuf,
    },

    /// Print the PEM encoding of a raw JSON key
    Export {
        /// Raw key file, `-` for stdin
        path: PathBuf,

        /// Export the public half only
        #[arg(long)]
        public: bool,
    },

    /// Convert a PEM key into a raw JSON key
    Import {
        /// PEM file, `-` for stdin
        path: PathBuf,
    },
}

impl KeyCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        match self {
            KeyCommand::Inspect { path } => inspect(&path, json),
            KeyCommand::Export { path, public } => export(&path, public, json),
            KeyCommand::Import { path } => import(&path, json),
        }
    }
}

/// Load a key handle from a raw JSON key file
pub(crate) fn load_raw(path: &Path) -> Result<KeyHandle, CliError> {
    let content = read_input(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let handle = KeyHandle::from_json(&value)?;
    tracing::debug!(path = %path.display(), curve = handle.curve_name(), "loaded raw key");
    Ok(handle)
}

fn inspect(path: &Path, json: bool) -> Result<(), CliError> {
    let handle = load_raw(path)?;
    let ski = handle.ski().map(hex::encode);

    let mut out = Output::new(json)
        .field("type", eckey::EC_KEY_TYPE)
        .field("curve", handle.curve_name())
        .field_bool("private", handle.is_private())
        .field("public_key", handle.public_point_hex());
    out = match &ski {
        Ok(ski) => out.field("ski", ski),
        Err(e) => out.field("ski_error", &e.to_string()),
    };
    out.message(&format!(
        "Type:       {}\nCurve:      {}\nPrivate:    {}\nPublic key: {}\nSKI:        {}",
        eckey::EC_KEY_TYPE,
        handle.curve_name(),
        handle.is_private(),
        handle.public_point_hex(),
        ski.unwrap_or_else(|e| format!("<{}>", e)),
    ))
    .print();
    Ok(())
}

fn export(path: &Path, public: bool, json: bool) -> Result<(), CliError> {
    let handle = load_raw(path)?;
    let key = if public {
        handle.get_public_key()
    } else {
        Cow::Borrowed(&handle)
    };
    let pem = key.to_pem()?;

    Output::new(json)
        .field("curve", key.curve_name())
        .field_bool("private", key.is_private())
        .field("pem", &pem)
        .message(pem.trim_end())
        .print();
    Ok(())
}

fn import(path: &Path, json: bool) -> Result<(), CliError> {
    let pem = read_input(path)?;
    let handle = KeyHandle::from_pem(&pem)?;
    let raw = handle.raw().to_json();

    Output::new(json)
        .field("curve", handle.curve_name())
        .field_bool("private", handle.is_private())
        .field_value("key", raw.clone())
        .message(&serde_json::to_string_pretty(&raw)?)
        .print();
    Ok(())
}
