//! Key generation command

use clap::Args;
use eckey::{Curve, KeyHandle};
use serde_json::Value;

use crate::config::KeyFormat;
use crate::{CliError, Config, Output};

/// Arguments of `eckey generate`
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Emit only the public half of the generated key
    #[arg(long)]
    pub public_only: bool,

    /// Output format: raw (JSON record) or pem
    #[arg(short, long)]
    pub format: Option<KeyFormat>,
}

impl GenerateArgs {
    pub fn execute(self, config: &Config, curve: Curve, json: bool) -> Result<(), CliError> {
        let format = self.format.unwrap_or(config.default_format);
        let rendered = generate(curve, self.public_only, format)?;

        let mut out = Output::new(json)
            .field("curve", curve.name())
            .field_bool("private", !self.public_only)
            .field("format", &format.to_string());
        out = match &rendered {
            Rendered::Raw(value) => out.field_value("key", value.clone()),
            Rendered::Pem(pem) => out.field("key", pem),
        };
        out.message(&rendered.to_text()?).print();
        Ok(())
    }
}

/// A generated key ready for printing
#[derive(Debug)]
pub(crate) enum Rendered {
    Raw(Value),
    Pem(String),
}

impl Rendered {
    pub(crate) fn to_text(&self) -> Result<String, CliError> {
        match self {
            Rendered::Raw(value) => Ok(serde_json::to_string_pretty(value)?),
            Rendered::Pem(pem) => Ok(pem.trim_end().to_string()),
        }
    }
}

pub(crate) fn generate(curve: Curve, public_only: bool, format: KeyFormat) -> Result<Rendered, CliError> {
    let mut handle = KeyHandle::generate(curve)?;
    if public_only {
        handle = handle.into_public_key();
    }
    tracing::info!(%curve, public_only, %format, "generated key");

    Ok(match format {
        KeyFormat::Raw => Rendered::Raw(handle.raw().to_json()),
        KeyFormat::Pem => Rendered::Pem(handle.to_pem()?),
    })
}
