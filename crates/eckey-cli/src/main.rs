//! # eckey-cli
//!
//! Command-line interface for EC key handles.
//!
//! ## Usage
//!
//! ```bash
//! # Generate keys
//! eckey generate
//! eckey --curve secp256k1 generate --format pem
//! eckey generate --public-only
//!
//! # Work with raw JSON keys
//! eckey key inspect key.json
//! eckey key export key.json --public
//! eckey key import public.pem
//!
//! # Configuration
//! eckey config --show
//! eckey config --set-curve secp256k1
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eckey::Curve;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

use config::KeyFormat;

/// EC key CLI
#[derive(Parser, Debug)]
#[command(name = "eckey")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Curve for `generate`, instead of the configured default
    ///
    /// Key commands take the curve from the key itself and reject this flag.
    #[arg(long, global = true)]
    curve: Option<Curve>,

    /// Config file path
    #[arg(long = "config", global = true)]
    config_path: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a new key
    Generate(commands::keygen::GenerateArgs),
    /// Inspect, export or import keys
    #[command(subcommand)]
    Key(commands::key::KeyCommand),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the default curve
        #[arg(long)]
        set_curve: Option<Curve>,
        /// Set the default output format of `generate`
        #[arg(long)]
        set_format: Option<KeyFormat>,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = Config::load(cli.config_path.as_deref());

    let result = match cli.command {
        Commands::Generate(args) => {
            let curve = cli.curve.unwrap_or(config.default_curve);
            args.execute(&config, curve, cli.json)
        }
        Commands::Key(cmd) => {
            reject_curve(cli.curve, "key").and_then(|()| cmd.execute(cli.json))
        }
        Commands::Config {
            show,
            set_curve,
            set_format,
        } => reject_curve(cli.curve, "config").and_then(|()| {
            handle_config(&mut config, cli.config_path, show, set_curve, set_format, cli.json)
        }),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "kind": e.kind(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// `--curve` only selects the curve of `generate`
fn reject_curve(curve: Option<Curve>, command: &str) -> Result<(), CliError> {
    match curve {
        Some(curve) => Err(CliError::InvalidInput(format!(
            "--curve {} does not apply to `{}`; only `generate` takes a curve",
            curve, command
        ))),
        None => Ok(()),
    }
}

fn handle_config(
    config: &mut Config,
    path: Option<PathBuf>,
    show: bool,
    set_curve: Option<Curve>,
    set_format: Option<KeyFormat>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(curve) = set_curve {
        config.default_curve = curve;
        modified = true;
    }

    if let Some(format) = set_format {
        config.default_format = format;
        modified = true;
    }

    if modified {
        let saved = config.save(path.as_deref())?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &saved.display().to_string())
            .message("Configuration saved")
            .print();
    } else if show {
        Output::new(json)
            .field("default_curve", config.default_curve.name())
            .field("default_format", &config.default_format.to_string())
            .message(&format!(
                "Default curve:  {}\nDefault format: {}",
                config.default_curve, config.default_format
            ))
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-curve/--set-format to modify")
            .print();
    }

    Ok(())
}
