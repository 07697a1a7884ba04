//! Config command - inspect and edit the configuration file.
//!
//! Keys are dotted paths into the JSON form of [`FacturaConfig`], e.g.
//! `batch.jobs` or `extraction.custom_fields.0.name`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use factura_core::models::config::FacturaConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Write here instead of the active config path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value (e.g., "extraction.schema")
    Get { key: String },

    /// Change one value; the result is validated before saving
    Set { key: String, value: String },

    /// Print the active config path
    Path,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} {} does not exist, showing defaults", style("ℹ").blue(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&read_or_default(&path)?)?);
        }
        ConfigCommand::Init { output, force } => {
            let target = output.unwrap_or(path);
            if target.exists() && !force {
                anyhow::bail!("{} already exists (use --force to replace it)", target.display());
            }
            save(&FacturaConfig::default(), &target)?;
            println!("{} Wrote default configuration to {}", style("✓").green(), target.display());
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(read_or_default(&path)?)?;
            let value = json.pointer(&json_pointer(&key)).ok_or_else(|| unknown_key(&key))?;
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ConfigCommand::Set { key, value } => {
            let mut json = serde_json::to_value(read_or_default(&path)?)?;
            let value = assign(&mut json, &key, &value)?;
            let config: FacturaConfig = serde_json::from_value(json)?;
            config.validate()?;
            save(&config, &path)?;
            println!("{} {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            let status = if path.exists() {
                style("exists").green()
            } else {
                style("missing, run 'factura config init'").yellow()
            };
            println!("{} ({})", path.display(), status);
        }
    }

    Ok(())
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("factura")
        .join("config.json")
}

fn read_or_default(path: &Path) -> anyhow::Result<FacturaConfig> {
    if path.exists() {
        Ok(FacturaConfig::from_file(path)?)
    } else {
        Ok(FacturaConfig::default())
    }
}

fn save(config: &FacturaConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn json_pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!("Configuration key not found: {}", key)
}

/// Overwrite an existing key. Values that parse as JSON keep their type,
/// anything else is stored as a string.
fn assign(json: &mut Value, key: &str, raw: &str) -> anyhow::Result<Value> {
    let slot = json.pointer_mut(&json_pointer(key)).ok_or_else(|| unknown_key(key))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    *slot = value.clone();
    Ok(value)
}
