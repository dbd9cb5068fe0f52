//! Config command implementation.
//!
//! View and modify status-metrics configuration settings.

use crate::cli::{Cli, ConfigAction, ConfigArgs, OutputFormat};
use crate::config::{default_config_path, Config, CONFIG_KEYS};
use crate::error::Result;

use super::load_config;

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Get { key } => get_config_value(cli, key),
        ConfigAction::Set { key, value } => set_config_value(cli, key, value),
        ConfigAction::Path => show_config_path(cli),
        ConfigAction::Init => init_config(cli),
        ConfigAction::Reset => reset_config(cli),
    }
}

/// Show the effective configuration (global file merged with project file).
fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match cli.effective_output() {
        OutputFormat::Json | OutputFormat::Compact => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        _ => {
            println!("Status Metrics Configuration");
            println!("============================\n");

            println!("[statuses]");
            println!("  names = {:?}", config.statuses.names);
            println!();

            println!("[accounting]");
            println!("  grace_period = \"{}\"", config.accounting.grace_period);
            println!("  lenient = {}", config.accounting.lenient);
            println!();

            println!("[display]");
            println!("  humanize = {}", config.display.humanize);
            println!("  show_titles = {}", config.display.show_titles);
        }
    }

    Ok(())
}

/// Get a specific configuration value.
fn get_config_value(cli: &Cli, key: &str) -> Result<()> {
    let config = load_config(cli)?;
    let value = config.get_value(key)?;

    match cli.effective_output() {
        OutputFormat::Json | OutputFormat::Compact => {
            println!("{}", serde_json::json!({ key: value }));
        }
        _ => println!("{value}"),
    }

    Ok(())
}

/// Set a configuration value in the target file.
fn set_config_value(cli: &Cli, key: &str, value: &str) -> Result<()> {
    let path = target_path(cli)?;
    let mut config = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };

    config.set_value(key, value)?;
    config.save_to(&path)?;
    if !cli.quiet {
        println!("Set {key} = {}", config.get_value(key)?);
    }

    Ok(())
}

/// Show configuration file path.
fn show_config_path(cli: &Cli) -> Result<()> {
    println!("{}", target_path(cli)?.display());
    Ok(())
}

/// Initialize configuration file with defaults.
fn init_config(cli: &Cli) -> Result<()> {
    let path = target_path(cli)?;

    if path.exists() {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use 'status-metrics config reset' to reset to defaults.");
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("Created configuration file at: {}", path.display());
    println!("Known keys: {}", CONFIG_KEYS.join(", "));

    Ok(())
}

/// Reset configuration to defaults.
fn reset_config(cli: &Cli) -> Result<()> {
    let path = target_path(cli)?;

    if !path.exists() {
        println!("No configuration file exists. Use 'status-metrics config init' to create one.");
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("Reset configuration to defaults at: {}", path.display());

    Ok(())
}

/// File written by `set`/`init`/`reset`: `--config` or the global file.
fn target_path(cli: &Cli) -> Result<std::path::PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    }
}
