//! Config command implementation.
//!
//! Shows the effective configuration and writes a default file.

use crate::cli::{Cli, ConfigAction, ConfigArgs};
use crate::config::{default_config_path, Config};
use crate::error::{AdvocateError, Result};

use super::{load_config, print_json, store_dir};

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_config_path(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

/// Show the effective configuration.
fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    if cli.json {
        return print_json(&config);
    }

    let toml = toml::to_string_pretty(&config).map_err(|e| AdvocateError::InvalidConfig {
        message: format!("Failed to serialize config: {e}"),
    })?;
    println!("{toml}");
    if !cli.quiet {
        println!("# artifacts are stored in {}", store_dir(cli, &config)?.display());
    }
    Ok(())
}

/// Show configuration file path.
fn show_config_path(cli: &Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}

/// Initialize configuration file with defaults.
fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use 'advocates config init --force' to reset it to defaults.");
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("Created configuration file at: {}", path.display());

    Ok(())
}
