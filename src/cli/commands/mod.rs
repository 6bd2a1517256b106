//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic.

pub mod config;
pub mod generate;
pub mod mappings;
pub mod project;
pub mod update;
pub mod validate;

use std::path::PathBuf;

use serde::Serialize;

use crate::api::{EventSource, ProjectionReport};
use crate::cli::Cli;
use crate::config::{default_store_dir, Config};
use crate::error::{AdvocateError, Result};
use crate::store::FsStore;

/// Load the configuration: `--config` when given, otherwise the global
/// file with the working directory's project file merged on top.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| AdvocateError::io("Failed to read current directory", e))?;
            Config::load_for_project(&cwd)?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Artifact directory: `--store-dir`, then `[artifacts] directory`, then
/// the platform data directory.
pub fn store_dir(cli: &Cli, config: &Config) -> Result<PathBuf> {
    match cli
        .store_dir
        .clone()
        .or_else(|| config.artifacts.directory.clone())
    {
        Some(dir) => Ok(dir),
        None => default_store_dir(),
    }
}

/// Job runner over the configured artifact directory.
pub fn open_jobs(cli: &Cli) -> Result<EventSource<FsStore>> {
    let config = load_config(cli)?;
    let dir = store_dir(cli, &config)?;
    tracing::debug!(store = %dir.display(), "Using artifact directory");
    Ok(EventSource::new(FsStore::new(dir), config))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Print projection reports in the requested output style.
pub fn print_projection_reports(cli: &Cli, reports: &[ProjectionReport]) -> Result<()> {
    if cli.json {
        return print_json(reports);
    }
    if cli.quiet {
        return Ok(());
    }
    for report in reports {
        println!(
            "{}: {} advocates ({} written to {})",
            report.view, report.items, report.written, report.artifact
        );
        for diagnostic in &report.diagnostics {
            println!("  warning: {diagnostic}");
        }
    }
    Ok(())
}
