//! Validate command implementation.
//!
//! Decodes the event log and prints a summary. Nothing is written.

use crate::api::ValidationReport;
use crate::cli::{Cli, ValidateArgs};
use crate::codec;
use crate::error::{AdvocateError, Result};

use super::{open_jobs, print_json};

/// Run the validate command.
pub fn run(cli: &Cli, args: &ValidateArgs) -> Result<()> {
    let report = match &args.file {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AdvocateError::io(format!("Failed to read {}", path.display()), e)
            })?;
            ValidationReport::from_events(&codec::decode(&text)?, None)
        }
        None => open_jobs(cli)?.validate_log()?,
    };

    if cli.json {
        return print_json(&report);
    }

    if !cli.quiet {
        println!(
            "{} events: {} added, {} modified, {} removed",
            report.events, report.added, report.modified, report.removed
        );
        if let (Some(first), Some(last)) = (report.first_event, report.last_event) {
            println!("From {first} to {last}");
        }
        if report.without_uid > 0 {
            println!("{} events carry no UID", report.without_uid);
        }
        if let Some(cursor) = &report.cursor {
            println!("Cursor: {cursor}");
        }
    }
    Ok(())
}
