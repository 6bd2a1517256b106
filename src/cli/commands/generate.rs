//! Generate command implementation.
//!
//! Walks the full history of a local clone and replaces the stored log.

use crate::cli::{Cli, GenerateArgs};
use crate::error::Result;
use crate::git::LocalRepository;

use super::{open_jobs, print_json, print_projection_reports};

/// Run the generate command.
pub fn run(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let jobs = open_jobs(cli)?;
    let settings = &jobs.config().repository;

    let path = args.repo.clone().unwrap_or_else(|| settings.path.clone());
    let revision = args
        .revision
        .clone()
        .unwrap_or_else(|| settings.revision.clone());
    let repo = LocalRepository::open(&path)?.with_revision(revision);

    let report = jobs.generate_all_events(&repo)?;
    let projections = if args.project {
        jobs.generate_projections()?
    } else {
        Vec::new()
    };

    if cli.json {
        return print_json(&serde_json::json!({
            "generate": report,
            "projections": projections,
        }));
    }

    if !cli.quiet {
        println!(
            "Generated {} events ({} added, {} modified, {} removed) from {} transitions",
            report.events,
            report.stats.added,
            report.stats.modified,
            report.stats.removed,
            report.stats.transitions_seen
        );
        match &report.cursor {
            Some(cursor) => println!("Cursor: {cursor}"),
            None => println!("History is empty; no cursor stored"),
        }
        if report.stats.changes_unknown > 0 {
            println!(
                "Skipped {} changes with an unsupported status",
                report.stats.changes_unknown
            );
        }
    }
    print_projection_reports(cli, &projections)
}
