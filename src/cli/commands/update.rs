//! Update command implementation.
//!
//! Appends the events after the stored cursor, from a local clone or the
//! hosting API.

use crate::cli::{Cli, SourceKind, UpdateArgs};
use crate::error::Result;
use crate::git::LocalRepository;
use crate::remote::GitHubRepository;

use super::{open_jobs, print_json, print_projection_reports};

/// Run the update command.
pub fn run(cli: &Cli, args: &UpdateArgs) -> Result<()> {
    let jobs = open_jobs(cli)?;

    let report = match args.source {
        SourceKind::Local => {
            let settings = &jobs.config().repository;
            let path = args.repo.clone().unwrap_or_else(|| settings.path.clone());
            let revision = args
                .revision
                .clone()
                .unwrap_or_else(|| settings.revision.clone());
            let repo = LocalRepository::open(&path)?.with_revision(revision);
            jobs.update_events(&repo)?
        }
        SourceKind::Remote => {
            let mut settings = jobs.config().remote.clone();
            if let Some(owner) = &args.owner {
                settings.owner.clone_from(owner);
            }
            if let Some(name) = &args.name {
                settings.name.clone_from(name);
            }
            if let Some(branch) = &args.branch {
                settings.branch.clone_from(branch);
            }
            if let Some(api_base) = &args.api_base {
                settings.api_base.clone_from(api_base);
            }
            let repo = GitHubRepository::new(settings, args.github_token.clone())?;
            jobs.update_events(&repo)?
        }
    };

    let projections = if args.project {
        jobs.generate_projections()?
    } else {
        Vec::new()
    };

    if cli.json {
        return print_json(&serde_json::json!({
            "update": report,
            "projections": projections,
        }));
    }

    if !cli.quiet {
        if report.new_events == 0 {
            println!("No new events since {}", report.previous_cursor);
        } else {
            println!(
                "Appended {} events ({} total)",
                report.new_events, report.total_events
            );
        }
        println!("Cursor: {} -> {}", report.previous_cursor, report.cursor);
    }
    print_projection_reports(cli, &projections)
}
