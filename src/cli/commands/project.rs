//! Project command implementation.

use crate::cli::{Cli, ProjectArgs, ProjectTarget};
use crate::error::Result;

use super::{open_jobs, print_projection_reports};

/// Run the project command.
pub fn run(cli: &Cli, args: &ProjectArgs) -> Result<()> {
    let jobs = open_jobs(cli)?;

    let reports = match args.target {
        ProjectTarget::Current => vec![jobs.generate_current_state()?],
        ProjectTarget::Dashboard => vec![jobs.generate_dashboard()?],
        ProjectTarget::All => jobs.generate_projections()?,
    };

    print_projection_reports(cli, &reports)
}
