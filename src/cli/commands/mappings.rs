//! Mappings command implementation.

use crate::cli::{Cli, MappingsArgs};
use crate::error::Result;

use super::{open_jobs, print_json};

/// Run the mappings command.
pub fn run(cli: &Cli, args: &MappingsArgs) -> Result<()> {
    let jobs = open_jobs(cli)?;
    let mappings = jobs.mappings(args.from.into())?;

    if cli.json {
        return print_json(&mappings);
    }

    for mapping in &mappings {
        println!(
            "{}\t{}\t{}\t{}",
            mapping.github_user_name, mapping.alias, mapping.team, mapping.name
        );
    }
    Ok(())
}
