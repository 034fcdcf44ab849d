use colored::Colorize;

use crate::cli::{open_session, render, AnalysisArgs, MappingArgs, SourceArgs};
use crate::error::{MedicaoError, Result};
use crate::settings::load_settings;

pub fn run(source: &SourceArgs, mapping: &MappingArgs, args: &AnalysisArgs) -> Result<()> {
    let settings = load_settings();
    let session = open_session(&settings, source, mapping, args)?;
    let analysis = session.analyze().ok_or(MedicaoError::NoData)?;
    match &analysis.groups {
        Some(groups) if !groups.is_empty() => {
            println!("Top Activities\n{}", render::groups_table(groups));
        }
        Some(_) => println!("No measured rows to group."),
        None => println!(
            "{}",
            "No discipline/activity column found. Pick one with --group-col.".yellow()
        ),
    }
    Ok(())
}
