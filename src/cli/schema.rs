use crate::cli::{open_session, render, AnalysisArgs, MappingArgs, SourceArgs};
use crate::error::{MedicaoError, Result};
use crate::settings::load_settings;

pub fn run(source: &SourceArgs, mapping: &MappingArgs) -> Result<()> {
    let settings = load_settings();
    let session = open_session(&settings, source, mapping, &AnalysisArgs::default())?;
    let table = session.table().ok_or(MedicaoError::NoData)?;
    let schema = session.mapping().ok_or(MedicaoError::NoData)?;

    println!(
        "Sheet '{}': {} columns, {} rows",
        table.name,
        table.columns.len(),
        table.len()
    );
    println!("{}", render::mapping_table(&schema));
    Ok(())
}
