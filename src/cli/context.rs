use crate::cli::{open_session, AnalysisArgs, MappingArgs, SourceArgs};
use crate::error::{MedicaoError, Result};
use crate::settings::load_settings;

pub fn run(
    source: &SourceArgs,
    mapping: &MappingArgs,
    args: &AnalysisArgs,
    question: &str,
    excerpt_rows: Option<usize>,
) -> Result<()> {
    let settings = load_settings();
    let mut session = open_session(&settings, source, mapping, args)?;
    if let Some(n) = excerpt_rows {
        session.excerpt_rows = n;
    }
    let context = session.context(question).ok_or(MedicaoError::NoData)?;
    println!("{context}");
    Ok(())
}
