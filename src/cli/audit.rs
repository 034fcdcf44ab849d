use colored::Colorize;

use crate::cli::{open_session, render, AnalysisArgs, MappingArgs, SourceArgs};
use crate::error::{MedicaoError, Result};
use crate::settings::load_settings;

pub fn run(source: &SourceArgs, mapping: &MappingArgs, args: &AnalysisArgs) -> Result<()> {
    let settings = load_settings();
    let session = open_session(&settings, source, mapping, args)?;
    if !session.audit.enabled {
        println!("{}", "Audit disabled.".yellow());
        return Ok(());
    }
    let analysis = session.analyze().ok_or(MedicaoError::NoData)?;
    if analysis.kpis.is_none() {
        println!("{}", "No quantity column found; nothing to audit.".yellow());
        return Ok(());
    }
    if analysis.findings.is_empty() {
        println!("{}", "No anomalies found.".green());
        return Ok(());
    }

    println!("{}", render::findings_table(&analysis.findings));
    let active = analysis.active_rows();
    for finding in &analysis.findings {
        let flagged: Vec<_> = finding.positions.iter().map(|&p| active[p]).collect();
        println!(
            "\n{} ({})\n{}",
            render::finding_label(finding.kind),
            finding.affected_rows,
            render::rows_table(&analysis.reconciled.columns, &flagged)
        );
    }
    Ok(())
}
