use colored::Colorize;

use crate::cli::{open_session, render, AnalysisArgs, MappingArgs, SourceArgs};
use crate::context::excerpt;
use crate::error::{MedicaoError, Result};
use crate::session::Analysis;
use crate::settings::load_settings;

/// Prints the executive panel for an analysis; shared with the session loop.
pub fn print_panel(analysis: &Analysis, currency: &str) {
    let Some(kpis) = &analysis.kpis else {
        println!(
            "{}",
            "No quantity column found. Pick one with --quantity-col.".yellow()
        );
        return;
    };
    println!("Executive Panel\n{}", render::kpi_table(kpis, currency));
    if let Some(c) = &analysis.comparison {
        println!("{}", render::comparison_line(c));
    }
    if !analysis.findings.is_empty() {
        println!("\nAudit\n{}", render::findings_table(&analysis.findings));
    }
}

pub fn run(
    source: &SourceArgs,
    mapping: &MappingArgs,
    args: &AnalysisArgs,
    series: bool,
    rows: Option<usize>,
) -> Result<()> {
    let settings = load_settings();
    let session = open_session(&settings, source, mapping, args)?;
    let analysis = session.analyze().ok_or(MedicaoError::NoData)?;

    println!(
        "{} of {} rows are measurements",
        analysis.active.len(),
        analysis.reconciled.len()
    );
    print_panel(&analysis, &settings.currency_symbol);

    if series {
        match &analysis.series {
            Some(s) => println!("\nMeasurement Curve\n{}", render::series_table(s)),
            None => println!("{}", "No date column found; curve unavailable.".yellow()),
        }
    }
    if let Some(n) = rows {
        let active = analysis.active_rows();
        let tail = excerpt(&active, n);
        println!(
            "\nLast {} rows\n{}",
            tail.len(),
            render::rows_table(&analysis.reconciled.columns, tail)
        );
    }
    Ok(())
}
