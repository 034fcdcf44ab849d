use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::fmt::{money, number, percent};
use crate::kpi::{progress_band, Comparison, ProgressBand};
use crate::models::{AuditFinding, FindingKind, GroupTotal, KpiSnapshot, Row, SemanticRole};
use crate::schema::SchemaMapping;

const BAR_WIDTH: usize = 30;

pub fn mapping_table(mapping: &SchemaMapping) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Role", "Column"]);
    for role in SemanticRole::ALL {
        let column = match mapping.get(role) {
            Some(c) => Cell::new(c),
            None => Cell::new("(not found)".dimmed()),
        };
        table.add_row(vec![Cell::new(role.name()), column]);
    }
    table
}

pub fn kpi_table(k: &KpiSnapshot, currency: &str) -> Table {
    let delta = if k.last_period_delta >= 0.0 {
        percent(k.last_period_delta).green().to_string()
    } else {
        percent(k.last_period_delta).red().to_string()
    };
    let progress = format!("{:.1}%", k.progress_ratio * 100.0);
    let progress = match progress_band(k.progress_ratio) {
        ProgressBand::Low => progress.red().to_string(),
        ProgressBand::Mid => progress.yellow().to_string(),
        ProgressBand::High => progress.green().to_string(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total measured"), Cell::new(number(k.total_quantity))]);
    table.add_row(vec![Cell::new("Total value"), Cell::new(money(k.total_value, currency))]);
    table.add_row(vec![Cell::new("Mean per period"), Cell::new(number(k.mean_quantity))]);
    table.add_row(vec![Cell::new("Trend (last)"), Cell::new(delta)]);
    table.add_row(vec![Cell::new("Target"), Cell::new(number(k.target))]);
    table.add_row(vec![Cell::new("Progress"), Cell::new(progress)]);
    table
}

pub fn comparison_line(c: &Comparison) -> String {
    if c.is_increase() {
        format!(
            "Increase of {} units ({}) vs previous measurement",
            number(c.diff),
            percent(c.percent)
        )
        .green()
        .to_string()
    } else {
        format!(
            "Decrease of {} units ({}) vs previous measurement",
            number(c.diff.abs()),
            percent(c.percent)
        )
        .yellow()
        .to_string()
    }
}

pub fn finding_label(kind: FindingKind) -> &'static str {
    match kind {
        FindingKind::StatisticalOutlier => "Statistical outlier",
        FindingKind::NegativeValue => "Negative quantity",
    }
}

pub fn findings_table(findings: &[AuditFinding]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Check", "Rows", "Detail"]);
    for f in findings {
        let detail = match f.threshold {
            Some(t) => format!("above {}", number(t)),
            None => "below zero".to_string(),
        };
        table.add_row(vec![
            Cell::new(finding_label(f.kind).red().bold()),
            Cell::new(f.affected_rows),
            Cell::new(detail),
        ]);
    }
    table
}

pub fn groups_table(groups: &[GroupTotal]) -> Table {
    let max = groups.iter().map(|g| g.total).fold(0.0_f64, f64::max);
    let mut table = Table::new();
    table.set_header(vec!["#", "Group", "Quantity", "Rows", ""]);
    for (i, g) in groups.iter().enumerate() {
        let width = if max > 0.0 {
            ((g.total.max(0.0) / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&g.group),
            Cell::new(number(g.total)),
            Cell::new(g.count),
            Cell::new("\u{2588}".repeat(width).cyan()),
        ]);
    }
    table
}

pub fn series_table(series: &[(String, f64)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Quantity"]);
    for (date, qty) in series {
        table.add_row(vec![Cell::new(date), Cell::new(number(*qty))]);
    }
    table
}

pub fn rows_table(columns: &[String], rows: &[&Row]) -> Table {
    let mut table = Table::new();
    table.set_header(columns.to_vec());
    for row in rows {
        table.add_row((0..columns.len()).map(|i| Cell::new(row.get(i))).collect::<Vec<_>>());
    }
    table
}
