//! Facts handed to an external question-answering model. This module picks
//! what goes in (filter, totals, a bounded tail of rows, the question); the
//! model call and the reply belong to the caller.

use std::fmt::Write;

use crate::models::{KpiSnapshot, Row};

pub const DEFAULT_EXCERPT_ROWS: usize = 15;

pub struct ContextRequest<'a> {
    /// Active grouping filter as (column, value), if any.
    pub filter: Option<(&'a str, &'a str)>,
    pub kpis: Option<&'a KpiSnapshot>,
    pub columns: &'a [String],
    pub rows: &'a [&'a Row],
    /// How many trailing rows to include.
    pub excerpt_rows: usize,
    pub question: &'a str,
}

/// The last `n` rows, oldest first.
pub fn excerpt<'r, 'a>(rows: &'r [&'a Row], n: usize) -> &'r [&'a Row] {
    &rows[rows.len().saturating_sub(n)..]
}

pub fn build_context(req: &ContextRequest<'_>) -> String {
    let mut out = String::new();

    match req.filter {
        Some((column, value)) => {
            let _ = writeln!(out, "Filter: {column} = {value}");
        }
        None => out.push_str("Filter: none (all rows)\n"),
    }

    match req.kpis {
        Some(k) => {
            let _ = writeln!(out, "Total quantity: {:.2}", k.total_quantity);
            let _ = writeln!(out, "Total value: {:.2}", k.total_value);
            let _ = writeln!(out, "Mean quantity: {:.2}", k.mean_quantity);
            let _ = writeln!(out, "Last period change: {:.1}%", k.last_period_delta);
            let _ = writeln!(
                out,
                "Progress: {:.1}% of target {:.2}",
                k.progress_ratio * 100.0,
                k.target
            );
        }
        None => out.push_str("Totals: unavailable (no quantity column)\n"),
    }

    let tail = excerpt(req.rows, req.excerpt_rows);
    let _ = writeln!(out, "\nLast {} of {} rows:", tail.len(), req.rows.len());
    let _ = writeln!(out, "{}", req.columns.join(" | "));
    for row in tail {
        let cells: Vec<String> = (0..req.columns.len()).map(|i| row.get(i).to_string()).collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }

    let _ = write!(out, "\nQuestion: {}", req.question.trim());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn rows(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|i| Row::source(vec![Cell::Text(format!("d{i}")), Cell::Number(i as f64)]))
            .collect()
    }

    #[test]
    fn test_excerpt_takes_tail() {
        let owned = rows(30);
        let refs: Vec<&Row> = owned.iter().collect();
        let tail = excerpt(&refs, 15);
        assert_eq!(tail.len(), 15);
        assert_eq!(tail[0].get(1), &Cell::Number(16.0));
        assert_eq!(excerpt(&refs[..3], 15).len(), 3);
    }

    #[test]
    fn test_context_contains_facts_and_question() {
        let owned = rows(20);
        let refs: Vec<&Row> = owned.iter().collect();
        let columns = vec!["Data".to_string(), "Qtd".to_string()];
        let kpis = KpiSnapshot {
            total_quantity: 210.0,
            target: 300.0,
            progress_ratio: 0.7,
            ..KpiSnapshot::default()
        };
        let text = build_context(&ContextRequest {
            filter: Some(("Disciplina", "Pintura")),
            kpis: Some(&kpis),
            columns: &columns,
            rows: &refs,
            excerpt_rows: 10,
            question: " Qual a tendência? ",
        });
        assert!(text.starts_with("Filter: Disciplina = Pintura\n"));
        assert!(text.contains("Total quantity: 210.00"));
        assert!(text.contains("Progress: 70.0% of target 300.00"));
        assert!(text.contains("Last 10 of 20 rows:"));
        assert!(text.contains("Data | Qtd"));
        assert!(text.contains("d20 | 20"));
        assert!(!text.contains("d10 | 10\n"));
        assert!(text.ends_with("Question: Qual a tendência?"));
    }

    #[test]
    fn test_context_without_kpis() {
        let text = build_context(&ContextRequest {
            filter: None,
            kpis: None,
            columns: &[],
            rows: &[],
            excerpt_rows: 15,
            question: "?",
        });
        assert!(text.contains("Filter: none"));
        assert!(text.contains("Totals: unavailable"));
        assert!(text.contains("Last 0 of 0 rows:"));
    }
}
