use std::collections::HashMap;

use crate::models::{GroupTotal, KpiSnapshot, Row};

pub const DEFAULT_TOP_GROUPS: usize = 12;
pub const DEFAULT_TARGET_FACTOR: f64 = 1.2;

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Straight sum: cells that do not coerce contribute zero.
pub fn sum_column(rows: &[&Row], idx: usize) -> f64 {
    rows.iter().map(|r| r.get(idx).as_number().unwrap_or(0.0)).sum()
}

/// Mean over the cells that coerce; the rest are left out, not zeroed.
pub fn mean_column(rows: &[&Row], idx: usize) -> f64 {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.get(idx).as_number()).collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percent change from the second-to-last row to the last one.
/// Zero when there are fewer than two rows or the earlier value is zero.
pub fn last_period_delta(rows: &[&Row], idx: usize) -> f64 {
    let [.., prev, last] = rows else {
        return 0.0;
    };
    let prev = prev.get(idx).as_number().unwrap_or(0.0);
    let last = last.get(idx).as_number().unwrap_or(0.0);
    percent_change(prev, last)
}

fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

pub fn progress_ratio(total: f64, target: f64) -> f64 {
    if target > 0.0 {
        (total / target).min(1.0)
    } else {
        0.0
    }
}

/// Target used when the user has not set one.
pub fn default_target(total: f64, factor: f64) -> f64 {
    total * factor
}

pub fn compute_kpis(
    rows: &[&Row],
    quantity_idx: usize,
    value_idx: Option<usize>,
    target: f64,
) -> KpiSnapshot {
    let total_quantity = sum_column(rows, quantity_idx);
    KpiSnapshot {
        total_quantity,
        total_value: value_idx.map(|i| sum_column(rows, i)).unwrap_or(0.0),
        mean_quantity: mean_column(rows, quantity_idx),
        last_period_delta: last_period_delta(rows, quantity_idx),
        progress_ratio: progress_ratio(total_quantity, target),
        target,
    }
}

// ---------------------------------------------------------------------------
// Grouped ranking
// ---------------------------------------------------------------------------

/// Sums quantity per group value and keeps the `top_n` largest, descending.
/// Equal totals keep the order in which the groups first appear. Rows with
/// no group label (blank cells, quick entries) belong to no group.
pub fn rank_groups(rows: &[&Row], group_idx: usize, quantity_idx: usize, top_n: usize) -> Vec<GroupTotal> {
    let mut groups: Vec<GroupTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = row.get(group_idx).to_string().trim().to_string();
        if key.is_empty() {
            continue;
        }
        let qty = row.get(quantity_idx).as_number().unwrap_or(0.0);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupTotal {
                group: key,
                total: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        groups[slot].total += qty;
        groups[slot].count += 1;
    }
    // sort_by is stable, so ties stay in first-seen order
    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups.truncate(top_n);
    groups
}

// ---------------------------------------------------------------------------
// Trend helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub current: f64,
    pub previous: f64,
    pub diff: f64,
    pub percent: f64,
}

impl Comparison {
    pub fn is_increase(&self) -> bool {
        self.diff >= 0.0
    }
}

pub fn compare(current: f64, previous: f64) -> Comparison {
    Comparison {
        current,
        previous,
        diff: current - previous,
        percent: percent_change(previous, current),
    }
}

/// Compares the last two quantities of the subset; missing ones read as 0.
pub fn compare_last(rows: &[&Row], quantity_idx: usize) -> Comparison {
    let value_at = |back: usize| {
        rows.len()
            .checked_sub(back)
            .and_then(|i| rows[i].get(quantity_idx).as_number())
            .unwrap_or(0.0)
    };
    compare(value_at(1), value_at(2))
}

/// (date label, quantity) per row, in row order.
pub fn evolution_series(rows: &[&Row], date_idx: usize, quantity_idx: usize) -> Vec<(String, f64)> {
    rows.iter()
        .map(|r| {
            let date = r.get(date_idx);
            let label = match date.as_date() {
                Some(d) => d.format("%Y-%m-%d").to_string(),
                None => date.to_string(),
            };
            (label, r.get(quantity_idx).as_number().unwrap_or(0.0))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Mid,
    High,
}

pub fn progress_band(ratio: f64) -> ProgressBand {
    if ratio < 0.5 {
        ProgressBand::Low
    } else if ratio < 0.9 {
        ProgressBand::Mid
    } else {
        ProgressBand::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn qty_rows(values: &[f64]) -> Vec<Row> {
        values.iter().map(|v| Row::source(vec![Cell::Number(*v)])).collect()
    }

    fn refs(rows: &[Row]) -> Vec<&Row> {
        rows.iter().collect()
    }

    #[test]
    fn test_last_period_delta() {
        let rows = qty_rows(&[50.0, 80.0, 100.0]);
        assert_eq!(last_period_delta(&refs(&rows), 0), 25.0);
        let one = qty_rows(&[100.0]);
        assert_eq!(last_period_delta(&refs(&one), 0), 0.0);
        assert_eq!(last_period_delta(&[], 0), 0.0);
        let zero_prev = qty_rows(&[0.0, 100.0]);
        assert_eq!(last_period_delta(&refs(&zero_prev), 0), 0.0);
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(progress_ratio(120.0, 100.0), 1.0);
        assert_eq!(progress_ratio(50.0, 100.0), 0.5);
        assert_eq!(progress_ratio(50.0, 0.0), 0.0);
        assert_eq!(progress_ratio(50.0, -10.0), 0.0);
    }

    #[test]
    fn test_sum_zeroes_text_but_mean_skips_it() {
        let rows = vec![
            Row::source(vec![Cell::Number(10.0)]),
            Row::source(vec![Cell::Text("x".into())]),
            Row::source(vec![Cell::Number(20.0)]),
        ];
        let r = refs(&rows);
        assert_eq!(sum_column(&r, 0), 30.0);
        assert_eq!(mean_column(&r, 0), 15.0);
    }

    #[test]
    fn test_empty_subset_kpis_are_zero() {
        let k = compute_kpis(&[], 0, Some(1), 100.0);
        assert_eq!(k.total_quantity, 0.0);
        assert_eq!(k.total_value, 0.0);
        assert_eq!(k.mean_quantity, 0.0);
        assert_eq!(k.last_period_delta, 0.0);
        assert_eq!(k.progress_ratio, 0.0);
    }

    #[test]
    fn test_unmapped_value_column_totals_zero() {
        let rows = qty_rows(&[1.0, 2.0]);
        let k = compute_kpis(&refs(&rows), 0, None, 0.0);
        assert_eq!(k.total_quantity, 3.0);
        assert_eq!(k.total_value, 0.0);
    }

    #[test]
    fn test_rank_groups_sorted_and_truncated() {
        let mut rows = Vec::new();
        for i in 0..15 {
            rows.push(Row::source(vec![Cell::Text(format!("G{i:02}")), Cell::Number(i as f64 + 1.0)]));
        }
        rows.push(Row::source(vec![Cell::Text("G00".into()), Cell::Number(100.0)]));
        let ranked = rank_groups(&refs(&rows), 0, 1, 12);
        assert_eq!(ranked.len(), 12);
        assert_eq!(ranked[0].group, "G00");
        assert_eq!(ranked[0].total, 101.0);
        assert_eq!(ranked[0].count, 2);
        assert!(ranked.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(ranked[1].group, "G14");
    }

    #[test]
    fn test_rank_groups_ties_keep_first_seen_order() {
        let rows = vec![
            Row::source(vec![Cell::Text("B".into()), Cell::Number(10.0)]),
            Row::source(vec![Cell::Text("A".into()), Cell::Number(10.0)]),
            Row::source(vec![Cell::Text("C".into()), Cell::Number(50.0)]),
        ];
        let ranked = rank_groups(&refs(&rows), 0, 1, 12);
        let names: Vec<&str> = ranked.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_rank_groups_skips_rows_without_group() {
        let rows = vec![
            Row::source(vec![Cell::Text("Pintura".into()), Cell::Number(5.0)]),
            Row::source(vec![Cell::Empty, Cell::Number(50.0)]),
            Row::source(vec![Cell::Text("   ".into()), Cell::Number(40.0)]),
        ];
        let ranked = rank_groups(&refs(&rows), 0, 1, 12);
        assert_eq!(
            ranked,
            vec![GroupTotal {
                group: "Pintura".into(),
                total: 5.0,
                count: 1,
            }]
        );
    }

    #[test]
    fn test_compare() {
        let c = compare(120.0, 100.0);
        assert_eq!(c.diff, 20.0);
        assert_eq!(c.percent, 20.0);
        assert!(c.is_increase());
        let c = compare(80.0, 100.0);
        assert!(!c.is_increase());
        assert_eq!(compare(5.0, 0.0).percent, 0.0);
    }

    #[test]
    fn test_compare_last() {
        let rows = qty_rows(&[10.0, 20.0]);
        let c = compare_last(&refs(&rows), 0);
        assert_eq!((c.current, c.previous), (20.0, 10.0));
        let one = qty_rows(&[7.0]);
        let c = compare_last(&refs(&one), 0);
        assert_eq!((c.current, c.previous), (7.0, 0.0));
    }

    #[test]
    fn test_evolution_series_formats_dates() {
        let rows = vec![
            Row::source(vec![Cell::Text("05/01/2024".into()), Cell::Number(3.0)]),
            Row::source(vec![Cell::Text("Semana 2".into()), Cell::Number(4.0)]),
        ];
        let series = evolution_series(&refs(&rows), 0, 1);
        assert_eq!(series, vec![("2024-01-05".to_string(), 3.0), ("Semana 2".to_string(), 4.0)]);
    }

    #[test]
    fn test_progress_band() {
        assert_eq!(progress_band(0.2), ProgressBand::Low);
        assert_eq!(progress_band(0.5), ProgressBand::Mid);
        assert_eq!(progress_band(0.95), ProgressBand::High);
    }
}
