use crate::models::{AuditFinding, FindingKind, Row};

pub const DEFAULT_OUTLIER_K: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditOptions {
    pub enabled: bool,
    /// Standard deviations above the mean beyond which a value is an outlier.
    pub outlier_k: f64,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            outlier_k: DEFAULT_OUTLIER_K,
        }
    }
}

/// Mean and population standard deviation. `None` below two samples.
pub fn moments(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sd = var.sqrt();
    sd.is_finite().then_some((mean, sd))
}

/// Runs the outlier and negative-value checks over the active rows.
/// Cells that do not coerce to a number are skipped by both checks.
pub fn audit_rows(rows: &[&Row], quantity_idx: usize, options: &AuditOptions) -> Vec<AuditFinding> {
    if !options.enabled {
        return Vec::new();
    }
    let values: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .filter_map(|(pos, row)| row.get(quantity_idx).as_number().map(|q| (pos, q)))
        .collect();

    let mut findings = Vec::new();

    let samples: Vec<f64> = values.iter().map(|(_, q)| *q).collect();
    if let Some((mean, sd)) = moments(&samples) {
        let threshold = mean + options.outlier_k * sd;
        let positions: Vec<usize> = values
            .iter()
            .filter(|(_, q)| *q > threshold)
            .map(|(pos, _)| *pos)
            .collect();
        tracing::debug!(mean, sd, threshold, flagged = positions.len(), "outlier check");
        if !positions.is_empty() {
            findings.push(AuditFinding {
                kind: FindingKind::StatisticalOutlier,
                affected_rows: positions.len(),
                positions,
                threshold: Some(threshold),
            });
        }
    }

    let negatives: Vec<usize> = values
        .iter()
        .filter(|(_, q)| *q < 0.0)
        .map(|(pos, _)| *pos)
        .collect();
    if !negatives.is_empty() {
        findings.push(AuditFinding {
            kind: FindingKind::NegativeValue,
            affected_rows: negatives.len(),
            positions: negatives,
            threshold: None,
        });
    }

    findings
}
