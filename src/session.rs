use std::sync::Arc;

use crate::audit::{audit_rows, AuditOptions};
use crate::context::{build_context, ContextRequest};
use crate::error::{MedicaoError, Result};
use crate::filter::active_indices;
use crate::kpi::{self, Comparison};
use crate::models::{AuditFinding, GroupTotal, KpiSnapshot, QuickEntry, Row, SemanticRole, Table};
use crate::reconciler::{fallback_label, reconcile};
use crate::schema::{apply_overrides, infer_mapping, KeywordTable, SchemaMapping};
use crate::settings::Settings;

/// Everything derived from the session inputs in one pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub mapping: SchemaMapping,
    pub reconciled: Table,
    /// Indices into `reconciled.rows`, after the group filter.
    pub active: Vec<usize>,
    pub findings: Vec<AuditFinding>,
    /// `None` when no column is bound to Quantity.
    pub kpis: Option<KpiSnapshot>,
    pub groups: Option<Vec<GroupTotal>>,
    pub series: Option<Vec<(String, f64)>>,
    pub comparison: Option<Comparison>,
}

impl Analysis {
    pub fn active_rows(&self) -> Vec<&Row> {
        self.active.iter().map(|&i| &self.reconciled.rows[i]).collect()
    }
}

/// Column holding `role` in the reconciled table. An unmapped role reads
/// from the fallback column quick entries were written to, if there is one.
fn role_column(mapping: &SchemaMapping, reconciled: &Table, role: SemanticRole) -> Option<usize> {
    match mapping.get(role) {
        Some(label) => reconciled.column_index(label),
        None => fallback_label(role).and_then(|l| reconciled.column_index(l)),
    }
}

/// State owned by one interactive session: the loaded table, user choices
/// and the quick entries submitted so far. Entries are only ever appended.
#[derive(Debug, Clone)]
pub struct Session {
    table: Option<Table>,
    keywords: KeywordTable,
    overrides: Vec<(SemanticRole, String)>,
    entries: Arc<Vec<QuickEntry>>,
    pub audit: AuditOptions,
    pub target: Option<f64>,
    pub target_factor: f64,
    pub top_groups: usize,
    pub excerpt_rows: usize,
    pub group_filter: Option<String>,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            table: None,
            keywords: settings.keywords.clone(),
            overrides: Vec::new(),
            entries: Arc::new(Vec::new()),
            audit: settings.audit_options(),
            target: None,
            target_factor: settings.target_factor,
            top_groups: settings.top_groups,
            excerpt_rows: settings.excerpt_rows,
            group_filter: None,
        }
    }

    /// Replaces the table. Overrides and the group filter referred to the
    /// old columns and are cleared; quick entries are kept.
    pub fn load_table(&mut self, table: Table) {
        self.table = Some(table);
        self.overrides.clear();
        self.group_filter = None;
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn set_override(&mut self, role: SemanticRole, label: &str) -> Result<()> {
        let table = self.table.as_ref().ok_or(MedicaoError::NoData)?;
        if !table.has_column(label) {
            return Err(MedicaoError::UnknownColumn(label.to_string()));
        }
        self.overrides.retain(|(r, _)| *r != role);
        self.overrides.push((role, label.to_string()));
        Ok(())
    }

    /// Appends by building the next sequence and swapping it in, so a
    /// snapshot taken from [`Session::entries`] never changes under a reader.
    pub fn submit(&mut self, entry: QuickEntry) {
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.extend(self.entries.iter().copied());
        next.push(entry);
        self.entries = Arc::new(next);
        tracing::info!(pending = self.entries.len(), "quick entry submitted");
    }

    pub fn entries(&self) -> Arc<Vec<QuickEntry>> {
        Arc::clone(&self.entries)
    }

    pub fn mapping(&self) -> Option<SchemaMapping> {
        let table = self.table.as_ref()?;
        let inferred = infer_mapping(&table.columns, &self.keywords);
        // Overrides were validated against this table when set.
        Some(apply_overrides(&inferred, &self.overrides, &table.columns).unwrap_or(inferred))
    }

    /// Runs mapping, reconciliation, filtering, audit and KPIs from the
    /// current inputs. `None` when no table is loaded.
    pub fn analyze(&self) -> Option<Analysis> {
        let mapping = self.mapping()?;
        let table = self.table.as_ref()?;
        let reconciled = reconcile(table, &mapping, &self.entries);

        let quantity_idx = role_column(&mapping, &reconciled, SemanticRole::Quantity);
        let value_idx = role_column(&mapping, &reconciled, SemanticRole::MonetaryValue);
        let date_idx = role_column(&mapping, &reconciled, SemanticRole::Date);
        let group_idx = mapping
            .get(SemanticRole::Discipline)
            .and_then(|l| reconciled.column_index(l));

        let Some(quantity_idx) = quantity_idx else {
            tracing::warn!("no quantity column; totals, audit and charts unavailable");
            return Some(Analysis {
                mapping,
                reconciled,
                active: Vec::new(),
                findings: Vec::new(),
                kpis: None,
                groups: None,
                series: None,
                comparison: None,
            });
        };

        let mut active = active_indices(&reconciled, &reconciled.columns[quantity_idx]);
        if let Some(value) = &self.group_filter {
            match group_idx {
                Some(g) => active.retain(|&i| reconciled.rows[i].get(g).to_string() == *value),
                None => tracing::warn!(filter = %value, "group filter ignored, no discipline column"),
            }
        }

        let rows: Vec<&Row> = active.iter().map(|&i| &reconciled.rows[i]).collect();
        let findings = audit_rows(&rows, quantity_idx, &self.audit);
        let total = kpi::sum_column(&rows, quantity_idx);
        let target = self
            .target
            .unwrap_or_else(|| kpi::default_target(total, self.target_factor));
        let kpis = kpi::compute_kpis(&rows, quantity_idx, value_idx, target);
        let groups = group_idx.map(|g| kpi::rank_groups(&rows, g, quantity_idx, self.top_groups));
        let series = date_idx.map(|d| kpi::evolution_series(&rows, d, quantity_idx));
        let comparison = kpi::compare_last(&rows, quantity_idx);
        tracing::debug!(
            active = rows.len(),
            findings = findings.len(),
            total = kpis.total_quantity,
            "analysis complete"
        );

        Some(Analysis {
            mapping,
            reconciled,
            active,
            findings,
            kpis: Some(kpis),
            groups,
            series,
            comparison: Some(comparison),
        })
    }

    /// Context string for a question about the current data.
    pub fn context(&self, question: &str) -> Option<String> {
        let analysis = self.analyze()?;
        let rows = analysis.active_rows();
        let filter_column = analysis.mapping.get(SemanticRole::Discipline);
        let filter = match (filter_column, self.group_filter.as_deref()) {
            (Some(column), Some(value)) => Some((column, value)),
            _ => None,
        };
        Some(build_context(&ContextRequest {
            filter,
            kpis: analysis.kpis.as_ref(),
            columns: &analysis.reconciled.columns,
            rows: &rows,
            excerpt_rows: self.excerpt_rows,
            question,
        }))
    }
}
