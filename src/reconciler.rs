use crate::models::{Cell, QuickEntry, Row, RowOrigin, SemanticRole, Table};
use crate::schema::SchemaMapping;

/// Column used for a quick-entry field when its role has no mapped column.
pub fn fallback_label(role: SemanticRole) -> Option<&'static str> {
    match role {
        SemanticRole::Date => Some("Date"),
        SemanticRole::Quantity => Some("Measurement"),
        SemanticRole::MonetaryValue => Some("Value"),
        _ => None,
    }
}

fn entry_label(mapping: &SchemaMapping, role: SemanticRole) -> String {
    match mapping.get(role) {
        Some(label) => label.to_string(),
        None => {
            let label = fallback_label(role).unwrap_or("Unmapped");
            tracing::warn!(role = role.name(), label, "role unmapped, quick entries use fallback column");
            label.to_string()
        }
    }
}

/// Target columns for the quantity, value and date of a quick entry, in that
/// order of precedence. When overrides point two of these roles at one
/// column, the later field moves to its fallback column instead of
/// overwriting the earlier one.
fn entry_labels(mapping: &SchemaMapping) -> (String, String, String) {
    let mut taken: Vec<String> = Vec::with_capacity(3);
    for role in [
        SemanticRole::Quantity,
        SemanticRole::MonetaryValue,
        SemanticRole::Date,
    ] {
        let mut label = entry_label(mapping, role);
        if taken.contains(&label) {
            let fallback = fallback_label(role).unwrap_or("Unmapped");
            tracing::warn!(
                role = role.name(),
                column = %label,
                fallback,
                "column already holds another quick-entry field"
            );
            label = fallback.to_string();
            let mut n = 1;
            while taken.contains(&label) {
                label = format!("{fallback}.{n}");
                n += 1;
            }
        }
        taken.push(label);
    }
    let date = taken.pop().unwrap_or_default();
    let value = taken.pop().unwrap_or_default();
    let quantity = taken.pop().unwrap_or_default();
    (quantity, value, date)
}

/// Appends quick-entry records to `table`, translating each field into the
/// column bound to its role. Rows from an earlier merge are discarded first,
/// so merging a merged table again yields the same result.
pub fn reconcile(table: &Table, mapping: &SchemaMapping, entries: &[QuickEntry]) -> Table {
    let mut merged = Table {
        name: table.name.clone(),
        columns: table.columns.clone(),
        rows: table
            .rows
            .iter()
            .filter(|r| r.origin == RowOrigin::Source)
            .cloned()
            .collect(),
    };
    if entries.is_empty() {
        return merged;
    }

    let (qty_label, value_label, date_label) = entry_labels(mapping);
    let date_idx = merged.ensure_column(&date_label);
    let qty_idx = merged.ensure_column(&qty_label);
    let value_idx = merged.ensure_column(&value_label);
    let width = merged.columns.len();

    for (seq, entry) in entries.iter().enumerate() {
        let mut cells = vec![Cell::Empty; width];
        cells[date_idx] = Cell::Date(entry.date);
        cells[qty_idx] = Cell::Number(entry.quantity);
        cells[value_idx] = Cell::Number(entry.value);
        merged.rows.push(Row {
            cells,
            origin: RowOrigin::QuickEntry(seq),
        });
    }
    tracing::debug!(
        source_rows = merged.rows.len() - entries.len(),
        quick_entries = entries.len(),
        "reconciled table"
    );
    merged
}
