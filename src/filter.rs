use crate::models::Table;

/// Positions of the rows that carry a real measurement: the quantity cell
/// coerces to a number other than zero. Blank, zero and non-numeric
/// quantities mark section headers and label rows and are left out.
/// Negative quantities stay in so the audit can flag them.
pub fn active_indices(table: &Table, quantity_label: &str) -> Vec<usize> {
    let Some(idx) = table.column_index(quantity_label) else {
        tracing::debug!(column = quantity_label, "quantity column not in table");
        return Vec::new();
    };
    let active: Vec<usize> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches!(row.get(idx).as_number(), Some(q) if q != 0.0))
        .map(|(i, _)| i)
        .collect();
    tracing::debug!(
        total = table.len(),
        active = active.len(),
        "filtered active rows"
    );
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Row};

    fn active_rows<'a>(table: &'a Table, label: &str) -> Vec<&'a Row> {
        active_indices(table, label).into_iter().map(|i| &table.rows[i]).collect()
    }

    fn table(quantities: Vec<Cell>) -> Table {
        let mut t = Table::new("t", vec!["Atividade".into(), "Qtd".into()]);
        for (i, q) in quantities.into_iter().enumerate() {
            t.rows.push(Row::source(vec![Cell::Text(format!("row {i}")), q]));
        }
        t
    }

    #[test]
    fn test_excludes_blank_zero_and_text() {
        let t = table(vec![
            Cell::Number(10.0),
            Cell::Empty,
            Cell::Number(0.0),
            Cell::Text("".into()),
            Cell::Text("SERVIÇOS PRELIMINARES".into()),
            Cell::Invalid("#REF!".into()),
            Cell::Text("0,00".into()),
            Cell::Text("2,5".into()),
        ]);
        let active = active_rows(&t, "Qtd");
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].get(1), &Cell::Number(10.0));
        assert_eq!(active[1].get(1), &Cell::Text("2,5".into()));
    }

    #[test]
    fn test_keeps_negative_quantities() {
        let t = table(vec![Cell::Number(-5.0), Cell::Number(3.0)]);
        assert_eq!(active_rows(&t, "Qtd").len(), 2);
    }

    #[test]
    fn test_short_rows_count_as_blank() {
        let mut t = table(vec![Cell::Number(1.0)]);
        t.rows.push(Row::source(vec![Cell::Text("header only".into())]));
        assert_eq!(active_rows(&t, "Qtd").len(), 1);
    }

    #[test]
    fn test_indices_point_into_table() {
        let t = table(vec![Cell::Empty, Cell::Number(4.0), Cell::Number(0.0), Cell::Number(1.0)]);
        assert_eq!(active_indices(&t, "Qtd"), vec![1, 3]);
    }

    #[test]
    fn test_unknown_column_yields_nothing() {
        let t = table(vec![Cell::Number(1.0)]);
        assert!(active_rows(&t, "Missing").is_empty());
    }
}
