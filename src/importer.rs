use std::collections::HashSet;
use std::path::Path;

use crate::error::{MedicaoError, Result};
use crate::models::{Cell, Row, Table};

/// Sheet name reported for delimited text files.
pub const CSV_SHEET: &str = "csv";

#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Workbook sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
    /// Rows above the header row (titles, logos, report banners).
    pub skip_rows: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<chrono::NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    if !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial as i64))
}

fn ingest_error(path: &Path, reason: impl ToString) -> MedicaoError {
    MedicaoError::Ingest {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xls" | "xlsb" | "ods"))
        .unwrap_or(false)
}

/// Semicolon-separated exports are common in pt-BR locales.
fn sniff_delimiter(sample: &str) -> u8 {
    let line = sample.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if line.matches(';').count() > line.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Header labels as text: blanks become `Unnamed: <i>`, repeats get a
/// `.<n>` suffix so every label is unique.
fn header_labels(header: &[Cell]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell {
                Cell::Empty => format!("Unnamed: {i}"),
                other => other.to_string().trim().to_string(),
            };
            let base = if base.is_empty() { format!("Unnamed: {i}") } else { base };
            let mut label = base.clone();
            let mut n = 1;
            while !seen.insert(label.clone()) {
                label = format!("{base}.{n}");
                n += 1;
            }
            label
        })
        .collect()
}

/// Turns a raw cell grid into a table: skips `skip_rows`, reads the next
/// row as the header and drops rows with no content at all.
fn build_table(name: &str, grid: Vec<Vec<Cell>>, skip_rows: usize) -> Result<Table> {
    let mut lines = grid.into_iter().skip(skip_rows);
    let header = lines
        .next()
        .ok_or_else(|| MedicaoError::Other(format!("No header row after skipping {skip_rows} rows")))?;
    let mut table = Table::new(name, header_labels(&header));
    let width = table.columns.len();
    let mut dropped = 0usize;
    for mut cells in lines {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        if cells.len() > width {
            dropped += cells.len() - width;
            cells.truncate(width);
        }
        table.rows.push(Row::source(cells));
    }
    if dropped > 0 {
        tracing::warn!(cells = dropped, "ignored cells beyond the header width");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

pub fn list_sheets(path: &Path) -> Result<Vec<String>> {
    if is_workbook(path) {
        workbook_sheets(path)
    } else {
        Ok(vec![CSV_SHEET.to_string()])
    }
}

pub fn load_table(path: &Path, options: &SourceOptions) -> Result<Table> {
    let table = if is_workbook(path) {
        read_workbook(path, options)?
    } else {
        read_csv(path, options.skip_rows)?
    };
    tracing::info!(
        file = %path.display(),
        sheet = %table.name,
        columns = table.columns.len(),
        rows = table.len(),
        "loaded table"
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv(path: &Path, skip_rows: usize) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|e| ingest_error(path, e))?;
    let text = String::from_utf8_lossy(&bytes);
    // Skip physical lines: the csv reader ignores blank lines, which would
    // throw the count off for banners with empty lines in them.
    let body: String = text.split_inclusive('\n').skip(skip_rows).collect();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(&body))
        .from_reader(body.as_bytes());

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(record.iter().map(Cell::from_text).collect::<Vec<_>>());
    }
    if grid.is_empty() {
        return Err(match skip_rows {
            0 => ingest_error(path, "file is empty"),
            n => ingest_error(path, format!("no rows left after skipping {n} lines")),
        });
    }
    build_table(CSV_SHEET, grid, 0)
}

// ---------------------------------------------------------------------------
// Workbooks (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn data_to_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from_text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => Cell::Date(d),
            None => Cell::Invalid(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(s) => match crate::models::parse_date(s) {
            Some(d) => Cell::Date(d),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Invalid(e.to_string()),
        Data::Empty => Cell::Empty,
    }
}

#[cfg(feature = "xlsx")]
fn workbook_sheets(path: &Path) -> Result<Vec<String>> {
    use calamine::Reader;
    let workbook = calamine::open_workbook_auto(path).map_err(|e| ingest_error(path, e))?;
    Ok(workbook.sheet_names().to_vec())
}

#[cfg(feature = "xlsx")]
fn read_workbook(path: &Path, options: &SourceOptions) -> Result<Table> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| ingest_error(path, e))?;
    let names = workbook.sheet_names().to_vec();
    let sheet = match &options.sheet {
        Some(s) if names.contains(s) => s.clone(),
        Some(s) => return Err(MedicaoError::UnknownSheet(s.clone())),
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ingest_error(path, "workbook has no sheets"))?,
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ingest_error(path, e))?;

    // The range starts at the first used cell; pad so skip_rows counts
    // from the top of the sheet.
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(data_to_cell));
        grid.push(cells);
    }
    build_table(&sheet, grid, options.skip_rows)
}

#[cfg(not(feature = "xlsx"))]
fn workbook_sheets(path: &Path) -> Result<Vec<String>> {
    Err(ingest_error(path, "built without workbook support (enable the `xlsx` feature)"))
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook(path: &Path, _options: &SourceOptions) -> Result<Table> {
    Err(ingest_error(path, "built without workbook support (enable the `xlsx` feature)"))
}
