use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MedicaoError;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// A single spreadsheet value as handed over by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Empty,
    /// A cell the reader could not decode (e.g. `#DIV/0!`), kept verbatim.
    Invalid(String),
}

static EMPTY: Cell = Cell::Empty;

fn us_thousands() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap())
}

fn br_thousands() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d{1,3}(\.\d{3})+(,\d+)?$").unwrap())
}

fn decimal_comma() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+,\d+$").unwrap())
}

/// Best-effort numeric parse of free text: currency symbols, thousands
/// separators in either convention, and accounting-style `(50)` negatives.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw
        .trim()
        .replace("R$", "")
        .replace(['$', '€', '"', ' ', '\u{a0}'], "");
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return parse_number(inner).map(|n| -n);
    }
    if let Ok(n) = s.parse::<f64>() {
        return Some(n).filter(|n| n.is_finite());
    }
    let normalized = if us_thousands().is_match(&s) {
        s.replace(',', "")
    } else if br_thousands().is_match(&s) {
        s.replace('.', "").replace(',', ".")
    } else if decimal_comma().is_match(&s) {
        s.replace(',', ".")
    } else {
        s
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Timestamps such as "2024-01-01 00:00:00" keep only the date part.
    let raw = raw.split_whitespace().next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
}

impl Cell {
    /// Builds a cell from reader text: blank becomes `Empty`, a plain float
    /// becomes `Number`, anything else stays `Text` for later coercion.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric coercion. `None` means the cell is excluded from numeric work.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Empty => Ok(()),
            Cell::Invalid(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Where a row came from. Quick-entry rows are recognised on re-merge so
/// reconciliation never stacks the same submissions twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    Source,
    QuickEntry(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub origin: RowOrigin,
}

impl Row {
    pub fn source(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            origin: RowOrigin::Source,
        }
    }

    /// Missing trailing cells read as `Empty`.
    pub fn get(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&EMPTY)
    }
}

/// Ordered rows under unique column labels. Serves as both the uploaded
/// table and the reconciled one; row order is chronological order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    /// Index of `label`, appending the column first if the table lacks it.
    pub fn ensure_column(&mut self, label: &str) -> usize {
        match self.column_index(label) {
            Some(i) => i,
            None => {
                self.columns.push(label.to_string());
                self.columns.len() - 1
            }
        }
    }

    #[cfg(test)]
    pub fn value<'a>(&self, row: &'a Row, label: &str) -> &'a Cell {
        match self.column_index(label) {
            Some(i) => row.get(i),
            None => &EMPTY,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Roles, entries, results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    Date,
    Quantity,
    MonetaryValue,
    ResponsibleParty,
    Location,
    Unit,
    Discipline,
    Balance,
    CumulativeTotal,
}

impl SemanticRole {
    pub const ALL: [SemanticRole; 9] = [
        SemanticRole::Date,
        SemanticRole::Quantity,
        SemanticRole::MonetaryValue,
        SemanticRole::ResponsibleParty,
        SemanticRole::Location,
        SemanticRole::Unit,
        SemanticRole::Discipline,
        SemanticRole::Balance,
        SemanticRole::CumulativeTotal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Quantity => "Quantity",
            Self::MonetaryValue => "Monetary value",
            Self::ResponsibleParty => "Responsible party",
            Self::Location => "Location",
            Self::Unit => "Unit",
            Self::Discipline => "Discipline",
            Self::Balance => "Balance",
            Self::CumulativeTotal => "Cumulative total",
        }
    }
}

/// A measurement captured through the quick-entry form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickEntry {
    pub date: NaiveDate,
    pub quantity: f64,
    pub value: f64,
}

impl FromStr for QuickEntry {
    type Err = MedicaoError;

    /// `DATE,QUANTITY[,VALUE]`, e.g. `2024-03-01,12.5,480`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| MedicaoError::InvalidEntry {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid("expected DATE,QUANTITY[,VALUE]"));
        }
        let date = parse_date(parts[0]).ok_or_else(|| invalid("unreadable date"))?;
        let quantity = parts[1]
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| invalid("quantity is not a number"))?;
        let value = match parts.get(2) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| invalid("value is not a number"))?,
            None => 0.0,
        };
        Ok(QuickEntry {
            date,
            quantity,
            value,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingKind {
    StatisticalOutlier,
    NegativeValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditFinding {
    pub kind: FindingKind,
    pub affected_rows: usize,
    /// Positions of the flagged rows within the active subset.
    pub positions: Vec<usize>,
    /// Upper bound used for the outlier check; `None` for negative values.
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiSnapshot {
    pub total_quantity: f64,
    pub total_value: f64,
    pub mean_quantity: f64,
    pub last_period_delta: f64,
    pub progress_ratio: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    pub group: String,
    pub total: f64,
    pub count: usize,
}
