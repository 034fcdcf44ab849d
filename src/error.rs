use thiserror::Error;

#[derive(Error, Debug)]
pub enum MedicaoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read {path}: {reason}")]
    Ingest { path: String, reason: String },

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid quick entry '{input}': {reason}")]
    InvalidEntry { input: String, reason: String },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("No table loaded")]
    NoData,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MedicaoError>;
