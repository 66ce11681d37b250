use thiserror::Error;

/// Failures surfaced by the OKQ8 statement parser.
///
/// Every variant is fatal for the file being parsed: no partial statement is
/// returned alongside an error.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unexpected header row: {found:?}")]
    SchemaMismatch { found: Vec<String> },

    #[error("row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: no amount in any of the credit, debit or original amount columns")]
    MissingAmount { row: usize },

    #[error("row {row}: invalid amount {value:?} in column {column:?}")]
    InvalidAmount {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no month names available for locale {0:?}")]
    UnknownLocale(String),

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error("reading workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
