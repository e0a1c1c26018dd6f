use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DreError {
    #[error("Invalid period '{name}': end date {end} is before start date {start}")]
    InvalidPeriod {
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    #[error("Period {0} is closed and cannot be modified")]
    PeriodClosed(Uuid),

    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Waterfall violation on '{line}': expected {expected}, found {actual}")]
    WaterfallViolation {
        line: String,
        expected: f64,
        actual: f64,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DreError>;
