// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableError>;

/// Failure to load or check a compiled table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table truncated at byte {offset} while reading {what}")]
    Truncated { offset: usize, what: &'static str },

    #[error("bad {what} value {value} at byte {offset}")]
    BadCode {
        what: &'static str,
        value: i64,
        offset: usize,
    },

    #[error("{len} trailing bytes after table")]
    Trailing { len: usize },

    #[error("invalid table: {0}")]
    Invalid(String),

    #[error("tables JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
