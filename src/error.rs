//! All error types for the flatrec crate.
//!
//! These are returned from all fallible operations (parsing, serialization, CRUD calls, etc.).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl Error {
    /// Creates a new invalid record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Error::InvalidRecord(message.into())
    }
}
