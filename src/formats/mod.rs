//! All supported on-disk record formats for flatrec.
//!
//! This module re-exports the document type for each format and provides
//! the [`FormatType`] enum for generic format handling across the crate.

pub mod csv;
pub mod json;
pub mod xml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

// Reexporting the formats for easier access
pub use csv::Format as CsvFormat;
pub use json::Format as JsonFormat;
pub use xml::Format as XmlFormat;

use crate::Error;

/// Represents all supported record file formats for generic handling.
///
/// This enum allows you to work with any supported file format in a type-safe way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// JSON: one array of objects.
    Json,
    /// CSV: header row plus one row per record.
    Csv,
    /// XML: a `<records>` document with one `<record>` element per record.
    Xml,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// This provides the lowercase tag for each format type:
/// - `Json` → `"json"`
/// - `Csv` → `"csv"`
/// - `Xml` → `"xml"`
///
/// # Example
/// ```rust
/// use flatrec::formats::FormatType;
/// assert_eq!(FormatType::Json.to_string(), "json");
/// assert_eq!(FormatType::Csv.to_string(), "csv");
/// assert_eq!(FormatType::Xml.to_string(), "xml");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Json => write!(f, "json"),
            FormatType::Csv => write!(f, "csv"),
            FormatType::Xml => write!(f, "xml"),
        }
    }
}

/// Implements [`std::str::FromStr`] for [`FormatType`].
///
/// Accepts `"json"`, `"csv"`, and `"xml"`, case-insensitively and with
/// surrounding whitespace tolerated.
///
/// Returns [`crate::error::Error::UnsupportedFormat`] for unknown strings.
///
/// # Example
/// ```rust
/// use flatrec::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("json").unwrap(), FormatType::Json);
/// assert_eq!(FormatType::from_str("CSV").unwrap(), FormatType::Csv);
/// assert!(FormatType::from_str("yaml").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "json" => Ok(FormatType::Json),
            "csv" => Ok(FormatType::Csv),
            "xml" => Ok(FormatType::Xml),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Json => "json",
            FormatType::Csv => "csv",
            FormatType::Xml => "xml",
        }
    }
}
