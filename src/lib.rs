#![forbid(unsafe_code)]
//! Flat-file record store for Rust.
//!
//! CRUD over JSON, CSV, and XML record collections through one handler
//! interface. Every operation is a whole-file read-modify-write cycle
//! against a single caller-supplied path; all records pass through the
//! unified [`Record`] model.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flatrec::{handler_for_tag, types::Record};
//!
//! let handler = handler_for_tag("json", "marines.json")?;
//! handler.create(Record::new().with_text("id", "1").with_text("name", "Ripley"))?;
//!
//! for record in handler.read()? {
//!     println!("{:?}", record.text("name"));
//! }
//!
//! handler.update(&Record::new().with_text("id", "1").with_text("name", "Hicks"))?;
//! handler.delete("1")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Formats
//!
//! - **JSON**: one pretty-printed array of objects
//! - **CSV**: header row taken from the first record, one row per record
//! - **XML**: a `<records>` document; nested member collections are
//!   persisted per record as `<members>` elements
//!
//! # Semantics worth knowing
//!
//! - A missing or unparsable file reads as an empty collection, never as
//!   an error; `create` on such a file reinitializes it.
//! - `update` merges by the `"id"` field (compared as text): matching
//!   stored fields take the payload's values, everything else stays.
//! - `update` and `delete` with an unmatched id are silent no-ops.
//! - There is no file locking; callers must serialize concurrent access
//!   to one file themselves.

pub mod error;
pub mod factory;
pub mod formats;
pub mod handler;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    factory::{handler_for, handler_for_path, handler_for_tag, infer_format_from_extension},
    formats::FormatType,
    handler::{CsvHandler, JsonHandler, RecordHandler, XmlHandler},
    types::{Field, FieldValue, Member, Record, RecordSet},
};
