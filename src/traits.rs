//! Traits for format-agnostic parsing and serialization in flatrec.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// A trait for parsing and writing a record collection from/to one file.
///
/// # Example
///
/// ```rust,no_run
/// use flatrec::traits::Parser;
/// let format = flatrec::formats::json::Format::read_from("marines.json")?;
/// format.write_to("marines_copy.json")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    ///
    /// The document is serialized in memory first; the destination file is
    /// created, replacing any previous content, only after serialization
    /// succeeds.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut buffer = Vec::new();
        self.to_writer(&mut buffer)?;
        fs::write(path, buffer).map_err(Error::Io)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }
}
