//! CRUD handlers for record files, one per on-disk format.
//!
//! Every operation is a blocking read-modify-write cycle against one file:
//! open, parse, mutate in memory, rewrite the whole file, close. Nothing is
//! cached between calls and no locking is performed; callers that need
//! concurrent access to one file must serialize it externally.

use std::{
    io,
    path::{Path, PathBuf},
};

use crate::{
    error::Error,
    formats::{CsvFormat, JsonFormat, XmlFormat},
    traits::Parser,
    types::{Record, RecordSet},
};

/// The CRUD capability set over one record file.
///
/// All three handlers share these semantics:
///
/// - A missing or unparsable file is treated as an empty collection.
///   `read` reports it as such; `create` reinitializes the file, silently
///   discarding unreadable prior content.
/// - `update` merges: every stored record whose id equals the payload's id
///   (string comparison) takes the payload's values for fields it already
///   has; stored fields absent from the payload are preserved, payload
///   fields the record lacks are ignored.
/// - `update` and `delete` with an id that matches nothing are silent
///   no-ops; the collection is rewritten unchanged and no NotFound is
///   signaled. Callers that need to distinguish a hit from a miss must
///   `read` first.
/// - Documents are serialized in memory before the file is replaced; a
///   record the target format cannot represent fails the operation and
///   leaves the file as it was. I/O failures during the final write
///   (permission denied, disk full) surface as errors.
pub trait RecordHandler {
    /// Appends one record to the persisted collection.
    fn create(&self, record: Record) -> Result<(), Error>;

    /// Returns all persisted records.
    ///
    /// A missing or unparsable file reads as an empty collection, never
    /// as an error; "missing file" and "no records" are indistinguishable.
    fn read(&self) -> Result<RecordSet, Error>;

    /// Merges the payload into every stored record with a matching id,
    /// then rewrites the collection.
    fn update(&self, update: &Record) -> Result<(), Error>;

    /// Removes every record with the given id, then rewrites the
    /// collection.
    fn delete(&self, id: &str) -> Result<(), Error>;

    /// The file this handler owns.
    fn path(&self) -> &Path;
}

/// Handler for a JSON record file (one array of objects).
///
/// # Example
///
/// ```rust,no_run
/// use flatrec::{handler::{JsonHandler, RecordHandler}, types::Record};
///
/// let handler = JsonHandler::new("marines.json");
/// handler.create(Record::new().with_text("id", "1").with_text("name", "Ripley"))?;
/// let records = handler.read()?;
/// assert_eq!(records[0].text("name"), Some("Ripley"));
/// # Ok::<(), flatrec::Error>(())
/// ```
pub struct JsonHandler {
    path: PathBuf,
}

impl JsonHandler {
    /// Creates a handler owning the given file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonHandler { path: path.into() }
    }

    fn load(&self) -> Result<RecordSet, Error> {
        load_or_empty(JsonFormat::read_from(&self.path).map(|format| format.records))
    }

    fn save(&self, records: RecordSet) -> Result<(), Error> {
        JsonFormat::with_records(records).write_to(&self.path)
    }
}

impl RecordHandler for JsonHandler {
    fn create(&self, record: Record) -> Result<(), Error> {
        let mut records = self.load()?;
        records.push(record);
        self.save(records)
    }

    fn read(&self) -> Result<RecordSet, Error> {
        self.load()
    }

    fn update(&self, update: &Record) -> Result<(), Error> {
        let mut records = self.load()?;
        apply_update(&mut records, update);
        self.save(records)
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        let mut records = self.load()?;
        remove_by_id(&mut records, id);
        self.save(records)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Handler for a CSV record file (header row plus one row per record).
///
/// Records must be flat; creating a record with a member collection fails
/// with an invalid record error. Deleting the last record leaves an empty
/// file, header included; the next create re-establishes the header from
/// its record's fields.
pub struct CsvHandler {
    path: PathBuf,
}

impl CsvHandler {
    /// Creates a handler owning the given file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CsvHandler { path: path.into() }
    }

    fn load(&self) -> Result<RecordSet, Error> {
        load_or_empty(CsvFormat::read_from(&self.path).map(|format| format.records))
    }

    fn save(&self, records: RecordSet) -> Result<(), Error> {
        CsvFormat::with_records(records).write_to(&self.path)
    }
}

impl RecordHandler for CsvHandler {
    fn create(&self, record: Record) -> Result<(), Error> {
        let mut records = self.load()?;
        records.push(record);
        self.save(records)
    }

    fn read(&self) -> Result<RecordSet, Error> {
        self.load()
    }

    fn update(&self, update: &Record) -> Result<(), Error> {
        let mut records = self.load()?;
        apply_update(&mut records, update);
        self.save(records)
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        let mut records = self.load()?;
        remove_by_id(&mut records, id);
        self.save(records)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Handler for an XML record file (a `<records>` document).
///
/// Member collections are persisted per record; see
/// [`crate::formats::xml`] for the document shape.
pub struct XmlHandler {
    path: PathBuf,
}

impl XmlHandler {
    /// Creates a handler owning the given file path.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        XmlHandler { path: path.into() }
    }

    fn load(&self) -> Result<RecordSet, Error> {
        load_or_empty(XmlFormat::read_from(&self.path).map(|format| format.records))
    }

    fn save(&self, records: RecordSet) -> Result<(), Error> {
        XmlFormat::with_records(records).write_to(&self.path)
    }
}

impl RecordHandler for XmlHandler {
    fn create(&self, record: Record) -> Result<(), Error> {
        let mut records = self.load()?;
        records.push(record);
        self.save(records)
    }

    fn read(&self) -> Result<RecordSet, Error> {
        self.load()
    }

    fn update(&self, update: &Record) -> Result<(), Error> {
        let mut records = self.load()?;
        apply_update(&mut records, update);
        self.save(records)
    }

    fn delete(&self, id: &str) -> Result<(), Error> {
        let mut records = self.load()?;
        remove_by_id(&mut records, id);
        self.save(records)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Recovery rule shared by every load path: a missing file or unparsable
/// content counts as an empty collection; any other error surfaces.
fn load_or_empty(result: Result<RecordSet, Error>) -> Result<RecordSet, Error> {
    match result {
        Ok(records) => Ok(records),
        Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(
            Error::Parse(_) | Error::XmlParse(_) | Error::CsvParse(_) | Error::InvalidRecord(_),
        ) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Merges the payload into every record with a matching id. A payload
/// without an id matches nothing.
fn apply_update(records: &mut RecordSet, update: &Record) {
    let Some(id) = update.id() else {
        return;
    };
    for record in records.iter_mut() {
        if record.id() == Some(id) {
            record.merge_from(update);
        }
    }
}

fn remove_by_id(records: &mut RecordSet, id: &str) {
    records.retain(|record| record.id() != Some(id));
}
