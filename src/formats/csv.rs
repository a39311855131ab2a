//! Support for the CSV record format.
//!
//! Only flat, text-valued records are supported: a record carrying a nested
//! member collection, or one with no fields at all, cannot be serialized to
//! CSV and is rejected. The header row is taken from the first record's
//! field names.

use std::io::BufRead;

use crate::{
    error::Error,
    traits::Parser,
    types::{Field, FieldValue, Record, RecordSet},
};

/// CSV document: a header row followed by one row per record.
///
/// All records in one file are expected to share the header's field set
/// (a caller contract). On read, each row is zipped with the header; on
/// write, rows follow the first record's field order, with an empty string
/// for a field a record lacks and surplus fields dropped.
///
/// Serializing zero records produces an empty file; the header goes with
/// them and is re-established by the next write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    pub records: RecordSet,
}

impl Format {
    /// Creates an empty document.
    pub fn new() -> Self {
        Format {
            records: Vec::new(),
        }
    }

    /// Creates a document holding the given records.
    pub fn with_records(records: RecordSet) -> Self {
        Format { records }
    }

    /// Appends one record.
    pub fn add_record(&mut self, record: Record) {
        self.records.push(record);
    }
}

impl Parser for Format {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| Field {
                    name: name.to_string(),
                    value: FieldValue::Text(value.to_string()),
                })
                .collect();
            records.push(Record { fields });
        }
        Ok(Format { records })
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        // Reject unrepresentable records before emitting any bytes.
        for record in &self.records {
            if record.fields.is_empty() {
                return Err(Error::invalid_record(
                    "a record with no fields cannot be represented in CSV",
                ));
            }
            if let Some(field) = nested_field(record) {
                return Err(Error::invalid_record(format!(
                    "field '{}' holds members, which CSV cannot represent",
                    field.name
                )));
            }
        }

        let mut wtr = csv::WriterBuilder::new().from_writer(writer);

        // No records, no bytes: the header travels with the data.
        let Some(first) = self.records.first() else {
            wtr.flush()?;
            return Ok(());
        };

        let header = first.field_names();
        wtr.write_record(&header)?;

        for record in &self.records {
            let row: Vec<&str> = header
                .iter()
                .map(|name| record.text(name).unwrap_or(""))
                .collect();
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn nested_field(record: &Record) -> Option<&Field> {
    record
        .fields
        .iter()
        .find(|f| matches!(f.value, FieldValue::Members(_)))
}
