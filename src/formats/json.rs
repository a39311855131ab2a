use serde_json::{Map, Value};
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{Field, FieldValue, Member, Record, RecordSet},
};

/// JSON document: one array of objects, pretty-printed on disk.
///
/// Scalar values are coerced to text on read (numbers and booleans through
/// their display form, null to the empty string), so ids always compare as
/// text. An array of objects becomes the nested member collection; member
/// fields must be scalar, so a member carrying a further collection is
/// rejected in both directions.
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
        let values: Vec<Value> = serde_json::from_reader(reader).map_err(Error::Parse)?;
        let records = values
            .iter()
            .enumerate()
            .map(|(index, value)| record_from_value(value, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Format { records })
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        // Build every value before emitting bytes; a rejected record must
        // not leave partial output behind.
        let values = self
            .records
            .iter()
            .map(record_to_value)
            .collect::<Result<Vec<Value>, Error>>()?;
        serde_json::to_writer_pretty(writer, &values).map_err(Error::Parse)
    }
}

fn record_from_value(value: &Value, index: usize) -> Result<Record, Error> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::invalid_record(format!("element {} is not an object", index)))?;

    let mut fields = Vec::with_capacity(object.len());
    for (name, value) in object {
        fields.push(Field {
            name: name.clone(),
            value: field_value_from_json(name, value)?,
        });
    }
    Ok(Record { fields })
}

fn field_value_from_json(name: &str, value: &Value) -> Result<FieldValue, Error> {
    match value {
        Value::Array(items) => {
            let members = items
                .iter()
                .map(|item| member_from_value(name, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(FieldValue::Members(members))
        }
        other => Ok(FieldValue::Text(scalar_to_text(name, other)?)),
    }
}

fn member_from_value(field: &str, value: &Value) -> Result<Member, Error> {
    let object = value.as_object().ok_or_else(|| {
        Error::invalid_record(format!("field '{}' holds a non-object member", field))
    })?;

    let mut member = Member::new();
    for (name, value) in object {
        if name == "battles" {
            let items = value.as_array().ok_or_else(|| {
                Error::invalid_record(format!("member battles in '{}' is not an array", field))
            })?;
            member.battles = items
                .iter()
                .map(|item| scalar_to_text(name, item))
                .collect::<Result<Vec<_>, _>>()?;
        } else {
            let text = scalar_to_text(name, value)?;
            member.fields.push(Field {
                name: name.clone(),
                value: FieldValue::Text(text),
            });
        }
    }
    Ok(member)
}

fn scalar_to_text(name: &str, value: &Value) -> Result<String, Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::invalid_record(format!(
            "field '{}' holds an unsupported nested value",
            name
        ))),
    }
}

fn record_to_value(record: &Record) -> Result<Value, Error> {
    let mut object = Map::with_capacity(record.fields.len());
    for field in &record.fields {
        let value = match &field.value {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Members(members) => Value::Array(
                members
                    .iter()
                    .map(member_to_value)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        object.insert(field.name.clone(), value);
    }
    Ok(Value::Object(object))
}

fn member_to_value(member: &Member) -> Result<Value, Error> {
    let mut object = Map::with_capacity(member.fields.len() + 1);
    for field in &member.fields {
        match &field.value {
            FieldValue::Text(s) => {
                object.insert(field.name.clone(), Value::String(s.clone()));
            }
            FieldValue::Members(_) => {
                return Err(Error::invalid_record(format!(
                    "member field '{}' holds a nested member collection",
                    field.name
                )));
            }
        }
    }
    object.insert(
        "battles".to_string(),
        Value::Array(
            member
                .battles
                .iter()
                .map(|b| Value::String(b.clone()))
                .collect(),
        ),
    );
    Ok(Value::Object(object))
}
