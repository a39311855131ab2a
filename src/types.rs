//! Core, format-agnostic types for flatrec.
//! Format codecs decode into these; handlers read and rewrite them.

/// The full in-memory materialization of one file's records.
///
/// Produced whole by `read`, consumed and rewritten whole by every mutation.
pub type RecordSet = Vec<Record>;

/// A single persisted record: an ordered sequence of named fields.
///
/// Field order is significant and survives parse/serialize round trips.
/// The field named `"id"`, when present with a text value, is the key used
/// by update and delete. Uniqueness of ids is a contract on the caller,
/// not enforced here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Ordered list of all fields in this record.
    pub fields: Vec<Field>,
}

/// One named field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name (also the CSV column / XML element name).
    pub name: String,

    /// Field value.
    pub value: FieldValue,
}

/// The value axis of a field.
///
/// Scalars are always text, even when they look numeric; ids compare as
/// text across all formats. `Members` holds the nested member collection,
/// representable in JSON and XML but not in CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A scalar text value.
    Text(String),

    /// A nested collection of member sub-records.
    Members(Vec<Member>),
}

/// One member of a record's nested collection.
///
/// Carries its own scalar fields plus the battles sequence, which is
/// always materialized (possibly empty). Member fields are text-valued;
/// a member whose field nests a further collection cannot be serialized
/// by any format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Member {
    /// Ordered scalar fields of this member.
    pub fields: Vec<Field>,

    /// Battles this member participated in.
    pub battles: Vec<String>,
}

impl Record {
    /// Creates a new, empty record.
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Adds a text field, consuming and returning the record for chaining.
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_text(name, value);
        self
    }

    /// Adds a members field, consuming and returning the record for chaining.
    pub fn with_members(mut self, name: impl Into<String>, members: Vec<Member>) -> Self {
        self.set(name, FieldValue::Members(members));
        self
    }

    /// Sets a field value, replacing an existing field of the same name in
    /// place (position preserved) or appending a new one.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == name) {
            existing.value = value;
        } else {
            self.fields.push(Field { name, value });
        }
    }

    /// Sets a text field. See [`Record::set`].
    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, FieldValue::Text(value.into()));
    }

    /// Finds a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Returns the text value of a field, if the field exists and is scalar.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns this record's id, if it has a scalar `"id"` field.
    ///
    /// A record without one (or whose id field holds members) has no id
    /// and never matches an update or delete.
    pub fn id(&self) -> Option<&str> {
        self.text("id")
    }

    /// Merges an update payload into this record.
    ///
    /// Rules:
    /// - Only fields already present in `self` are considered.
    /// - A payload field with a matching name replaces the stored value
    ///   in place; field order does not change.
    /// - Payload fields with no counterpart are ignored; stored fields
    ///   absent from the payload are preserved.
    pub fn merge_from(&mut self, update: &Record) {
        for field in &update.fields {
            if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
                existing.value = field.value.clone();
            }
        }
    }

    /// Returns the field names in order, as used for the CSV header.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl Member {
    /// Creates a new, empty member.
    pub fn new() -> Self {
        Member {
            fields: Vec::new(),
            battles: Vec::new(),
        }
    }

    /// Adds a scalar field, consuming and returning the member for chaining.
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        });
        self
    }

    /// Sets the battles sequence, consuming and returning the member.
    pub fn with_battles<I, S>(mut self, battles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.battles = battles.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the text value of a field, if present.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).and_then(|f| match &f.value {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
