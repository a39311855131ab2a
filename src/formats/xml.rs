//! Support for the XML record format.
//!
//! The document shape is a `<records>` root holding one `<record>` element
//! per record; scalar fields are child elements named for the field, and the
//! nested member collection is a run of `<members>` elements, one per member,
//! each carrying its own scalar children plus repeated `<battles>` elements.
//! Members are scoped to their parent record.

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{Field, FieldValue, Member, Record, RecordSet},
};

/// XML document codec.
///
/// Reading is lenient: unknown structure outside the shapes above is
/// skipped, text is trimmed, and entities are unescaped. A truncated
/// document fails with an invalid record error; malformed markup fails
/// with an XML parse error.
///
/// Writing validates field names as XML element names. The name
/// `"members"` is reserved for the member collection: a scalar field with
/// that name, or a member collection under any other name, cannot be
/// represented and is rejected. Member fields must be scalar; a member
/// whose field nests a further collection is rejected as well.
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
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut records = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if e.name().as_ref() == b"record" => {
                    let record = parse_record(&mut xml_reader)?;
                    records.push(record);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }
        Ok(Format { records })
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        // Reject unrepresentable records before emitting any bytes.
        for record in &self.records {
            validate_record(record)?;
        }

        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 2);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        xml_writer.write_event(Event::Start(BytesStart::new("records")))?;

        for record in &self.records {
            write_record(&mut xml_writer, record)?;
        }

        xml_writer.write_event(Event::End(BytesEnd::new("records")))?;
        Ok(())
    }
}

/// Parses one `<record>` element, consuming events through its end tag.
///
/// Every `<members>` child becomes one member; repeated members aggregate
/// into a single members field at the position of the first one.
fn parse_record<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<Record, Error> {
    let mut record = Record::new();
    let mut buf = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"members" => {
                let member = parse_member(xml_reader)?;
                push_member(&mut record, member);
            }
            Ok(Event::Start(ref e)) => {
                let name = decode_name(e);
                let text = read_text(xml_reader)?;
                record.fields.push(Field {
                    name,
                    value: FieldValue::Text(text),
                });
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"members" => {
                push_member(&mut record, Member::new());
            }
            Ok(Event::Empty(ref e)) => {
                let name = decode_name(e);
                record.fields.push(Field {
                    name,
                    value: FieldValue::Text(String::new()),
                });
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"record" => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_record("unexpected EOF inside record"));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(record)
}

/// Parses one `<members>` element into a member, consuming events through
/// its end tag. `<battles>` children feed the battles sequence; any other
/// child becomes a scalar field.
fn parse_member<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<Member, Error> {
    let mut member = Member::new();
    let mut buf = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = decode_name(e);
                let text = read_text(xml_reader)?;
                if name == "battles" {
                    member.battles.push(text);
                } else {
                    member.fields.push(Field {
                        name,
                        value: FieldValue::Text(text),
                    });
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = decode_name(e);
                if name == "battles" {
                    member.battles.push(String::new());
                } else {
                    member.fields.push(Field {
                        name,
                        value: FieldValue::Text(String::new()),
                    });
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"members" => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_record("unexpected EOF inside members"));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(member)
}

/// Reads the text content of the current element, consuming its end tag.
fn read_text<R: BufRead>(xml_reader: &mut Reader<R>) -> Result<String, Error> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => {
                text = e.unescape().map_err(Error::XmlParse)?.to_string();
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_record("unexpected EOF inside element"));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
        buf.clear();
    }
    Ok(text)
}

fn push_member(record: &mut Record, member: Member) {
    if let Some(FieldValue::Members(members)) = record
        .fields
        .iter_mut()
        .find(|f| f.name == "members")
        .map(|f| &mut f.value)
    {
        members.push(member);
    } else {
        record.fields.push(Field {
            name: "members".to_string(),
            value: FieldValue::Members(vec![member]),
        });
    }
}

fn decode_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Checks that a record fits the document shape before any of it is written.
fn validate_record(record: &Record) -> Result<(), Error> {
    for field in &record.fields {
        match &field.value {
            FieldValue::Text(_) => {
                if field.name == "members" {
                    return Err(Error::invalid_record(
                        "field 'members' is reserved for the member collection",
                    ));
                }
                validate_element_name(&field.name)?;
            }
            FieldValue::Members(members) => {
                if field.name != "members" {
                    return Err(Error::invalid_record(format!(
                        "member collection must be named 'members', got '{}'",
                        field.name
                    )));
                }
                for member in members {
                    for member_field in &member.fields {
                        match &member_field.value {
                            FieldValue::Text(_) => {
                                validate_element_name(&member_field.name)?;
                            }
                            FieldValue::Members(_) => {
                                return Err(Error::invalid_record(format!(
                                    "member field '{}' holds a nested member collection",
                                    member_field.name
                                )));
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn validate_element_name(name: &str) -> Result<(), Error> {
    if valid_element_name(name) {
        Ok(())
    } else {
        Err(Error::invalid_record(format!(
            "field name '{}' is not a valid XML element name",
            name
        )))
    }
}

fn write_record<W: Write>(xml_writer: &mut Writer<W>, record: &Record) -> Result<(), Error> {
    xml_writer.write_event(Event::Start(BytesStart::new("record")))?;

    for field in &record.fields {
        match &field.value {
            FieldValue::Text(text) => write_text_element(xml_writer, &field.name, text)?,
            FieldValue::Members(members) => {
                for member in members {
                    write_member(xml_writer, member)?;
                }
            }
        }
    }

    xml_writer.write_event(Event::End(BytesEnd::new("record")))?;
    Ok(())
}

fn write_member<W: Write>(xml_writer: &mut Writer<W>, member: &Member) -> Result<(), Error> {
    xml_writer.write_event(Event::Start(BytesStart::new("members")))?;

    for field in &member.fields {
        if let FieldValue::Text(text) = &field.value {
            write_text_element(xml_writer, &field.name, text)?;
        }
    }
    for battle in &member.battles {
        write_text_element(xml_writer, "battles", battle)?;
    }

    xml_writer.write_event(Event::End(BytesEnd::new("members")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    xml_writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), Error> {
    xml_writer.write_event(Event::Start(BytesStart::new(name)))?;
    xml_writer.write_event(Event::Text(BytesText::new(text)))?;
    xml_writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Parser;

    #[test]
    fn test_parse_basic_records() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
        <records>
            <record>
                <id>1</id>
                <name>Ripley</name>
            </record>
            <record>
                <id>2</id>
                <name>Hicks</name>
            </record>
        </records>
        "#;
        let format = Format::from_str(xml).unwrap();
        assert_eq!(format.records.len(), 2);
        assert_eq!(format.records[0].id(), Some("1"));
        assert_eq!(format.records[0].text("name"), Some("Ripley"));
        assert_eq!(format.records[1].id(), Some("2"));
    }

    #[test]
    fn test_members_scoped_per_record() {
        let xml = r#"
        <records>
            <record>
                <id>1</id>
                <legionName>Hellhounds</legionName>
                <members>
                    <name>Vasquez</name>
                    <battles>LV-426</battles>
                    <battles>Fury 161</battles>
                </members>
                <members>
                    <name>Hudson</name>
                </members>
            </record>
            <record>
                <id>2</id>
                <legionName>Wolfpack</legionName>
                <members>
                    <name>Apone</name>
                    <battles>LV-426</battles>
                </members>
            </record>
        </records>
        "#;
        let format = Format::from_str(xml).unwrap();
        assert_eq!(format.records.len(), 2);

        let first = &format.records[0];
        match first.get("members") {
            Some(FieldValue::Members(members)) => {
                assert_eq!(members.len(), 2);
                assert_eq!(members[0].text("name"), Some("Vasquez"));
                assert_eq!(
                    members[0].battles,
                    vec!["LV-426".to_string(), "Fury 161".to_string()]
                );
                assert_eq!(members[1].text("name"), Some("Hudson"));
                assert!(members[1].battles.is_empty());
            }
            other => panic!("expected members, got {:?}", other),
        }

        // The second record keeps only its own member.
        let second = &format.records[1];
        match second.get("members") {
            Some(FieldValue::Members(members)) => {
                assert_eq!(members.len(), 1);
                assert_eq!(members[0].text("name"), Some("Apone"));
            }
            other => panic!("expected members, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_element_is_empty_text() {
        let xml = "<records><record><id>1</id><note/></record></records>";
        let format = Format::from_str(xml).unwrap();
        assert_eq!(format.records[0].text("note"), Some(""));
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let xml = "<records><record><id>1</id><quote>Stay frosty &amp; alert</quote></record></records>";
        let format = Format::from_str(xml).unwrap();
        assert_eq!(
            format.records[0].text("quote"),
            Some("Stay frosty & alert")
        );
    }

    #[test]
    fn test_parse_skips_unknown_top_level_elements() {
        let xml = r#"
        <records>
            <generatedBy>legion-tool</generatedBy>
            <record><id>1</id></record>
        </records>
        "#;
        let format = Format::from_str(xml).unwrap();
        assert_eq!(format.records.len(), 1);
        assert_eq!(format.records[0].id(), Some("1"));
    }

    #[test]
    fn test_truncated_document_is_an_error() {
        // Truncation surfaces as an invalid record or, depending on where
        // the input ends, as an XML parse error; never as records.
        let result = Format::from_str("<records><record><id>1</id>");
        assert!(matches!(
            result,
            Err(Error::InvalidRecord(_) | Error::XmlParse(_))
        ));
    }

    #[test]
    fn test_mismatched_tag_is_xml_parse_error() {
        let result = Format::from_str("<records><record></zzz></records>");
        assert!(matches!(result, Err(Error::XmlParse(_))));
    }

    #[test]
    fn test_round_trip_serialization() {
        let format = Format::with_records(vec![
            Record::new()
                .with_text("id", "1")
                .with_text("legionName", "Hellhounds")
                .with_members(
                    "members",
                    vec![
                        Member::new()
                            .with_text("name", "Vasquez")
                            .with_battles(["LV-426", "Fury 161"]),
                        Member::new().with_text("name", "Hudson"),
                    ],
                ),
            Record::new().with_text("id", "2").with_text("legionName", "Wolfpack"),
        ]);
        let mut out = Vec::new();
        format.to_writer(&mut out).unwrap();
        let reparsed = Format::from_str(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(format, reparsed);
    }

    #[test]
    fn test_write_escapes_text() {
        let format = Format::with_records(vec![
            Record::new().with_text("id", "1").with_text("quote", "a < b & c"),
        ]);
        let mut out = Vec::new();
        format.to_writer(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a &lt; b &amp; c"));
        let reparsed = Format::from_str(&text).unwrap();
        assert_eq!(reparsed.records[0].text("quote"), Some("a < b & c"));
    }

    #[test]
    fn test_write_empty_set() {
        let mut out = Vec::new();
        Format::new().to_writer(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("<records>"));
        let reparsed = Format::from_str(&text).unwrap();
        assert!(reparsed.records.is_empty());
    }

    #[test]
    fn test_write_rejects_invalid_element_name() {
        let format = Format::with_records(vec![
            Record::new().with_text("id", "1").with_text("bad name", "x"),
        ]);
        let mut out = Vec::new();
        assert!(matches!(
            format.to_writer(&mut out),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_write_rejects_scalar_members_field() {
        let format = Format::with_records(vec![
            Record::new().with_text("id", "1").with_text("members", "oops"),
        ]);
        let mut out = Vec::new();
        assert!(matches!(
            format.to_writer(&mut out),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_write_rejects_nested_member_collection() {
        let mut leader = Member::new().with_text("name", "Apone");
        leader.fields.push(Field {
            name: "fireteam".to_string(),
            value: FieldValue::Members(vec![Member::new().with_text("name", "Drake")]),
        });
        let format = Format::with_records(vec![
            Record::new().with_text("id", "1").with_members("members", vec![leader]),
        ]);
        let mut out = Vec::new();
        assert!(matches!(
            format.to_writer(&mut out),
            Err(Error::InvalidRecord(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_rejects_misnamed_member_collection() {
        let format = Format::with_records(vec![Record::new().with_text("id", "1").with_members(
            "squad",
            vec![Member::new().with_text("name", "Drake")],
        )]);
        let mut out = Vec::new();
        assert!(matches!(
            format.to_writer(&mut out),
            Err(Error::InvalidRecord(_))
        ));
    }
}
