//! Tag-keyed construction of record handlers.

use std::path::{Path, PathBuf};

use crate::{
    error::Error,
    formats::FormatType,
    handler::{CsvHandler, JsonHandler, RecordHandler, XmlHandler},
};

/// Constructs the handler variant for a format.
///
/// Dispatch keys strictly on the format tag; the file path plays no part in
/// the selection and may carry any name or extension.
pub fn handler_for<P: Into<PathBuf>>(format: FormatType, path: P) -> Box<dyn RecordHandler> {
    match format {
        FormatType::Json => Box::new(JsonHandler::new(path)),
        FormatType::Csv => Box::new(CsvHandler::new(path)),
        FormatType::Xml => Box::new(XmlHandler::new(path)),
    }
}

/// Constructs the handler for a textual format tag.
///
/// Accepts the tags [`FormatType`] accepts (`"json"`, `"csv"`, `"xml"`,
/// case-insensitive); any other tag fails with
/// [`crate::error::Error::UnsupportedFormat`].
pub fn handler_for_tag<P: Into<PathBuf>>(
    tag: &str,
    path: P,
) -> Result<Box<dyn RecordHandler>, Error> {
    let format: FormatType = tag.parse()?;
    Ok(handler_for(format, path))
}

/// Constructs the handler for a path, inferring the format from the file
/// extension.
///
/// Fails with [`crate::error::Error::UnsupportedFormat`] when the
/// extension is missing or unknown.
pub fn handler_for_path<P: AsRef<Path>>(path: P) -> Result<Box<dyn RecordHandler>, Error> {
    let format = infer_format_from_extension(&path)
        .ok_or_else(|| Error::UnsupportedFormat(path.as_ref().display().to_string()))?;
    Ok(handler_for(format, path.as_ref().to_path_buf()))
}

/// Infers the record file format from a path's extension.
///
/// # Example
/// ```rust
/// use flatrec::factory::infer_format_from_extension;
/// use flatrec::formats::FormatType;
/// assert_eq!(
///     infer_format_from_extension("marines.json"),
///     Some(FormatType::Json)
/// );
/// assert_eq!(
///     infer_format_from_extension("marines.csv"),
///     Some(FormatType::Csv)
/// );
/// assert_eq!(infer_format_from_extension("marines.txt"), None);
/// ```
pub fn infer_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FormatType> {
    let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "json" => Some(FormatType::Json),
        "csv" => Some(FormatType::Csv),
        "xml" => Some(FormatType::Xml),
        _ => None,
    }
}
