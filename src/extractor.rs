//! Document extractor for uploaded profiles and analysis material.
//!
//! Uploads are accepted by extension (`pdf`, `docx`, `doc`), capped in size,
//! and converted to plain text. PDF text comes from `pdf-extract`; DOCX is
//! unpacked with `zip` and the `word/document.xml` runs are pulled out with
//! `quick-xml`. Legacy `.doc` files pass the format check but cannot be
//! parsed, which surfaces as an ordinary extraction error the user can
//! recover from by re-uploading a supported format.

use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::path::Path;

/// Upload size cap, enforced before extraction is attempted.
pub const MAX_DOCUMENT_BYTES: u64 = 15 * 1024 * 1024;

/// Accepted file extensions, matched case-insensitively against the final
/// extension component only.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "doc"];

/// Failure modes of document ingestion.
#[derive(Debug, Clone)]
pub enum ExtractError {
    /// The file extension is not one of the supported formats.
    Format(String),
    /// The file exceeds [`MAX_DOCUMENT_BYTES`].
    TooLarge(u64),
    /// The file could not be parsed into text.
    Parse(String),
    /// Parsing succeeded but produced no usable text.
    Empty,
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Format(name) => write!(f, "unsupported file format: {name}"),
            ExtractError::TooLarge(size) => write!(f, "file too large: {size} bytes"),
            ExtractError::Parse(msg) => write!(f, "extraction failed: {msg}"),
            ExtractError::Empty => write!(f, "no text found in document"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Returns true iff the final extension component of `file_name` is exactly
/// one of the supported formats, case-insensitively. `report.pdf.exe` is
/// rejected; `REPORT.PDF` is accepted.
pub fn verify_format(file_name: &str) -> bool {
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Returns true iff a declared size is acceptable for download and
/// extraction.
pub fn check_size(size: u64) -> bool {
    size > 0 && size <= MAX_DOCUMENT_BYTES
}

/// Converts an uploaded document to plain text.
pub fn extract(data: &[u8], file_name: &str) -> Result<String, ExtractError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ExtractError::Format(file_name.to_string()))?;

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(data)
            .map_err(|err| ExtractError::Parse(err.to_string()))?,
        "docx" => extract_docx(data)?,
        "doc" => {
            return Err(ExtractError::Parse(
                "legacy .doc files cannot be parsed; please convert to PDF or DOCX".to_string(),
            ))
        }
        _ => return Err(ExtractError::Format(file_name.to_string())),
    };

    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    Ok(text)
}

/// Pulls the text runs out of a DOCX `word/document.xml`, with paragraph
/// boundaries as newlines.
fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|err| ExtractError::Parse(err.to_string()))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|err| ExtractError::Parse(err.to_string()))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|err| ExtractError::Parse(err.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(XmlEvent::Start(element)) if element.local_name().as_ref() == b"t" => {
                in_text_run = true;
            }
            Ok(XmlEvent::End(element)) => match element.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(XmlEvent::Text(content)) if in_text_run => {
                let run = content
                    .unescape()
                    .map_err(|err| ExtractError::Parse(err.to_string()))?;
                text.push_str(&run);
            }
            Ok(XmlEvent::Eof) => break,
            Err(err) => return Err(ExtractError::Parse(err.to_string())),
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_format_accepts_supported_extensions() {
        assert!(verify_format("profile.pdf"));
        assert!(verify_format("profile.docx"));
        assert!(verify_format("profile.doc"));
        assert!(verify_format("PROFILE.PDF"));
        assert!(verify_format("annual.report.pdf"));
    }

    #[test]
    fn test_verify_format_rejects_everything_else() {
        assert!(!verify_format("profile.txt"));
        assert!(!verify_format("profile.exe"));
        // Only the final extension component counts.
        assert!(!verify_format("profile.pdf.exe"));
        assert!(!verify_format("profile"));
        assert!(!verify_format(""));
    }

    #[test]
    fn test_check_size() {
        assert!(check_size(1));
        assert!(check_size(MAX_DOCUMENT_BYTES));
        assert!(!check_size(0));
        assert!(!check_size(MAX_DOCUMENT_BYTES + 1));
    }

    #[test]
    fn test_legacy_doc_is_a_parse_error() {
        let result = extract(b"\xd0\xcf\x11\xe0", "profile.doc");
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }
}
