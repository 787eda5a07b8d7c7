use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{AppError, FileError};
use crate::Result;

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TXT_MIME: &str = "text/plain";

const DOCX_BODY: &str = "word/document.xml";
/// Upper bound on the inflated document body.
const MAX_DOCX_BODY_SIZE: u64 = 4 * MAX_FILE_SIZE as u64;

/// Determines the MIME type to store and parse with. Browsers sometimes send
/// an empty or generic content type, in which case the file extension decides.
pub fn resolve_mime_type(content_type: Option<&str>, filename: &str) -> Result<&'static str> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .unwrap_or_default();

    match declared.as_str() {
        DOCX_MIME => return Ok(DOCX_MIME),
        TXT_MIME => return Ok(TXT_MIME),
        "" | "application/octet-stream" => {}
        _ => return Err(FileError::UnsupportedType.into()),
    }

    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".docx") {
        Ok(DOCX_MIME)
    } else if lower.ends_with(".txt") {
        Ok(TXT_MIME)
    } else {
        Err(FileError::UnsupportedType.into())
    }
}

pub fn validate_size(size: usize) -> Result<()> {
    if size > MAX_FILE_SIZE {
        return Err(too_large());
    }
    Ok(())
}

fn too_large() -> AppError {
    FileError::TooLarge {
        max_mb: MAX_FILE_SIZE / (1024 * 1024),
    }
    .into()
}

/// Extracts the plain text of an uploaded document. Fails with
/// [`FileError::Empty`] when nothing readable is left after trimming.
pub fn parse_file_content(data: &[u8], mime_type: &str) -> Result<String> {
    let text = match mime_type {
        DOCX_MIME => parse_docx(data)?,
        TXT_MIME => String::from_utf8_lossy(data).trim().to_string(),
        _ => return Err(FileError::UnsupportedType.into()),
    };

    if text.is_empty() {
        return Err(FileError::Empty.into());
    }
    Ok(text)
}

fn parse_docx(data: &[u8]) -> Result<String> {
    let xml = read_docx_body(data, MAX_DOCX_BODY_SIZE)?;
    docx_text(&xml)
}

/// Reads `word/document.xml`, refusing bodies that inflate past `cap` bytes.
/// The size in the zip header is checked first, then enforced while reading.
fn read_docx_body(data: &[u8], cap: u64) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(parse_error)?;
    let entry = archive.by_name(DOCX_BODY).map_err(parse_error)?;
    if entry.size() > cap {
        return Err(too_large());
    }

    let mut xml = Vec::new();
    entry
        .take(cap + 1)
        .read_to_end(&mut xml)
        .map_err(parse_error)?;
    if xml.len() as u64 > cap {
        return Err(too_large());
    }

    String::from_utf8(xml).map_err(parse_error)
}

/// Walks WordprocessingML and keeps the contents of `w:t` runs, turning
/// paragraph ends, tabs and line breaks into their plain-text equivalents.
fn docx_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                text.push_str(&t.unescape().map_err(parse_error)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}

fn parse_error(err: impl std::fmt::Display) -> AppError {
    FileError::Parse(err.to_string()).into()
}

/// The sentence around a selection, bounded by `.`, `!`, `?` or a newline.
/// Offsets count characters, not bytes. The terminating punctuation is kept.
pub fn extract_sentence(text: &str, selection_start: usize, selection_end: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let is_ender = |c: char| matches!(c, '.' | '!' | '?' | '\n');
    let start_at = selection_start.min(chars.len());
    let end_at = selection_end.max(start_at).min(chars.len());

    let start = chars[..start_at]
        .iter()
        .rposition(|&c| is_ender(c))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = chars[end_at..]
        .iter()
        .position(|&c| is_ender(c))
        .map(|i| end_at + i + 1)
        .unwrap_or(chars.len());

    chars[start..end].iter().collect::<String>().trim().to_string()
}

/// Storage key for an upload: `files/{user}/{millis}-{name}` with every
/// character outside `[A-Za-z0-9.-]` replaced by `_`.
pub fn generate_file_key(user_id: &uuid::Uuid, filename: &str, millis: i64) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("files/{}/{}-{}", user_id, millis, sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use uuid::Uuid;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::FileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            zip.start_file(DOCX_BODY, options).unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_resolve_mime_type() {
        assert_eq!(resolve_mime_type(Some("text/plain; charset=utf-8"), "a.txt").unwrap(), TXT_MIME);
        assert_eq!(resolve_mime_type(Some(DOCX_MIME), "whatever").unwrap(), DOCX_MIME);
        assert_eq!(resolve_mime_type(None, "Notes.DOCX").unwrap(), DOCX_MIME);
        assert_eq!(
            resolve_mime_type(Some("application/octet-stream"), "notes.txt").unwrap(),
            TXT_MIME
        );
        assert!(resolve_mime_type(Some("application/pdf"), "paper.pdf").is_err());
        assert!(resolve_mime_type(None, "image.png").is_err());
    }

    #[test]
    fn test_size_limit() {
        assert!(validate_size(MAX_FILE_SIZE).is_ok());
        let err = validate_size(MAX_FILE_SIZE + 1).unwrap_err();
        assert_eq!(err.to_string(), "File error: File too large. Max size: 10MB");
    }

    #[test]
    fn test_parse_txt() {
        let text = parse_file_content(b"  Hello there.\nSecond line.  \n", TXT_MIME).unwrap();
        assert_eq!(text, "Hello there.\nSecond line.");
    }

    #[test]
    fn test_parse_txt_invalid_utf8_is_lossy() {
        let text = parse_file_content(&[b'h', b'i', 0xff], TXT_MIME).unwrap();
        assert!(text.starts_with("hi"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = parse_file_content(b"   \n ", TXT_MIME).unwrap_err();
        assert!(matches!(err, AppError::FileError(FileError::Empty)));
    }

    #[test]
    fn test_parse_docx() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Fish &amp; chips</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve">are </w:t></w:r><w:r><w:t>great.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Line one</w:t><w:br/><w:t>line two</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = parse_file_content(&docx_bytes(xml), DOCX_MIME).unwrap();
        assert_eq!(text, "Fish & chips\tare great.\nLine one\nline two");
    }

    #[test]
    fn test_docx_body_over_cap_rejected() {
        let xml = format!(
            "<w:document><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            "a".repeat(64 * 1024)
        );
        let data = docx_bytes(&xml);
        assert!(data.len() < 4 * 1024);

        let err = read_docx_body(&data, 16 * 1024).unwrap_err();
        assert!(matches!(err, AppError::FileError(FileError::TooLarge { .. })));
        assert!(read_docx_body(&data, xml.len() as u64).is_ok());
    }

    #[test]
    fn test_highly_compressible_docx_rejected() {
        let xml = format!(
            "<w:document><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            "a".repeat(MAX_DOCX_BODY_SIZE as usize)
        );
        let data = docx_bytes(&xml);
        assert!(validate_size(data.len()).is_ok());

        let err = parse_file_content(&data, DOCX_MIME).unwrap_err();
        assert!(matches!(err, AppError::FileError(FileError::TooLarge { .. })));
    }

    #[test]
    fn test_corrupt_docx() {
        let err = parse_file_content(b"definitely not a zip", DOCX_MIME).unwrap_err();
        assert!(matches!(err, AppError::FileError(FileError::Parse(_))));
    }

    #[test]
    fn test_extract_sentence() {
        let text = "First sentence. The cat sat down! Last one";
        let start = text.find("cat").unwrap();
        assert_eq!(extract_sentence(text, start, start + 3), "The cat sat down!");
        assert_eq!(extract_sentence(text, 0, 5), "First sentence.");
        let last = text.find("Last").unwrap();
        assert_eq!(extract_sentence(text, last, last + 4), "Last one");
    }

    #[test]
    fn test_extract_sentence_counts_characters() {
        let text = "გამარჯობა. ეს არის ტესტი? კი";
        let start = text.chars().position(|c| c == 'ტ').unwrap();
        assert_eq!(extract_sentence(text, start, start + 5), "ეს არის ტესტი?");
    }

    #[test]
    fn test_extract_sentence_clamps_offsets() {
        assert_eq!(extract_sentence("Short text", 50, 80), "Short text");
    }

    #[test]
    fn test_generate_file_key() {
        let user = Uuid::nil();
        assert_eq!(
            generate_file_key(&user, "my notes (v2).docx", 1700000000000),
            "files/00000000-0000-0000-0000-000000000000/1700000000000-my_notes__v2_.docx"
        );
        assert_eq!(
            generate_file_key(&user, "ქართული.txt", 1),
            "files/00000000-0000-0000-0000-000000000000/1-_______.txt"
        );
    }
}
