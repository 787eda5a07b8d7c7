//! Uploaded documents: type and size checks, text extraction and the
//! helpers used when mining words from the extracted text.

pub mod parser;

pub use parser::{
    extract_sentence, generate_file_key, parse_file_content, resolve_mime_type, validate_size,
    DOCX_MIME, MAX_FILE_SIZE, TXT_MIME,
};
