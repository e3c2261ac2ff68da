//! Line-record extraction for the supported upload formats.

use pattern_core::{lines_from_text, Error, LineRecord, Result};
use std::io::Cursor;
use std::path::Path;

use crate::docx;

/// Supported file types for record extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Docx,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Self::PlainText,
            "md" | "markdown" => Self::Markdown,
            "docx" => Self::Docx,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    /// Check if this is a text-based file type.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::PlainText | Self::Markdown)
    }
}

/// Extract line records from a file on disk.
pub fn extract_records(path: &Path) -> Result<Vec<LineRecord>> {
    let file_type = FileType::from_path(path);
    if file_type == FileType::Unknown {
        return Err(Error::UnsupportedFormat(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    records_from_bytes(&bytes, file_type)
}

/// Extract line records from an in-memory upload.
pub fn records_from_bytes(bytes: &[u8], file_type: FileType) -> Result<Vec<LineRecord>> {
    match file_type {
        FileType::PlainText | FileType::Markdown => {
            let text = String::from_utf8_lossy(bytes);
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
            Ok(lines_from_text(text))
        }
        FileType::Docx => docx::read_docx(Cursor::new(bytes)),
        FileType::Unknown => Err(Error::UnsupportedFormat(
            "expected .txt, .md or .docx".to_string(),
        )),
    }
}
