//! Pattern Formatter Ingest — uploaded files to line records.

pub mod docx;
pub mod file;

pub use file::{extract_records, records_from_bytes, FileType};
