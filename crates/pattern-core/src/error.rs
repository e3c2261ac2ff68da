//! Error types for the formatter.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
