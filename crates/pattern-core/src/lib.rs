//! Pattern Formatter Core — errors, configuration, line-record input contract.

pub mod config;
pub mod error;
pub mod record;

pub use config::{DataPaths, FormatPolicy, FormatterConfig, NumberingPreference};
pub use error::{Error, Result};
pub use record::{lines_from_text, LineRecord};
