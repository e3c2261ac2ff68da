//! Line records: the unit of input handed to the document processor.

use serde::{Deserialize, Serialize};

pub const DEFAULT_STYLE: &str = "Normal";
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// One source line (plain text) or paragraph (Word document).
///
/// `style`, `bold` and `font_size` carry the author's original formatting
/// when the source was an already-formatted document; plain text gets the
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub text: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_style() -> String {
    DEFAULT_STYLE.into()
}
fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

impl LineRecord {
    /// A record for a plain-text line.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: DEFAULT_STYLE.into(),
            bold: false,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Split raw text into plain records.
///
/// Accepts `\r\n`, `\n` and bare `\r` line endings. A trailing line
/// terminator does not produce an extra empty record.
pub fn lines_from_text(text: &str) -> Vec<LineRecord> {
    if text.is_empty() {
        return Vec::new();
    }
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
    body.split('\n').map(LineRecord::plain).collect()
}
