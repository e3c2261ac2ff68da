//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Paths to all formatter data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Generated documents (`data/outputs/`).
    pub outputs: PathBuf,
    /// Formatting policy overrides (`data/policy.json`).
    pub policy_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            outputs: root.join("outputs"),
            policy_file: root.join("policy.json"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.outputs)?;
        Ok(())
    }

    /// Location of the generated document for a job.
    pub fn output_for(&self, job_id: &str) -> PathBuf {
        self.outputs.join(format!("{}_formatted.docx", job_id))
    }
}

/// How numbered lists are carried into the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingPreference {
    /// Keep list markers exactly as written.
    #[default]
    Preserve,
    /// Renumber lists sequentially in each list's own scheme.
    Auto,
}

impl std::str::FromStr for NumberingPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown numbering preference '{}'", other)),
        }
    }
}

/// Tunable thresholds of the structure engine and page-break policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPolicy {
    /// Lines at or above this length are never headings.
    pub short_line_chars: usize,
    /// Heuristic (ALL-CAPS / Title-Case) headings must be shorter than this.
    pub very_short_line_chars: usize,
    /// Characters per estimated page.
    pub chars_per_page: f64,
    /// Documents estimated below this many pages are short.
    pub short_document_pages: f64,
    /// Documents with fewer sections than this are short.
    pub short_document_sections: usize,
    /// A list item this many words long renders the list as paragraphs.
    pub substantial_item_words: usize,
    pub numbering: NumberingPreference,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            short_line_chars: 100,
            very_short_line_chars: 50,
            chars_per_page: 2000.0,
            short_document_pages: 5.0,
            short_document_sections: 5,
            substantial_item_words: 30,
            numbering: NumberingPreference::Preserve,
        }
    }
}

impl FormatPolicy {
    /// Load policy from a JSON file, falling back to defaults, then apply
    /// `PATTERN_*` environment overrides.
    pub fn load(path: &Path) -> Self {
        let mut policy: FormatPolicy = match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(p) => {
                    info!("Loaded formatting policy from {}", path.display());
                    p
                }
                Err(e) => {
                    warn!("Ignoring malformed policy file {}: {}", path.display(), e);
                    FormatPolicy::default()
                }
            },
            Err(_) => FormatPolicy::default(),
        };
        policy.apply_env();
        policy
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("PATTERN_SHORT_LINE_CHARS") {
            self.short_line_chars = v;
        }
        if let Some(v) = env_parse("PATTERN_VERY_SHORT_LINE_CHARS") {
            self.very_short_line_chars = v;
        }
        if let Some(v) = env_parse("PATTERN_CHARS_PER_PAGE") {
            self.chars_per_page = v;
        }
        if let Some(v) = env_parse("PATTERN_SHORT_DOC_PAGES") {
            self.short_document_pages = v;
        }
        if let Some(v) = env_parse("PATTERN_SHORT_DOC_SECTIONS") {
            self.short_document_sections = v;
        }
        if let Some(v) = env_parse("PATTERN_SUBSTANTIAL_ITEM_WORDS") {
            self.substantial_item_words = v;
        }
        if let Some(v) = env_parse("PATTERN_NUMBERING") {
            self.numbering = v;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Top-level formatter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Engine and layout thresholds.
    pub policy: FormatPolicy,
}

impl FormatterConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = env_parse("PORT").unwrap_or(5000);
        let max_upload_mb: usize = env_parse("PATTERN_MAX_UPLOAD_MB").unwrap_or(16);

        let data_paths = DataPaths::new(data_dir)?;
        let policy = FormatPolicy::load(&data_paths.policy_file);

        Ok(Self {
            port,
            data_paths,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            policy,
        })
    }
}
