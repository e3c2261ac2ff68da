//! One-shot command-line formatting, without the HTTP server.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pattern_core::FormatPolicy;
use pattern_docx::DocxWriter;
use pattern_engine::{DocumentAnalysis, DocumentProcessor};
use tracing::info;

fn analyze_file(input: &Path, policy: FormatPolicy) -> anyhow::Result<DocumentAnalysis> {
    let records = pattern_ingest::extract_records(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    Ok(DocumentProcessor::new(policy).process_lines(&records))
}

/// Print the analysis of `input` as JSON.
pub fn analyze(input: &Path, policy: FormatPolicy) -> anyhow::Result<()> {
    let analysis = analyze_file(input, policy)?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

/// Format `input` into a `.docx`, next to it unless `output` is given.
pub fn format(input: &Path, output: Option<&Path>, policy: FormatPolicy) -> anyhow::Result<PathBuf> {
    let analysis = analyze_file(input, policy)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));

    DocxWriter::default()
        .write_to(&analysis, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Formatted {} → {} ({} sections, short: {})",
        input.display(),
        output.display(),
        analysis.stats.sections,
        analysis.stats.is_short_document
    );
    Ok(output)
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    input.with_file_name(format!("{}_formatted.docx", stem))
}
