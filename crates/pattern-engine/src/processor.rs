//! Document processor — classification pass, structuring pass, stats and
//! layout plan for one document.

use pattern_core::{lines_from_text, FormatPolicy, LineRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{LineClassification, LineContext, LineKind, PatternEngine};
use crate::policy::{self, LayoutPlan};
use crate::structure::{self, ContentItem, Section};

/// Aggregate counters for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_lines: usize,
    pub empty_lines: usize,
    pub headings: usize,
    pub paragraphs: usize,
    pub references: usize,
    /// Tables emitted by the structuring pass, not table lines.
    pub tables: usize,
    /// List lines.
    pub lists: usize,
    pub definitions: usize,
    pub figures: usize,
    pub words: usize,
    pub characters: usize,
    pub sections: usize,
    pub estimated_pages: f64,
    pub is_short_document: bool,
}

impl DocumentStats {
    fn count(&mut self, line: &LineClassification) {
        match line.kind {
            LineKind::Empty | LineKind::HorizontalRule => self.empty_lines += 1,
            LineKind::Heading => self.headings += 1,
            LineKind::Paragraph => self.paragraphs += 1,
            LineKind::Reference => self.references += 1,
            LineKind::BulletList | LineKind::NumberedList => self.lists += 1,
            LineKind::Definition => self.definitions += 1,
            LineKind::Figure => self.figures += 1,
            LineKind::TableStart | LineKind::TableEnd | LineKind::TableCaption | LineKind::TableRow => {}
        }
        if !line.content.is_empty() {
            self.words += line.content.split_whitespace().count();
            self.characters += line.content.chars().count();
        }
    }
}

/// Everything the document writer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub analyzed: Vec<LineClassification>,
    pub structured: Vec<Section>,
    pub stats: DocumentStats,
    pub layout: LayoutPlan,
}

/// Runs the two passes over a document. Holds no per-document state, so
/// one processor may be reused; each request in the server builds its own.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    engine: PatternEngine,
    policy: FormatPolicy,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(FormatPolicy::default())
    }
}

impl DocumentProcessor {
    pub fn new(policy: FormatPolicy) -> Self {
        Self {
            engine: PatternEngine::new(&policy),
            policy,
        }
    }

    pub fn engine(&self) -> &PatternEngine {
        &self.engine
    }

    pub fn policy(&self) -> &FormatPolicy {
        &self.policy
    }

    /// Process raw text. `\r\n`, `\n` and bare `\r` all end a line.
    pub fn process_text(&self, text: &str) -> DocumentAnalysis {
        self.process_lines(&lines_from_text(text))
    }

    /// Process line records, from plain text or an ingested Word document.
    pub fn process_lines(&self, lines: &[LineRecord]) -> DocumentAnalysis {
        let mut stats = DocumentStats {
            total_lines: lines.len(),
            ..DocumentStats::default()
        };

        let analyzed: Vec<LineClassification> = lines
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let context = LineContext {
                    prev: i.checked_sub(1).map_or("", |p| lines[p].text.as_str()),
                    next: lines.get(i + 1).map_or("", |n| n.text.as_str()),
                };
                let line = self
                    .engine
                    .analyze_line(&record.text, i, &context)
                    .with_origin(record);
                stats.count(&line);
                line
            })
            .collect();

        let structured = structure::structure(&analyzed);

        stats.sections = structured.len();
        stats.tables = structured
            .iter()
            .flat_map(|s| &s.content)
            .filter(|item| matches!(item, ContentItem::Table { .. }))
            .count();

        let layout = policy::plan_layout(&structured, stats.characters, &self.policy);
        stats.estimated_pages = layout.estimated_pages;
        stats.is_short_document = layout.is_short_document;

        debug!(
            "Processed {} lines into {} sections ({} words, {:.2} pages, short={})",
            stats.total_lines,
            stats.sections,
            stats.words,
            stats.estimated_pages,
            stats.is_short_document
        );

        DocumentAnalysis {
            analyzed,
            structured,
            stats,
            layout,
        }
    }
}
