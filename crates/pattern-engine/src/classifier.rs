//! Line classifier — one line in, one typed classification out.
//!
//! Tiers are tried in a fixed order and the first hit wins:
//! empty → headings (short lines only) → references → lists → tables →
//! definitions → figures → paragraph. Confidence is diagnostic only.

use once_cell::sync::Lazy;
use pattern_core::record::{DEFAULT_FONT_SIZE, DEFAULT_STYLE};
use pattern_core::{FormatPolicy, LineRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::patterns::{self, Category, PatternLibrary, TABLE_END, TABLE_START};

static THEMATIC_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap());
static ATX_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})(?:\s+(.*?))?\s*#*$").unwrap());
static EMPHASIS_RE: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"^\*\*\*([^*]+)\*\*\*$").unwrap(),
        Regex::new(r"^\*\*([^*]+)\*\*$").unwrap(),
        Regex::new(r"^__([^_]+)__$").unwrap(),
    ]
});
static TITLE_CASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*$").unwrap());

/// What a line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Empty,
    HorizontalRule,
    Heading,
    Paragraph,
    Reference,
    BulletList,
    NumberedList,
    TableStart,
    TableEnd,
    TableCaption,
    TableRow,
    Definition,
    Figure,
}

impl LineKind {
    pub fn is_list(&self) -> bool {
        matches!(self, Self::BulletList | Self::NumberedList)
    }

    pub fn is_table(&self) -> bool {
        matches!(
            self,
            Self::TableStart | Self::TableEnd | Self::TableCaption | Self::TableRow
        )
    }

    /// Blank lines and thematic breaks: separators that carry no content.
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Empty | Self::HorizontalRule)
    }
}

/// The result of classifying one line. Never mutated after the
/// classification pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineClassification {
    pub line_number: usize,
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub content: String,
    pub original: String,
    pub level: u8,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<String>>,
    pub original_style: String,
    pub original_bold: bool,
    pub original_font_size: f32,
}

impl LineClassification {
    fn new(line_number: usize, original: &str, kind: LineKind, content: &str, confidence: f32) -> Self {
        Self {
            line_number,
            kind,
            content: content.to_string(),
            original: original.to_string(),
            level: 0,
            confidence,
            term: None,
            definition: None,
            cells: None,
            original_style: DEFAULT_STYLE.to_string(),
            original_bold: false,
            original_font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Attach the formatting the line carried in its source document.
    pub fn with_origin(mut self, record: &LineRecord) -> Self {
        self.original_style = record.style.clone();
        self.original_bold = record.bold;
        self.original_font_size = record.font_size;
        self
    }

    pub fn is_heading(&self) -> bool {
        self.kind == LineKind::Heading
    }
}

/// Neighbouring lines, for the few rules that look around.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineContext<'a> {
    pub prev: &'a str,
    pub next: &'a str,
}

/// A line with markdown decoration removed.
struct Stripped<'a> {
    text: &'a str,
    /// Number of leading `#` markers, if the line was an ATX heading.
    hashes: Option<usize>,
}

fn strip_markup(trimmed: &str) -> Stripped<'_> {
    let mut text = trimmed;
    let mut hashes = None;

    if let Some(caps) = ATX_HEADING_RE.captures(text) {
        hashes = caps.get(1).map(|m| m.as_str().len());
        text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
    }

    for re in EMPHASIS_RE.iter() {
        if let Some(inner) = re.captures(text).and_then(|c| c.get(1)) {
            text = inner.as_str().trim();
            break;
        }
    }

    Stripped { text, hashes }
}

fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

/// Rule-based line classifier.
///
/// Holds only thresholds and a reference to the shared pattern table, so
/// one engine per request is cheap.
#[derive(Debug, Clone)]
pub struct PatternEngine {
    library: &'static PatternLibrary,
    short_line_chars: usize,
    very_short_line_chars: usize,
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new(&FormatPolicy::default())
    }
}

impl PatternEngine {
    pub fn new(policy: &FormatPolicy) -> Self {
        Self {
            library: PatternLibrary::global(),
            short_line_chars: policy.short_line_chars,
            very_short_line_chars: policy.very_short_line_chars,
        }
    }

    /// Classify one line. Pure: the same input always yields the same result.
    pub fn analyze_line(
        &self,
        line: &str,
        line_number: usize,
        context: &LineContext<'_>,
    ) -> LineClassification {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineClassification::new(line_number, line, LineKind::Empty, "", 1.0);
        }
        if THEMATIC_BREAK_RE.is_match(trimmed) {
            return LineClassification::new(line_number, line, LineKind::HorizontalRule, "", 1.0);
        }

        let stripped = strip_markup(trimmed);
        let text = stripped.text;
        if text.is_empty() {
            return LineClassification::new(line_number, line, LineKind::Empty, "", 1.0);
        }

        // Headings
        if let Some((level, confidence)) = self.heading_level(text, stripped.hashes, context) {
            let mut result =
                LineClassification::new(line_number, line, LineKind::Heading, text, confidence);
            result.level = level;
            return result;
        }

        // References
        if self.library.matches(Category::Reference, text) {
            return LineClassification::new(line_number, line, LineKind::Reference, text, 0.90);
        }

        // Lists
        if let Some(m) = self.library.find(Category::BulletList, text) {
            let content = m.content().unwrap_or(text).trim();
            return LineClassification::new(line_number, line, LineKind::BulletList, content, 0.95);
        }
        if self.library.matches(Category::NumberedList, text) {
            return LineClassification::new(line_number, line, LineKind::NumberedList, text, 0.95);
        }

        // Tables
        if let Some(m) = self.library.find(Category::TableMarker, text) {
            let kind = match m.index {
                TABLE_START => LineKind::TableStart,
                TABLE_END => LineKind::TableEnd,
                _ => LineKind::TableCaption,
            };
            return LineClassification::new(line_number, line, kind, text, 1.0);
        }
        if self.library.matches(Category::TableRow, text) {
            let mut result = LineClassification::new(line_number, line, LineKind::TableRow, text, 1.0);
            result.cells = Some(split_cells(text));
            return result;
        }

        // Definitions
        if let Some(m) = self.library.find(Category::Definition, text) {
            let mut result =
                LineClassification::new(line_number, line, LineKind::Definition, text, 0.90);
            result.term = m.group(1).map(str::to_string);
            result.definition = Some(m.content().map(str::trim).unwrap_or("").to_string());
            return result;
        }

        // Figures
        if self.library.matches(Category::Figure, text) {
            return LineClassification::new(line_number, line, LineKind::Figure, text, 0.95);
        }

        LineClassification::new(line_number, line, LineKind::Paragraph, text, 0.70)
    }

    fn heading_level(
        &self,
        text: &str,
        hashes: Option<usize>,
        context: &LineContext<'_>,
    ) -> Option<(u8, f32)> {
        let length = text.chars().count();
        if length >= self.short_line_chars {
            return None;
        }

        for (category, level, confidence) in [
            (Category::Heading1, 1, 0.95),
            (Category::Heading2, 2, 0.90),
            (Category::Heading3, 3, 0.85),
        ] {
            if self.library.matches(category, text) {
                return Some((level, confidence));
            }
        }

        if patterns::section_keyword(text).is_some() {
            return Some((1, 0.90));
        }

        if let Some(hashes) = hashes {
            return Some((hashes.clamp(2, 3) as u8, 0.85));
        }

        if length < self.very_short_line_chars && self.heuristic_allowed(text, context) {
            if is_all_caps(text) {
                return Some((1, 0.80));
            }
            if TITLE_CASE_RE.is_match(text) {
                return Some((2, 0.75));
            }
        }

        None
    }

    /// Guards for the ALL-CAPS / Title-Case fallback, which otherwise
    /// swallows markers, captions and wrapped sentence fragments.
    fn heuristic_allowed(&self, text: &str, context: &LineContext<'_>) -> bool {
        let starts_alnum = text.chars().next().is_some_and(char::is_alphanumeric);
        if !starts_alnum {
            return false;
        }
        if self.library.matches(Category::TableMarker, text)
            || self.library.matches(Category::Figure, text)
        {
            return false;
        }
        let continues_sentence = context
            .next
            .trim_start()
            .chars()
            .next()
            .is_some_and(char::is_lowercase);
        !continues_sentence
    }
}

/// Split a pipe-delimited row into trimmed, non-empty cells.
pub fn split_cells(row: &str) -> Vec<String> {
    row.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> LineClassification {
        PatternEngine::default().analyze_line(line, 0, &LineContext::default())
    }

    fn classify_before(line: &str, next: &str) -> LineClassification {
        PatternEngine::default().analyze_line(line, 0, &LineContext { prev: "", next })
    }

    #[test]
    fn test_empty_and_whitespace() {
        for line in ["", "   ", "\t \t"] {
            let c = classify(line);
            assert_eq!(c.kind, LineKind::Empty);
            assert_eq!(c.content, "");
            assert_eq!(c.level, 0);
        }
    }

    #[test]
    fn test_heading_level_one() {
        for line in [
            "INTRODUCTION",
            "CHAPTER ONE",
            "Chapter 2: Literature Review",
            "PART IV",
            "1. INTRODUCTION",
            "Bibliography",
            "Acknowledgements",
        ] {
            let c = classify(line);
            assert_eq!(c.kind, LineKind::Heading, "{line}");
            assert_eq!(c.level, 1, "{line}");
            assert!((c.confidence - 0.95).abs() < f32::EPSILON, "{line}");
        }
    }

    #[test]
    fn test_heading_level_two() {
        for line in ["Research Questions", "1.1 Background", "Methods and Results"] {
            let c = classify(line);
            assert_eq!(c.kind, LineKind::Heading, "{line}");
            assert_eq!(c.level, 2, "{line}");
        }
    }

    #[test]
    fn test_heading_level_three() {
        for line in ["1.1.1 Scope", "2.1.1.1 Objectives of Preservation", "a) Sampling frame", "Findings:"] {
            let c = classify(line);
            assert_eq!(c.kind, LineKind::Heading, "{line}");
            assert_eq!(c.level, 3, "{line}");
        }
    }

    #[test]
    fn test_section_keyword_is_level_one() {
        let c = classify("Methodology");
        assert_eq!(c.kind, LineKind::Heading);
        assert_eq!(c.level, 1);
        assert!((c.confidence - 0.90).abs() < f32::EPSILON);
    }

    #[test]
    fn test_heuristic_all_caps() {
        let c = classify("DATA COLLECTION: 2024");
        assert_eq!(c.kind, LineKind::Heading);
        assert_eq!(c.level, 1);
        assert!((c.confidence - 0.80).abs() < f32::EPSILON);
    }

    #[test]
    fn test_heuristic_title_case_single_word() {
        let c = classify("Limitations");
        assert_eq!(c.kind, LineKind::Heading);
        assert_eq!(c.level, 2);
        assert!((c.confidence - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_heuristic_rejects_sentence_fragment() {
        let c = classify_before("Limitations", "of this study include the sample size.");
        assert_eq!(c.kind, LineKind::Paragraph);
    }

    #[test]
    fn test_table_marker_is_not_a_heading() {
        assert_eq!(classify("[TABLE START]").kind, LineKind::TableStart);
        assert_eq!(classify("[TABLE END]").kind, LineKind::TableEnd);
        assert_eq!(classify("TABLE 2: RESPONSE RATES").kind, LineKind::TableCaption);
    }

    #[test]
    fn test_caption_with_end_in_text_stays_caption() {
        let c = classify("Table 3: Spending Trends by Quarter End");
        assert_eq!(c.kind, LineKind::TableCaption);
    }

    #[test]
    fn test_long_line_is_never_heading() {
        let line = "A".repeat(120);
        assert_eq!(classify(&line).kind, LineKind::Paragraph);
    }

    #[test]
    fn test_reference() {
        let c = classify("Smith, J. (2024). Title. Journal.");
        assert_eq!(c.kind, LineKind::Reference);
        assert!((c.confidence - 0.90).abs() < f32::EPSILON);
        assert_eq!(classify("[12] Doe, A. Something").kind, LineKind::Reference);
        assert_eq!(
            classify("Brown et al. studied this in 2019 extensively").kind,
            LineKind::Reference
        );
    }

    #[test]
    fn test_bullet_strips_marker() {
        let c = classify("•   First point");
        assert_eq!(c.kind, LineKind::BulletList);
        assert_eq!(c.content, "First point");
        assert_eq!(c.original, "•   First point");
    }

    #[test]
    fn test_numbered_keeps_marker() {
        for line in ["1. Item C", "2) Second", "b. Lettered", "iv) Roman", "(3) Parenthesised"] {
            let c = classify(line);
            assert_eq!(c.kind, LineKind::NumberedList, "{line}");
            assert_eq!(c.content, line);
        }
    }

    #[test]
    fn test_table_row_cells() {
        let c = classify("|  Name | Age |  |");
        assert_eq!(c.kind, LineKind::TableRow);
        assert_eq!(c.cells, Some(vec!["Name".to_string(), "Age".to_string()]));
    }

    #[test]
    fn test_definition() {
        let c = classify("Objective: to measure uptake");
        assert_eq!(c.kind, LineKind::Definition);
        assert_eq!(c.term.as_deref(), Some("Objective"));
        assert_eq!(c.definition.as_deref(), Some("to measure uptake"));
    }

    #[test]
    fn test_definition_without_text() {
        // Capitalised bare labels ("Note:") are H3 headings; lowercase ones stay definitions
        let c = classify("key point:");
        assert_eq!(c.kind, LineKind::Definition);
        assert_eq!(c.definition.as_deref(), Some(""));
    }

    #[test]
    fn test_figure() {
        let c = classify("Figure 4: Distribution of respondents by age");
        assert_eq!(c.kind, LineKind::Figure);
        assert_eq!(classify("Fig. 2 Map").kind, LineKind::Figure);
    }

    #[test]
    fn test_paragraph_default() {
        let c = classify("This is body text.");
        assert_eq!(c.kind, LineKind::Paragraph);
        assert!((c.confidence - 0.70).abs() < f32::EPSILON);
    }

    #[test]
    fn test_markdown_heading_levels() {
        let c = classify("# Introduction");
        assert_eq!(c.kind, LineKind::Heading);
        assert_eq!(c.level, 1);
        assert_eq!(c.content, "Introduction");
        assert_eq!(c.original, "# Introduction");

        let c = classify("# what we found");
        assert_eq!(c.level, 2);
        let c = classify("##### deep note here");
        assert_eq!(c.level, 3);
    }

    #[test]
    fn test_markdown_emphasis_stripped() {
        let c = classify("**This whole line is bold text.**");
        assert_eq!(c.kind, LineKind::Paragraph);
        assert_eq!(c.content, "This whole line is bold text.");
        // Inline emphasis is left alone
        let c = classify("**Bold** and **more** words in a sentence.");
        assert_eq!(c.content, "**Bold** and **more** words in a sentence.");
    }

    #[test]
    fn test_horizontal_rule() {
        for line in ["---", "***", "_ _ _", "------"] {
            assert_eq!(classify(line).kind, LineKind::HorizontalRule, "{line}");
        }
    }

    #[test]
    fn test_heading_wins_over_reference() {
        assert_eq!(classify("REFERENCES").kind, LineKind::Heading);
    }

    #[test]
    fn test_idempotent() {
        let engine = PatternEngine::default();
        let ctx = LineContext { prev: "x", next: "y" };
        for line in ["INTRODUCTION", "- item", "| a | b |", "Plain words here."] {
            assert_eq!(engine.analyze_line(line, 3, &ctx), engine.analyze_line(line, 3, &ctx));
        }
    }

    #[test]
    fn test_garbage_does_not_panic() {
        for line in ["\u{0}\u{1}\u{7f}", "|||||", "((((((", "#", "**", "🎓📚 ✓✓", "ǅǈǋ"] {
            let _ = classify(line);
        }
    }

    #[test]
    fn test_thresholds_come_from_policy() {
        let policy = FormatPolicy {
            short_line_chars: 10,
            ..FormatPolicy::default()
        };
        let engine = PatternEngine::new(&policy);
        let c = engine.analyze_line("LITERATURE REVIEW", 0, &LineContext::default());
        assert_eq!(c.kind, LineKind::Paragraph);
    }

    #[test]
    fn test_origin_metadata() {
        let record = LineRecord {
            text: "Heading".into(),
            style: "Heading1".into(),
            bold: true,
            font_size: 16.0,
        };
        let c = classify("Heading").with_origin(&record);
        assert_eq!(c.original_style, "Heading1");
        assert!(c.original_bold);
        assert_eq!(c.original_font_size, 16.0);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(classify("| a | b |")).unwrap();
        assert_eq!(json["type"], "table_row");
        assert_eq!(json["cells"][1], "b");
        assert!(json.get("term").is_none());
    }
}
