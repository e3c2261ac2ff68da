//! Pattern library — compiled recognition rules grouped by category.
//!
//! The table is built once per process and never mutated. Within a
//! category patterns are tried in declaration order and the first match
//! wins. Patterns are anchored at both ends except the reference, table
//! marker and figure caption rules, which are prefix matches.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// Semantic category of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
    Reference,
    BulletList,
    NumberedList,
    TableMarker,
    TableRow,
    Definition,
    Figure,
    SectionAbstract,
    SectionIntro,
    SectionMethods,
    SectionResults,
    SectionDiscussion,
    SectionConclusion,
    SectionReferences,
}

impl Category {
    /// Section-keyword recognizers, in lookup order.
    pub const SECTION_KEYWORDS: [Category; 7] = [
        Category::SectionAbstract,
        Category::SectionIntro,
        Category::SectionMethods,
        Category::SectionResults,
        Category::SectionDiscussion,
        Category::SectionConclusion,
        Category::SectionReferences,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::Reference => "reference",
            Self::BulletList => "bullet_list",
            Self::NumberedList => "numbered_list",
            Self::TableMarker => "table_marker",
            Self::TableRow => "table_row",
            Self::Definition => "definition",
            Self::Figure => "figure",
            Self::SectionAbstract => "section_abstract",
            Self::SectionIntro => "section_intro",
            Self::SectionMethods => "section_methods",
            Self::SectionResults => "section_results",
            Self::SectionDiscussion => "section_discussion",
            Self::SectionConclusion => "section_conclusion",
            Self::SectionReferences => "section_references",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Index of each table marker pattern; the classifier maps them to kinds.
pub const TABLE_START: usize = 0;
pub const TABLE_END: usize = 1;
pub const TABLE_CAPTION: usize = 2;

/// One compiled recognition rule.
#[derive(Debug)]
pub struct Pattern {
    pub category: Category,
    regex: Regex,
    /// Capture group holding the clean content, if the rule strips markup.
    content_group: Option<usize>,
}

impl Pattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// A successful match: which pattern hit and what it captured.
#[derive(Debug)]
pub struct PatternMatch<'t> {
    pub index: usize,
    captures: Captures<'t>,
    content_group: Option<usize>,
}

impl<'t> PatternMatch<'t> {
    pub fn group(&self, i: usize) -> Option<&'t str> {
        self.captures.get(i).map(|m| m.as_str())
    }

    /// The clean content designated by the pattern, if it has one.
    pub fn content(&self) -> Option<&'t str> {
        self.content_group.and_then(|g| self.group(g))
    }
}

/// All categories with their ordered patterns.
#[derive(Debug)]
pub struct PatternLibrary {
    table: HashMap<Category, Vec<Pattern>>,
}

static LIBRARY: Lazy<PatternLibrary> = Lazy::new(PatternLibrary::build);

impl PatternLibrary {
    /// The process-wide pattern table.
    pub fn global() -> &'static PatternLibrary {
        &LIBRARY
    }

    pub fn patterns(&self, category: Category) -> &[Pattern] {
        self.table.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First pattern of `category` matching `line`.
    pub fn find<'t>(&self, category: Category, line: &'t str) -> Option<PatternMatch<'t>> {
        self.patterns(category)
            .iter()
            .enumerate()
            .find_map(|(index, pattern)| {
                pattern.regex.captures(line).map(|captures| PatternMatch {
                    index,
                    captures,
                    content_group: pattern.content_group,
                })
            })
    }

    pub fn matches(&self, category: Category, line: &str) -> bool {
        self.patterns(category)
            .iter()
            .any(|p| p.regex.is_match(line))
    }

    fn build() -> Self {
        let mut table = HashMap::new();

        table.insert(
            Category::Heading1,
            compile(
                Category::Heading1,
                &[
                    // ALL CAPS
                    (r"^([A-Z\s]{3,50})$", None),
                    (
                        r"(?i)^(CHAPTER\s+(?:\d+|ONE|TWO|THREE|FOUR|FIVE|SIX|SEVEN|EIGHT|NINE|TEN|[IVXL]+)\b.*)$",
                        None,
                    ),
                    (r"(?i)^(PART\s+[IVX]+\b.*)$", None),
                    // "1. INTRODUCTION"
                    (r"^(\d+\.\s+[A-Z][A-Z\s]+)$", None),
                    (
                        r"(?i)^(ACKNOWLEDGEMENT|ABSTRACT|INTRODUCTION|CONCLUSION|REFERENCES|BIBLIOGRAPHY|APPENDIX)S?$",
                        None,
                    ),
                ],
            ),
        );

        table.insert(
            Category::Heading2,
            compile(
                Category::Heading2,
                &[
                    // Title Case, 2-6 words
                    (r"^([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,5})$", None),
                    // "1.1 Background"
                    (r"^\d+\.\d+\s+([A-Z].{3,80})$", None),
                    // "Methods and Results"
                    (r"^([A-Z][a-z]+\s+and\s+[A-Z][a-z]+)$", None),
                ],
            ),
        );

        table.insert(
            Category::Heading3,
            compile(
                Category::Heading3,
                &[
                    // "1.1.1 Details", deeper numbering stays at level 3
                    (r"^\d+(?:\.\d+){2,}\s+(.+)$", None),
                    // "a) Subsection"
                    (r"^([a-z]\)\s+.+)$", None),
                    // "Definition:"
                    (r"^([A-Z][a-z]+:)\s*$", None),
                ],
            ),
        );

        table.insert(
            Category::Reference,
            compile(
                Category::Reference,
                &[
                    // "Smith, J. ... (2024)"
                    (r"^([A-Z][a-z]+,?\s+[A-Z]\..*\(\d{4}\))", None),
                    // "Smith et al. ... 2024"
                    (r"^([A-Z][a-z]+\s+et\s+al\..*\d{4})", None),
                    // "[1] Reference"
                    (r"^\[\d+\]", None),
                    (r"^([A-Z][a-z]+.*Retrieved from)", None),
                    (r"^([A-Z][a-z]+.*https?://)", None),
                    // APA "Smith, J. (2024)."
                    (r"^([A-Z][a-z]+,\s+[A-Z]\.\s+\(\d{4}\)\.)", None),
                ],
            ),
        );

        table.insert(
            Category::BulletList,
            compile(
                Category::BulletList,
                &[
                    (r"^[•●○▪▫■□]\s+(.+)$", Some(1)),
                    (r"^[-–—]\s+(.+)$", Some(1)),
                    (r"^\*\s+(.+)$", Some(1)),
                ],
            ),
        );

        table.insert(
            Category::NumberedList,
            compile(
                Category::NumberedList,
                &[
                    (r"^(\d+[.)]\s+.+)$", None),
                    (r"^([a-z][.)]\s+.+)$", None),
                    (r"(?i)^([ivxlcdm]+[.)]\s+.+)$", None),
                    (r"^\(\d+\)\s+.+$", None),
                ],
            ),
        );

        // Order is load-bearing: see TABLE_START / TABLE_END / TABLE_CAPTION.
        table.insert(
            Category::TableMarker,
            compile(
                Category::TableMarker,
                &[
                    (r"(?i)^\[TABLE\s+START\]", None),
                    (r"(?i)^\[TABLE\s+END\]", None),
                    (r"(?i)^Table\s+\d+", None),
                ],
            ),
        );

        table.insert(
            Category::TableRow,
            compile(Category::TableRow, &[(r"^\|(.+\|)+$", None)]),
        );

        table.insert(
            Category::Definition,
            compile(
                Category::Definition,
                &[(
                    r"(?i)^(Definition|Objective|Task|Goal|Purpose|Aim|Method|Result|Conclusion|Note|Important|Key Point|Summary|Overview|Background):\s*(.+)?$",
                    Some(2),
                )],
            ),
        );

        table.insert(
            Category::Figure,
            compile(
                Category::Figure,
                &[(r"(?i)^Figure\s+\d+", None), (r"(?i)^Fig\.\s+\d+", None)],
            ),
        );

        let keywords: [(Category, &str); 7] = [
            (Category::SectionAbstract, r"(?i)^(abstract|executive summary)$"),
            (
                Category::SectionIntro,
                r"(?i)^(introduction|background|overview|motivation)$",
            ),
            (
                Category::SectionMethods,
                r"(?i)^(method|methodology|approach|procedure|materials)$",
            ),
            (Category::SectionResults, r"(?i)^(results|findings|outcomes|data)$"),
            (
                Category::SectionDiscussion,
                r"(?i)^(discussion|analysis|interpretation)$",
            ),
            (
                Category::SectionConclusion,
                r"(?i)^(conclusion|summary|final remarks|future work)$",
            ),
            (
                Category::SectionReferences,
                r"(?i)^(references|bibliography|works cited|citations)$",
            ),
        ];
        for (category, pattern) in keywords {
            table.insert(category, compile(category, &[(pattern, Some(1))]));
        }

        Self { table }
    }
}

fn compile(category: Category, specs: &[(&str, Option<usize>)]) -> Vec<Pattern> {
    specs
        .iter()
        .map(|&(pattern, content_group)| Pattern {
            category,
            regex: Regex::new(pattern).unwrap(),
            content_group,
        })
        .collect()
}

/// `find` against the process-wide table.
pub fn find(category: Category, line: &str) -> Option<PatternMatch<'_>> {
    PatternLibrary::global().find(category, line)
}

/// Which section-keyword recognizer, if any, matches the whole line.
pub fn section_keyword(line: &str) -> Option<Category> {
    let library = PatternLibrary::global();
    Category::SECTION_KEYWORDS
        .into_iter()
        .find(|&category| library.matches(category, line.trim()))
}

static CHAPTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?i:CHAPTER|PART)\s+\S+.*|\d{1,2}\.?(?:\s+[A-Z][A-Z\s]*)?)$").unwrap()
});

/// A chapter-like top-level heading: `CHAPTER n`, `PART n`, or a bare
/// chapter number such as `1` or `1. INTRODUCTION`.
///
/// Sub-numbering (`1.1`) and headings that merely open with a figure
/// (`2024 ANNUAL REPORT`) are never chapter-like.
pub fn is_chapter_heading(text: &str) -> bool {
    CHAPTER_RE.is_match(text.trim())
}
