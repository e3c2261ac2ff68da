//! Structuring pass — groups classified lines into a section tree.
//!
//! All mutable cursors of the pass live in [`StructuringState`]. At most
//! one list and one table are open at a time, never both.

use serde::{Deserialize, Serialize};

use crate::classifier::{LineClassification, LineKind};
use crate::patterns::{self, Category};

/// Heading of the section synthesized for content that precedes any heading.
pub const IMPLICIT_SECTION_HEADING: &str = "Introduction";

/// One node of the output tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub level: u8,
    pub content: Vec<ContentItem>,
}

impl Section {
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: heading.into(),
            level,
            content: Vec::new(),
        }
    }
}

/// A content item of a section, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Paragraph { text: String },
    BulletList { items: Vec<String> },
    NumberedList { items: Vec<String> },
    Table { caption: String, rows: Vec<Vec<String>> },
    Definition { term: String, definition: String },
    Figure { caption: String },
    Reference { text: String },
}

impl ContentItem {
    pub fn list_items(&self) -> Option<&[String]> {
        match self {
            Self::BulletList { items } | Self::NumberedList { items } => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct OpenList {
    kind: LineKind,
    items: Vec<String>,
}

impl OpenList {
    fn into_item(self) -> ContentItem {
        match self.kind {
            LineKind::NumberedList => ContentItem::NumberedList { items: self.items },
            _ => ContentItem::BulletList { items: self.items },
        }
    }
}

#[derive(Debug, Default)]
struct OpenTable {
    caption: String,
    rows: Vec<Vec<String>>,
    /// Opened by `[TABLE START]`; survives blank lines until `[TABLE END]`.
    explicit: bool,
}

/// Cursor state threaded through the structuring pass.
#[derive(Debug, Default)]
pub struct StructuringState {
    sections: Vec<Section>,
    current: Option<Section>,
    open_list: Option<OpenList>,
    open_table: Option<OpenTable>,
    in_references: bool,
}

impl StructuringState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a references heading has been seen. Never reset.
    pub fn in_references(&self) -> bool {
        self.in_references
    }

    /// Feed the next classified line.
    pub fn apply(&mut self, line: &LineClassification) {
        if !line.kind.is_list() {
            self.close_list();
        }

        match line.kind {
            LineKind::Empty | LineKind::HorizontalRule => {
                if self.open_table.as_ref().is_some_and(|t| !t.explicit) {
                    self.close_table();
                }
            }
            LineKind::Heading => self.open_section(line),
            LineKind::BulletList | LineKind::NumberedList => {
                self.close_table();
                self.push_list_item(line.kind, &line.content);
            }
            LineKind::TableStart => self.start_table(),
            LineKind::TableCaption => self.set_caption(&line.content),
            LineKind::TableRow => {
                let cells = line.cells.clone().unwrap_or_default();
                self.open_table
                    .get_or_insert_with(OpenTable::default)
                    .rows
                    .push(cells);
            }
            LineKind::TableEnd => self.close_table(),
            LineKind::Reference => {
                self.close_table();
                let text = line.content.clone();
                if self.in_references {
                    self.push(ContentItem::Reference { text });
                } else {
                    self.push(ContentItem::Paragraph { text });
                }
            }
            LineKind::Definition => {
                self.close_table();
                self.push(ContentItem::Definition {
                    term: line.term.clone().unwrap_or_default(),
                    definition: line.definition.clone().unwrap_or_default(),
                });
            }
            LineKind::Figure => {
                self.close_table();
                self.push(ContentItem::Figure {
                    caption: line.content.clone(),
                });
            }
            LineKind::Paragraph => {
                self.close_table();
                self.push(ContentItem::Paragraph {
                    text: line.content.clone(),
                });
            }
        }
    }

    /// Flush open accumulators and return the finished tree.
    pub fn finish(mut self) -> Vec<Section> {
        self.close_list();
        self.close_table();
        if let Some(section) = self.current.take() {
            self.sections.push(section);
        }
        self.sections
    }

    fn open_section(&mut self, line: &LineClassification) {
        self.close_table();
        if let Some(section) = self.current.take() {
            self.sections.push(section);
        }
        if line.level == 1 && is_references_heading(&line.content) {
            self.in_references = true;
        }
        self.current = Some(Section::new(line.content.clone(), line.level.clamp(1, 3)));
    }

    fn section(&mut self) -> &mut Section {
        self.current
            .get_or_insert_with(|| Section::new(IMPLICIT_SECTION_HEADING, 1))
    }

    fn push(&mut self, item: ContentItem) {
        self.section().content.push(item);
    }

    fn push_list_item(&mut self, kind: LineKind, text: &str) {
        if self.open_list.as_ref().is_some_and(|l| l.kind != kind) {
            self.close_list();
        }
        self.open_list
            .get_or_insert_with(|| OpenList {
                kind,
                items: Vec::new(),
            })
            .items
            .push(text.to_string());
    }

    fn close_list(&mut self) {
        if let Some(list) = self.open_list.take() {
            self.push(list.into_item());
        }
    }

    fn start_table(&mut self) {
        // A caption seen just before the marker belongs to this table
        if let Some(table) = self.open_table.as_mut() {
            if !table.explicit && table.rows.is_empty() {
                table.explicit = true;
                return;
            }
        }
        self.close_table();
        self.open_table = Some(OpenTable {
            explicit: true,
            ..OpenTable::default()
        });
    }

    fn set_caption(&mut self, caption: &str) {
        if let Some(table) = self.open_table.as_mut() {
            if table.caption.is_empty() {
                table.caption = caption.to_string();
                return;
            }
        }
        self.close_table();
        self.open_table = Some(OpenTable {
            caption: caption.to_string(),
            ..OpenTable::default()
        });
    }

    fn close_table(&mut self) {
        let Some(table) = self.open_table.take() else {
            return;
        };
        if !table.explicit && table.rows.is_empty() {
            // "Table 3 shows ..." without any rows is prose, not a table
            self.push(ContentItem::Paragraph {
                text: table.caption,
            });
            return;
        }
        self.push(ContentItem::Table {
            caption: table.caption,
            rows: table.rows,
        });
    }
}

fn is_references_heading(heading: &str) -> bool {
    let lower = heading.to_lowercase();
    lower.contains("reference")
        || lower.contains("bibliography")
        || patterns::section_keyword(heading) == Some(Category::SectionReferences)
}

/// Run the structuring pass over a classified document.
pub fn structure(analyzed: &[LineClassification]) -> Vec<Section> {
    let mut state = StructuringState::new();
    for line in analyzed {
        state.apply(line);
    }
    state.finish()
}
