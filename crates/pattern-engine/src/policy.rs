//! Short-document and page-break policy.
//!
//! Two independent knobs decide forced breaks: short documents get none at
//! all, and in long documents only chapter-like level-1 headings qualify.
//! The plan is computed once per document.

use pattern_core::{FormatPolicy, NumberingPreference};
use serde::{Deserialize, Serialize};

use crate::patterns;
use crate::structure::{ContentItem, Section};

/// How numbered lists are emitted by the document writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingMode {
    /// Items keep the author's markers verbatim.
    Preserve,
    /// Lists are renumbered from the first counter of their own scheme.
    Auto,
}

/// Rendering decisions derived from the finished structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub is_short_document: bool,
    pub estimated_pages: f64,
    pub numbering: NumberingMode,
    /// One flag per section: force a page break before it.
    pub page_breaks: Vec<bool>,
    /// `(section, item)` positions of lists rendered as plain paragraphs.
    pub plain_lists: Vec<(usize, usize)>,
}

impl LayoutPlan {
    pub fn breaks_before(&self, section: usize) -> bool {
        self.page_breaks.get(section).copied().unwrap_or(false)
    }

    pub fn is_plain_list(&self, section: usize, item: usize) -> bool {
        self.plain_lists.contains(&(section, item))
    }
}

pub fn estimate_pages(characters: usize, policy: &FormatPolicy) -> f64 {
    if policy.chars_per_page > 0.0 {
        characters as f64 / policy.chars_per_page
    } else {
        0.0
    }
}

pub fn is_short_document(estimated_pages: f64, sections: usize, policy: &FormatPolicy) -> bool {
    estimated_pages < policy.short_document_pages || sections < policy.short_document_sections
}

/// Build the layout plan for a structured document.
pub fn plan_layout(sections: &[Section], characters: usize, policy: &FormatPolicy) -> LayoutPlan {
    let estimated_pages = estimate_pages(characters, policy);
    let short = is_short_document(estimated_pages, sections.len(), policy);

    LayoutPlan {
        is_short_document: short,
        estimated_pages,
        numbering: numbering_mode(policy.numbering),
        page_breaks: page_breaks(sections, short),
        plain_lists: plain_lists(sections, policy.substantial_item_words),
    }
}

fn page_breaks(sections: &[Section], short: bool) -> Vec<bool> {
    sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            !short && i > 0 && section.level == 1 && patterns::is_chapter_heading(&section.heading)
        })
        .collect()
}

fn numbering_mode(preference: NumberingPreference) -> NumberingMode {
    match preference {
        NumberingPreference::Preserve => NumberingMode::Preserve,
        NumberingPreference::Auto => NumberingMode::Auto,
    }
}

fn plain_lists(sections: &[Section], substantial_item_words: usize) -> Vec<(usize, usize)> {
    sections
        .iter()
        .enumerate()
        .flat_map(|(s, section)| {
            section
                .content
                .iter()
                .enumerate()
                .filter(|(_, item)| has_substantial_item(item, substantial_item_words))
                .map(move |(i, _)| (s, i))
        })
        .collect()
}

fn has_substantial_item(item: &ContentItem, words: usize) -> bool {
    item.list_items().is_some_and(|items| {
        items
            .iter()
            .any(|text| text.split_whitespace().count() >= words)
    })
}
