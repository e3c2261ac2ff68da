//! End-to-end structuring scenarios — whole documents in, section trees
//! and layout decisions out.

use pattern_core::FormatPolicy;
use pattern_engine::{ContentItem, DocumentProcessor, LineKind, Section};

fn process(text: &str) -> pattern_engine::DocumentAnalysis {
    DocumentProcessor::default().process_text(text)
}

fn paragraph(text: &str) -> ContentItem {
    ContentItem::Paragraph { text: text.into() }
}

/// Two ALL-CAPS vocabulary headings, each with one paragraph.
#[test]
fn test_introduction_conclusion() {
    let doc = process("INTRODUCTION\n\nThis is body text.\n\nCONCLUSION\n\nFinal text.");

    assert_eq!(
        doc.structured,
        vec![
            Section {
                heading: "INTRODUCTION".into(),
                level: 1,
                content: vec![paragraph("This is body text.")],
            },
            Section {
                heading: "CONCLUSION".into(),
                level: 1,
                content: vec![paragraph("Final text.")],
            },
        ]
    );
}

/// Hierarchical numbering makes a level-2 heading.
#[test]
fn test_numbered_subheading() {
    let doc = process("1.1 Background\n\nSome text here.");

    assert_eq!(doc.structured.len(), 1);
    assert_eq!(doc.structured[0].heading, "1.1 Background");
    assert_eq!(doc.structured[0].level, 2);
    assert_eq!(doc.structured[0].content, vec![paragraph("Some text here.")]);
}

/// One bullet line per item aggregates into a single list.
#[test]
fn test_bullet_list_aggregates() {
    let doc = process("• First\n• Second\n• Third");

    let content = &doc.structured[0].content;
    assert_eq!(content.len(), 1);
    assert_eq!(
        content[0],
        ContentItem::BulletList {
            items: vec!["First".into(), "Second".into(), "Third".into()]
        }
    );
}

/// A blank line and a change of list type both split lists.
#[test]
fn test_bullet_then_numbered() {
    let doc = process("- Item A\n- Item B\n\n1. Item C");

    assert_eq!(
        doc.structured[0].content,
        vec![
            ContentItem::BulletList {
                items: vec!["Item A".into(), "Item B".into()]
            },
            ContentItem::NumberedList {
                items: vec!["1. Item C".into()]
            },
        ]
    );
}

/// Explicit markers with a caption line produce exactly one table.
#[test]
fn test_table_round_trip() {
    let doc = process(
        "[TABLE START]\nTable 1: Caption\n| Name | Score |\n| Ada | 91 |\n[TABLE END]",
    );

    let content = &doc.structured[0].content;
    assert_eq!(content.len(), 1);
    match &content[0] {
        ContentItem::Table { caption, rows } => {
            assert_eq!(caption, "Table 1: Caption");
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1], vec!["Ada".to_string(), "91".to_string()]);
        }
        other => panic!("expected a table, got {:?}", other),
    }
    assert_eq!(doc.stats.tables, 1);
}

/// A citation before the references heading is classified as a reference
/// but grouped as ordinary text.
#[test]
fn test_reference_before_heading() {
    let cite = "Smith, J. (2024). Title. Journal.";
    let doc = process(&format!("Opening paragraph text.\n{cite}\nREFERENCES\n{cite}"));

    assert_eq!(doc.analyzed[1].kind, LineKind::Reference);
    assert_eq!(doc.analyzed[3].kind, LineKind::Reference);

    assert_eq!(doc.structured[0].content[1], paragraph(cite));
    assert_eq!(
        doc.structured[1].content,
        vec![ContentItem::Reference { text: cite.into() }]
    );
}

/// Three sections of about eighty words: short, so no forced breaks.
#[test]
fn test_short_document_gating() {
    let body = vec!["word"; 26].join(" ");
    let text = format!("CHAPTER ONE\n{body}\nCHAPTER TWO\n{body}\nCHAPTER THREE\n{body}");
    let doc = process(&text);

    assert_eq!(doc.stats.sections, 3);
    assert!(doc.stats.words >= 78 && doc.stats.words <= 90);
    assert!(doc.stats.is_short_document);
    assert!(doc.layout.page_breaks.iter().all(|b| !b));
}

/// A long document breaks only before chapter headings after the first.
#[test]
fn test_long_document_chapter_breaks() {
    let body = vec!["lorem"; 500].join(" ");
    let mut text = String::new();
    for chapter in ["CHAPTER ONE", "CHAPTER TWO", "CHAPTER THREE"] {
        text.push_str(&format!("{chapter}\n{body}\n1.1 Background Study\n{body}\n"));
    }
    let doc = process(&text);

    assert!(!doc.stats.is_short_document);
    assert_eq!(
        doc.layout.page_breaks,
        vec![false, false, true, false, true, false]
    );
}

/// Level-1 headings are always ALL-CAPS, chapter/part prefixed, or
/// section vocabulary.
#[test]
fn test_level_one_headings_are_recognisable() {
    let doc = process(
        "CHAPTER 1\nPART II Findings\nMethodology\nRESULTS AND DATA\nResearch Design\nabstract\nSome ordinary paragraph text here.",
    );
    let keywords = [
        "abstract", "introduction", "background", "overview", "motivation", "method",
        "methodology", "approach", "procedure", "materials", "results", "findings",
        "outcomes", "data", "discussion", "analysis", "interpretation", "conclusion",
        "summary", "final remarks", "future work", "references", "bibliography",
        "works cited", "citations",
    ];

    for line in doc.analyzed.iter().filter(|l| l.is_heading() && l.level == 1) {
        let text = line.content.trim();
        let upper = text.to_uppercase();
        let all_caps = text == upper;
        let prefixed = upper.starts_with("CHAPTER") || upper.starts_with("PART");
        let vocabulary = keywords.contains(&text.to_lowercase().as_str());
        assert!(all_caps || prefixed || vocabulary, "unexpected level-1 heading {text:?}");
    }
}

/// Counted categories never exceed the number of input lines.
#[test]
fn test_no_double_counting() {
    let docs = [
        "[TABLE START]\nTable 1: A\n| a | b |\n[TABLE END]\nTable 2: B\n| c |",
        "INTRODUCTION\n- a\n- b\n1. c\nNote: x\nSmith, J. (2024). T.\n",
        "",
        "| x |\n| y |\n\n| z |",
    ];
    for text in docs {
        let s = process(text).stats;
        let counted =
            s.headings + s.paragraphs + s.references + s.lists + s.definitions + s.tables;
        assert!(counted <= s.total_lines, "{counted} > {} for {text:?}", s.total_lines);
    }
}

/// Classification is pure.
#[test]
fn test_reprocessing_is_identical() {
    let text = "INTRODUCTION\nBody.\n- a\n| x | y |\nFigure 1: F";
    assert_eq!(process(text), process(text));
}

#[test]
fn test_empty_input() {
    let doc = process("");
    assert!(doc.analyzed.is_empty());
    assert!(doc.structured.is_empty());
    assert_eq!(doc.stats.total_lines, 0);
    assert!(doc.stats.is_short_document);
}

#[test]
fn test_single_huge_line() {
    let line = "word ".repeat(20_000);
    let doc = process(&line);
    assert_eq!(doc.analyzed.len(), 1);
    assert_eq!(doc.analyzed[0].kind, LineKind::Paragraph);
    assert_eq!(doc.structured.len(), 1);
}

#[test]
fn test_cr_only_line_endings() {
    let doc = process("INTRODUCTION\rBody text here.\rCONCLUSION\rDone now.");
    assert_eq!(doc.stats.total_lines, 4);
    assert_eq!(doc.structured.len(), 2);
}

#[test]
fn test_garbage_characters() {
    let doc = process("\u{0}\u{1b}[31m\n|||\n####\n**\n[[[]]]\n\u{feff}\u{200b}\n(((((\n🎓🎓🎓\n¿¡§¶");
    assert_eq!(doc.analyzed.len(), 9);
}

/// Unterminated tables are flushed at the end of input.
#[test]
fn test_unterminated_table() {
    let doc = process("RESULTS\n[TABLE START]\n| a | b |\n| c | d |");
    assert!(matches!(
        &doc.structured[0].content[0],
        ContentItem::Table { rows, .. } if rows.len() == 2
    ));
}

/// Thresholds are data: a lower page threshold makes the same text long.
#[test]
fn test_policy_thresholds() {
    let text = "CHAPTER ONE\nSome text.\nCHAPTER TWO\nMore text.";
    let policy = FormatPolicy {
        short_document_pages: 0.0,
        short_document_sections: 1,
        ..FormatPolicy::default()
    };
    let doc = DocumentProcessor::new(policy).process_text(text);
    assert!(!doc.stats.is_short_document);
    assert_eq!(doc.layout.page_breaks, vec![false, true]);
}

/// Markdown input keeps its structure.
#[test]
fn test_markdown_document() {
    let doc = process("# Introduction\n\nSome **bold** words.\n\n## Study area\n\n* one\n* two\n\n---\n\n### 2.1.1 Soil samples");

    let headings: Vec<(&str, u8)> = doc
        .structured
        .iter()
        .map(|s| (s.heading.as_str(), s.level))
        .collect();
    assert_eq!(
        headings,
        vec![("Introduction", 1), ("Study area", 2), ("2.1.1 Soil samples", 3)]
    );
    assert_eq!(
        doc.structured[1].content,
        vec![ContentItem::BulletList {
            items: vec!["one".into(), "two".into()]
        }]
    );
}
