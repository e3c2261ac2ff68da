//! Word document writer — renders a [`DocumentAnalysis`] as a `.docx`.

use std::io::{Cursor, Write};
use std::path::Path;

use pattern_core::Result;
use pattern_engine::numbering::renumber;
use pattern_engine::{ContentItem, DocumentAnalysis, LayoutPlan, NumberingMode, Section};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zip::write::SimpleFileOptions;

use crate::body::{Align, Body, Para, Run};
use crate::parts;

/// Half an inch in twips.
const HALF_INCH: u32 = 720;
const BULLET: &str = "•";

/// Typography knobs for the generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Body font size in points.
    pub font_size: f32,
    pub line_spacing: f32,
    /// Emit a table-of-contents field on its own page first.
    pub include_toc: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_spacing: 1.5,
            include_toc: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    options: RenderOptions,
}

impl DocxWriter {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render the analysis into `.docx` bytes.
    pub fn render(&self, analysis: &DocumentAnalysis) -> Result<Vec<u8>> {
        let document = self.document_xml(&analysis.structured, &analysis.layout);
        let styles = parts::styles_xml(&self.options);

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in [
            ("[Content_Types].xml", parts::CONTENT_TYPES),
            ("_rels/.rels", parts::PACKAGE_RELS),
            ("word/_rels/document.xml.rels", parts::DOCUMENT_RELS),
            ("word/document.xml", document.as_str()),
            ("word/styles.xml", styles.as_str()),
        ] {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        let bytes = zip.finish()?.into_inner();

        debug!(
            "Rendered {} sections into {} bytes",
            analysis.structured.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Render and write to `path`.
    pub fn write_to(&self, analysis: &DocumentAnalysis, path: &Path) -> Result<()> {
        let bytes = self.render(analysis)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn document_xml(&self, sections: &[Section], plan: &LayoutPlan) -> String {
        let mut body = Body::new();
        if self.options.include_toc {
            body.toc();
        }
        for (s, section) in sections.iter().enumerate() {
            if plan.breaks_before(s) {
                body.page_break();
            }
            body.heading(section.level, &section.heading);
            for (i, item) in section.content.iter().enumerate() {
                render_item(&mut body, item, plan.is_plain_list(s, i), plan.numbering);
            }
        }
        body.finish()
    }
}

fn justified<'a>() -> Para<'a> {
    Para {
        align: Some(Align::Both),
        ..Para::default()
    }
}

fn render_item(body: &mut Body, item: &ContentItem, plain_list: bool, numbering: NumberingMode) {
    match item {
        ContentItem::Paragraph { text } => body.paragraph(justified(), &[Run::text(text)]),
        ContentItem::Definition { term, definition } => {
            let label = format!("{}: ", term);
            body.paragraph(justified(), &[Run::bold(&label), Run::text(definition)]);
        }
        ContentItem::Figure { caption } => body.paragraph(
            Para {
                align: Some(Align::Center),
                ..Para::default()
            },
            &[Run {
                text: caption,
                italic: true,
                ..Run::default()
            }],
        ),
        ContentItem::Reference { text } => body.paragraph(
            Para {
                hanging: Some((HALF_INCH, HALF_INCH)),
                ..Para::default()
            },
            &[Run::text(text)],
        ),
        ContentItem::BulletList { items } | ContentItem::NumberedList { items } if plain_list => {
            for text in items {
                body.paragraph(justified(), &[Run::text(text)]);
            }
        }
        ContentItem::BulletList { items } => {
            for text in items {
                list_paragraph(body, BULLET, text);
            }
        }
        ContentItem::NumberedList { items } => match numbering {
            NumberingMode::Preserve => {
                for text in items {
                    list_paragraph(body, "", text);
                }
            }
            NumberingMode::Auto => {
                for (marker, text) in renumber(items) {
                    list_paragraph(body, &marker, text);
                }
            }
        },
        ContentItem::Table { caption, rows } => {
            if !caption.is_empty() {
                body.paragraph(
                    Para {
                        align: Some(Align::Center),
                        ..Para::default()
                    },
                    &[Run::bold(caption)],
                );
            }
            body.table(rows);
            // Spacing after the grid
            body.paragraph(Para::default(), &[]);
        }
    }
}

/// A hanging-indent list paragraph; an empty marker keeps the text as written.
fn list_paragraph(body: &mut Body, marker: &str, text: &str) {
    let para = Para {
        hanging: Some((HALF_INCH, HALF_INCH / 2)),
        align: Some(Align::Left),
        ..Para::default()
    };
    if marker.is_empty() {
        body.paragraph(para, &[Run::text(text)]);
    } else {
        body.paragraph(
            para,
            &[
                Run {
                    text: marker,
                    tab: true,
                    ..Run::default()
                },
                Run::text(text),
            ],
        );
    }
}
