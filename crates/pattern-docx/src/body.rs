//! `word/document.xml` builder.

use std::borrow::Cow;

use quick_xml::escape::escape;

/// Usable text width of an A4 page with one-inch margins, in twips.
pub const TEXT_WIDTH_TWIPS: u32 = 9026;

const PAGE_WIDTH_TWIPS: u32 = 11906;
const PAGE_HEIGHT_TWIPS: u32 = 16838;
const MARGIN_TWIPS: u32 = 1440;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Both,
}

impl Align {
    fn val(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Both => "both",
        }
    }
}

/// Paragraph properties used by the writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Para<'a> {
    pub style: Option<&'a str>,
    pub align: Option<Align>,
    /// `(left, hanging)` indent in twips.
    pub hanging: Option<(u32, u32)>,
}

/// A text run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Run<'a> {
    pub text: &'a str,
    pub bold: bool,
    pub italic: bool,
    /// Emit a tab after the text.
    pub tab: bool,
}

impl<'a> Run<'a> {
    pub fn text(text: &'a str) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    pub fn bold(text: &'a str) -> Self {
        Self {
            text,
            bold: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Body {
    xml: String,
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(&mut self, para: Para<'_>, runs: &[Run<'_>]) {
        self.xml.push_str("<w:p>");
        write_ppr(&mut self.xml, &para);
        for run in runs {
            write_run(&mut self.xml, run);
        }
        self.xml.push_str("</w:p>");
    }

    pub fn heading(&mut self, level: u8, text: &str) {
        let style = format!("Heading{}", level.clamp(1, 3));
        self.paragraph(
            Para {
                style: Some(&style),
                ..Para::default()
            },
            &[Run::text(text)],
        );
    }

    pub fn page_break(&mut self) {
        self.xml
            .push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
    }

    /// A table-of-contents field Word fills in on open.
    pub fn toc(&mut self) {
        self.heading(1, "Table of Contents");
        self.xml.push_str(concat!(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> TOC \o "1-3" \h \z \u </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:t>Right-click to update the table of contents.</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
        ));
        self.page_break();
    }

    /// A bordered grid. Rows shorter than the widest row are padded with
    /// empty cells; the first row is bold.
    pub fn table(&mut self, rows: &[Vec<String>]) {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let width = TEXT_WIDTH_TWIPS / columns as u32;

        self.xml.push_str("<w:tbl><w:tblPr>");
        self.xml.push_str(r#"<w:tblW w:w="0" w:type="auto"/><w:tblBorders>"#);
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            self.xml.push_str(&format!(
                r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
            ));
        }
        self.xml.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
        for _ in 0..columns {
            self.xml
                .push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
        }
        self.xml.push_str("</w:tblGrid>");

        for (r, row) in rows.iter().enumerate() {
            self.xml.push_str("<w:tr>");
            for c in 0..columns {
                let text = row.get(c).map(String::as_str).unwrap_or("");
                self.xml.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/></w:tcPr>"#
                ));
                let run = Run {
                    text,
                    bold: r == 0,
                    ..Run::default()
                };
                let runs: &[Run<'_>] = if text.is_empty() {
                    &[]
                } else {
                    std::slice::from_ref(&run)
                };
                self.paragraph(
                    Para {
                        align: Some(Align::Left),
                        ..Para::default()
                    },
                    runs,
                );
                self.xml.push_str("</w:tc>");
            }
            self.xml.push_str("</w:tr>");
        }
        self.xml.push_str("</w:tbl>");
    }

    /// Wrap the body in the document root with an A4 section.
    pub fn finish(self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<w:document xmlns:w="{w}" xmlns:r="{r}"><w:body>{body}"#,
                r#"<w:sectPr><w:pgSz w:w="{pw}" w:h="{ph}"/>"#,
                r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/>"#,
                r#"</w:sectPr></w:body></w:document>"#
            ),
            w = W_NS,
            r = R_NS,
            body = self.xml,
            pw = PAGE_WIDTH_TWIPS,
            ph = PAGE_HEIGHT_TWIPS,
            m = MARGIN_TWIPS,
        )
    }
}

fn write_ppr(xml: &mut String, para: &Para<'_>) {
    if para.style.is_none() && para.align.is_none() && para.hanging.is_none() {
        return;
    }
    xml.push_str("<w:pPr>");
    if let Some(style) = para.style {
        xml.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape(style)));
    }
    if let Some((left, hanging)) = para.hanging {
        xml.push_str(&format!(r#"<w:ind w:left="{left}" w:hanging="{hanging}"/>"#));
    }
    if let Some(align) = para.align {
        xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, align.val()));
    }
    xml.push_str("</w:pPr>");
}

fn write_run(xml: &mut String, run: &Run<'_>) {
    xml.push_str("<w:r>");
    if run.bold || run.italic {
        xml.push_str("<w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        xml.push_str("</w:rPr>");
    }
    if !run.text.is_empty() {
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&xml_text(run.text));
        xml.push_str("</w:t>");
    }
    if run.tab {
        xml.push_str("<w:tab/>");
    }
    xml.push_str("</w:r>");
}

/// Characters XML 1.0 allows in content.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Escape `text` for element content, dropping characters XML forbids.
pub fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        escape(text)
    } else {
        let cleaned: String = text.chars().filter(|&c| is_xml_char(c)).collect();
        Cow::Owned(escape(&cleaned).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_escaped() {
        let mut body = Body::new();
        body.paragraph(Para::default(), &[Run::text("R&D <2024> \"quoted\"")]);
        let xml = body.finish();
        assert!(xml.contains("R&amp;D &lt;2024&gt;"));
        assert!(!xml.contains("R&D"));
    }

    #[test]
    fn test_control_characters_dropped() {
        assert_eq!(xml_text("Bad\u{1}char\u{0}here\u{FFFF}"), "Badcharhere");
        assert_eq!(xml_text("tab\there & <ok>"), "tab\there &amp; &lt;ok&gt;");

        let mut body = Body::new();
        body.table(&[vec!["cell\u{7}".into()]]);
        let xml = body.finish();
        assert!(xml.contains(">cell</w:t>"));
        assert!(!xml.contains('\u{7}'));
    }

    #[test]
    fn test_table_padding_and_header() {
        let mut body = Body::new();
        body.table(&[
            vec!["A".into(), "B".into(), "C".into()],
            vec!["1".into()],
        ]);
        let xml = body.finish();
        assert_eq!(xml.matches("<w:tc>").count(), 6);
        assert_eq!(xml.matches("<w:gridCol ").count(), 3);
        assert_eq!(xml.matches("<w:b/>").count(), 3);
    }

    #[test]
    fn test_empty_table_emits_nothing() {
        let mut body = Body::new();
        body.table(&[]);
        assert!(!body.finish().contains("<w:tbl>"));
    }

    #[test]
    fn test_heading_level_clamped() {
        let mut body = Body::new();
        body.heading(7, "Deep");
        assert!(body.finish().contains(r#"<w:pStyle w:val="Heading3"/>"#));
    }
}
