//! Word document reader.
//!
//! A `.docx` is a ZIP archive; the body lives in `word/document.xml`.
//! Each body paragraph becomes one [`LineRecord`] carrying its style id,
//! whether any run is bold and the first run's font size. Table rows are
//! flattened into pipe-delimited records so the structure engine sees them
//! as table rows.

use std::io::{Read, Seek};

use pattern_core::record::{DEFAULT_FONT_SIZE, DEFAULT_STYLE};
use pattern_core::{Error, LineRecord, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

const DOCUMENT_XML: &str = "word/document.xml";

/// Read all paragraph records from a `.docx` archive.
pub fn read_docx<R: Read + Seek>(reader: R) -> Result<Vec<LineRecord>> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let xml = read_document_xml(&mut archive)?;
    let records = parse_document_xml(&xml)?;
    debug!("Read {} paragraphs from {}", records.len(), DOCUMENT_XML);
    Ok(records)
}

fn read_document_xml<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<String> {
    let mut file = archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| Error::Docx(format!("cannot find {}: {}", DOCUMENT_XML, e)))?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

#[derive(Debug, Default)]
struct Paragraph {
    text: String,
    style: Option<String>,
    bold: bool,
    font_size: Option<f32>,
    runs: usize,
}

impl Paragraph {
    fn into_record(self) -> LineRecord {
        LineRecord {
            text: self.text.trim().to_string(),
            style: self.style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            bold: self.bold,
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
        }
    }
}

#[derive(Debug, Default)]
struct TableCursor {
    row: Vec<String>,
    cell: String,
}

fn attr_value(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` and `"false"` are off.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(
        attr_value(e, "w:val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

/// Parse `word/document.xml` into records.
pub fn parse_document_xml(xml: &str) -> Result<Vec<LineRecord>> {
    let mut reader = Reader::from_str(xml);
    // Run text keeps its spaces: "Hello" + " world" must not fuse.
    reader.config_mut().trim_text(false);

    let mut records = Vec::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut tables: Vec<TableCursor> = Vec::new();
    let mut in_ppr = false;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Docx(format!(
                "XML error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(Paragraph::default()),
                b"w:pPr" => in_ppr = true,
                b"w:r" => {
                    in_run = true;
                    if let Some(p) = paragraph.as_mut() {
                        p.runs += 1;
                    }
                }
                b"w:t" => in_text = true,
                b"w:tbl" => tables.push(TableCursor::default()),
                b"w:tr" => {
                    if let Some(t) = tables.last_mut() {
                        t.row.clear();
                    }
                }
                b"w:tc" => {
                    if let Some(t) = tables.last_mut() {
                        t.cell.clear();
                    }
                }
                _ => apply_property(&e, paragraph.as_mut(), in_ppr, in_run),
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" if in_run => {
                    if let Some(p) = paragraph.as_mut() {
                        p.text.push('\t');
                    }
                }
                b"w:br" | b"w:cr" if in_run => {
                    if let Some(p) = paragraph.as_mut() {
                        p.text.push(' ');
                    }
                }
                _ => apply_property(&e, paragraph.as_mut(), in_ppr, in_run),
            },
            Event::Text(e) => {
                if in_text {
                    if let Some(p) = paragraph.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Docx(format!("bad text node: {}", e)))?;
                        p.text.push_str(&text);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:pPr" => in_ppr = false,
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        let record = p.into_record();
                        if let Some(t) = tables.last_mut() {
                            if !record.text.is_empty() {
                                if !t.cell.is_empty() {
                                    t.cell.push(' ');
                                }
                                t.cell.push_str(&record.text);
                            }
                        } else if !record.text.is_empty() {
                            records.push(record);
                        }
                    }
                }
                b"w:tc" => {
                    if let Some(t) = tables.last_mut() {
                        let cell = std::mem::take(&mut t.cell);
                        t.row.push(cell.trim().to_string());
                    }
                }
                b"w:tr" => {
                    if let Some(t) = tables.last_mut() {
                        let row = std::mem::take(&mut t.row);
                        if row.iter().any(|c| !c.is_empty()) {
                            records.push(LineRecord::plain(pipe_row(&row)));
                        }
                    }
                }
                b"w:tbl" => {
                    tables.pop();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

fn apply_property(e: &BytesStart<'_>, paragraph: Option<&mut Paragraph>, in_ppr: bool, in_run: bool) {
    let Some(p) = paragraph else {
        return;
    };
    match e.name().as_ref() {
        b"w:pStyle" if in_ppr => p.style = attr_value(e, "w:val"),
        // Run properties only; the paragraph mark's own rPr sits inside pPr
        b"w:b" if in_run && !in_ppr => {
            if toggle_on(e) {
                p.bold = true;
            }
        }
        b"w:sz" if in_run && !in_ppr && p.runs == 1 && p.font_size.is_none() => {
            p.font_size = attr_value(e, "w:val")
                .and_then(|v| v.parse::<f32>().ok())
                .map(|half_points| half_points / 2.0);
        }
        _ => {}
    }
}

fn pipe_row(cells: &[String]) -> String {
    let cells: Vec<String> = cells.iter().map(|c| c.replace('|', "/")).collect();
    format!("| {} |", cells.join(" | "))
}
