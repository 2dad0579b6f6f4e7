//! WordprocessingML packaging for [`Document`].
//!
//! Only the parts Word needs to open a document are written: content types,
//! package relationships, a styles part carrying the document font, and the
//! main document part.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::document::{Alignment, Block, Document, Font, Paragraph, Run, Table};
use crate::error::DocxError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// A4 with one-inch margins, in twips.
const PAGE_WIDTH: i32 = 11906;
const PAGE_HEIGHT: i32 = 16838;
const PAGE_MARGIN: i32 = 1440;

/// Serializes `document` into the bytes of a `.docx` file.
pub fn write_docx(document: &Document) -> Result<Vec<u8>, DocxError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/styles.xml", styles_xml(&document.font)),
        ("word/document.xml", document_xml(document)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    let bytes = zip.finish()?.into_inner();
    tracing::debug!(
        blocks = document.blocks.len(),
        bytes = bytes.len(),
        "packaged docx"
    );
    Ok(bytes)
}

/// The `word/document.xml` part for `document`.
pub fn document_xml(document: &Document) -> String {
    let mut writer = XmlWriter::new();
    writer.raw(XML_DECLARATION);
    writer.open(&format!(
        "<w:document xmlns:w=\"{}\" xmlns:r=\"{}\">",
        W_NS, R_NS
    ));
    writer.open("<w:body>");
    for block in &document.blocks {
        match block {
            Block::Paragraph(paragraph) => write_paragraph(&mut writer, paragraph),
            Block::Table(table) => write_table(&mut writer, table),
        }
    }
    // Word requires a paragraph between a trailing table and the section.
    if matches!(document.blocks.last(), Some(Block::Table(_))) {
        writer.line("<w:p/>");
    }
    writer.line(&format!(
        "<w:sectPr><w:pgSz w:w=\"{}\" w:h=\"{}\"/><w:pgMar w:top=\"{m}\" w:right=\"{m}\" w:bottom=\"{m}\" w:left=\"{m}\" w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>",
        PAGE_WIDTH,
        PAGE_HEIGHT,
        m = PAGE_MARGIN
    ));
    writer.close("</w:body>");
    writer.close("</w:document>");
    writer.finish()
}

fn styles_xml(font: &Font) -> String {
    let family = escape(font.family.as_str());
    let size = font.size.as_half_points();
    let mut writer = XmlWriter::new();
    writer.raw(XML_DECLARATION);
    writer.open(&format!("<w:styles xmlns:w=\"{}\">", W_NS));
    writer.open("<w:docDefaults>");
    writer.line(&format!(
        "<w:rPrDefault><w:rPr><w:rFonts w:ascii=\"{f}\" w:hAnsi=\"{f}\" w:eastAsia=\"{f}\" w:cs=\"{f}\"/><w:sz w:val=\"{s}\"/><w:szCs w:val=\"{s}\"/><w:lang w:val=\"en-GB\"/></w:rPr></w:rPrDefault>",
        f = family,
        s = size
    ));
    writer.line(
        "<w:pPrDefault><w:pPr><w:spacing w:after=\"0\" w:line=\"240\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault>",
    );
    writer.close("</w:docDefaults>");
    writer.line(
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
    );
    writer.close("</w:styles>");
    writer.finish()
}

fn write_paragraph(writer: &mut XmlWriter, paragraph: &Paragraph) {
    writer.open("<w:p>");
    writer.line(&paragraph_properties(paragraph));
    for run in &paragraph.runs {
        write_run(writer, run);
    }
    writer.close("</w:p>");
}

// Child order follows CT_PPr: keepNext, tabs, spacing, ind, jc.
fn paragraph_properties(paragraph: &Paragraph) -> String {
    let format = &paragraph.format;
    let mut out = String::from("<w:pPr>");
    if format.keep_with_next {
        out.push_str("<w:keepNext/>");
    }
    if !format.tab_stops.is_empty() {
        out.push_str("<w:tabs>");
        for stop in &format.tab_stops {
            out.push_str(&format!(
                "<w:tab w:val=\"left\" w:pos=\"{}\"/>",
                stop.as_twips()
            ));
        }
        out.push_str("</w:tabs>");
    }
    out.push_str(&format!(
        "<w:spacing w:before=\"{}\" w:after=\"{}\"/>",
        format.space_before.as_twips(),
        format.space_after.as_twips()
    ));
    let left = format.left_indent.as_twips();
    let first = format.first_line_indent.as_twips();
    if left != 0 || first != 0 {
        out.push_str(&format!("<w:ind w:left=\"{}\"", left));
        if first < 0 {
            out.push_str(&format!(" w:hanging=\"{}\"", -first));
        } else if first > 0 {
            out.push_str(&format!(" w:firstLine=\"{}\"", first));
        }
        out.push_str("/>");
    }
    out.push_str(&format!("<w:jc w:val=\"{}\"/>", justification(format.alignment)));
    out.push_str("</w:pPr>");
    out
}

fn justification(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "both",
    }
}

fn write_run(writer: &mut XmlWriter, run: &Run) {
    let mut out = String::from("<w:r>");
    if !run.style.is_plain() {
        out.push_str("<w:rPr>");
        if run.style.bold {
            out.push_str("<w:b/>");
        }
        if run.style.italic {
            out.push_str("<w:i/>");
        }
        if run.style.underline {
            out.push_str("<w:u w:val=\"single\"/>");
        }
        out.push_str("</w:rPr>");
    }
    for (index, segment) in run.text.split('\t').enumerate() {
        if index > 0 {
            out.push_str("<w:tab/>");
        }
        if !segment.is_empty() {
            out.push_str("<w:t xml:space=\"preserve\">");
            out.push_str(&escape(segment));
            out.push_str("</w:t>");
        }
    }
    out.push_str("</w:r>");
    writer.line(&out);
}

fn write_table(writer: &mut XmlWriter, table: &Table) {
    writer.open("<w:tbl>");
    writer.open("<w:tblPr>");
    writer.line("<w:tblW w:w=\"0\" w:type=\"auto\"/>");
    let mut borders = String::from("<w:tblBorders>");
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        borders.push_str(&format!(
            "<w:{} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"000000\"/>",
            edge
        ));
    }
    borders.push_str("</w:tblBorders>");
    writer.line(&borders);
    writer.close("</w:tblPr>");

    let mut grid = String::from("<w:tblGrid>");
    for width in &table.column_widths {
        grid.push_str(&format!("<w:gridCol w:w=\"{}\"/>", width.as_twips()));
    }
    grid.push_str("</w:tblGrid>");
    writer.line(&grid);

    for row in &table.rows {
        writer.open("<w:tr>");
        for (index, cell) in row.cells.iter().enumerate() {
            writer.open("<w:tc>");
            if let Some(width) = table.column_widths.get(index) {
                writer.line(&format!(
                    "<w:tcPr><w:tcW w:w=\"{}\" w:type=\"dxa\"/></w:tcPr>",
                    width.as_twips()
                ));
            }
            if cell.paragraphs.is_empty() {
                writer.line("<w:p/>");
            }
            for paragraph in &cell.paragraphs {
                write_paragraph(writer, paragraph);
            }
            writer.close("</w:tc>");
        }
        writer.close("</w:tr>");
    }
    writer.close("</w:tbl>");
}

struct XmlWriter {
    out: String,
    indent: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(line);
        self.out.push('\n');
    }

    fn open(&mut self, tag: &str) {
        self.line(tag);
        self.indent += 1;
    }

    fn close(&mut self, tag: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(tag);
    }

    fn finish(mut self) -> String {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }
}
