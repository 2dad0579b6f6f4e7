use std::collections::BTreeMap;

use crate::document::{Alignment, Block, Document, Paragraph, Run, Table};

const BASE_CSS: &str = "\
body { background: var(--careletter-bg); color: var(--careletter-fg); }
.careletter-page { max-width: 16cm; margin: 2.5cm auto; font-family: var(--careletter-font); font-size: var(--careletter-size); line-height: 1.15; }
.careletter-page p { margin: 0; }
.careletter-tab { display: inline-block; min-width: 0.5cm; }
.careletter-table { border-collapse: collapse; width: 100%; }
.careletter-table td { border: 1px solid var(--careletter-border); padding: 4pt 6pt; vertical-align: top; }
";

/// Standalone HTML page for reviewing a rendered document in a browser.
#[derive(Debug, Clone, Default)]
pub struct Preview {
    custom_vars: BTreeMap<String, String>,
}

impl Preview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    pub fn stylesheet(&self, document: &Document) -> String {
        let mut vars = BTreeMap::from([
            ("--careletter-bg".to_string(), "#ffffff".to_string()),
            ("--careletter-fg".to_string(), "#1f2328".to_string()),
            ("--careletter-border".to_string(), "#5f6b76".to_string()),
            (
                "--careletter-font".to_string(),
                format!("\"{}\", sans-serif", css_string(&document.font.family)),
            ),
            (
                "--careletter-size".to_string(),
                format!("{}pt", document.font.size.as_pt()),
            ),
        ]);
        vars.extend(self.custom_vars.clone());

        let mut out = String::from(":root {\n");
        for (key, value) in &vars {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push_str(";\n");
        }
        out.push_str("}\n");
        out.push_str(BASE_CSS);
        out
    }

    pub fn embed_html(&self, document: &Document, title: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en-GB\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str(&format!("  <title>{}</title>\n", escape_html(title)));
        out.push_str("  <style>\n");
        out.push_str(&self.stylesheet(document));
        out.push_str("  </style>\n");
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str(&preview_html(document));
        out.push('\n');
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }
}

/// Body markup for `document`, wrapped in a `careletter-page` container.
pub fn preview_html(document: &Document) -> String {
    let mut out = String::from("<main class=\"careletter-page\">\n");
    for block in &document.blocks {
        match block {
            Block::Paragraph(paragraph) => {
                out.push_str(&paragraph_html(paragraph));
                out.push('\n');
            }
            Block::Table(table) => out.push_str(&table_html(table)),
        }
    }
    out.push_str("</main>");
    out
}

fn paragraph_html(paragraph: &Paragraph) -> String {
    let format = &paragraph.format;
    let align = match format.alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
        Alignment::Justify => "justify",
    };
    let mut out = format!(
        "<p style=\"text-align: {}; margin-left: {}pt; text-indent: {}pt; margin-top: {}pt; margin-bottom: {}pt\">",
        align,
        format.left_indent.as_pt(),
        format.first_line_indent.as_pt(),
        format.space_before.as_pt(),
        format.space_after.as_pt(),
    );
    if paragraph.runs.is_empty() {
        out.push_str("<br />");
    }
    for run in &paragraph.runs {
        out.push_str(&run_html(run));
    }
    out.push_str("</p>");
    out
}

fn run_html(run: &Run) -> String {
    let mut text = String::new();
    for (index, segment) in run.text.split('\t').enumerate() {
        if index > 0 {
            text.push_str("<span class=\"careletter-tab\"></span>");
        }
        text.push_str(&escape_html(segment));
    }
    if run.style.underline {
        text = format!("<u>{}</u>", text);
    }
    if run.style.italic {
        text = format!("<em>{}</em>", text);
    }
    if run.style.bold {
        text = format!("<strong>{}</strong>", text);
    }
    text
}

fn table_html(table: &Table) -> String {
    let mut out = String::from("<table class=\"careletter-table\">\n");
    for row in &table.rows {
        out.push_str("  <tr>");
        for (index, cell) in row.cells.iter().enumerate() {
            match table.column_widths.get(index) {
                Some(width) => out.push_str(&format!("<td style=\"width: {}pt\">", width.as_pt())),
                None => out.push_str("<td>"),
            }
            for paragraph in &cell.paragraphs {
                out.push_str(&paragraph_html(paragraph));
            }
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn css_string(text: &str) -> String {
    text.chars().filter(|ch| !matches!(ch, '"' | '\\' | '<' | '>' | ';')).collect()
}

#[cfg(test)]
mod tests {
    use super::{Preview, preview_html};
    use crate::document::{Document, Font, Length, Paragraph, ParagraphFormat, Run};
    use careletter_core::RunStyle;

    fn document() -> Document {
        let mut document = Document::new(Font {
            family: "Arial".to_string(),
            size: Length::pt(11.0),
        });
        let bold = RunStyle {
            bold: true,
            ..RunStyle::PLAIN
        };
        document.add_paragraph(
            Paragraph::new(ParagraphFormat::default())
                .with_run(Run::styled("Fees", bold))
                .with_run(Run::plain(" & <costs>")),
        );
        document
    }

    #[test]
    fn escapes_and_styles_runs() {
        let html = preview_html(&document());
        assert!(html.contains("<strong>Fees</strong> &amp; &lt;costs&gt;"));
    }

    #[test]
    fn embed_includes_stylesheet_and_overrides() {
        let html = Preview::new()
            .with_var("--careletter-bg", "#fafafa")
            .embed_html(&document(), "Letter <draft>");
        assert!(html.contains("<style>"));
        assert!(html.contains("--careletter-bg: #fafafa;"));
        assert!(html.contains("--careletter-font: \"Arial\", sans-serif;"));
        assert!(html.contains("<title>Letter &lt;draft&gt;</title>"));
    }
}
