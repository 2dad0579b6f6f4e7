use careletter_core::{RunStyle, tokenize};
use serde::Deserialize;

use crate::document::{
    Alignment, Document, Length, Paragraph, ParagraphFormat, Run, Table, TableCell, TableRow,
};
use crate::settings::RenderSettings;

const LABEL_COLUMN_CM: f32 = 4.5;
const VALUE_COLUMN_CM: f32 = 11.5;

/// Record of the initial advice given to the client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AdviceSummary {
    pub client_name: String,
    pub our_ref: String,
    /// Already formatted for display.
    pub date: String,
    pub method: String,
    /// One paragraph per line.
    pub content: String,
}

pub fn render_advice_summary(summary: &AdviceSummary, settings: &RenderSettings) -> Document {
    let mut document = Document::new(settings.font());

    let mut title = ParagraphFormat::aligned(Alignment::Left);
    title.space_after = Length::pt(settings.paragraph_break_pt);
    document.add_paragraph(Paragraph::new(title).with_run(Run::styled(
        format!(
            "Initial Advice Summary: {} (our ref {})",
            summary.client_name, summary.our_ref
        ),
        RunStyle {
            bold: true,
            italic: false,
            underline: true,
        },
    )));

    let rows = [
        ("Date of advice", summary.date.as_str()),
        ("Method of advice", summary.method.as_str()),
        ("Content of advice", summary.content.as_str()),
    ];
    let table = Table {
        column_widths: vec![Length::cm(LABEL_COLUMN_CM), Length::cm(VALUE_COLUMN_CM)],
        rows: rows
            .into_iter()
            .map(|(label, value)| TableRow {
                cells: vec![label_cell(label), value_cell(value)],
            })
            .collect(),
    };
    document.add_table(table);
    document
}

fn label_cell(label: &str) -> TableCell {
    let mut style = RunStyle::PLAIN;
    style.bold = true;
    TableCell {
        paragraphs: vec![
            Paragraph::new(ParagraphFormat::aligned(Alignment::Left))
                .with_run(Run::styled(label, style)),
        ],
    }
}

fn value_cell(value: &str) -> TableCell {
    let paragraphs = value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut paragraph = Paragraph::new(ParagraphFormat::aligned(Alignment::Left));
            for run in tokenize(line) {
                paragraph.push_run(Run::styled(run.text, run.style));
            }
            paragraph
        })
        .collect();
    TableCell { paragraphs }
}

#[cfg(test)]
mod tests {
    use super::{AdviceSummary, render_advice_summary};
    use crate::settings::RenderSettings;

    #[test]
    fn three_rows_in_order() {
        let summary = AdviceSummary {
            client_name: "Jane Smith".to_string(),
            our_ref: "JS/001".to_string(),
            date: "15 October 2026".to_string(),
            method: "Telephone".to_string(),
            content: "First point.\n\nSecond point.".to_string(),
        };
        let document = render_advice_summary(&summary, &RenderSettings::default());
        let title: Vec<_> = document.paragraphs().map(|p| p.text()).collect();
        assert_eq!(title, ["Initial Advice Summary: Jane Smith (our ref JS/001)"]);

        let table = document.tables().next().unwrap();
        let labels: Vec<_> = table
            .rows
            .iter()
            .map(|row| row.cells[0].paragraphs[0].text())
            .collect();
        assert_eq!(labels, ["Date of advice", "Method of advice", "Content of advice"]);
        assert_eq!(table.rows[2].cells[1].paragraphs.len(), 2);
    }
}
