use std::collections::HashSet;

use careletter_core::{
    Diagnostic, ElementKind, LogicalElement, Placeholders, Span,
    W_PLACEHOLDER_UNRESOLVED, tokenize,
};

use crate::document::{Alignment, Document, Length, Paragraph, ParagraphFormat, Run};
use crate::settings::RenderSettings;

pub struct RenderedLetter {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Counters for numbered paragraphs and their sub-items.
///
/// A numbered paragraph restarts the lettered and roman positions; a lettered
/// item restarts the roman position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NumberingState {
    pub paragraph: u32,
    pub letter: u32,
    pub roman: u32,
}

impl NumberingState {
    pub fn next_paragraph(&mut self) -> u32 {
        self.paragraph += 1;
        self.letter = 0;
        self.roman = 0;
        self.paragraph
    }

    pub fn next_letter(&mut self) -> u32 {
        self.letter += 1;
        self.roman = 0;
        self.letter
    }

    pub fn next_roman(&mut self) -> u32 {
        self.roman += 1;
        self.roman
    }
}

/// Renders selected precedent elements into the client-care letter.
pub struct LetterRenderer<'a> {
    settings: &'a RenderSettings,
    placeholders: &'a Placeholders,
    fee_lines: &'a [String],
}

impl<'a> LetterRenderer<'a> {
    pub fn new(settings: &'a RenderSettings, placeholders: &'a Placeholders) -> Self {
        Self {
            settings,
            placeholders,
            fee_lines: &[],
        }
    }

    pub fn with_fee_lines(mut self, fee_lines: &'a [String]) -> Self {
        self.fee_lines = fee_lines;
        self
    }

    pub fn render(&self, elements: &[LogicalElement]) -> RenderedLetter {
        let mut pass = RenderPass {
            renderer: self,
            document: Document::new(self.settings.font()),
            numbering: NumberingState::default(),
            diagnostics: Vec::new(),
            reported: HashSet::new(),
        };
        for element in elements {
            pass.element(element);
        }
        pass.close();
        RenderedLetter {
            document: pass.document,
            diagnostics: pass.diagnostics,
        }
    }
}

struct RenderPass<'r, 'a> {
    renderer: &'r LetterRenderer<'a>,
    document: Document,
    numbering: NumberingState,
    diagnostics: Vec<Diagnostic>,
    reported: HashSet<String>,
}

impl RenderPass<'_, '_> {
    fn element(&mut self, element: &LogicalElement) {
        let settings = self.renderer.settings;
        match element.kind {
            ElementKind::Heading => {
                let mut format = ParagraphFormat::aligned(Alignment::Left);
                format.space_before = Length::pt(settings.heading_space_before_pt);
                format.space_after = Length::pt(settings.heading_space_after_pt);
                format.keep_with_next = true;
                let mut runs = self.runs(&element.text(), element.span);
                for run in &mut runs {
                    run.style.bold = true;
                    run.style.underline = true;
                }
                self.push(format, None, runs);
            }
            ElementKind::NumberedItem => {
                let number = self.numbering.next_paragraph();
                let left = settings.numbered_left();
                let format = ParagraphFormat::aligned(Alignment::Justify).hanging(left, left);
                let runs = self.runs(&element.text(), element.span);
                self.push(format, Some(format!("{}.\t", number)), runs);
            }
            ElementKind::LetterItem => {
                let position = self.numbering.next_letter();
                let format = self.sub_item_format(1);
                let runs = self.runs(&element.text(), element.span);
                self.push(format, Some(format!("({})\t", letter_label(position))), runs);
            }
            ElementKind::RomanItem => {
                let position = self.numbering.next_roman();
                let format = self.sub_item_format(2);
                let runs = self.runs(&element.text(), element.span);
                self.push(format, Some(format!("({})\t", roman_label(position))), runs);
            }
            ElementKind::BulletItem => {
                let depth = if element.indent { 2 } else { 1 };
                let format = self.sub_item_format(depth);
                let runs = self.runs(&element.text(), element.span);
                let prefix = format!("{}\t", settings.bullet_glyph);
                self.push(format, Some(prefix), runs);
            }
            ElementKind::FeeTable => self.fee_table(element.span),
            ElementKind::BlankLine => {
                let spacing = Length::pt(settings.paragraph_break_pt);
                if let Some(previous) = self.document.last_paragraph_mut() {
                    previous.format.space_after = spacing;
                }
            }
            ElementKind::GeneralParagraph => {
                let mut format = ParagraphFormat::aligned(Alignment::Justify);
                if element.indent {
                    format.left_indent = Length::cm(settings.indent_modifier_cm);
                }
                let runs = self.runs(&element.text(), element.span);
                self.push(format, None, runs);
            }
        }
    }

    fn fee_table(&mut self, span: Span) {
        let settings = self.renderer.settings;
        let lines = self.renderer.fee_lines;
        for (index, line) in lines.iter().enumerate() {
            let mut format = ParagraphFormat::aligned(Alignment::Left);
            format.left_indent = settings.numbered_left();
            format.space_after = if index + 1 == lines.len() {
                Length::ZERO
            } else {
                Length::pt(settings.fee_line_spacing_pt)
            };
            let runs = self.runs(line, span);
            self.push(format, None, runs);
        }
    }

    fn sub_item_format(&self, depth: u8) -> ParagraphFormat {
        let settings = self.renderer.settings;
        ParagraphFormat::aligned(Alignment::Justify)
            .hanging(settings.nested_left(depth), settings.sub_item_hang())
    }

    fn push(&mut self, format: ParagraphFormat, prefix: Option<String>, runs: Vec<Run>) {
        let paragraph = self.document.add_paragraph(Paragraph::new(format));
        if let Some(prefix) = prefix {
            paragraph.push_run(Run::plain(prefix));
        }
        paragraph.runs.extend(runs);
    }

    // Placeholders are substituted before inline formatting is tokenized.
    fn runs(&mut self, text: &str, span: Span) -> Vec<Run> {
        let substitution = self.renderer.placeholders.substitute(text);
        for key in substitution.unresolved {
            if !self.reported.insert(key.clone()) {
                continue;
            }
            tracing::warn!(
                placeholder = %key,
                line = span.start,
                "unresolved placeholder left in letter"
            );
            self.diagnostics.push(Diagnostic::warning(
                span,
                W_PLACEHOLDER_UNRESOLVED,
                format!("placeholder `{{{}}}` has no value", key),
            ));
        }
        tokenize(&substitution.text)
            .into_iter()
            .map(|run| Run::styled(run.text, run.style))
            .collect()
    }

    fn close(&mut self) {
        let minimum = Length::pt(self.renderer.settings.closing_space_pt);
        if let Some(last) = self.document.last_paragraph_mut()
            && last.format.space_after < minimum
        {
            last.format.space_after = minimum;
        }
    }
}

/// `1 -> a`, `26 -> z`, `27 -> aa`.
pub fn letter_label(position: u32) -> String {
    let mut n = position.max(1);
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Lower-case roman numeral for `position`.
pub fn roman_label(position: u32) -> String {
    const NUMERALS: &[(u32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut n = position.max(1);
    let mut out = String::new();
    for &(value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{NumberingState, letter_label, roman_label};

    #[test]
    fn labels() {
        assert_eq!(letter_label(1), "a");
        assert_eq!(letter_label(7), "g");
        assert_eq!(letter_label(27), "aa");
        assert_eq!(roman_label(1), "i");
        assert_eq!(roman_label(4), "iv");
        assert_eq!(roman_label(9), "ix");
        assert_eq!(roman_label(14), "xiv");
    }

    #[test]
    fn numbered_paragraph_restarts_sub_items() {
        let mut state = NumberingState::default();
        assert_eq!(state.next_paragraph(), 1);
        assert_eq!(state.next_letter(), 1);
        assert_eq!(state.next_roman(), 1);
        assert_eq!(state.next_roman(), 2);
        assert_eq!(state.next_letter(), 2);
        assert_eq!(state.next_roman(), 1);
        assert_eq!(state.next_paragraph(), 2);
        assert_eq!(state.next_letter(), 1);
    }
}
