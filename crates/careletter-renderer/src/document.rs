//! Minimal rich-document model: paragraphs of styled runs and simple tables.
//!
//! Writers such as [`crate::write_docx`] and [`crate::preview_html`] consume
//! this model; renderers only ever build it.

use careletter_core::RunStyle;

const TWIPS_PER_CM: f32 = 566.929;

/// A length stored in twentieths of a point.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Length(i32);

impl Length {
    pub const ZERO: Length = Length(0);

    pub fn cm(value: f32) -> Self {
        Self((value * TWIPS_PER_CM).round() as i32)
    }

    pub fn pt(value: f32) -> Self {
        Self((value * 20.0).round() as i32)
    }

    pub fn as_twips(self) -> i32 {
        self.0
    }

    pub fn as_pt(self) -> f32 {
        self.0 as f32 / 20.0
    }

    /// Size in half-points, the unit WordprocessingML uses for font sizes.
    pub fn as_half_points(self) -> i32 {
        self.0 / 10
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl std::ops::Neg for Length {
    type Output = Length;

    fn neg(self) -> Length {
        Length(-self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphFormat {
    pub alignment: Alignment,
    pub left_indent: Length,
    /// Negative values produce a hanging indent.
    pub first_line_indent: Length,
    pub tab_stops: Vec<Length>,
    pub space_before: Length,
    pub space_after: Length,
    pub keep_with_next: bool,
}

impl ParagraphFormat {
    pub fn aligned(alignment: Alignment) -> Self {
        Self {
            alignment,
            ..Self::default()
        }
    }

    /// Hanging layout: the first line starts at `left - hang`, wrapped lines
    /// align with the tab stop at `left`.
    pub fn hanging(mut self, left: Length, hang: Length) -> Self {
        self.left_indent = left;
        self.first_line_indent = -hang;
        self.tab_stops = vec![left];
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::PLAIN,
        }
    }

    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub format: ParagraphFormat,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(format: ParagraphFormat) -> Self {
        Self {
            format,
            runs: Vec::new(),
        }
    }

    pub fn with_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn push_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub column_widths: Vec<Length>,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: Length,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub font: Font,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(font: Font) -> Self {
        Self {
            font,
            blocks: Vec::new(),
        }
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.blocks.push(Block::Paragraph(paragraph));
        match self.blocks.last_mut() {
            Some(Block::Paragraph(paragraph)) => paragraph,
            _ => unreachable!("paragraph was just pushed"),
        }
    }

    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// The last block, if it is a paragraph.
    pub fn last_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self.blocks.last_mut() {
            Some(Block::Paragraph(paragraph)) => Some(paragraph),
            _ => None,
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(paragraph) => Some(paragraph),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            Block::Paragraph(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Length;

    #[test]
    fn converts_units() {
        assert_eq!(Length::pt(12.0).as_twips(), 240);
        assert_eq!(Length::cm(0.75).as_twips(), 425);
        assert_eq!(Length::pt(11.0).as_half_points(), 22);
        assert_eq!((-Length::cm(0.5)).as_twips(), -283);
    }
}
