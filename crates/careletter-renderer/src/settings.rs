use serde::Deserialize;

use crate::document::{Font, Length};

/// Layout constants shared by every rendered document.
///
/// Distances are in centimetres and spacings in points, matching how they are
/// written in configuration files.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub font_family: String,
    pub font_size_pt: f32,
    /// Body-text column of numbered paragraphs; also their hanging width.
    pub numbered_indent_cm: f32,
    /// Hanging width of lettered, roman and bullet items.
    pub sub_item_hang_cm: f32,
    /// Extra left indent for paragraphs marked with `[ind]`.
    pub indent_modifier_cm: f32,
    pub paragraph_break_pt: f32,
    pub fee_line_spacing_pt: f32,
    pub heading_space_before_pt: f32,
    pub heading_space_after_pt: f32,
    pub closing_space_pt: f32,
    pub bullet_glyph: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size_pt: 11.0,
            numbered_indent_cm: 0.75,
            sub_item_hang_cm: 0.5,
            indent_modifier_cm: 0.75,
            paragraph_break_pt: 12.0,
            fee_line_spacing_pt: 6.0,
            heading_space_before_pt: 12.0,
            heading_space_after_pt: 6.0,
            closing_space_pt: 6.0,
            bullet_glyph: "\u{2022}".to_string(),
        }
    }
}

impl RenderSettings {
    pub fn font(&self) -> Font {
        Font {
            family: self.font_family.clone(),
            size: Length::pt(self.font_size_pt),
        }
    }

    pub(crate) fn numbered_left(&self) -> Length {
        Length::cm(self.numbered_indent_cm)
    }

    pub(crate) fn sub_item_hang(&self) -> Length {
        Length::cm(self.sub_item_hang_cm)
    }

    /// Left edge of body text for nested items; `depth` 1 is a lettered item.
    pub(crate) fn nested_left(&self, depth: u8) -> Length {
        let mut left = self.numbered_left();
        for _ in 0..depth {
            left = left + self.sub_item_hang();
        }
        left
    }
}
