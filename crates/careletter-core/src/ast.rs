use std::fmt;

use serde::Serialize;

use crate::context::Track;
use crate::span::Span;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientTag {
    Indiv,
    Corp,
}

impl ClientTag {
    pub fn name(self) -> &'static str {
        match self {
            ClientTag::Indiv => "indiv",
            ClientTag::Corp => "corp",
        }
    }
}

/// One of the eight track-assignment tags, `a1`..`a4` and `u1`..`u4`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TrackTag {
    pub assigned: bool,
    pub track: Track,
}

impl TrackTag {
    pub const ALL: [TrackTag; 8] = [
        TrackTag::new(true, Track::SmallClaims),
        TrackTag::new(true, Track::Fast),
        TrackTag::new(true, Track::Intermediate),
        TrackTag::new(true, Track::Multi),
        TrackTag::new(false, Track::SmallClaims),
        TrackTag::new(false, Track::Fast),
        TrackTag::new(false, Track::Intermediate),
        TrackTag::new(false, Track::Multi),
    ];

    pub const fn new(assigned: bool, track: Track) -> Self {
        Self { assigned, track }
    }

    pub fn name(self) -> String {
        let prefix = if self.assigned { 'a' } else { 'u' };
        format!("{}{}", prefix, self.track.digit())
    }

    fn parse(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let assigned = match chars.next()? {
            'a' => true,
            'u' => false,
            _ => return None,
        };
        let track = Track::from_digit(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(assigned, track))
    }
}

impl Serialize for TrackTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BlockTag {
    Client(ClientTag),
    Track(TrackTag),
}

impl BlockTag {
    /// Parses the inner name of a block tag, e.g. `indiv` or `u3`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "indiv" => Some(BlockTag::Client(ClientTag::Indiv)),
            "corp" => Some(BlockTag::Client(ClientTag::Corp)),
            other => TrackTag::parse(other).map(BlockTag::Track),
        }
    }

    pub fn name(&self) -> String {
        match self {
            BlockTag::Client(tag) => tag.name().to_string(),
            BlockTag::Track(tag) => tag.name(),
        }
    }

    pub fn start_marker(&self) -> String {
        format!("[{}]", self.name())
    }

    pub fn end_marker(&self) -> String {
        format!("[end {}]", self.name())
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Conditional blocks active where an element was parsed.
///
/// The client and track families are independent, so both may be set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
pub struct Governing {
    pub client: Option<ClientTag>,
    pub track: Option<TrackTag>,
}

impl Governing {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_unconditional(&self) -> bool {
        self.client.is_none() && self.track.is_none()
    }

    pub fn tags(&self) -> impl Iterator<Item = BlockTag> {
        let client = self.client.map(BlockTag::Client);
        let track = self.track.map(BlockTag::Track);
        client.into_iter().chain(track)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Heading,
    NumberedItem,
    LetterItem,
    RomanItem,
    BulletItem,
    FeeTable,
    BlankLine,
    GeneralParagraph,
}

impl ElementKind {
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Heading => "heading",
            ElementKind::NumberedItem => "numbered_item",
            ElementKind::LetterItem => "letter_item",
            ElementKind::RomanItem => "roman_item",
            ElementKind::BulletItem => "bullet_item",
            ElementKind::FeeTable => "fee_table",
            ElementKind::BlankLine => "blank_line",
            ElementKind::GeneralParagraph => "general_paragraph",
        }
    }

    pub fn carries_text(self) -> bool {
        !matches!(self, ElementKind::FeeTable | ElementKind::BlankLine)
    }
}

/// One parsed unit of letter content, ready for rendering.
///
/// `text_lines` still contain placeholders and inline formatting tags.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LogicalElement {
    pub span: Span,
    pub kind: ElementKind,
    pub text_lines: Vec<String>,
    pub governing: Governing,
    pub indent: bool,
}

impl LogicalElement {
    /// Source lines joined the way the renderer reflows them.
    pub fn text(&self) -> String {
        self.text_lines.join(" ")
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Precedent {
    pub elements: Vec<LogicalElement>,
}
