use crate::ast::{
    BlockTag, ClientTag, ElementKind, Governing, LogicalElement, Precedent, TrackTag,
};
use crate::diagnostic::{
    Diagnostic, E_BLOCK_UNTERMINATED, RelatedDiagnostic, W_BLOCK_END_UNMATCHED, W_BLOCK_NESTED,
    W_SECTION_END_UNMATCHED, W_SECTION_UNTERMINATED,
};
use crate::span::Span;

pub struct ParseResult {
    pub document: Precedent,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a precedent into logical elements.
///
/// Conditional blocks are recorded on each element rather than evaluated here;
/// see [`crate::select`].
pub fn parse(source: &str) -> ParseResult {
    let mut parser = Parser::new();
    for (index, line) in source.lines().enumerate() {
        parser.parse_line(index + 1, line);
    }
    parser.finish();
    ParseResult {
        document: Precedent {
            elements: parser.elements,
        },
        diagnostics: parser.diagnostics,
    }
}

/// Classification of a content line once block tags and `[ind]` are removed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineClass {
    Heading,
    Numbered,
    Roman,
    Letter,
    Bullet,
    FeeTable,
    Blank,
    Text,
}

pub struct LineRule {
    pub name: &'static str,
    pub class: LineClass,
    matcher: fn(&str) -> Option<&str>,
}

impl LineRule {
    /// Returns the line body after the marker when this rule applies.
    pub fn apply<'a>(&self, text: &'a str) -> Option<&'a str> {
        (self.matcher)(text)
    }
}

/// Line classification rules, tried in order; the first match wins.
///
/// Roman items come before lettered items so that a marker matching both is
/// read as a roman numeral. The final rule accepts any line.
pub const LINE_RULES: &[LineRule] = &[
    LineRule {
        name: "heading",
        class: LineClass::Heading,
        matcher: match_heading,
    },
    LineRule {
        name: "numbered",
        class: LineClass::Numbered,
        matcher: match_numbered,
    },
    LineRule {
        name: "roman",
        class: LineClass::Roman,
        matcher: match_roman,
    },
    LineRule {
        name: "letter",
        class: LineClass::Letter,
        matcher: match_letter,
    },
    LineRule {
        name: "bullet",
        class: LineClass::Bullet,
        matcher: match_bullet,
    },
    LineRule {
        name: "fee_table",
        class: LineClass::FeeTable,
        matcher: match_fee_table,
    },
    LineRule {
        name: "blank",
        class: LineClass::Blank,
        matcher: match_blank,
    },
    LineRule {
        name: "text",
        class: LineClass::Text,
        matcher: match_text,
    },
];

pub const INDENT_MARKER: &str = "[ind]";
pub const FEE_TABLE_MARKER: &str = "[fee_table]";
pub const BLANK_MARKER: &str = "[]";
pub const SECTION_START: &str = "[numbering]";
pub const SECTION_END: &str = "[end numbering]";

/// Classifies a line body, returning the matching class and the body text.
pub fn classify(text: &str) -> (LineClass, &str) {
    for rule in LINE_RULES {
        if let Some(body) = rule.apply(text) {
            return (rule.class, body);
        }
    }
    (LineClass::Text, text)
}

/// Splits a leading `[ind]` marker off a line body.
pub fn strip_indent(text: &str) -> (bool, &str) {
    match text.strip_prefix(INDENT_MARKER) {
        Some(rest) => (true, rest.trim_start()),
        None => (false, text),
    }
}

fn match_text(text: &str) -> Option<&str> {
    Some(text)
}

fn match_heading(text: &str) -> Option<&str> {
    text.strip_prefix("[h]").map(str::trim_start)
}

fn match_numbered(text: &str) -> Option<&str> {
    text.strip_prefix("[n]").map(str::trim_start)
}

fn match_roman(text: &str) -> Option<&str> {
    let (inner, body) = bracketed_prefix(text)?;
    let valid = (1..=3).contains(&inner.len())
        && inner.chars().all(|ch| matches!(ch, 'i' | 'v' | 'x'));
    valid.then(|| body.trim_start())
}

fn match_letter(text: &str) -> Option<&str> {
    let (inner, body) = bracketed_prefix(text)?;
    let mut chars = inner.chars();
    let letter = chars.next()?;
    (chars.next().is_none() && ('a'..='g').contains(&letter)).then(|| body.trim_start())
}

fn match_bullet(text: &str) -> Option<&str> {
    text.strip_prefix("[bp]").map(str::trim_start)
}

fn match_fee_table(text: &str) -> Option<&str> {
    (text == FEE_TABLE_MARKER).then_some("")
}

fn match_blank(text: &str) -> Option<&str> {
    (text.is_empty() || text == BLANK_MARKER).then_some("")
}

// Splits `[inner]rest` into `(inner, rest)`.
fn bracketed_prefix(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('[')?;
    let close = rest.find(']')?;
    Some((&rest[..close], &rest[close + 1..]))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ControlTag {
    Start(BlockTag),
    End(BlockTag),
    SectionStart,
    SectionEnd,
}

fn control_tag(trimmed: &str) -> Option<ControlTag> {
    if trimmed == SECTION_START {
        return Some(ControlTag::SectionStart);
    }
    if trimmed == SECTION_END {
        return Some(ControlTag::SectionEnd);
    }
    let inner = trimmed.strip_prefix('[')?.strip_suffix(']')?;
    if let Some(name) = inner.strip_prefix("end ") {
        return BlockTag::from_name(name).map(ControlTag::End);
    }
    BlockTag::from_name(inner).map(ControlTag::Start)
}

#[derive(Clone, Copy, Debug)]
struct OpenBlock<T> {
    tag: T,
    line: usize,
}

#[derive(Clone, Debug)]
struct PendingParagraph {
    span: Span,
    lines: Vec<String>,
    governing: Governing,
    indent: bool,
    numbered: bool,
}

#[derive(Clone, Debug, Default)]
struct ScanState {
    client: Option<OpenBlock<ClientTag>>,
    track: Option<OpenBlock<TrackTag>>,
    // Line on which the numbered section opened.
    section: Option<usize>,
    pending: Option<PendingParagraph>,
}

impl ScanState {
    fn governing(&self) -> Governing {
        Governing {
            client: self.client.map(|open| open.tag),
            track: self.track.map(|open| open.tag),
        }
    }

    fn in_numbered_section(&self) -> bool {
        self.section.is_some()
    }
}

struct Parser {
    state: ScanState,
    elements: Vec<LogicalElement>,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: ScanState::default(),
            elements: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn parse_line(&mut self, line_no: usize, raw: &str) {
        let trimmed = raw.trim();

        if let Some(tag) = control_tag(trimmed) {
            self.flush_paragraph();
            self.apply_control(tag, line_no);
            return;
        }

        let (opened, rest) = self.strip_inline_starts(trimmed, line_no);
        let (closes, body) = strip_inline_ends(rest);
        if opened {
            self.flush_paragraph();
        }

        let governing = self.state.governing();
        let (indent, body) = strip_indent(body.trim());
        // A line made only of block tags carries no content of its own.
        let tags_only = (opened || !closes.is_empty()) && body.is_empty();
        if !tags_only {
            let (class, body) = classify(body);
            self.emit_line(line_no, class, body, governing, indent);
        }

        if !closes.is_empty() {
            self.flush_paragraph();
            for tag in closes {
                self.close_block(tag, line_no);
            }
        }
    }

    fn apply_control(&mut self, tag: ControlTag, line_no: usize) {
        match tag {
            ControlTag::Start(tag) => self.open_block(tag, line_no),
            ControlTag::End(tag) => self.close_block(tag, line_no),
            ControlTag::SectionStart => {
                if let Some(opened) = self.state.section {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            Span::line(line_no),
                            W_BLOCK_NESTED,
                            "numbered section is already open",
                        )
                        .with_related(RelatedDiagnostic::new(
                            Span::line(opened),
                            Some("opened here".to_string()),
                        )),
                    );
                } else {
                    self.state.section = Some(line_no);
                }
            }
            ControlTag::SectionEnd => {
                if self.state.section.take().is_none() {
                    self.diagnostics.push(Diagnostic::warning(
                        Span::line(line_no),
                        W_SECTION_END_UNMATCHED,
                        "`[end numbering]` without an open numbered section",
                    ));
                }
            }
        }
    }

    // Leading start tags, at most one per family, open blocks that already
    // apply to this line's own content.
    fn strip_inline_starts<'a>(&mut self, text: &'a str, line_no: usize) -> (bool, &'a str) {
        let mut rest = text;
        let mut seen_client = false;
        let mut seen_track = false;
        let mut opened = false;

        while let Some((inner, after)) = bracketed_prefix(rest) {
            let Some(tag) = BlockTag::from_name(inner) else {
                break;
            };
            let seen = match tag {
                BlockTag::Client(_) => &mut seen_client,
                BlockTag::Track(_) => &mut seen_track,
            };
            if *seen {
                break;
            }
            *seen = true;
            self.open_block(tag, line_no);
            opened = true;
            rest = after.trim_start();
        }
        (opened, rest)
    }

    fn open_block(&mut self, tag: BlockTag, line_no: usize) {
        let previous = match tag {
            BlockTag::Client(client) => self
                .state
                .client
                .replace(OpenBlock {
                    tag: client,
                    line: line_no,
                })
                .map(|open| (BlockTag::Client(open.tag), open.line)),
            BlockTag::Track(track) => self
                .state
                .track
                .replace(OpenBlock {
                    tag: track,
                    line: line_no,
                })
                .map(|open| (BlockTag::Track(open.tag), open.line)),
        };
        if let Some((open_tag, open_line)) = previous {
            self.diagnostics.push(
                Diagnostic::warning(
                    Span::line(line_no),
                    W_BLOCK_NESTED,
                    format!(
                        "`{}` opened while `{}` is still open; the earlier block ends here",
                        tag.start_marker(),
                        open_tag.start_marker()
                    ),
                )
                .with_related(RelatedDiagnostic::new(
                    Span::line(open_line),
                    Some("opened here".to_string()),
                )),
            );
        }
    }

    fn close_block(&mut self, tag: BlockTag, line_no: usize) {
        let closed = match tag {
            BlockTag::Client(client) => match self.state.client {
                Some(open) if open.tag == client => self.state.client.take().is_some(),
                _ => false,
            },
            BlockTag::Track(track) => match self.state.track {
                Some(open) if open.tag == track => self.state.track.take().is_some(),
                _ => false,
            },
        };
        if !closed {
            self.diagnostics.push(Diagnostic::warning(
                Span::line(line_no),
                W_BLOCK_END_UNMATCHED,
                format!("`{}` does not close an open block", tag.end_marker()),
            ));
        }
    }

    fn emit_line(
        &mut self,
        line_no: usize,
        class: LineClass,
        body: &str,
        governing: Governing,
        indent: bool,
    ) {
        let kind = match class {
            LineClass::Text => {
                self.accumulate(line_no, body, governing, indent);
                return;
            }
            LineClass::Heading => ElementKind::Heading,
            LineClass::Numbered => ElementKind::NumberedItem,
            LineClass::Roman => ElementKind::RomanItem,
            LineClass::Letter => ElementKind::LetterItem,
            LineClass::Bullet => ElementKind::BulletItem,
            LineClass::FeeTable => ElementKind::FeeTable,
            LineClass::Blank => ElementKind::BlankLine,
        };
        self.flush_paragraph();
        let text_lines = if kind.carries_text() {
            vec![body.to_string()]
        } else {
            Vec::new()
        };
        self.elements.push(LogicalElement {
            span: Span::line(line_no),
            kind,
            text_lines,
            governing,
            indent,
        });
    }

    // Plain lines reflow into one paragraph while the governing blocks stay
    // the same.
    fn accumulate(&mut self, line_no: usize, body: &str, governing: Governing, indent: bool) {
        if let Some(pending) = self.state.pending.as_mut()
            && pending.governing == governing
        {
            pending.span.extend_to(line_no);
            pending.lines.push(body.to_string());
            pending.indent |= indent;
            return;
        }
        self.flush_paragraph();
        self.state.pending = Some(PendingParagraph {
            span: Span::line(line_no),
            lines: vec![body.to_string()],
            governing,
            indent,
            numbered: self.state.in_numbered_section(),
        });
    }

    fn flush_paragraph(&mut self) {
        let Some(pending) = self.state.pending.take() else {
            return;
        };
        let kind = if pending.numbered && !pending.indent {
            ElementKind::NumberedItem
        } else {
            ElementKind::GeneralParagraph
        };
        self.elements.push(LogicalElement {
            span: pending.span,
            kind,
            text_lines: pending.lines,
            governing: pending.governing,
            indent: pending.indent,
        });
    }

    fn finish(&mut self) {
        self.flush_paragraph();
        if let Some(open) = self.state.client.take() {
            self.report_unterminated(BlockTag::Client(open.tag), open.line);
        }
        if let Some(open) = self.state.track.take() {
            self.report_unterminated(BlockTag::Track(open.tag), open.line);
        }
        if let Some(line) = self.state.section.take() {
            self.diagnostics.push(Diagnostic::warning(
                Span::line(line),
                W_SECTION_UNTERMINATED,
                "numbered section is never closed with `[end numbering]`",
            ));
        }
    }

    fn report_unterminated(&mut self, tag: BlockTag, line: usize) {
        self.diagnostics.push(Diagnostic::error(
            Span::line(line),
            E_BLOCK_UNTERMINATED,
            format!(
                "`{}` has no matching `{}`; the block runs to the end of the precedent",
                tag.start_marker(),
                tag.end_marker()
            ),
        ));
    }
}

// Trailing end tags, at most one per family. They take effect after the line.
fn strip_inline_ends(text: &str) -> (Vec<BlockTag>, &str) {
    let mut rest = text;
    let mut closes: Vec<BlockTag> = Vec::new();

    while rest.ends_with(']') {
        let Some(open) = rest.rfind("[end ") else {
            break;
        };
        let inner = &rest[open + "[end ".len()..rest.len() - 1];
        let Some(tag) = BlockTag::from_name(inner) else {
            break;
        };
        let same_family = closes
            .iter()
            .any(|seen| std::mem::discriminant(seen) == std::mem::discriminant(&tag));
        if same_family {
            break;
        }
        closes.push(tag);
        rest = rest[..open].trim_end();
    }
    (closes, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<ElementKind> {
        parse(source)
            .document
            .elements
            .iter()
            .map(|element| element.kind)
            .collect()
    }

    #[test]
    fn start_and_end_tags_on_one_line_emit_nothing() {
        let parsed = parse("Opening.\n[indiv][end indiv]\nClosing.");
        assert!(parsed.diagnostics.is_empty());
        let kinds: Vec<ElementKind> = parsed
            .document
            .elements
            .iter()
            .map(|element| element.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![ElementKind::GeneralParagraph, ElementKind::GeneralParagraph]
        );

        let parsed = parse("Opening.\n[corp][]\nClosing.");
        assert_eq!(parsed.document.elements[1].kind, ElementKind::BlankLine);
    }

    #[test]
    fn rule_order_is_fixed() {
        let names: Vec<&str> = LINE_RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            vec![
                "heading",
                "numbered",
                "roman",
                "letter",
                "bullet",
                "fee_table",
                "blank",
                "text"
            ]
        );
    }

    #[test]
    fn classifies_line_markers() {
        assert_eq!(classify("[h]Title"), (LineClass::Heading, "Title"));
        assert_eq!(classify("[n] Numbered"), (LineClass::Numbered, "Numbered"));
        assert_eq!(classify("[iii] third"), (LineClass::Roman, "third"));
        assert_eq!(classify("[xiv]"), (LineClass::Roman, ""));
        assert_eq!(classify("[xixi] four"), (LineClass::Text, "[xixi] four"));
        assert_eq!(classify("[c] item"), (LineClass::Letter, "item"));
        assert_eq!(classify("[h] [c] nested"), (LineClass::Heading, "[c] nested"));
        assert_eq!(classify("[bp] bullet"), (LineClass::Bullet, "bullet"));
        assert_eq!(classify("[fee_table]"), (LineClass::FeeTable, ""));
        assert_eq!(classify("[]"), (LineClass::Blank, ""));
        assert_eq!(classify(""), (LineClass::Blank, ""));
        assert_eq!(classify("[z] not a letter"), (LineClass::Text, "[z] not a letter"));
        assert_eq!(classify("[]To comply"), (LineClass::Text, "[]To comply"));
    }

    #[test]
    fn roman_wins_over_letter() {
        // No letter marker overlaps today, but the table order decides if one does.
        let roman = LINE_RULES.iter().position(|rule| rule.class == LineClass::Roman);
        let letter = LINE_RULES.iter().position(|rule| rule.class == LineClass::Letter);
        assert!(roman < letter);
        assert_eq!(classify("[i] first").0, LineClass::Roman);
        assert_eq!(classify("[v] fifth").0, LineClass::Roman);
    }

    #[test]
    fn plain_lines_reflow_into_one_paragraph() {
        let parsed = parse("First line\nsecond line\n\nNext");
        let elements = &parsed.document.elements;
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].kind, ElementKind::GeneralParagraph);
        assert_eq!(elements[0].text(), "First line second line");
        assert_eq!(elements[0].span, Span { start: 1, end: 2 });
        assert_eq!(elements[1].kind, ElementKind::BlankLine);
        assert_eq!(elements[2].text(), "Next");
    }

    #[test]
    fn tag_only_lines_produce_no_output() {
        let parsed = parse("[indiv]\nFor you\n[end indiv]\n[corp]\nFor the company\n[end corp]");
        let elements = &parsed.document.elements;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].governing.client, Some(ClientTag::Indiv));
        assert_eq!(elements[1].governing.client, Some(ClientTag::Corp));
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn inline_tags_apply_to_their_own_line() {
        let parsed = parse("[a2]Assigned fast track.[end a2]\nAfter");
        let elements = &parsed.document.elements;
        assert_eq!(elements[0].text(), "Assigned fast track.");
        assert_eq!(
            elements[0].governing.track,
            Some(TrackTag::new(true, crate::context::Track::Fast))
        );
        assert!(elements[1].governing.is_unconditional());
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn inline_start_continues_to_following_lines() {
        let parsed = parse("[corp]Line one\nline two[end corp]\nOutside");
        let elements = &parsed.document.elements;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Line one line two");
        assert_eq!(elements[0].governing.client, Some(ClientTag::Corp));
        assert!(elements[1].governing.is_unconditional());
    }

    #[test]
    fn client_and_track_blocks_overlap() {
        let parsed = parse("[indiv]\n[u4]\nBoth\n[end indiv]\nTrack only\n[end u4]");
        let elements = &parsed.document.elements;
        assert_eq!(elements[0].governing.client, Some(ClientTag::Indiv));
        assert!(elements[0].governing.track.is_some());
        assert_eq!(elements[1].governing.client, None);
        assert!(elements[1].governing.track.is_some());
    }

    #[test]
    fn separate_blocks_do_not_merge() {
        let parsed = parse("[indiv]\nA\n[end indiv]\n[indiv]\nB\n[end indiv]");
        assert_eq!(parsed.document.elements.len(), 2);
    }

    #[test]
    fn numbered_section_numbers_plain_paragraphs_only() {
        let source = "Dear Client\n[numbering]\nFirst\n[a] sub\n[ind]Indented\n[bp] bullet\n[fee_table]\n[]\nSecond\n[end numbering]\nYours sincerely,";
        assert_eq!(
            kinds(source),
            vec![
                ElementKind::GeneralParagraph,
                ElementKind::NumberedItem,
                ElementKind::LetterItem,
                ElementKind::GeneralParagraph,
                ElementKind::BulletItem,
                ElementKind::FeeTable,
                ElementKind::BlankLine,
                ElementKind::NumberedItem,
                ElementKind::GeneralParagraph,
            ]
        );
    }

    #[test]
    fn indent_marker_is_paragraph_scoped() {
        let parsed = parse("[numbering]\nStart of paragraph\n[ind]continued\n[end numbering]");
        let element = &parsed.document.elements[0];
        assert_eq!(element.kind, ElementKind::GeneralParagraph);
        assert!(element.indent);
        assert_eq!(element.text(), "Start of paragraph continued");
    }

    #[test]
    fn unknown_tags_are_literal_text() {
        let parsed = parse("[foo] keep me\n[end foo]");
        let elements = &parsed.document.elements;
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text(), "[foo] keep me [end foo]");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn unterminated_block_runs_to_end_with_diagnostic() {
        let parsed = parse("Intro\n\n[corp]\nCorporate text");
        let last = parsed.document.elements.last().expect("element");
        assert_eq!(last.governing.client, Some(ClientTag::Corp));
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].code, E_BLOCK_UNTERMINATED);
        assert_eq!(parsed.diagnostics[0].span.start, 3);
    }

    #[test]
    fn stray_and_nested_tags_are_reported() {
        let parsed = parse("[end indiv]\n[a1]\n[a2]\nText\n[end a1]\n[end a2]\n[end numbering]");
        let codes: Vec<&str> = parsed.diagnostics.iter().map(|diag| diag.code).collect();
        assert_eq!(
            codes,
            vec![
                W_BLOCK_END_UNMATCHED,
                W_BLOCK_NESTED,
                W_BLOCK_END_UNMATCHED,
                W_SECTION_END_UNMATCHED
            ]
        );
    }
}
