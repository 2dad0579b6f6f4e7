use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl RunStyle {
    pub const PLAIN: RunStyle = RunStyle {
        bold: false,
        italic: false,
        underline: false,
    };

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

/// A literal text fragment together with the toggles active over it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StyledRun {
    pub text: String,
    pub style: RunStyle,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Toggle {
    Bold,
    Italic,
    Underline,
}

// Delimiters are matched exactly and case-sensitively.
const DELIMITERS: &[(&str, Toggle, bool)] = &[
    ("[bd]", Toggle::Bold, true),
    ("[/bd]", Toggle::Bold, false),
    ("[it]", Toggle::Italic, true),
    ("[/it]", Toggle::Italic, false),
    ("[ul]", Toggle::Underline, true),
    ("[/ul]", Toggle::Underline, false),
];

/// Splits already-substituted text into styled runs.
///
/// Closing an inactive toggle and reopening an active one are both no-ops.
/// Empty literal segments produce no run.
pub fn tokenize(text: &str) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut style = RunStyle::PLAIN;
    let mut literal = String::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some((marker, toggle, on)) = match_delimiter(rest) {
            flush(&mut runs, &mut literal, style);
            match toggle {
                Toggle::Bold => style.bold = on,
                Toggle::Italic => style.italic = on,
                Toggle::Underline => style.underline = on,
            }
            rest = &rest[marker.len()..];
            continue;
        }
        let first = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        let next = rest[first..]
            .find('[')
            .map(|index| index + first)
            .unwrap_or(rest.len());
        literal.push_str(&rest[..next]);
        rest = &rest[next..];
    }
    flush(&mut runs, &mut literal, style);
    runs
}

/// Text with every formatting delimiter removed.
pub fn strip_formatting(text: &str) -> String {
    tokenize(text).into_iter().map(|run| run.text).collect()
}

fn match_delimiter(text: &str) -> Option<(&'static str, Toggle, bool)> {
    if !text.starts_with('[') {
        return None;
    }
    DELIMITERS
        .iter()
        .find(|(marker, _, _)| text.starts_with(marker))
        .copied()
}

fn flush(runs: &mut Vec<StyledRun>, literal: &mut String, style: RunStyle) {
    if literal.is_empty() {
        return;
    }
    runs.push(StyledRun {
        text: std::mem::take(literal),
        style,
    });
}

#[cfg(test)]
mod tests {
    use super::{RunStyle, StyledRun, strip_formatting, tokenize};

    fn run(text: &str, bold: bool, italic: bool, underline: bool) -> StyledRun {
        StyledRun {
            text: text.to_string(),
            style: RunStyle {
                bold,
                italic,
                underline,
            },
        }
    }

    #[test]
    fn bold_span_then_plain_text() {
        assert_eq!(
            tokenize("[bd]Hello[/bd] World"),
            vec![run("Hello", true, false, false), run(" World", false, false, false)]
        );
    }

    #[test]
    fn overlapping_toggles_combine() {
        assert_eq!(
            tokenize("a[bd]b[it]c[/bd]d[/it]"),
            vec![
                run("a", false, false, false),
                run("b", true, false, false),
                run("c", true, true, false),
                run("d", false, true, false),
            ]
        );
    }

    #[test]
    fn unmatched_closers_and_repeated_openers_are_no_ops() {
        assert_eq!(
            tokenize("[/ul]x[bd][bd]y[/bd]z"),
            vec![
                run("x", false, false, false),
                run("y", true, false, false),
                run("z", false, false, false),
            ]
        );
    }

    #[test]
    fn unknown_and_differently_cased_brackets_are_literal() {
        assert_eq!(
            tokenize("[BD]x[b] [i]"),
            vec![run("[BD]x[b] [i]", false, false, false)]
        );
    }

    #[test]
    fn toggle_left_open_stays_on_to_the_end() {
        let runs = tokenize("[ul]Heading");
        assert_eq!(runs, vec![run("Heading", false, false, true)]);
    }

    #[test]
    fn strips_delimiters() {
        assert_eq!(strip_formatting("[bd]a[/bd][it]b[/it]c"), "abc");
        assert!(tokenize("").is_empty());
        assert!(tokenize("[bd][/bd]").is_empty());
    }
}
