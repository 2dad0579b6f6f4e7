use std::collections::BTreeSet;

use careletter_core::{
    Diagnostic, DiagnosticSeverity, LogicalElement, placeholder_keys, strip_formatting,
};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiagnosticsMode {
    Json,
    Pretty,
}

pub fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) {
    match mode {
        DiagnosticsMode::Json => eprintln!("{}", diagnostics_to_json(diagnostics)),
        DiagnosticsMode::Pretty => {
            for diagnostic in diagnostics {
                eprintln!("{}", diagnostic_to_pretty(diagnostic));
            }
        }
    }
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|diag| diag.severity == DiagnosticSeverity::Error)
}

fn diagnostic_to_pretty(diagnostic: &Diagnostic) -> String {
    let severity = match diagnostic.severity {
        DiagnosticSeverity::Error => "error",
        DiagnosticSeverity::Warning => "warning",
    };
    let mut out = format!(
        "{}: {} {} {}",
        diagnostic.span.start, severity, diagnostic.code, diagnostic.message
    );
    for related in &diagnostic.related {
        out.push_str(&format!("\n  {}: note", related.span.start));
        if let Some(message) = &related.message {
            out.push_str(": ");
            out.push_str(message);
        }
    }
    out
}

fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> String {
    serde_json::to_string_pretty(diagnostics).unwrap_or_else(|_| "[]".to_string())
}

/// One line per element: span, kind, governing blocks and a text excerpt.
pub fn outline(elements: &[LogicalElement]) -> String {
    let mut out = String::new();
    for element in elements {
        let span = if element.span.start == element.span.end {
            element.span.start.to_string()
        } else {
            format!("{}-{}", element.span.start, element.span.end)
        };
        let mut line = format!("{:>7}  {:<17}", span, element.kind.name());
        let tags: Vec<String> = element
            .governing
            .tags()
            .map(|tag| tag.start_marker())
            .collect();
        if !tags.is_empty() {
            line.push(' ');
            line.push_str(&tags.join(""));
        }
        if element.indent {
            line.push_str(" [ind]");
        }
        let text = strip_formatting(&element.text());
        if !text.is_empty() {
            line.push(' ');
            line.push_str(&excerpt(&text, 60));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Sorted, de-duplicated placeholder keys the elements refer to.
pub fn placeholders_used(elements: &[LogicalElement]) -> Vec<String> {
    let keys: BTreeSet<String> = elements
        .iter()
        .flat_map(|element| element.text_lines.iter())
        .flat_map(|line| placeholder_keys(line))
        .map(str::to_string)
        .collect();
    keys.into_iter().collect()
}

fn excerpt(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use careletter_core::parse;

    use super::{diagnostic_to_pretty, diagnostics_to_json, outline, placeholders_used};

    #[test]
    fn outline_lists_kinds_and_blocks() {
        let parsed = parse("[h] Fees\n[a2]\nAllocated.\nStill allocated.\n[end a2]");
        let text = outline(&parsed.document.elements);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("heading"));
        assert!(lines[0].ends_with("Fees"));
        assert!(lines[1].trim_start().starts_with("3-4"));
        assert!(lines[1].contains("general_paragraph [a2] Allocated. Still allocated."));
    }

    #[test]
    fn outline_hides_inline_formatting() {
        let parsed = parse("Allocated to the [bd]Fast Track[/bd].");
        let text = outline(&parsed.document.elements);
        assert!(text.trim_end().ends_with("Allocated to the Fast Track."));
    }

    #[test]
    fn lists_each_placeholder_once_sorted() {
        let parsed = parse("Dear {client_name}\n[]\n{our_ref} for {client_name}\n[a] {timescale}");
        assert_eq!(
            placeholders_used(&parsed.document.elements),
            vec!["client_name", "our_ref", "timescale"]
        );
    }

    #[test]
    fn formats_diagnostics() {
        let parsed = parse("[indiv]\nNever closed.");
        let diagnostic = &parsed.diagnostics[0];
        let pretty = diagnostic_to_pretty(diagnostic);
        assert!(pretty.contains("E_BLOCK_UNTERMINATED"));
        assert!(pretty.contains("error"));
        let json = diagnostics_to_json(&parsed.diagnostics);
        assert!(json.contains("\"code\": \"E_BLOCK_UNTERMINATED\""));
        assert!(json.contains("\"severity\": \"error\""));
    }
}
