use serde::Serialize;

use crate::span::Span;

pub const E_BLOCK_UNTERMINATED: &str = "E_BLOCK_UNTERMINATED";

pub const W_BLOCK_END_UNMATCHED: &str = "W_BLOCK_END_UNMATCHED";
pub const W_BLOCK_NESTED: &str = "W_BLOCK_NESTED";
pub const W_SECTION_UNTERMINATED: &str = "W_SECTION_UNTERMINATED";
pub const W_SECTION_END_UNMATCHED: &str = "W_SECTION_END_UNMATCHED";
pub const W_PLACEHOLDER_UNRESOLVED: &str = "W_PLACEHOLDER_UNRESOLVED";

/// Operator-facing report about the precedent or the rendered output.
///
/// Diagnostics never abort generation; they are logged and can be printed by
/// the CLI for review.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub span: Span,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedDiagnostic>,
}

impl Diagnostic {
    pub fn new(
        span: Span,
        severity: DiagnosticSeverity,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            span,
            severity,
            code,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn error(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(span, DiagnosticSeverity::Error, code, message)
    }

    pub fn warning(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(span, DiagnosticSeverity::Warning, code, message)
    }

    pub fn with_related(mut self, related: RelatedDiagnostic) -> Self {
        self.related.push(related);
        self
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RelatedDiagnostic {
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelatedDiagnostic {
    pub fn new(span: Span, message: Option<String>) -> Self {
        Self { span, message }
    }
}

/// Forwards diagnostics to the `tracing` subscriber for operator review.
pub fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let line = diagnostic.span.start;
        match diagnostic.severity {
            DiagnosticSeverity::Error => {
                tracing::error!(code = diagnostic.code, line, "{}", diagnostic.message)
            }
            DiagnosticSeverity::Warning => {
                tracing::warn!(code = diagnostic.code, line, "{}", diagnostic.message)
            }
        }
    }
}
