mod ast;
mod condition;
mod context;
mod diagnostic;
mod inline;
mod parser;
mod placeholder;
mod select;
mod span;

pub use ast::{
    BlockTag, ClientTag, ElementKind, Governing, LogicalElement, Precedent, TrackTag,
};
pub use condition::{should_render, should_render_name};
pub use context::{ChoiceContext, ClientType, Track};
pub use diagnostic::{
    Diagnostic, DiagnosticSeverity, E_BLOCK_UNTERMINATED, RelatedDiagnostic,
    W_BLOCK_END_UNMATCHED, W_BLOCK_NESTED, W_PLACEHOLDER_UNRESOLVED, W_SECTION_END_UNMATCHED,
    W_SECTION_UNTERMINATED, log_diagnostics,
};
pub use inline::{RunStyle, StyledRun, strip_formatting, tokenize};
pub use parser::{
    BLANK_MARKER, FEE_TABLE_MARKER, INDENT_MARKER, LINE_RULES, LineClass, LineRule, ParseResult,
    SECTION_END, SECTION_START, classify, parse, strip_indent,
};
pub use placeholder::{Placeholders, Substitution, placeholder_keys};
pub use select::select;
pub use span::{Span, SpanError};
