use crate::ast::{LogicalElement, Precedent};
use crate::context::ChoiceContext;

/// Keeps the elements whose governing blocks render for `context`.
///
/// This is the only place conditional blocks are evaluated.
pub fn select(document: &Precedent, context: &ChoiceContext) -> Vec<LogicalElement> {
    let selected: Vec<LogicalElement> = document
        .elements
        .iter()
        .filter(|element| element.governing.renders(context))
        .cloned()
        .collect();
    tracing::debug!(
        total = document.elements.len(),
        selected = selected.len(),
        ?context,
        "selected precedent elements"
    );
    selected
}
