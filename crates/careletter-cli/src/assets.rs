use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::error::AppError;

pub const BUNDLED_PRECEDENT: &str = include_str!("../assets/client_care_precedent.txt");

static PRECEDENT: OnceCell<String> = OnceCell::new();

/// Precedent text for this process, read on first use.
///
/// `None` selects the precedent bundled with the binary. Later calls return
/// the first result whatever `path` they pass.
pub fn precedent(path: Option<&Path>) -> Result<&'static str, AppError> {
    PRECEDENT
        .get_or_try_init(|| read_precedent(path))
        .map(String::as_str)
}

fn read_precedent(path: Option<&Path>) -> Result<String, AppError> {
    let Some(path) = path else {
        tracing::debug!("using bundled precedent");
        return Ok(BUNDLED_PRECEDENT.to_string());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::Precedent {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(bytes = text.len(), "precedent loaded");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use careletter_core::parse;

    use super::{BUNDLED_PRECEDENT, read_precedent};
    use crate::error::AppError;

    #[test]
    fn bundled_precedent_parses_cleanly() {
        let parsed = parse(BUNDLED_PRECEDENT);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert!(!parsed.document.elements.is_empty());
    }

    #[test]
    fn unreadable_precedent_is_an_error() {
        let result = read_precedent(Some(Path::new("/nonexistent/precedent.txt")));
        assert!(matches!(result, Err(AppError::Precedent { .. })));
    }
}
