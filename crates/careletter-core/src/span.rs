use serde::Serialize;

/// Inclusive range of 1-based source line numbers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(SpanError::Inverted { start, end })
        }
    }

    pub fn line(line: usize) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    /// Extends the span so that it also covers `line`.
    pub fn extend_to(&mut self, line: usize) {
        if line > self.end {
            self.end = line;
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpanError {
    Inverted { start: usize, end: usize },
}
