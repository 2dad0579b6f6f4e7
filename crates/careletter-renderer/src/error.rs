use thiserror::Error;

/// Failure while packaging a rendered document or bundle.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("duplicate archive entry `{0}`")]
    DuplicateEntry(String),
}
