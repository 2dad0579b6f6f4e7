use std::io;
use std::path::PathBuf;

use careletter_renderer::DocxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error")]
    Config(#[from] config::ConfigError),
    #[error("failed to read request {}", path.display())]
    RequestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("request is not valid TOML")]
    RequestParse(#[from] toml::de::Error),
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("failed to read precedent {}", path.display())]
    Precedent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build documents")]
    Docx(#[from] DocxError),
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AppError {
    /// Message shown to the operator; never includes paths or internal detail.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(_) => {
                "The configuration could not be loaded. Check the configuration file and try again."
                    .to_string()
            }
            AppError::RequestRead { .. } => {
                "The request file could not be read. Check that it exists and try again."
                    .to_string()
            }
            AppError::RequestParse(_) => {
                "The request file could not be understood. Check its format and try again."
                    .to_string()
            }
            AppError::MissingField(field) => {
                format!("Please provide `{}` before generating the letter.", field)
            }
            AppError::InvalidField { field, .. } => {
                format!("The value given for `{}` is not valid.", field)
            }
            AppError::Precedent { .. } => {
                "The letter precedent is unavailable, so no documents were generated.".to_string()
            }
            AppError::Docx(_) => {
                "The documents could not be generated. Please try again; if the problem persists, contact support."
                    .to_string()
            }
            AppError::Write { .. } => {
                "The documents could not be saved. Check the output folder and try again."
                    .to_string()
            }
        }
    }
}

/// The error and each of its sources, outermost first, joined with `: `.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::{AppError, error_chain};

    #[test]
    fn user_message_hides_paths() {
        let error = AppError::Precedent {
            path: PathBuf::from("/srv/secret/precedent.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(!error.user_message().contains("/srv/secret"));
        assert_eq!(
            error_chain(&error),
            "failed to read precedent /srv/secret/precedent.txt: missing"
        );
    }

    #[test]
    fn missing_field_names_the_field() {
        let message = AppError::MissingField("client_postcode").user_message();
        assert!(message.contains("client_postcode"));
    }
}
