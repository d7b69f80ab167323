//! Error types for Nutri Goals

use crate::validation::FieldErrors;
use thiserror::Error;

/// Errors that can occur around the goal computation.
///
/// The calculation stages themselves are total; these errors come from the
/// surfaces in front of them (parsing, validation, configuration, encoding).
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Insufficient data for computation: {0}")]
    InsufficientData(String),
}

impl From<FieldErrors> for ComputeError {
    fn from(errors: FieldErrors) -> Self {
        ComputeError::Validation(errors)
    }
}
