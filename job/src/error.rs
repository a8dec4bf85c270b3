//! Pipeline error types

use thiserror::Error;

/// A record that cannot be turned into a [`crate::record::Record`].
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("record {index}: missing field {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: invalid {field} - {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("snapshot item {index} is not an object")]
    NotAnObject { index: usize },
}

/// Every failure aborts the whole run; nothing is persisted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<rusqlite::Error> for PipelineError {
    fn from(e: rusqlite::Error) -> Self {
        PipelineError::SourceUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::FeedUnavailable(e.to_string())
    }
}
