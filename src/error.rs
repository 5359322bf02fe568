//! Error types for the collection store and its sibling services

use thiserror::Error;

use crate::schema::ValidationIssue;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Collection store errors
#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Invalid collection name: '{0}'")]
    InvalidName(String),

    #[error("Collection already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid schema: {0}")]
    Schema(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Item '{id}' not found in collection '{collection}'")]
    ItemNotFound { collection: String, id: String },

    #[error("No item at index {0}")]
    IndexOutOfRange(usize),

    #[error("Validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationIssue>),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollectionError {
    /// Validation issues carried by this error, if any
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            CollectionError::ValidationFailed(issues) => issues,
            _ => &[],
        }
    }
}
