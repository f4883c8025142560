//! Store error definitions

use thiserror::Error;

/// Errors that can occur when talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Document store operation failed: {0}")]
    Backend(String),

    #[error("Invalid stored document: {0}")]
    InvalidDocument(String),
}
