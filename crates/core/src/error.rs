//! Error types for docstore
//!
//! This module defines all error types surfaced by document operations.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! A missing key on read is never an error; reads return `Ok(None)`.

use crate::etag::Etag;
use crate::transaction::TransactionId;
use thiserror::Error;

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Error types for document storage
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Etag precondition did not match the current etag
    ///
    /// Always surfaced to the caller, never retried internally.
    #[error("{operation} attempted on document '{key}' using a non current etag (expected {expected}, actual {})", display_actual(.actual))]
    Concurrency {
        /// Operation that failed ("PUT", "DELETE")
        operation: &'static str,
        /// Document key
        key: String,
        /// Etag supplied by the caller
        expected: Etag,
        /// Etag found in storage, `None` when the document does not exist
        actual: Option<Etag>,
    },

    /// Document is owned by a different in-flight transaction
    #[error("document '{key}' is locked by transaction {transaction}")]
    Locked {
        /// Document key
        key: String,
        /// Transaction that owns the document
        transaction: TransactionId,
    },

    /// Operation requires an existing document
    #[error("document '{key}' does not exist: {reason}")]
    NotFound {
        /// Document key
        key: String,
        /// What the caller attempted
        reason: String,
    },

    /// Input rejected before any mutation was attempted
    #[error("validation failed: {0}")]
    Validation(String),

    /// Data or metadata column could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Codec pipeline failed to encode or decode a document
    #[error("codec error: {0}")]
    Codec(String),

    /// Session commit lost a row-level race with another session
    #[error("write conflict on {table} row '{key}'")]
    WriteConflict {
        /// Table holding the row
        table: &'static str,
        /// Row key
        key: String,
    },

    /// Record store failure
    #[error("storage error: {0}")]
    Storage(String),
}

fn display_actual(actual: &Option<Etag>) -> String {
    match actual {
        Some(etag) => etag.to_string(),
        None => "none".to_string(),
    }
}

impl DocumentError {
    /// Create a concurrency error
    pub fn concurrency(
        operation: &'static str,
        key: impl Into<String>,
        expected: Etag,
        actual: Option<Etag>,
    ) -> Self {
        DocumentError::Concurrency {
            operation,
            key: key.into(),
            expected,
            actual,
        }
    }

    /// Create a locked error
    pub fn locked(key: impl Into<String>, transaction: TransactionId) -> Self {
        DocumentError::Locked {
            key: key.into(),
            transaction,
        }
    }

    /// Create a not-found error
    pub fn not_found(key: impl Into<String>, reason: impl Into<String>) -> Self {
        DocumentError::NotFound {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// True for etag precondition failures
    pub fn is_concurrency(&self) -> bool {
        matches!(self, DocumentError::Concurrency { .. })
    }

    /// True when the key is owned by another transaction
    pub fn is_locked(&self) -> bool {
        matches!(self, DocumentError::Locked { .. })
    }

    /// True when retrying later may succeed without caller changes
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocumentError::Locked { .. } | DocumentError::WriteConflict { .. }
        )
    }
}
