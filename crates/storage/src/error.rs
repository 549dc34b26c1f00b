//! Record store errors

use docstore_core::DocumentError;
use thiserror::Error;

/// Errors raised by the record store itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Another session committed a change to this row after this session began
    #[error("write conflict on {table} row '{key}'")]
    WriteConflict {
        /// Table holding the row
        table: &'static str,
        /// Row key
        key: String,
    },

    /// Insert violated the unique `by_key` index
    #[error("duplicate key '{key}' in {table}")]
    DuplicateKey {
        /// Table holding the row
        table: &'static str,
        /// Row key
        key: String,
    },
}

impl From<StoreError> for DocumentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::WriteConflict { table, key } => DocumentError::WriteConflict { table, key },
            other => DocumentError::Storage(other.to_string()),
        }
    }
}
