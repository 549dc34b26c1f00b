//! Logical transaction context
//!
//! The transaction lifecycle (begin, commit, rollback) is owned by the
//! caller. Document operations only need to know which transaction they run
//! in and how long that transaction may stay open.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier of a logical transaction
///
/// Wraps a UUID v4; stored in the `locked_by_transaction` column of live
/// documents and shadows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random TransactionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a TransactionId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a TransactionId from its string form
    ///
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction context passed to transactional operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInformation {
    /// Transaction identifier
    pub id: TransactionId,
    /// How long the transaction may stay open before it is considered abandoned
    pub timeout: Duration,
}

impl TransactionInformation {
    /// Default transaction timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a context for a fresh transaction with the default timeout
    pub fn new() -> Self {
        Self::with_id(TransactionId::new())
    }

    /// Create a context for an existing transaction id
    pub fn with_id(id: TransactionId) -> Self {
        TransactionInformation {
            id,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the timeout (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for TransactionInformation {
    fn default() -> Self {
        Self::new()
    }
}
