//! Row types of the document tables
//!
//! Columns hold stored bytes, not decoded values: `data` is the output of the
//! codec pipeline and `metadata` is the serialized metadata column.

use docstore_core::{Etag, Timestamp, TransactionId};

/// Row of the `Documents` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Primary key (`by_key` index)
    pub key: String,
    /// Codec-encoded data column
    pub data: Vec<u8>,
    /// Serialized metadata column
    pub metadata: Vec<u8>,
    /// Current etag (`by_etag` index, storage-sort encoding)
    pub etag: Etag,
    /// Last modification time
    pub last_modified: Timestamp,
    /// Transaction holding a pending mutation for this row
    pub locked_by_transaction: Option<TransactionId>,
}

impl DocumentRecord {
    /// Bytes occupied by the metadata and data columns
    pub fn serialized_size(&self) -> u64 {
        (self.metadata.len() + self.data.len()) as u64
    }
}

/// Row of the `DocumentsModifiedByTransactions` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRecord {
    /// Document key (`by_key` index)
    pub key: String,
    /// Codec-encoded data column of the pending value
    pub data: Vec<u8>,
    /// Serialized metadata column of the pending value
    pub metadata: Vec<u8>,
    /// Etag the live document receives when the transaction commits
    pub etag: Etag,
    /// Last modification time of the pending value
    pub last_modified: Timestamp,
    /// True for a pending delete, false for a pending put
    pub delete_document: bool,
    /// Owning transaction
    pub locked_by_transaction: TransactionId,
}

impl ShadowRecord {
    /// Bytes occupied by the metadata and data columns
    pub fn serialized_size(&self) -> u64 {
        (self.metadata.len() + self.data.len()) as u64
    }

    /// True if `transaction` owns this shadow
    pub fn is_owned_by(&self, transaction: TransactionId) -> bool {
        self.locked_by_transaction == transaction
    }
}
