//! Document read and write results

use crate::etag::Etag;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Metadata flag set on synthetic results for keys that only exist inside
/// another, uncommitted transaction
pub const DOCUMENT_DOES_NOT_EXIST: &str = "Document-Does-Not-Exist";

/// Document metadata without the data column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDocumentMetadata {
    /// Document key
    pub key: String,
    /// Metadata column
    pub metadata: JsonValue,
    /// Current etag (`Etag::EMPTY` for synthetic results)
    pub etag: Etag,
    /// Last modification time
    pub last_modified: Timestamp,
    /// True if a newer value exists in a transaction the reader cannot see
    pub non_authoritative: bool,
}

impl JsonDocumentMetadata {
    /// Synthetic "pending creation elsewhere" result
    pub fn pending_elsewhere(key: impl Into<String>) -> Self {
        JsonDocumentMetadata {
            key: key.into(),
            metadata: json!({ DOCUMENT_DOES_NOT_EXIST: true }),
            etag: Etag::EMPTY,
            last_modified: Timestamp::EPOCH,
            non_authoritative: true,
        }
    }

    /// True for synthetic "pending creation elsewhere" results
    pub fn is_pending_elsewhere(&self) -> bool {
        self.metadata
            .get(DOCUMENT_DOES_NOT_EXIST)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }
}

/// A full document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonDocument {
    /// Document key
    pub key: String,
    /// Data column
    pub data: JsonValue,
    /// Metadata column
    pub metadata: JsonValue,
    /// Current etag
    pub etag: Etag,
    /// Last modification time
    pub last_modified: Timestamp,
    /// True if a newer value exists in a transaction the reader cannot see
    pub non_authoritative: bool,
    /// Bytes occupied by the stored metadata and data columns
    pub serialized_size: u64,
}

impl JsonDocument {
    /// Build a document from its metadata and decoded data
    pub fn from_metadata(metadata: JsonDocumentMetadata, data: JsonValue, serialized_size: u64) -> Self {
        JsonDocument {
            key: metadata.key,
            data,
            metadata: metadata.metadata,
            etag: metadata.etag,
            last_modified: metadata.last_modified,
            non_authoritative: metadata.non_authoritative,
            serialized_size,
        }
    }

    /// True for synthetic "pending creation elsewhere" results
    pub fn is_pending_elsewhere(&self) -> bool {
        self.metadata
            .get(DOCUMENT_DOES_NOT_EXIST)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }
}

/// Result of a put / insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDocumentResult {
    /// Newly assigned etag
    pub etag: Etag,
    /// Time the write was stamped with
    pub saved_at: Timestamp,
    /// True if an existing document was replaced
    pub updated: bool,
}

/// Result of an untransacted delete
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDocumentResult {
    /// True if a live document was removed
    pub existed: bool,
    /// Metadata of the removed document
    pub metadata: Option<JsonValue>,
    /// Etag of the removed document
    pub etag: Option<Etag>,
}

impl DeleteDocumentResult {
    /// Result for a key that had no live document
    pub fn missing() -> Self {
        DeleteDocumentResult {
            existed: false,
            metadata: None,
            etag: None,
        }
    }
}

/// Etags before and after a touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchResult {
    /// Etag before the touch
    pub previous: Etag,
    /// Freshly assigned etag
    pub current: Etag,
}
