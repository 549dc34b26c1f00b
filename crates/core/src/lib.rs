//! Core types for docstore
//!
//! This crate defines the foundational types used throughout the system:
//! - Etag: 128-bit version stamp with sortable and canonical encodings
//! - EtagGenerator: sequential etag allocation partitioned by category
//! - TransactionId / TransactionInformation: logical transaction context
//! - JsonDocument / JsonDocumentMetadata: read results
//! - Key limits and validation
//! - Timestamp: microsecond wall-clock stamps
//! - Error: DocumentError hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod etag;
pub mod generator;
pub mod limits;
pub mod timestamp;
pub mod transaction;

pub use document::{
    AddDocumentResult, DeleteDocumentResult, JsonDocument, JsonDocumentMetadata, TouchResult,
    DOCUMENT_DOES_NOT_EXIST,
};
pub use error::{DocumentError, Result};
pub use etag::{Etag, EtagCategory, EtagParseError};
pub use generator::EtagGenerator;
pub use limits::{validate_key, MAX_KEY_BYTES, MAX_KEY_CODE_UNITS};
pub use timestamp::Timestamp;
pub use transaction::{TransactionId, TransactionInformation};

/// Structured document value (data and metadata columns).
pub use serde_json::Value as JsonValue;
