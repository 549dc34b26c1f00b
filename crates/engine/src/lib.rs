//! Document engine for docstore
//!
//! Ties the record store, the isolation layer, the codec pipeline and the
//! document cache together:
//! - DocumentDatabase: facade, batches and transaction completion
//! - DocumentStorageActions: document reads and writes within one batch
//! - Enumeration by etag order and key prefix
//! - DocumentStoreConfig: `docstore.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod actions;
pub mod config;
pub mod database;
pub mod enumeration;
pub mod reader;

pub use actions::DocumentStorageActions;
pub use config::{ConfigError, DocumentStoreConfig, CONFIG_FILE_NAME};
pub use database::DocumentDatabase;
pub use enumeration::DocumentsAfter;
pub use reader::DocumentReader;

pub use docstore_concurrency::{AppliedShadow, ShadowView};
pub use docstore_core::{
    AddDocumentResult, DeleteDocumentResult, DocumentError, Etag, EtagCategory, JsonDocument,
    JsonDocumentMetadata, JsonValue, Result, Timestamp, TouchResult, TransactionId,
    TransactionInformation,
};
pub use docstore_storage::codec::SKIP_COMPRESSION;
pub use docstore_storage::{
    CacheStats, CachedDocument, CodecError, CodecPipeline, DocumentCache, DocumentCodec,
    LruDocumentCache, NoopDocumentCache,
};
