//! Storage layer for docstore
//!
//! This crate implements the record store underneath the document layer:
//! - Tables: `Documents`, `DocumentsModifiedByTransactions` and `Details`
//! - MemoryStore: committed tables behind a `parking_lot::RwLock`
//! - Session: snapshot unit of work with first-committer-wins commit
//! - Codec pipeline for the data column (identity, zstd, checksum)
//! - Column serialization via MessagePack
//! - LRU cache of decoded documents keyed by `(key, etag)`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod codec;
pub mod column;
pub mod error;
pub mod record;
pub mod session;
pub mod store;
pub mod tables;

pub use cache::{CacheStats, CachedDocument, DocumentCache, LruDocumentCache, NoopDocumentCache};
pub use codec::{get_codec, CodecError, CodecPipeline, DocumentCodec};
pub use error::StoreError;
pub use record::{DocumentRecord, ShadowRecord};
pub use session::Session;
pub use store::MemoryStore;
pub use tables::{Details, Tables, DETAILS, DOCUMENTS, DOCUMENTS_MODIFIED_BY_TRANSACTIONS};
