//! Turning stored rows into documents
//!
//! Decoding goes through the cache: a hit on `(key, etag)` skips both column
//! decodes. Shadow rows are cached the same way, since their etags are
//! unique too.

use docstore_concurrency::{resolve, Resolution};
use docstore_core::{
    Etag, JsonDocument, JsonDocumentMetadata, JsonValue, Result, Timestamp, TransactionId,
};
use docstore_storage::column::{decode_data_column, decode_metadata_column};
use docstore_storage::{
    CachedDocument, CodecPipeline, DocumentCache, DocumentRecord, Session, ShadowRecord,
};
use serde_json::json;
use tracing::debug;

/// Borrowed view of the columns a document is built from
#[derive(Debug, Clone, Copy)]
pub(crate) struct StoredColumns<'r> {
    pub key: &'r str,
    pub data: &'r [u8],
    pub metadata: &'r [u8],
    pub etag: Etag,
    pub last_modified: Timestamp,
}

impl<'r> From<&'r DocumentRecord> for StoredColumns<'r> {
    fn from(record: &'r DocumentRecord) -> Self {
        StoredColumns {
            key: &record.key,
            data: &record.data,
            metadata: &record.metadata,
            etag: record.etag,
            last_modified: record.last_modified,
        }
    }
}

impl<'r> From<&'r ShadowRecord> for StoredColumns<'r> {
    fn from(shadow: &'r ShadowRecord) -> Self {
        StoredColumns {
            key: &shadow.key,
            data: &shadow.data,
            metadata: &shadow.metadata,
            etag: shadow.etag,
            last_modified: shadow.last_modified,
        }
    }
}

impl StoredColumns<'_> {
    fn size(&self) -> u64 {
        (self.data.len() + self.metadata.len()) as u64
    }
}

/// Cache-aware document decoder
#[derive(Clone, Copy)]
pub struct DocumentReader<'a> {
    codecs: &'a CodecPipeline,
    cache: &'a dyn DocumentCache,
}

impl<'a> DocumentReader<'a> {
    /// Create a reader over the given codecs and cache
    pub fn new(codecs: &'a CodecPipeline, cache: &'a dyn DocumentCache) -> Self {
        Self { codecs, cache }
    }

    pub(crate) fn metadata(
        &self,
        columns: StoredColumns<'_>,
        non_authoritative: bool,
    ) -> Result<JsonDocumentMetadata> {
        let metadata = match self.cache.get(columns.key, columns.etag) {
            Some(cached) => cached.metadata.clone(),
            None => decode_metadata_column(columns.metadata)?,
        };
        Ok(JsonDocumentMetadata {
            key: columns.key.to_string(),
            metadata,
            etag: columns.etag,
            last_modified: columns.last_modified,
            non_authoritative,
        })
    }

    pub(crate) fn document(
        &self,
        columns: StoredColumns<'_>,
        non_authoritative: bool,
    ) -> Result<JsonDocument> {
        let size = columns.size();
        let (data, metadata) = match self.cache.get(columns.key, columns.etag) {
            Some(cached) => (cached.data.clone(), cached.metadata.clone()),
            None => {
                let metadata = decode_metadata_column(columns.metadata)?;
                let data = decode_data_column(self.codecs, columns.key, &metadata, columns.data)?;
                self.cache.put(
                    columns.key,
                    columns.etag,
                    CachedDocument {
                        data: data.clone(),
                        metadata: metadata.clone(),
                        size,
                    },
                );
                (data, metadata)
            }
        };
        Ok(JsonDocument {
            key: columns.key.to_string(),
            data,
            metadata,
            etag: columns.etag,
            last_modified: columns.last_modified,
            non_authoritative,
            serialized_size: size,
        })
    }

    /// Read the document `key` as transaction `tx` sees it
    pub fn read(
        &self,
        session: &Session,
        key: &str,
        tx: Option<TransactionId>,
    ) -> Result<Option<JsonDocument>> {
        let resolution = resolve(session, key, tx);
        debug!(key = %key, resolution = resolution.name(), "read document");
        match resolution {
            Resolution::Live {
                record,
                modified_in_transaction,
            } => self.document(record.into(), modified_in_transaction).map(Some),
            Resolution::OwnShadow(shadow) => self.document(shadow.into(), false).map(Some),
            Resolution::PendingElsewhere(_) => Ok(Some(JsonDocument::from_metadata(
                JsonDocumentMetadata::pending_elsewhere(key),
                json!({}),
                0,
            ))),
            Resolution::DeletedInTransaction(_) | Resolution::Absent => Ok(None),
        }
    }

    /// Read the metadata of `key` as transaction `tx` sees it
    pub fn read_metadata(
        &self,
        session: &Session,
        key: &str,
        tx: Option<TransactionId>,
    ) -> Result<Option<JsonDocumentMetadata>> {
        let resolution = resolve(session, key, tx);
        debug!(key = %key, resolution = resolution.name(), "read metadata");
        match resolution {
            Resolution::Live {
                record,
                modified_in_transaction,
            } => self.metadata(record.into(), modified_in_transaction).map(Some),
            Resolution::OwnShadow(shadow) => self.metadata(shadow.into(), false).map(Some),
            Resolution::PendingElsewhere(_) => {
                Ok(Some(JsonDocumentMetadata::pending_elsewhere(key)))
            }
            Resolution::DeletedInTransaction(_) | Resolution::Absent => Ok(None),
        }
    }
}

/// Decode a metadata column outside the cache
pub(crate) fn stored_metadata(record: &DocumentRecord) -> Result<JsonValue> {
    decode_metadata_column(&record.metadata)
}
