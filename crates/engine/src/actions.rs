//! Document operations over one storage session
//!
//! `DocumentStorageActions` is what a batch closure receives. Untransacted
//! writes go straight to the live table; transactional writes go through the
//! isolation layer. Every check runs before the first mutation, so a failed
//! operation leaves the session exactly as it was.

use docstore_concurrency::{
    check_etag, ensure_not_locked, IsolationLayer, PendingRegistrations, ShadowView,
};
use docstore_core::{
    validate_key, AddDocumentResult, DeleteDocumentResult, DocumentError, Etag, EtagCategory,
    EtagGenerator, JsonDocument, JsonDocumentMetadata, JsonValue, Result, Timestamp, TouchResult,
    TransactionId, TransactionInformation,
};
use docstore_storage::column::{encode_data_column, encode_metadata_column};
use docstore_storage::{CodecPipeline, DocumentCache, DocumentRecord, Session};
use tracing::debug;

use crate::reader::{stored_metadata, DocumentReader};

/// Document operations bound to one session
pub struct DocumentStorageActions<'a> {
    pub(crate) session: &'a mut Session,
    pub(crate) etags: &'a EtagGenerator,
    pub(crate) codecs: &'a CodecPipeline,
    pub(crate) cache: &'a dyn DocumentCache,
    pending: PendingRegistrations,
}

impl<'a> DocumentStorageActions<'a> {
    /// Bind operations to a session and its collaborators
    pub fn new(
        session: &'a mut Session,
        etags: &'a EtagGenerator,
        codecs: &'a CodecPipeline,
        cache: &'a dyn DocumentCache,
    ) -> Self {
        Self {
            session,
            etags,
            codecs,
            cache,
            pending: PendingRegistrations::new(),
        }
    }

    /// Transactions that wrote through these actions, to be registered
    /// once the session commits
    pub fn into_pending(self) -> PendingRegistrations {
        self.pending
    }

    pub(crate) fn reader(&self) -> DocumentReader<'a> {
        DocumentReader::new(self.codecs, self.cache)
    }

    fn isolation(&mut self) -> IsolationLayer<'_> {
        IsolationLayer::new(
            self.session,
            self.etags,
            self.codecs,
            self.cache,
            &mut self.pending,
        )
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Get a document as `tx` sees it
    ///
    /// A key being created by another transaction yields a synthetic
    /// non-authoritative document (see [`JsonDocumentMetadata::pending_elsewhere`]).
    pub fn get(
        &self,
        key: &str,
        tx: Option<&TransactionInformation>,
    ) -> Result<Option<JsonDocument>> {
        self.reader().read(self.session, key, tx.map(|t| t.id))
    }

    /// Get document metadata as `tx` sees it; never decodes the data column
    pub fn get_metadata(
        &self,
        key: &str,
        tx: Option<&TransactionInformation>,
    ) -> Result<Option<JsonDocumentMetadata>> {
        self.reader().read_metadata(self.session, key, tx.map(|t| t.id))
    }

    /// Number of live documents
    pub fn document_count(&self) -> i64 {
        self.session.document_count()
    }

    // ========================================================================
    // Untransacted writes
    // ========================================================================

    /// Create or replace a document
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad key
    /// - `Locked` if a transaction holds the key
    /// - `Concurrency` if `etag` does not match the live etag, or is
    ///   non-empty for a new key
    pub fn put(
        &mut self,
        key: &str,
        etag: Option<Etag>,
        data: &JsonValue,
        metadata: &JsonValue,
    ) -> Result<AddDocumentResult> {
        validate_key(key)?;
        let previous = match self.session.document(key) {
            Some(existing) => {
                if let Some(owner) = existing.locked_by_transaction {
                    return Err(DocumentError::locked(key, owner));
                }
                check_etag("PUT", key, etag, Some(existing.etag))?;
                Some(existing.etag)
            }
            None => {
                check_etag("PUT", key, etag, None)?;
                ensure_not_locked(self.session, key, None)?;
                None
            }
        };

        let data_column = encode_data_column(self.codecs, key, data, metadata)?;
        let metadata_column = encode_metadata_column(metadata)?;
        let new_etag = self.etags.create_sequential_etag(EtagCategory::Documents);
        let now = Timestamp::now();

        self.session.put_document(DocumentRecord {
            key: key.to_string(),
            data: data_column,
            metadata: metadata_column,
            etag: new_etag,
            last_modified: now,
            locked_by_transaction: None,
        });
        match previous {
            Some(previous) => self.cache.invalidate(key, previous),
            None => self.session.escrow_update(1),
        }

        debug!(key = %key, etag = %new_etag, updated = previous.is_some(), "put document");
        Ok(AddDocumentResult {
            etag: new_etag,
            saved_at: now,
            updated: previous.is_some(),
        })
    }

    /// Replace the metadata of an existing document, keeping its data
    ///
    /// # Errors
    ///
    /// - `NotFound` if no live document exists
    /// - `Locked` if a transaction holds the key
    pub fn put_metadata_only(&mut self, key: &str, metadata: &JsonValue) -> Result<AddDocumentResult> {
        validate_key(key)?;
        let Some(existing) = self.session.document(key) else {
            return Err(DocumentError::not_found(
                key,
                "cannot update metadata of a document that does not exist",
            ));
        };
        let previous = existing.etag;
        ensure_not_locked(self.session, key, None)?;

        let metadata_column = encode_metadata_column(metadata)?;
        let new_etag = self.etags.create_sequential_etag(EtagCategory::Documents);
        let now = Timestamp::now();

        self.session.update_document(key, |record| {
            record.metadata = metadata_column;
            record.etag = new_etag;
            record.last_modified = now;
        });
        self.cache.invalidate(key, previous);

        debug!(key = %key, etag = %new_etag, "put document metadata");
        Ok(AddDocumentResult {
            etag: new_etag,
            saved_at: now,
            updated: true,
        })
    }

    /// Delete a document
    ///
    /// A missing key is not an error: the result reports `existed = false`.
    ///
    /// # Errors
    ///
    /// - `Concurrency` if `etag` does not match the live etag
    /// - `Locked` if a transaction holds the key
    pub fn delete(&mut self, key: &str, etag: Option<Etag>) -> Result<DeleteDocumentResult> {
        validate_key(key)?;
        let Some(existing) = self.session.document(key) else {
            debug!(key = %key, "delete: no such document");
            return Ok(DeleteDocumentResult::missing());
        };
        check_etag("DELETE", key, etag, Some(existing.etag))?;
        if let Some(owner) = existing.locked_by_transaction {
            return Err(DocumentError::locked(key, owner));
        }
        let metadata = stored_metadata(existing)?;

        let removed_etag = existing.etag;
        self.session.remove_document(key);
        self.session.escrow_update(-1);
        self.cache.invalidate(key, removed_etag);

        debug!(key = %key, etag = %removed_etag, "delete document");
        Ok(DeleteDocumentResult {
            existed: true,
            metadata: Some(metadata),
            etag: Some(removed_etag),
        })
    }

    /// Give a document a fresh etag without changing its content
    ///
    /// Returns `None` if the key does not exist.
    pub fn touch(&mut self, key: &str) -> Result<Option<TouchResult>> {
        validate_key(key)?;
        let Some(previous) = self.session.document(key).map(|record| record.etag) else {
            return Ok(None);
        };
        let current = self.etags.create_sequential_etag(EtagCategory::Documents);
        self.session.update_document(key, |record| record.etag = current);
        self.cache.invalidate(key, previous);

        debug!(key = %key, previous = %previous, etag = %current, "touch document");
        Ok(Some(TouchResult { previous, current }))
    }

    /// Bulk-load write without preconditions or lock checks
    ///
    /// With `check_for_update = false` the existence check is skipped and a
    /// duplicate key is rejected by the store.
    pub fn insert_unconditional(
        &mut self,
        key: &str,
        data: &JsonValue,
        metadata: &JsonValue,
        check_for_update: bool,
    ) -> Result<AddDocumentResult> {
        validate_key(key)?;
        let existing = if check_for_update {
            self.session
                .document(key)
                .map(|record| (record.etag, record.locked_by_transaction))
        } else {
            None
        };

        let data_column = encode_data_column(self.codecs, key, data, metadata)?;
        let metadata_column = encode_metadata_column(metadata)?;
        let new_etag = self.etags.create_sequential_etag(EtagCategory::Documents);
        let now = Timestamp::now();
        let record = DocumentRecord {
            key: key.to_string(),
            data: data_column,
            metadata: metadata_column,
            etag: new_etag,
            last_modified: now,
            locked_by_transaction: existing.and_then(|(_, lock)| lock),
        };

        match existing {
            Some((previous, _)) => {
                self.session.put_document(record);
                self.cache.invalidate(key, previous);
            }
            None => {
                self.session.insert_document(record)?;
                self.session.escrow_update(1);
            }
        }

        debug!(key = %key, etag = %new_etag, updated = existing.is_some(), "insert document");
        Ok(AddDocumentResult {
            etag: new_etag,
            saved_at: now,
            updated: existing.is_some(),
        })
    }

    // ========================================================================
    // Transactional writes
    // ========================================================================

    /// Record a pending put in `tx`; returns the etag it will commit with
    pub fn put_in_transaction(
        &mut self,
        key: &str,
        etag: Option<Etag>,
        data: &JsonValue,
        metadata: &JsonValue,
        tx: &TransactionInformation,
    ) -> Result<Etag> {
        self.isolation()
            .put_in_transaction(key, etag, data, metadata, tx)
    }

    /// Record a pending delete in `tx`; false if there was nothing to delete
    pub fn delete_in_transaction(
        &mut self,
        key: &str,
        etag: Option<Etag>,
        tx: &TransactionInformation,
    ) -> Result<bool> {
        self.isolation().delete_in_transaction(key, etag, tx)
    }

    /// True if a transaction other than `tx` holds `key`
    pub fn is_locked_by_other(&self, key: &str, tx: Option<TransactionId>) -> bool {
        docstore_concurrency::is_locked_by_other(self.session, key, tx)
    }

    /// Pending state of `key` in its owner `tx`
    pub fn effective_view(&self, key: &str, tx: TransactionId) -> Option<ShadowView> {
        docstore_concurrency::effective_view(self.session, key, tx)
    }

    /// Keys with a pending change in `tx`
    pub fn shadows_of(&mut self, tx: TransactionId) -> Vec<String> {
        self.isolation().shadows_of(tx)
    }

    /// Apply every shadow of `tx` to the live table
    pub fn apply_transaction(&mut self, tx: TransactionId) -> Result<Vec<docstore_concurrency::AppliedShadow>> {
        let mut layer = self.isolation();
        let keys = layer.shadows_of(tx);
        keys.iter().map(|key| layer.apply_shadow(key, tx)).collect()
    }

    /// Discard every shadow of `tx`, returning how many were dropped
    pub fn discard_transaction(&mut self, tx: TransactionId) -> Result<usize> {
        let mut layer = self.isolation();
        let keys = layer.shadows_of(tx);
        for key in &keys {
            layer.discard_shadow(key, tx)?;
        }
        Ok(keys.len())
    }
}
