//! Transactional writes through the shadow table
//!
//! A write inside a transaction never touches the live row's content. It
//! locks the live row (if any) for the transaction and records the pending
//! value in `DocumentsModifiedByTransactions`. Other readers keep seeing the
//! live row, flagged non-authoritative.
//!
//! All checks run before the first mutation: a failed write leaves the row
//! and the shadow untouched. Writing transactions are only noted in the
//! session's [`PendingRegistrations`]; the registry hears of them after the
//! session commits.

use docstore_core::{
    validate_key, DocumentError, Etag, EtagCategory, EtagGenerator, JsonValue, Result, Timestamp,
    TransactionId, TransactionInformation,
};
use docstore_storage::column::{encode_data_column, encode_metadata_column};
use docstore_storage::{CodecPipeline, DocumentCache, Session, ShadowRecord};
use tracing::debug;

use crate::registry::PendingRegistrations;
use crate::resolution::{self, check_etag, ensure_not_locked, resolve, ShadowView};

/// Shadow-table operations over one storage session
pub struct IsolationLayer<'a> {
    pub(crate) session: &'a mut Session,
    pub(crate) etags: &'a EtagGenerator,
    pub(crate) codecs: &'a CodecPipeline,
    pub(crate) cache: &'a dyn DocumentCache,
    pub(crate) pending: &'a mut PendingRegistrations,
}

impl<'a> IsolationLayer<'a> {
    /// Bind the layer to a session and its collaborators
    pub fn new(
        session: &'a mut Session,
        etags: &'a EtagGenerator,
        codecs: &'a CodecPipeline,
        cache: &'a dyn DocumentCache,
        pending: &'a mut PendingRegistrations,
    ) -> Self {
        Self {
            session,
            etags,
            codecs,
            cache,
            pending,
        }
    }

    /// Record a pending put of `key` in transaction `tx`
    ///
    /// Returns the etag the document will carry once `tx` commits.
    ///
    /// # Errors
    ///
    /// - `Locked` if another transaction holds the key
    /// - `Concurrency` if `etag` does not match the etag `tx` sees
    pub fn put_in_transaction(
        &mut self,
        key: &str,
        etag: Option<Etag>,
        data: &JsonValue,
        metadata: &JsonValue,
        tx: &TransactionInformation,
    ) -> Result<Etag> {
        validate_key(key)?;
        ensure_not_locked(self.session, key, Some(tx.id))?;
        let current = resolve(self.session, key, Some(tx.id)).effective_etag();
        check_etag("PUT", key, etag, current)?;

        let data_column = encode_data_column(self.codecs, key, data, metadata)?;
        let metadata_column = encode_metadata_column(metadata)?;

        let new_etag = self
            .etags
            .create_sequential_etag(EtagCategory::DocumentTransactions);
        let now = Timestamp::now();

        self.session.lock_document(key, Some(tx.id));
        self.session.put_shadow(ShadowRecord {
            key: key.to_string(),
            data: data_column,
            metadata: metadata_column,
            etag: new_etag,
            last_modified: now,
            delete_document: false,
            locked_by_transaction: tx.id,
        });
        self.pending.record(tx);

        debug!(key = %key, etag = %new_etag, transaction = %tx.id, "put in transaction");
        Ok(new_etag)
    }

    /// Record a pending delete of `key` in transaction `tx`
    ///
    /// Returns false if there is no live document to delete.
    ///
    /// # Errors
    ///
    /// - `Concurrency` if `etag` is non-empty and the key has no live document,
    ///   or `etag` does not match the etag `tx` sees
    /// - `Locked` if another transaction holds the key
    pub fn delete_in_transaction(
        &mut self,
        key: &str,
        etag: Option<Etag>,
        tx: &TransactionInformation,
    ) -> Result<bool> {
        validate_key(key)?;
        let Some(live) = self.session.document(key) else {
            check_etag("DELETE", key, etag, None)?;
            debug!(key = %key, transaction = %tx.id, "delete in transaction: no live document");
            return Ok(false);
        };
        let (data, metadata, last_modified) =
            (live.data.clone(), live.metadata.clone(), live.last_modified);

        ensure_not_locked(self.session, key, Some(tx.id))?;
        let current = resolve(self.session, key, Some(tx.id)).effective_etag();
        check_etag("DELETE", key, etag, current)?;

        let new_etag = self
            .etags
            .create_sequential_etag(EtagCategory::DocumentTransactions);

        self.session.lock_document(key, Some(tx.id));
        self.session.put_shadow(ShadowRecord {
            key: key.to_string(),
            data,
            metadata,
            etag: new_etag,
            last_modified,
            delete_document: true,
            locked_by_transaction: tx.id,
        });
        self.pending.record(tx);

        debug!(key = %key, etag = %new_etag, transaction = %tx.id, "delete in transaction");
        Ok(true)
    }

    /// True if a transaction other than `tx` holds `key`
    pub fn is_locked_by_other(&self, key: &str, tx: Option<TransactionId>) -> bool {
        resolution::is_locked_by_other(self.session, key, tx)
    }

    /// Pending state of `key` as seen by its owner `tx`
    pub fn effective_view(&self, key: &str, tx: TransactionId) -> Option<ShadowView> {
        resolution::effective_view(self.session, key, tx)
    }

    /// Fail unless a shadow for `key` is owned by `tx`
    pub(crate) fn owned_shadow(&self, key: &str, tx: TransactionId) -> Result<ShadowRecord> {
        match self.session.shadow(key) {
            Some(shadow) if shadow.is_owned_by(tx) => Ok(shadow.clone()),
            Some(shadow) => Err(DocumentError::locked(key, shadow.locked_by_transaction)),
            None => Err(DocumentError::not_found(
                key,
                format!("no pending change in transaction {}", tx),
            )),
        }
    }
}
