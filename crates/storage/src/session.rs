//! Session: a unit of work over a snapshot of the tables
//!
//! Reads see the snapshot plus the session's own writes. Writes are recorded
//! per row so commit can detect conflicts and apply only what changed.
//!
//! The snapshot is shared with the store until the session first writes;
//! that write clones the tables once.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::record::{DocumentRecord, ShadowRecord};
use crate::store::Committed;
use crate::tables::{Tables, DOCUMENTS, DOCUMENTS_MODIFIED_BY_TRANSACTIONS};
use docstore_core::{Etag, TransactionId};

/// A storage session
///
/// Dropping a session without calling [`Session::commit`] rolls it back.
#[derive(Debug)]
pub struct Session {
    committed: Arc<RwLock<Committed>>,
    base_commit: u64,
    pub(crate) tables: Arc<Tables>,
    touched_documents: BTreeSet<String>,
    touched_shadows: BTreeSet<String>,
    count_delta: i64,
    finished: bool,
}

impl Session {
    pub(crate) fn new(committed: Arc<RwLock<Committed>>, base_commit: u64, tables: Arc<Tables>) -> Self {
        Self {
            committed,
            base_commit,
            tables,
            touched_documents: BTreeSet::new(),
            touched_shadows: BTreeSet::new(),
            count_delta: 0,
            finished: false,
        }
    }

    /// Commit sequence this session's snapshot was taken at
    pub fn base_commit(&self) -> u64 {
        self.base_commit
    }

    fn tables_mut(&mut self) -> &mut Tables {
        Arc::make_mut(&mut self.tables)
    }

    /// True if the session has written anything
    pub fn is_dirty(&self) -> bool {
        !self.touched_documents.is_empty() || !self.touched_shadows.is_empty() || self.count_delta != 0
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Seek `Documents.by_key`
    pub fn document(&self, key: &str) -> Option<&DocumentRecord> {
        self.tables.document(key)
    }

    /// All live rows in ascending etag order
    pub fn documents_by_etag(&self) -> impl DoubleEndedIterator<Item = &DocumentRecord> + '_ {
        self.tables.documents_by_etag()
    }

    /// Live rows with etag strictly after `etag`
    pub fn documents_after(&self, etag: Etag) -> impl Iterator<Item = &DocumentRecord> + '_ {
        self.tables.documents_after(etag)
    }

    /// Smallest indexed etag strictly after `etag`
    pub fn first_etag_after(&self, etag: Etag) -> Option<Etag> {
        self.tables.first_etag_after(etag)
    }

    /// Live rows with key at or after `key`, ascending by key
    pub fn documents_from_key<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a DocumentRecord> + 'a {
        self.tables.documents_from_key(key)
    }

    /// Insert a new row; fails on a duplicate key
    pub fn insert_document(&mut self, record: DocumentRecord) -> Result<(), StoreError> {
        let key = record.key.clone();
        self.tables_mut().insert_document(record)?;
        self.touched_documents.insert(key);
        Ok(())
    }

    /// Insert or replace a row
    pub fn put_document(&mut self, record: DocumentRecord) -> Option<DocumentRecord> {
        self.touched_documents.insert(record.key.clone());
        self.tables_mut().put_document(record)
    }

    /// Update a row in place
    pub fn update_document<F>(&mut self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut DocumentRecord),
    {
        if self.tables.document(key).is_none() {
            return false;
        }
        self.touched_documents.insert(key.to_string());
        self.tables_mut().update_document(key, f)
    }

    /// Remove a row
    pub fn remove_document(&mut self, key: &str) -> Option<DocumentRecord> {
        self.tables.document(key)?;
        self.touched_documents.insert(key.to_string());
        self.tables_mut().remove_document(key)
    }

    /// Set or clear the transaction lock on a row
    pub fn lock_document(&mut self, key: &str, transaction: Option<TransactionId>) -> bool {
        self.update_document(key, |record| record.locked_by_transaction = transaction)
    }

    // ========================================================================
    // DocumentsModifiedByTransactions
    // ========================================================================

    /// Seek the shadow table `by_key`
    pub fn shadow(&self, key: &str) -> Option<&ShadowRecord> {
        self.tables.shadow(key)
    }

    /// Shadow rows owned by `transaction`
    pub fn shadows_owned_by(
        &self,
        transaction: TransactionId,
    ) -> impl Iterator<Item = &ShadowRecord> + '_ {
        self.tables.shadows_owned_by(transaction)
    }

    /// Insert or replace a shadow row
    pub fn put_shadow(&mut self, record: ShadowRecord) -> Option<ShadowRecord> {
        self.touched_shadows.insert(record.key.clone());
        self.tables_mut().put_shadow(record)
    }

    /// Remove a shadow row
    pub fn remove_shadow(&mut self, key: &str) -> Option<ShadowRecord> {
        self.tables.shadow(key)?;
        self.touched_shadows.insert(key.to_string());
        self.tables_mut().remove_shadow(key)
    }

    // ========================================================================
    // Details
    // ========================================================================

    /// Document count as seen by this session
    pub fn document_count(&self) -> i64 {
        self.tables.document_count()
    }

    /// Escrow update of the document count
    pub fn escrow_update(&mut self, delta: i64) {
        self.count_delta += delta;
        self.tables_mut().escrow_update(delta);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Commit the session, returning the new commit sequence
    ///
    /// # Errors
    ///
    /// `StoreError::WriteConflict` if a row this session touched was committed
    /// by another session after this one began. Nothing is applied in that case.
    pub fn commit(mut self) -> Result<u64, StoreError> {
        self.finished = true;
        let mut committed = self.committed.write();

        for key in &self.touched_documents {
            if committed.document_stamps.get(key).copied().unwrap_or(0) > self.base_commit {
                warn!(table = DOCUMENTS, key = %key, base = self.base_commit, "write conflict");
                return Err(StoreError::WriteConflict {
                    table: DOCUMENTS,
                    key: key.clone(),
                });
            }
        }
        for key in &self.touched_shadows {
            if committed.shadow_stamps.get(key).copied().unwrap_or(0) > self.base_commit {
                warn!(
                    table = DOCUMENTS_MODIFIED_BY_TRANSACTIONS,
                    key = %key,
                    base = self.base_commit,
                    "write conflict"
                );
                return Err(StoreError::WriteConflict {
                    table: DOCUMENTS_MODIFIED_BY_TRANSACTIONS,
                    key: key.clone(),
                });
            }
        }

        let seq = committed.commit_seq + 1;
        let committed = &mut *committed;
        // clean sessions still share the committed tables
        if self.is_dirty() {
            let tables = Arc::make_mut(&mut committed.tables);

            for key in &self.touched_documents {
                match self.tables.document(key) {
                    Some(record) => {
                        tables.put_document(record.clone());
                    }
                    None => {
                        tables.remove_document(key);
                    }
                }
                committed.document_stamps.insert(key.clone(), seq);
            }
            for key in &self.touched_shadows {
                match self.tables.shadow(key) {
                    Some(record) => {
                        tables.put_shadow(record.clone());
                    }
                    None => {
                        tables.remove_shadow(key);
                    }
                }
                committed.shadow_stamps.insert(key.clone(), seq);
            }
            tables.escrow_update(self.count_delta);
        }
        committed.commit_seq = seq;

        debug!(
            commit_seq = seq,
            documents = self.touched_documents.len(),
            shadows = self.touched_shadows.len(),
            count_delta = self.count_delta,
            "session committed"
        );
        Ok(seq)
    }

    /// Discard every change made in this session
    pub fn rollback(mut self) {
        self.finished = true;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.finished && self.is_dirty() {
            debug!(
                base = self.base_commit,
                documents = self.touched_documents.len(),
                shadows = self.touched_shadows.len(),
                "session dropped without commit, rolling back"
            );
        }
    }
}
