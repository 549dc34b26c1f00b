//! The three document tables and their indexes
//!
//! `Tables` is the unit the store snapshots and commits. Every mutation keeps
//! the secondary `by_etag` index consistent with the `Documents` rows.

use crate::error::StoreError;
use crate::record::{DocumentRecord, ShadowRecord};
use docstore_core::{Etag, TransactionId};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Name of the live document table
pub const DOCUMENTS: &str = "Documents";
/// Name of the transaction shadow table
pub const DOCUMENTS_MODIFIED_BY_TRANSACTIONS: &str = "DocumentsModifiedByTransactions";
/// Name of the single-row details table
pub const DETAILS: &str = "Details";

/// Single row of the `Details` table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Details {
    /// Escrow counter of live documents
    pub document_count: i64,
}

/// Documents, shadows and details
#[derive(Debug, Clone, Default)]
pub struct Tables {
    documents: BTreeMap<String, DocumentRecord>,
    by_etag: BTreeMap<[u8; 16], String>,
    modified_by_transactions: BTreeMap<String, ShadowRecord>,
    details: Details,
}

impl Tables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Seek `by_key`
    pub fn document(&self, key: &str) -> Option<&DocumentRecord> {
        self.documents.get(key)
    }

    /// Number of rows in `Documents`
    pub fn document_rows(&self) -> usize {
        self.documents.len()
    }

    /// Insert a new row, rejecting duplicates on `by_key`
    pub fn insert_document(&mut self, record: DocumentRecord) -> Result<(), StoreError> {
        if self.documents.contains_key(&record.key) {
            return Err(StoreError::DuplicateKey {
                table: DOCUMENTS,
                key: record.key,
            });
        }
        self.put_document(record);
        Ok(())
    }

    /// Insert or replace a row, returning the previous row
    pub fn put_document(&mut self, record: DocumentRecord) -> Option<DocumentRecord> {
        let previous = self.documents.remove(&record.key);
        if let Some(prev) = &previous {
            self.by_etag.remove(&prev.etag.to_sortable_bytes());
        }
        self.by_etag
            .insert(record.etag.to_sortable_bytes(), record.key.clone());
        self.documents.insert(record.key.clone(), record);
        previous
    }

    /// Update a row in place; the etag index follows any etag change
    ///
    /// Returns false if no row exists for `key`.
    pub fn update_document<F>(&mut self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut DocumentRecord),
    {
        let Some(record) = self.documents.get_mut(key) else {
            return false;
        };
        let before = record.etag;
        f(record);
        let after = record.etag;
        if before != after {
            self.by_etag.remove(&before.to_sortable_bytes());
            self.by_etag.insert(after.to_sortable_bytes(), key.to_string());
        }
        true
    }

    /// Remove a row
    pub fn remove_document(&mut self, key: &str) -> Option<DocumentRecord> {
        let removed = self.documents.remove(key)?;
        self.by_etag.remove(&removed.etag.to_sortable_bytes());
        Some(removed)
    }

    /// Set or clear the transaction lock on a row
    pub fn lock_document(&mut self, key: &str, transaction: Option<TransactionId>) -> bool {
        self.update_document(key, |record| record.locked_by_transaction = transaction)
    }

    /// All rows in ascending etag order
    pub fn documents_by_etag(&self) -> impl DoubleEndedIterator<Item = &DocumentRecord> + '_ {
        self.by_etag
            .values()
            .filter_map(move |key| self.documents.get(key))
    }

    /// Rows whose etag sorts strictly after `etag`, ascending
    pub fn documents_after(&self, etag: Etag) -> impl Iterator<Item = &DocumentRecord> + '_ {
        self.by_etag
            .range((Bound::Excluded(etag.to_sortable_bytes()), Bound::Unbounded))
            .filter_map(move |(_, key)| self.documents.get(key))
    }

    /// Smallest indexed etag strictly greater than `etag`
    pub fn first_etag_after(&self, etag: Etag) -> Option<Etag> {
        self.by_etag
            .range((Bound::Excluded(etag.to_sortable_bytes()), Bound::Unbounded))
            .next()
            .map(|(bytes, _)| Etag::from_sortable_bytes(bytes))
    }

    /// Rows with key at or after `key`, ascending by key
    pub fn documents_from_key<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a DocumentRecord> + 'a {
        self.documents
            .range::<str, _>((Bound::Included(key), Bound::Unbounded))
            .map(|(_, record)| record)
    }

    // ========================================================================
    // DocumentsModifiedByTransactions
    // ========================================================================

    /// Seek the shadow table `by_key`
    pub fn shadow(&self, key: &str) -> Option<&ShadowRecord> {
        self.modified_by_transactions.get(key)
    }

    /// Insert or replace a shadow row, returning the previous row
    pub fn put_shadow(&mut self, record: ShadowRecord) -> Option<ShadowRecord> {
        self.modified_by_transactions
            .insert(record.key.clone(), record)
    }

    /// Remove a shadow row
    pub fn remove_shadow(&mut self, key: &str) -> Option<ShadowRecord> {
        self.modified_by_transactions.remove(key)
    }

    /// Shadow rows owned by `transaction`, ascending by key
    pub fn shadows_owned_by(
        &self,
        transaction: TransactionId,
    ) -> impl Iterator<Item = &ShadowRecord> + '_ {
        self.modified_by_transactions
            .values()
            .filter(move |shadow| shadow.is_owned_by(transaction))
    }

    /// Number of rows in the shadow table
    pub fn shadow_rows(&self) -> usize {
        self.modified_by_transactions.len()
    }

    // ========================================================================
    // Details
    // ========================================================================

    /// Current escrow document count
    pub fn document_count(&self) -> i64 {
        self.details.document_count
    }

    /// Apply an escrow delta to the document count
    pub fn escrow_update(&mut self, delta: i64) {
        self.details.document_count += delta;
    }

    /// The details row
    pub fn details(&self) -> Details {
        self.details
    }
}
