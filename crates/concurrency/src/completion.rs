//! Per-shadow completion primitives
//!
//! The transaction manager decides when a transaction commits or rolls back;
//! these primitives carry out that decision one shadow at a time.

use docstore_core::{Etag, Result, TransactionId};
use docstore_storage::DocumentRecord;
use tracing::debug;

use crate::isolation::IsolationLayer;

/// Outcome of applying one shadow to the live table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedShadow {
    /// Document key
    pub key: String,
    /// Live etag before the change, if a live row existed
    pub previous: Option<Etag>,
    /// Etag now carried by the live row (the shadow etag)
    pub etag: Etag,
    /// True if the shadow was a delete
    pub deleted: bool,
}

impl<'a> IsolationLayer<'a> {
    /// Keys of every shadow owned by `tx`, ascending
    pub fn shadows_of(&self, tx: TransactionId) -> Vec<String> {
        self.session
            .shadows_owned_by(tx)
            .map(|shadow| shadow.key.clone())
            .collect()
    }

    /// Apply the shadow for `key` owned by `tx` to the live table
    ///
    /// A pending put replaces (or creates) the live row with the shadow's
    /// content and etag; a pending delete removes the live row. The shadow is
    /// removed and the lock cleared either way.
    pub fn apply_shadow(&mut self, key: &str, tx: TransactionId) -> Result<AppliedShadow> {
        let shadow = self.owned_shadow(key, tx)?;
        self.session.remove_shadow(key);

        let previous = if shadow.delete_document {
            let removed = self.session.remove_document(key);
            if removed.is_some() {
                self.session.escrow_update(-1);
            }
            removed
        } else {
            let replaced = self.session.put_document(DocumentRecord {
                key: shadow.key.clone(),
                data: shadow.data,
                metadata: shadow.metadata,
                etag: shadow.etag,
                last_modified: shadow.last_modified,
                locked_by_transaction: None,
            });
            if replaced.is_none() {
                self.session.escrow_update(1);
            }
            replaced
        };
        let previous = previous.map(|record| record.etag);
        if let Some(previous) = previous {
            self.cache.invalidate(key, previous);
        }

        debug!(
            key = %key,
            etag = %shadow.etag,
            transaction = %tx,
            deleted = shadow.delete_document,
            "shadow applied"
        );
        Ok(AppliedShadow {
            key: shadow.key,
            previous,
            etag: shadow.etag,
            deleted: shadow.delete_document,
        })
    }

    /// Drop the shadow for `key` owned by `tx`, leaving the live row as it was
    pub fn discard_shadow(&mut self, key: &str, tx: TransactionId) -> Result<()> {
        self.owned_shadow(key, tx)?;
        self.session.remove_shadow(key);
        let locked_by_tx = self
            .session
            .document(key)
            .is_some_and(|record| record.locked_by_transaction == Some(tx));
        if locked_by_tx {
            self.session.lock_document(key, None);
        }
        debug!(key = %key, transaction = %tx, "shadow discarded");
        Ok(())
    }
}
