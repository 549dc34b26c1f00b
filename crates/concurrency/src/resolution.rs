//! Resolution of a key against the live table and transaction shadows
//!
//! Every read and write path asks the same question first: what does this
//! key look like to this transaction? `resolve` answers it once.

use docstore_core::{DocumentError, Etag, Result, Timestamp, TransactionId};
use docstore_storage::{DocumentRecord, Session, ShadowRecord};

/// What a key resolves to for a given reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The live row; `modified_in_transaction` when any shadow exists for it
    Live {
        /// Live row
        record: &'a DocumentRecord,
        /// True if a shadow exists for the key
        modified_in_transaction: bool,
    },
    /// The reader's own pending put
    OwnShadow(&'a ShadowRecord),
    /// The reader's own pending delete
    DeletedInTransaction(&'a ShadowRecord),
    /// No live row, but another transaction is creating one
    PendingElsewhere(&'a ShadowRecord),
    /// Nothing at all
    Absent,
}

impl<'a> Resolution<'a> {
    /// Etag the reader sees, used for preconditions
    ///
    /// A pending delete still reports the etag of its shadow.
    pub fn effective_etag(&self) -> Option<Etag> {
        match self {
            Resolution::Live { record, .. } => Some(record.etag),
            Resolution::OwnShadow(shadow) | Resolution::DeletedInTransaction(shadow) => {
                Some(shadow.etag)
            }
            Resolution::PendingElsewhere(_) | Resolution::Absent => None,
        }
    }

    /// Short name for log fields
    pub fn name(&self) -> &'static str {
        match self {
            Resolution::Live { .. } => "live",
            Resolution::OwnShadow(_) => "own-shadow",
            Resolution::DeletedInTransaction(_) => "deleted-in-transaction",
            Resolution::PendingElsewhere(_) => "pending-elsewhere",
            Resolution::Absent => "absent",
        }
    }
}

/// Resolve `key` for a reader in transaction `tx` (or outside any transaction)
pub fn resolve<'a>(session: &'a Session, key: &str, tx: Option<TransactionId>) -> Resolution<'a> {
    let shadow = session.shadow(key);

    if let (Some(shadow), Some(tx)) = (shadow, tx) {
        if shadow.is_owned_by(tx) {
            return if shadow.delete_document {
                Resolution::DeletedInTransaction(shadow)
            } else {
                Resolution::OwnShadow(shadow)
            };
        }
    }

    match (session.document(key), shadow) {
        (Some(record), shadow) => Resolution::Live {
            record,
            modified_in_transaction: shadow.is_some(),
        },
        (None, Some(shadow)) => Resolution::PendingElsewhere(shadow),
        (None, None) => Resolution::Absent,
    }
}

/// The transaction that blocks `tx` from writing `key`, if any
///
/// A live row locked by another transaction blocks; so does a foreign
/// shadow for a key with no live row.
pub fn blocking_transaction(
    session: &Session,
    key: &str,
    tx: Option<TransactionId>,
) -> Option<TransactionId> {
    match session.document(key) {
        Some(record) => record
            .locked_by_transaction
            .filter(|owner| Some(*owner) != tx),
        None => session
            .shadow(key)
            .map(|shadow| shadow.locked_by_transaction)
            .filter(|owner| Some(*owner) != tx),
    }
}

/// True if another transaction holds `key`
pub fn is_locked_by_other(session: &Session, key: &str, tx: Option<TransactionId>) -> bool {
    blocking_transaction(session, key, tx).is_some()
}

/// Fail with `DocumentError::Locked` if another transaction holds `key`
pub fn ensure_not_locked(session: &Session, key: &str, tx: Option<TransactionId>) -> Result<()> {
    match blocking_transaction(session, key, tx) {
        Some(owner) => Err(DocumentError::locked(key, owner)),
        None => Ok(()),
    }
}

/// Check an etag precondition against the etag the writer sees
///
/// `None` and `Etag::EMPTY` impose no precondition. Otherwise the expected
/// etag must equal `actual`; a missing document never matches.
pub fn check_etag(
    operation: &'static str,
    key: &str,
    expected: Option<Etag>,
    actual: Option<Etag>,
) -> Result<()> {
    match expected {
        Some(expected) if !expected.is_empty() && actual != Some(expected) => {
            Err(DocumentError::concurrency(operation, key, expected, actual))
        }
        _ => Ok(()),
    }
}

/// The pending state of a key as seen by its owning transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowView {
    /// Etag the key receives on commit
    pub etag: Etag,
    /// True for a pending delete
    pub delete_document: bool,
    /// Last modification time of the pending value
    pub last_modified: Timestamp,
    /// Owning transaction
    pub transaction: TransactionId,
}

impl From<&ShadowRecord> for ShadowView {
    fn from(shadow: &ShadowRecord) -> Self {
        ShadowView {
            etag: shadow.etag,
            delete_document: shadow.delete_document,
            last_modified: shadow.last_modified,
            transaction: shadow.locked_by_transaction,
        }
    }
}

/// The shadow `tx` sees for `key`, if it owns one
pub fn effective_view(session: &Session, key: &str, tx: TransactionId) -> Option<ShadowView> {
    session
        .shadow(key)
        .filter(|shadow| shadow.is_owned_by(tx))
        .map(ShadowView::from)
}
