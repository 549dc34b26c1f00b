//! MemoryStore: in-memory record store with snapshot sessions
//!
//! Committed tables live behind a single `parking_lot::RwLock` as a shared
//! `Arc<Tables>`. Beginning a session only bumps the reference count; the
//! session clones the tables on its first write (copy-on-write) and commits
//! by writing back only the rows it touched.
//!
//! # Cost
//!
//! A read-only session is O(1) to begin and commit. A writing session pays
//! one O(n) clone of the tables, n being live plus shadow rows, and a commit
//! clones the committed tables again if an older session still shares them.
//! Loading n documents as n single-write batches is therefore quadratic;
//! bulk loads should put many documents per batch.
//!
//! # Conflict Detection
//!
//! Every committed row carries the commit sequence that last wrote it. A
//! session that touched a row committed by someone else after the session
//! began fails with `StoreError::WriteConflict` (first committer wins). The
//! `Details` count is an escrow column: deltas are applied additively and
//! never conflict.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::session::Session;
use crate::tables::Tables;

/// Committed state shared by the store and its sessions
#[derive(Debug, Default)]
pub(crate) struct Committed {
    pub(crate) tables: Arc<Tables>,
    pub(crate) commit_seq: u64,
    /// Commit sequence that last wrote each `Documents` row
    pub(crate) document_stamps: HashMap<String, u64>,
    /// Commit sequence that last wrote each shadow row
    pub(crate) shadow_stamps: HashMap<String, u64>,
}

/// In-memory record store
///
/// Cloning the store yields another handle to the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Arc<RwLock<Committed>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session over a snapshot of the committed tables
    pub fn begin_session(&self) -> Session {
        let committed = self.committed.read();
        Session::new(
            Arc::clone(&self.committed),
            committed.commit_seq,
            Arc::clone(&committed.tables),
        )
    }

    /// Sequence of the latest commit (0 before the first commit)
    pub fn commit_seq(&self) -> u64 {
        self.committed.read().commit_seq
    }

    /// Committed escrow document count
    pub fn document_count(&self) -> i64 {
        self.committed.read().tables.document_count()
    }

    /// Committed number of live rows
    pub fn document_rows(&self) -> usize {
        self.committed.read().tables.document_rows()
    }

    /// Committed number of shadow rows
    pub fn shadow_rows(&self) -> usize {
        self.committed.read().tables.shadow_rows()
    }
}
