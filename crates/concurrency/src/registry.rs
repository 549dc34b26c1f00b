//! Registry of transactions that own shadows
//!
//! Transactional writes are noted in a session-local
//! [`PendingRegistrations`]; the registry only learns about them once that
//! session commits, so a rolled-back batch leaves no registration behind.
//! The first committed write records the transaction; every later one slides
//! its expiry forward by the transaction's timeout. An external manager
//! polls `expired` and rolls those transactions back so their shadows never
//! outlive them.

use dashmap::DashMap;
use docstore_core::{Timestamp, TransactionId, TransactionInformation};
use tracing::debug;

/// A registered transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredTransaction {
    /// Transaction identity and timeout
    pub info: TransactionInformation,
    /// Time of the first write
    pub started: Timestamp,
    /// Time after which the transaction is considered abandoned
    pub expires_at: Timestamp,
}

/// Transactions written to by one session, registered after it commits
#[derive(Debug, Default)]
pub struct PendingRegistrations {
    transactions: Vec<TransactionInformation>,
}

impl PendingRegistrations {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a write by `info`; the latest timeout wins
    pub fn record(&mut self, info: &TransactionInformation) {
        match self.transactions.iter_mut().find(|pending| pending.id == info.id) {
            Some(pending) => *pending = *info,
            None => self.transactions.push(*info),
        }
    }

    /// True if `id` wrote in this session
    pub fn contains(&self, id: TransactionId) -> bool {
        self.transactions.iter().any(|pending| pending.id == id)
    }

    /// Number of distinct transactions noted
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True if no transactional write happened
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Concurrent map of live transactions
#[derive(Debug, Default)]
pub struct TransactionRegistry {
    transactions: DashMap<TransactionId, RegisteredTransaction>,
}

impl TransactionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `info` if unknown, and push its expiry to `now + timeout`
    pub fn ensure_exists(&self, info: &TransactionInformation, now: Timestamp) {
        let expires_at = now.saturating_add(info.timeout);
        self.transactions
            .entry(info.id)
            .and_modify(|registered| registered.expires_at = expires_at)
            .or_insert_with(|| {
                debug!(transaction = %info.id, timeout_ms = info.timeout.as_millis() as u64, "transaction registered");
                RegisteredTransaction {
                    info: *info,
                    started: now,
                    expires_at,
                }
            });
    }

    /// Register every transaction of a committed session
    pub fn register(&self, pending: PendingRegistrations, now: Timestamp) {
        for info in &pending.transactions {
            self.ensure_exists(info, now);
        }
    }

    /// Look up a transaction
    pub fn get(&self, id: TransactionId) -> Option<RegisteredTransaction> {
        self.transactions.get(&id).map(|entry| *entry)
    }

    /// True if the transaction is registered
    pub fn contains(&self, id: TransactionId) -> bool {
        self.transactions.contains_key(&id)
    }

    /// Transactions whose expiry is before `now`
    pub fn expired(&self, now: Timestamp) -> Vec<TransactionId> {
        let mut expired: Vec<_> = self
            .transactions
            .iter()
            .filter(|entry| entry.expires_at < now)
            .map(|entry| *entry.key())
            .collect();
        expired.sort();
        expired
    }

    /// Unregister a transaction, returning its record
    pub fn remove(&self, id: TransactionId) -> Option<RegisteredTransaction> {
        self.transactions.remove(&id).map(|(_, registered)| registered)
    }

    /// Number of registered transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True if no transaction is registered
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
