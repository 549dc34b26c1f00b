//! Transaction isolation for docstore
//!
//! This crate implements shadow-table isolation:
//! - Resolution: what a key looks like to a given transaction
//! - IsolationLayer: transactional put/delete through shadows and row locks
//! - Completion primitives: apply or discard a transaction's shadows
//! - TransactionRegistry: live transactions and their timeouts, fed from
//!   each committed session's PendingRegistrations
//!
//! Commit and rollback of logical transactions are decided by the caller;
//! this crate only provides the per-shadow operations.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod isolation;
pub mod registry;
pub mod resolution;

pub use completion::AppliedShadow;
pub use isolation::IsolationLayer;
pub use registry::{PendingRegistrations, RegisteredTransaction, TransactionRegistry};
pub use resolution::{
    check_etag, effective_view, ensure_not_locked, is_locked_by_other, resolve, Resolution,
    ShadowView,
};
