//! Document store integration suite
//!
//! End-to-end scenarios through the public `docstore` API:
//! - basic_ops: untransacted put / get / delete with etag preconditions
//! - transactions: shadow visibility, completion and rollback
//! - enumeration: etag-ordered paging and key prefix scans
//! - concurrency: racing batches and transactions on threads
//! - codecs: documents surviving the compression and checksum pipeline
//! - config: loading `docstore.toml` from disk

#[path = "../common/mod.rs"]
mod common;

mod basic_ops;
mod codecs;
mod concurrency;
mod config;
mod enumeration;
mod transactions;
