//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::Once;

pub use docstore::{
    DocumentDatabase, DocumentError, DocumentStoreConfig, Etag, JsonDocument, TransactionInformation,
};
pub use serde_json::{json, Value as JsonValue};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness (shown with `--nocapture`).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Database helpers
// ============================================================================

/// Fresh in-memory database with tracing initialised.
pub fn memory_db() -> DocumentDatabase {
    init_tracing();
    DocumentDatabase::in_memory()
}

/// Database with the compression and checksum codecs enabled.
pub fn codec_db() -> DocumentDatabase {
    init_tracing();
    let config = DocumentStoreConfig::default().with_codecs(["checksum", "zstd"]);
    DocumentDatabase::open(config).expect("valid config")
}

/// Untransacted put in its own batch.
pub fn put(db: &DocumentDatabase, key: &str, etag: Option<Etag>, data: JsonValue) -> docstore::Result<Etag> {
    db.batch(|actions| actions.put(key, etag, &data, &json!({})))
        .map(|result| result.etag)
}

/// Untransacted get in its own batch.
pub fn get(db: &DocumentDatabase, key: &str) -> Option<JsonDocument> {
    db.batch(|actions| actions.get(key, None)).expect("read")
}

/// Get as seen by `tx`.
pub fn get_in(db: &DocumentDatabase, key: &str, tx: &TransactionInformation) -> Option<JsonDocument> {
    db.batch(|actions| actions.get(key, Some(tx))).expect("read")
}
