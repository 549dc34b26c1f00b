//! docstore - embedded transactional JSON document storage
//!
//! Documents are JSON values addressed by key, versioned by etags and
//! guarded by optimistic concurrency. Writes made inside a logical
//! transaction stay invisible to everyone else until the transaction
//! completes.
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore::{DocumentDatabase, JsonValue};
//! use serde_json::json;
//!
//! let db = DocumentDatabase::in_memory();
//!
//! let put = db.batch(|actions| actions.put("users/1", None, &json!({"Name": "Ayende"}), &json!({})))?;
//! let doc = db.batch(|actions| actions.get("users/1", None))?;
//! assert_eq!(doc.unwrap().etag, put.etag);
//! ```
//!
//! # Architecture
//!
//! All operations go through [`DocumentDatabase::batch`], which hands the
//! closure a [`DocumentStorageActions`] bound to one storage session.
//! Storage, isolation and codec internals live in their own crates and are
//! reachable through the re-exports below.

// Re-export the public API from docstore-engine
pub use docstore_engine::*;
