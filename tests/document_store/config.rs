//! Opening a database from `docstore.toml`

use docstore::{ConfigError, CONFIG_FILE_NAME};
use tempfile::TempDir;

use crate::common::*;

#[test]
fn test_open_from_default_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    DocumentStoreConfig::write_default_if_missing(&path).unwrap();

    let config = DocumentStoreConfig::from_file(&path).unwrap();
    assert_eq!(config, DocumentStoreConfig::default());

    let db = DocumentDatabase::open(config).unwrap();
    put(&db, "a", None, json!({})).unwrap();
    assert_eq!(db.document_count(), 1);
}

#[test]
fn test_open_from_written_file() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    let written = DocumentStoreConfig::default()
        .with_codecs(["checksum", "zstd"])
        .without_cache();
    written.write_to_file(&path).unwrap();

    let db = DocumentDatabase::open(DocumentStoreConfig::from_file(&path).unwrap()).unwrap();
    assert_eq!(db.config(), &written);
    assert!(db.cache_stats().is_none());

    put(&db, "a", None, json!({ "text": "x".repeat(256) })).unwrap();
    assert_eq!(get(&db, "a").unwrap().data["text"].as_str().unwrap().len(), 256);
}

#[test]
fn test_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "codecs = [\"rot13\"]\n").unwrap();
    assert!(matches!(DocumentStoreConfig::from_file(&path), Err(ConfigError::Invalid(_))));

    std::fs::write(&path, "codecs = 7\n").unwrap();
    assert!(matches!(DocumentStoreConfig::from_file(&path), Err(ConfigError::Parse(_))));

    let missing = dir.path().join("missing.toml");
    assert!(matches!(DocumentStoreConfig::from_file(&missing), Err(ConfigError::Io { .. })));
}

#[test]
fn test_transaction_timeout_from_config() {
    let config = DocumentStoreConfig::from_toml_str("transaction_timeout_secs = 5\n").unwrap();
    let db = DocumentDatabase::open(config).unwrap();
    let tx = db.begin_transaction();
    assert_eq!(tx.timeout, std::time::Duration::from_secs(5));
}
