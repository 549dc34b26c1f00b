//! Etag-ordered paging and key prefix scans

use std::collections::BTreeSet;

use crate::common::*;

fn page(db: &DocumentDatabase, after: Etag, take: usize) -> Vec<JsonDocument> {
    db.batch(|actions| actions.documents_after(after, take, None, None).collect())
        .unwrap()
}

#[test]
fn test_paging_visits_every_document_once() {
    let db = memory_db();
    for i in 0..37 {
        put(&db, &format!("docs/{i}"), None, json!({ "i": i })).unwrap();
    }

    let mut seen = BTreeSet::new();
    let mut cursor = Etag::EMPTY;
    loop {
        let docs = page(&db, cursor, 10);
        if docs.is_empty() {
            break;
        }
        for doc in &docs {
            assert!(doc.etag > cursor);
            assert!(seen.insert(doc.key.clone()), "{} returned twice", doc.key);
        }
        cursor = docs.last().map(|d| d.etag).unwrap();
    }
    assert_eq!(seen.len(), 37);
}

#[test]
fn test_paging_with_concurrent_updates_is_lossless() {
    let db = memory_db();
    for i in 0..10 {
        put(&db, &format!("docs/{i}"), None, json!({ "i": i })).unwrap();
    }

    let first = page(&db, Etag::EMPTY, 5);
    let cursor = first.last().map(|d| d.etag).unwrap();

    // an already-visited document moves to the end of the etag order
    put(&db, "docs/0", None, json!({ "i": "moved" })).unwrap();

    let rest = page(&db, cursor, 100);
    let keys: Vec<_> = rest.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys.len(), 6);
    assert_eq!(keys.last(), Some(&"docs/0"));
}

#[test]
fn test_best_next_etag_skips_deleted_gap() {
    let db = memory_db();
    let etags: Vec<_> = (0..5)
        .map(|i| put(&db, &format!("docs/{i}"), None, json!({})).unwrap())
        .collect();
    db.batch(|actions| {
        actions.delete("docs/1", None)?;
        actions.delete("docs/2", None)
    })
    .unwrap();

    db.batch(|actions| {
        assert_eq!(actions.best_next_etag(etags[0]), etags[3]);
        assert_eq!(actions.best_next_etag(etags[4]), etags[4]);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_documents_after_max_bytes() {
    let db = memory_db();
    for i in 0..10 {
        put(&db, &format!("docs/{i}"), None, json!({ "payload": "x".repeat(100) })).unwrap();
    }
    db.batch(|actions| {
        let one = actions
            .documents_after(Etag::EMPTY, 100, None, None)
            .next()
            .unwrap()?;
        let budget = one.serialized_size * 3;

        // landing exactly on the budget does not stop the scan
        let mut scan = actions.documents_after(Etag::EMPTY, 100, Some(budget), None);
        let docs: Vec<_> = scan.by_ref().collect::<docstore::Result<_>>()?;
        assert_eq!(docs.len(), 4);
        assert_eq!(scan.total_bytes(), one.serialized_size * 4);

        let mut scan = actions.documents_after(Etag::EMPTY, 100, Some(budget - 1), None);
        let docs: Vec<_> = scan.by_ref().collect::<docstore::Result<_>>()?;
        assert_eq!(docs.len(), 3);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_prefix_scan_is_case_sensitive() {
    let db = memory_db();
    for key in ["users/1", "Users/2", "users/3"] {
        put(&db, key, None, json!({})).unwrap();
    }
    let docs = db
        .batch(|actions| actions.documents_with_key_prefix("users/", 0, 10))
        .unwrap();
    let keys: Vec<_> = docs.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["users/1", "users/3"]);
}

#[test]
fn test_reverse_update_order_after_update() {
    let db = memory_db();
    for i in 0..3 {
        put(&db, &format!("docs/{i}"), None, json!({})).unwrap();
    }
    put(&db, "docs/0", None, json!({ "updated": true })).unwrap();

    let docs = db
        .batch(|actions| actions.documents_by_reverse_update_order(0, 10))
        .unwrap();
    let keys: Vec<_> = docs.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["docs/0", "docs/2", "docs/1"]);
}
