//! Untransacted document operations

use crate::common::*;

#[test]
fn test_put_update_delete_lifecycle() {
    let db = memory_db();

    let e1 = put(&db, "users/1", None, json!({ "Name": "Ayende" })).unwrap();
    assert_eq!(db.document_count(), 1);

    let e2 = put(&db, "users/1", Some(e1), json!({ "Name": "Oren" })).unwrap();
    assert!(e2 > e1);
    assert_eq!(get(&db, "users/1").unwrap().data["Name"], "Oren");

    let deleted = db.batch(|actions| actions.delete("users/1", Some(e2))).unwrap();
    assert!(deleted.existed);
    assert_eq!(deleted.etag, Some(e2));
    assert_eq!(db.document_count(), 0);
    assert!(get(&db, "users/1").is_none());
}

#[test]
fn test_stale_etag_is_rejected() {
    let db = memory_db();
    let e1 = put(&db, "users/1", None, json!({ "v": 1 })).unwrap();
    let e2 = put(&db, "users/1", Some(e1), json!({ "v": 2 })).unwrap();

    let err = put(&db, "users/1", Some(e1), json!({ "v": 3 })).unwrap_err();
    match err {
        DocumentError::Concurrency { expected, actual, .. } => {
            assert_eq!(expected, e1);
            assert_eq!(actual, Some(e2));
        }
        other => panic!("expected concurrency error, got {other:?}"),
    }
    // the failed batch left the document untouched
    let doc = get(&db, "users/1").unwrap();
    assert_eq!(doc.etag, e2);
    assert_eq!(doc.data["v"], 2);
}

#[test]
fn test_put_new_key_with_etag_fails() {
    let db = memory_db();
    let other = put(&db, "users/1", None, json!({})).unwrap();
    let err = put(&db, "users/2", Some(other), json!({})).unwrap_err();
    assert!(matches!(err, DocumentError::Concurrency { .. }));
    assert_eq!(db.document_count(), 1);
}

#[test]
fn test_empty_etag_means_no_precondition() {
    let db = memory_db();
    let e1 = put(&db, "users/1", None, json!({})).unwrap();
    let e2 = put(&db, "users/1", Some(Etag::EMPTY), json!({ "v": 2 })).unwrap();
    assert!(e2 > e1);
}

#[test]
fn test_delete_missing_key() {
    let db = memory_db();
    let result = db.batch(|actions| actions.delete("nope", None)).unwrap();
    assert!(!result.existed);
    assert!(result.metadata.is_none());
}

#[test]
fn test_invalid_keys() {
    let db = memory_db();
    assert!(matches!(put(&db, "", None, json!({})), Err(DocumentError::Validation(_))));
    let long = "k".repeat(1025);
    assert!(matches!(put(&db, &long, None, json!({})), Err(DocumentError::Validation(_))));
    assert!(put(&db, &"k".repeat(1024), None, json!({})).is_ok());
}

#[test]
fn test_metadata_round_trip() {
    let db = memory_db();
    db.batch(|actions| {
        actions.put("users/1", None, &json!({ "a": 1 }), &json!({ "Raven-Entity-Name": "Users" }))
    })
    .unwrap();

    let metadata = db
        .batch(|actions| actions.get_metadata("users/1", None))
        .unwrap()
        .unwrap();
    assert_eq!(metadata.metadata["Raven-Entity-Name"], "Users");
    assert!(!metadata.non_authoritative);
}

#[test]
fn test_touch_changes_etag_only() {
    let db = memory_db();
    let e1 = put(&db, "users/1", None, json!({ "v": 1 })).unwrap();
    let touched = db.batch(|actions| actions.touch("users/1")).unwrap().unwrap();
    assert_eq!(touched.previous, e1);
    assert!(touched.current > e1);

    let doc = get(&db, "users/1").unwrap();
    assert_eq!(doc.etag, touched.current);
    assert_eq!(doc.data["v"], 1);
    assert!(db.batch(|actions| actions.touch("nope")).unwrap().is_none());
}

#[test]
fn test_insert_unconditional_duplicate() {
    let db = memory_db();
    db.batch(|actions| actions.insert_unconditional("a", &json!(1), &json!({}), false))
        .unwrap();
    let err = db
        .batch(|actions| actions.insert_unconditional("a", &json!(2), &json!({}), false))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Storage(_)));

    let result = db
        .batch(|actions| actions.insert_unconditional("a", &json!(3), &json!({}), true))
        .unwrap();
    assert!(result.updated);
    assert_eq!(get(&db, "a").unwrap().data, json!(3));
    assert_eq!(db.document_count(), 1);
}

#[test]
fn test_count_tracks_inserts_minus_deletes() {
    let db = memory_db();
    for i in 0..20 {
        put(&db, &format!("docs/{i}"), None, json!({ "i": i })).unwrap();
    }
    for i in (0..20).step_by(3) {
        db.batch(|actions| actions.delete(&format!("docs/{i}"), None)).unwrap();
    }
    // overwrites do not change the count
    put(&db, "docs/1", None, json!({ "i": "again" })).unwrap();
    assert_eq!(db.document_count(), 20 - 7);
}
