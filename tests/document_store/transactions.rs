//! Transactional writes: visibility, locking, completion and rollback

use crate::common::*;

#[test]
fn test_put_in_transaction_visible_only_to_owner() {
    let db = memory_db();
    let e1 = put(&db, "users/1", None, json!({ "v": 1 })).unwrap();
    let tx = db.begin_transaction();

    let pending = db
        .batch(|actions| actions.put_in_transaction("users/1", Some(e1), &json!({ "v": 2 }), &json!({}), &tx))
        .unwrap();
    assert!(pending > e1);

    let outside = get(&db, "users/1").unwrap();
    assert_eq!(outside.data["v"], 1);
    assert!(outside.non_authoritative);

    let inside = get_in(&db, "users/1", &tx).unwrap();
    assert_eq!(inside.data["v"], 2);
    assert_eq!(inside.etag, pending);

    db.complete_transaction(tx.id).unwrap();
    let committed = get(&db, "users/1").unwrap();
    assert_eq!(committed.data["v"], 2);
    assert_eq!(committed.etag, pending);
    assert!(!committed.non_authoritative);
}

#[test]
fn test_new_key_pending_elsewhere() {
    let db = memory_db();
    let tx = db.begin_transaction();
    db.batch(|actions| actions.put_in_transaction("users/9", None, &json!({}), &json!({}), &tx))
        .unwrap();

    let outside = get(&db, "users/9").unwrap();
    assert!(outside.is_pending_elsewhere());
    assert!(outside.non_authoritative);
    assert_eq!(outside.etag, Etag::EMPTY);
    assert_eq!(db.document_count(), 0);

    db.complete_transaction(tx.id).unwrap();
    assert!(!get(&db, "users/9").unwrap().is_pending_elsewhere());
    assert_eq!(db.document_count(), 1);
}

#[test]
fn test_locked_document_rejects_other_writers() {
    let db = memory_db();
    put(&db, "users/1", None, json!({})).unwrap();
    let owner = db.begin_transaction();
    let intruder = db.begin_transaction();
    db.batch(|actions| actions.put_in_transaction("users/1", None, &json!({ "by": "owner" }), &json!({}), &owner))
        .unwrap();

    let err = put(&db, "users/1", None, json!({})).unwrap_err();
    assert!(matches!(err, DocumentError::Locked { transaction, .. } if transaction == owner.id));

    let err = db
        .batch(|actions| actions.put_in_transaction("users/1", None, &json!({}), &json!({}), &intruder))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Locked { .. }));

    let err = db.batch(|actions| actions.delete("users/1", None)).unwrap_err();
    assert!(matches!(err, DocumentError::Locked { .. }));

    db.batch(|actions| {
        assert!(actions.is_locked_by_other("users/1", Some(intruder.id)));
        assert!(!actions.is_locked_by_other("users/1", Some(owner.id)));
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_delete_in_transaction_then_complete() {
    let db = memory_db();
    let e1 = put(&db, "users/1", None, json!({ "v": 1 })).unwrap();
    let tx = db.begin_transaction();

    let deleted = db
        .batch(|actions| actions.delete_in_transaction("users/1", Some(e1), &tx))
        .unwrap();
    assert!(deleted);
    assert!(get_in(&db, "users/1", &tx).is_none());
    assert!(get(&db, "users/1").unwrap().non_authoritative);
    assert_eq!(db.document_count(), 1);

    let applied = db.complete_transaction(tx.id).unwrap();
    assert_eq!(applied.len(), 1);
    assert!(applied[0].deleted);
    assert!(get(&db, "users/1").is_none());
    assert_eq!(db.document_count(), 0);
}

#[test]
fn test_delete_in_transaction_then_rollback() {
    let db = memory_db();
    let e1 = put(&db, "users/1", None, json!({ "v": 1 })).unwrap();
    let tx = db.begin_transaction();
    db.batch(|actions| actions.delete_in_transaction("users/1", Some(e1), &tx))
        .unwrap();

    assert_eq!(db.rollback_transaction(tx.id).unwrap(), 1);
    let doc = get(&db, "users/1").unwrap();
    assert_eq!(doc.etag, e1);
    assert!(!doc.non_authoritative);

    // lock released: untransacted writers proceed
    put(&db, "users/1", Some(e1), json!({ "v": 2 })).unwrap();
}

#[test]
fn test_delete_in_transaction_missing_key() {
    let db = memory_db();
    let tx = db.begin_transaction();
    assert!(!db
        .batch(|actions| actions.delete_in_transaction("nope", None, &tx))
        .unwrap());

    let stale = put(&db, "other", None, json!({})).unwrap();
    let err = db
        .batch(|actions| actions.delete_in_transaction("nope", Some(stale), &tx))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Concurrency { actual: None, .. }));
}

#[test]
fn test_repeated_writes_in_one_transaction() {
    let db = memory_db();
    let tx = db.begin_transaction();
    let first = db
        .batch(|actions| actions.put_in_transaction("a", None, &json!(1), &json!({}), &tx))
        .unwrap();
    let second = db
        .batch(|actions| actions.put_in_transaction("a", Some(first), &json!(2), &json!({}), &tx))
        .unwrap();
    assert!(second > first);

    // the shadow etag is the one preconditions see
    let err = db
        .batch(|actions| actions.put_in_transaction("a", Some(first), &json!(3), &json!({}), &tx))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Concurrency { .. }));

    let applied = db.complete_transaction(tx.id).unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(get(&db, "a").unwrap().data, json!(2));
}

#[test]
fn test_effective_view() {
    let db = memory_db();
    let e1 = put(&db, "a", None, json!({})).unwrap();
    let tx = db.begin_transaction();
    db.batch(|actions| actions.delete_in_transaction("a", Some(e1), &tx))
        .unwrap();

    db.batch(|actions| {
        let view = actions.effective_view("a", tx.id).unwrap();
        assert!(view.delete_document);
        assert_eq!(view.transaction, tx.id);
        assert!(actions.effective_view("b", tx.id).is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_completion_removes_transaction() {
    let db = memory_db();
    let tx = db.begin_transaction();
    db.batch(|actions| {
        actions.put_in_transaction("a", None, &json!(1), &json!({}), &tx)?;
        actions.put_in_transaction("b", None, &json!(2), &json!({}), &tx)?;
        Ok(())
    })
    .unwrap();
    assert!(db.is_transaction_active(tx.id));
    assert_eq!(db.complete_transaction(tx.id).unwrap().len(), 2);
    assert!(!db.is_transaction_active(tx.id));

    // completing again is a no-op
    assert!(db.complete_transaction(tx.id).unwrap().is_empty());
}

#[test]
fn test_aborted_batch_leaves_no_transaction_behind() {
    let db = memory_db();
    let tx = db.begin_transaction();
    let err = db
        .batch(|actions| {
            actions.put_in_transaction("users/1", None, &json!({}), &json!({}), &tx)?;
            actions.put("", None, &json!({}), &json!({}))
        })
        .unwrap_err();
    assert!(matches!(err, DocumentError::Validation(_)));

    assert!(!db.is_transaction_active(tx.id));
    assert!(get(&db, "users/1").is_none());

    // the same transaction registers once a batch of it commits
    db.batch(|actions| actions.put_in_transaction("users/1", None, &json!({}), &json!({}), &tx))
        .unwrap();
    assert!(db.is_transaction_active(tx.id));
}
