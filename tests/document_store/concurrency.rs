//! Racing batches and transactions on threads

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use crate::common::*;

#[test]
fn test_racing_conditional_puts_one_winner() {
    let db = Arc::new(memory_db());
    let base = put(&db, "counter", None, json!({ "n": 0 })).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let winners = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            let winners = Arc::clone(&winners);
            thread::spawn(move || {
                barrier.wait();
                match put(&db, "counter", Some(base), json!({ "n": t })) {
                    Ok(_) => {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(DocumentError::Concurrency { .. }) | Err(DocumentError::WriteConflict { .. }) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert!(get(&db, "counter").unwrap().etag > base);
}

#[test]
fn test_parallel_writers_disjoint_keys() {
    let db = Arc::new(memory_db());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..50 {
                    put(&db, &format!("t{t}/{i}"), None, json!({ "t": t, "i": i })).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.document_count(), 200);
    let mut etags: Vec<_> = db
        .batch(|actions| actions.documents_after(Etag::EMPTY, usize::MAX, None, None).collect::<docstore::Result<Vec<_>>>())
        .unwrap()
        .into_iter()
        .map(|d| d.etag)
        .collect();
    let len = etags.len();
    etags.dedup();
    assert_eq!(etags.len(), len);
}

#[test]
fn test_racing_transactions_one_owner() {
    let db = Arc::new(memory_db());
    put(&db, "shared", None, json!({})).unwrap();

    let threads = 6;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let tx = db.begin_transaction();
                barrier.wait();
                let outcome =
                    db.batch(|actions| actions.put_in_transaction("shared", None, &json!({}), &json!({}), &tx));
                (tx, outcome)
            })
        })
        .collect();

    let mut owners = Vec::new();
    for handle in handles {
        let (tx, outcome) = handle.join().unwrap();
        match outcome {
            Ok(_) => owners.push(tx),
            Err(DocumentError::Locked { .. }) | Err(DocumentError::WriteConflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(owners.len(), 1);
    assert_eq!(db.complete_transaction(owners[0].id).unwrap().len(), 1);
    assert_eq!(db.document_count(), 1);
}
