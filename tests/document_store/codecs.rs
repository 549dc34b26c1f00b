//! Documents through the data column codec pipeline

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docstore::{CodecError, CodecPipeline, DocumentCodec, SKIP_COMPRESSION};
use proptest::prelude::*;

use crate::common::*;

/// Reversible byte scrambler that counts its calls
struct XorCodec {
    mask: u8,
    encodes: Arc<AtomicUsize>,
}

impl DocumentCodec for XorCodec {
    fn encode(
        &self,
        _key: &str,
        _data: &JsonValue,
        _metadata: &JsonValue,
        bytes: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        Ok(bytes.into_iter().map(|b| b ^ self.mask).collect())
    }

    fn decode(&self, _key: &str, _metadata: &JsonValue, bytes: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.into_iter().map(|b| b ^ self.mask).collect())
    }

    fn codec_id(&self) -> &str {
        "xor"
    }
}

#[test]
fn test_custom_codec_in_pipeline() {
    init_tracing();
    let encodes = Arc::new(AtomicUsize::new(0));
    let pipeline = CodecPipeline::new().with(XorCodec {
        mask: 0x5a,
        encodes: Arc::clone(&encodes),
    });
    let db = DocumentDatabase::in_memory().with_codecs(pipeline);

    let tx = db.begin_transaction();
    put(&db, "a", None, json!({ "name": "plain" })).unwrap();
    db.batch(|actions| actions.put_in_transaction("b", None, &json!({ "name": "shadow" }), &json!({}), &tx))
        .unwrap();
    assert_eq!(encodes.load(Ordering::SeqCst), 2);

    assert_eq!(get(&db, "a").unwrap().data["name"], "plain");
    assert_eq!(get_in(&db, "b", &tx).unwrap().data["name"], "shadow");
    db.complete_transaction(tx.id).unwrap();
    assert_eq!(get(&db, "b").unwrap().data["name"], "shadow");
}

#[test]
fn test_skip_compression_flag() {
    let db = codec_db();
    let text = "compressible ".repeat(200);
    db.batch(|actions| {
        actions.put("small", None, &json!({ "text": text }), &json!({}))?;
        actions.put("large", None, &json!({ "text": text }), &json!({ SKIP_COMPRESSION: true }))
    })
    .unwrap();

    let small = get(&db, "small").unwrap();
    let large = get(&db, "large").unwrap();
    assert_eq!(small.data, large.data);
    assert!(small.serialized_size < large.serialized_size);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_documents_survive_codecs(
        name in "\\PC{0,64}",
        count in any::<i64>(),
        tags in prop::collection::vec("[a-z]{1,8}", 0..8),
    ) {
        let db = codec_db();
        let data = json!({ "name": name, "count": count, "tags": tags });
        put(&db, "docs/1", None, data.clone()).unwrap();
        let doc = get(&db, "docs/1").unwrap();
        prop_assert_eq!(doc.data, data);
    }
}
