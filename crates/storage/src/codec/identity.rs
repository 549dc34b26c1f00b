//! Identity codec (no transformation).

use super::traits::{CodecError, DocumentCodec};
use serde_json::Value as JsonValue;

/// Identity codec - bytes pass through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityCodec;

impl DocumentCodec for IdentityCodec {
    fn encode(
        &self,
        _key: &str,
        _data: &JsonValue,
        _metadata: &JsonValue,
        bytes: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(bytes)
    }

    fn decode(&self, _key: &str, _metadata: &JsonValue, bytes: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(bytes)
    }

    fn codec_id(&self) -> &str {
        "identity"
    }
}
