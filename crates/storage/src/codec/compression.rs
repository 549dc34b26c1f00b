//! Zstandard compression codec.
//!
//! Output is a one-byte header followed by the payload. Documents whose
//! metadata sets `Skip-Compression` are stored raw behind the same header,
//! so decode never depends on the metadata.

use super::traits::{CodecError, DocumentCodec};
use serde_json::Value as JsonValue;

/// Metadata flag that disables compression for a document
pub const SKIP_COMPRESSION: &str = "Skip-Compression";

/// Default zstd level
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

const HEADER_RAW: u8 = 0;
const HEADER_ZSTD: u8 = 1;

/// Zstandard codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Create a codec compressing at `level`
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    /// Compression level
    pub fn level(&self) -> i32 {
        self.level
    }

    fn skips(metadata: &JsonValue) -> bool {
        metadata
            .get(SKIP_COMPRESSION)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl DocumentCodec for ZstdCodec {
    fn encode(
        &self,
        _key: &str,
        _data: &JsonValue,
        metadata: &JsonValue,
        bytes: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        if Self::skips(metadata) {
            let mut out = Vec::with_capacity(bytes.len() + 1);
            out.push(HEADER_RAW);
            out.extend_from_slice(&bytes);
            return Ok(out);
        }
        let compressed = zstd::encode_all(bytes.as_slice(), self.level).map_err(|e| CodecError::Encode {
            codec: self.codec_id().to_string(),
            reason: e.to_string(),
        })?;
        let mut out = Vec::with_capacity(compressed.len() + 1);
        out.push(HEADER_ZSTD);
        out.extend_from_slice(&compressed);
        Ok(out)
    }

    fn decode(&self, _key: &str, _metadata: &JsonValue, bytes: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        let Some((&header, payload)) = bytes.split_first() else {
            return Err(CodecError::Decode {
                codec: self.codec_id().to_string(),
                reason: "missing header byte".to_string(),
            });
        };
        match header {
            HEADER_RAW => Ok(payload.to_vec()),
            HEADER_ZSTD => zstd::decode_all(payload).map_err(|e| CodecError::Decode {
                codec: self.codec_id().to_string(),
                reason: e.to_string(),
            }),
            other => Err(CodecError::Decode {
                codec: self.codec_id().to_string(),
                reason: format!("unknown header byte {other}"),
            }),
        }
    }

    fn codec_id(&self) -> &str {
        "zstd"
    }
}
