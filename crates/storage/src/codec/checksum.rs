//! CRC32 checksum codec.
//!
//! Appends a little-endian CRC32 of the payload; decode verifies and strips it.

use super::traits::{CodecError, DocumentCodec};
use byteorder::{ByteOrder, LittleEndian};
use serde_json::Value as JsonValue;
use tracing::warn;

const TRAILER_LEN: usize = 4;

/// Checksum codec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecksumCodec;

impl DocumentCodec for ChecksumCodec {
    fn encode(
        &self,
        _key: &str,
        _data: &JsonValue,
        _metadata: &JsonValue,
        mut bytes: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        let mut trailer = [0u8; TRAILER_LEN];
        LittleEndian::write_u32(&mut trailer, crc32fast::hash(&bytes));
        bytes.extend_from_slice(&trailer);
        Ok(bytes)
    }

    fn decode(&self, key: &str, _metadata: &JsonValue, mut bytes: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        if bytes.len() < TRAILER_LEN {
            return Err(CodecError::Decode {
                codec: self.codec_id().to_string(),
                reason: format!("{} bytes is shorter than the checksum trailer", bytes.len()),
            });
        }
        let split = bytes.len() - TRAILER_LEN;
        let expected = LittleEndian::read_u32(&bytes[split..]);
        bytes.truncate(split);
        let actual = crc32fast::hash(&bytes);
        if expected != actual {
            warn!(key = %key, expected, actual, "document checksum mismatch");
            return Err(CodecError::ChecksumMismatch {
                key: key.to_string(),
                expected,
                actual,
            });
        }
        Ok(bytes)
    }

    fn codec_id(&self) -> &str {
        "checksum"
    }
}
