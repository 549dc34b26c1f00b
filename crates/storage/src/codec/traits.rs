//! Document codec trait definitions.

use serde_json::Value as JsonValue;

/// Document codec trait.
///
/// Every data column passes through the configured codecs on its way to and
/// from storage. A codec sees the document key and metadata so it can make
/// per-document decisions (for example, skipping compression).
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync` to allow concurrent encoding/decoding
/// from multiple threads.
pub trait DocumentCodec: Send + Sync {
    /// Encode a serialized data column for storage.
    ///
    /// `data` is the logical value the bytes were serialized from.
    fn encode(
        &self,
        key: &str,
        data: &JsonValue,
        metadata: &JsonValue,
        bytes: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decode stored bytes.
    ///
    /// Reverses `encode`. Returns an error if the bytes are corrupt.
    fn decode(&self, key: &str, metadata: &JsonValue, bytes: Vec<u8>) -> Result<Vec<u8>, CodecError>;

    /// Unique codec identifier, as used in configuration.
    fn codec_id(&self) -> &str;
}

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Encoding failed.
    #[error("{codec} encode error: {reason}")]
    Encode {
        /// Codec that failed
        codec: String,
        /// Failure detail
        reason: String,
    },

    /// Decoding failed (truncated or invalid format).
    #[error("{codec} decode error: {reason}")]
    Decode {
        /// Codec that failed
        codec: String,
        /// Failure detail
        reason: String,
    },

    /// Stored checksum does not match the data.
    #[error("Checksum mismatch for '{key}': stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Document key
        key: String,
        /// Checksum read from storage
        expected: u32,
        /// Checksum computed over the stored data
        actual: u32,
    },

    /// Unknown codec identifier.
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),
}

impl From<CodecError> for docstore_core::DocumentError {
    fn from(e: CodecError) -> Self {
        docstore_core::DocumentError::Codec(e.to_string())
    }
}
