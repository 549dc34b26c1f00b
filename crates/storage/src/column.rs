//! Column serialization
//!
//! JSON values are stored as MessagePack. The data column additionally passes
//! through the codec pipeline; the metadata column does not.

use crate::codec::CodecPipeline;
use docstore_core::{DocumentError, JsonValue, Result};

/// Serialize a JSON value to MessagePack
pub fn serialize_value(value: &JsonValue) -> Result<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| DocumentError::Serialization(e.to_string()))
}

/// Deserialize a JSON value from MessagePack
pub fn deserialize_value(bytes: &[u8]) -> Result<JsonValue> {
    rmp_serde::from_slice(bytes).map_err(|e| DocumentError::Serialization(e.to_string()))
}

/// Serialize and encode a data column
pub fn encode_data_column(
    codecs: &CodecPipeline,
    key: &str,
    data: &JsonValue,
    metadata: &JsonValue,
) -> Result<Vec<u8>> {
    let bytes = serialize_value(data)?;
    Ok(codecs.encode(key, data, metadata, bytes)?)
}

/// Decode and deserialize a stored data column
pub fn decode_data_column(
    codecs: &CodecPipeline,
    key: &str,
    metadata: &JsonValue,
    stored: &[u8],
) -> Result<JsonValue> {
    let bytes = codecs.decode(key, metadata, stored.to_vec())?;
    deserialize_value(&bytes)
}

/// Serialize a metadata column
pub fn encode_metadata_column(metadata: &JsonValue) -> Result<Vec<u8>> {
    serialize_value(metadata)
}

/// Deserialize a stored metadata column
pub fn decode_metadata_column(stored: &[u8]) -> Result<JsonValue> {
    deserialize_value(stored)
}
