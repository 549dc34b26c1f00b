//! Document codec abstraction.
//!
//! Every data column passes through the configured codec pipeline between
//! serialization and storage. Metadata columns are never encoded.
//!
//! # Usage
//!
//! ```ignore
//! use docstore_storage::codec::CodecPipeline;
//!
//! let pipeline = CodecPipeline::from_ids(&["checksum", "zstd"], 3)?;
//! let stored = pipeline.encode(key, &data, &metadata, bytes)?;
//! let bytes = pipeline.decode(key, &metadata, stored)?;
//! ```

mod checksum;
mod compression;
mod identity;
mod pipeline;
mod traits;

pub use checksum::ChecksumCodec;
pub use compression::{ZstdCodec, DEFAULT_COMPRESSION_LEVEL, SKIP_COMPRESSION};
pub use identity::IdentityCodec;
pub use pipeline::CodecPipeline;
pub use traits::{CodecError, DocumentCodec};

/// Get a codec by its identifier.
///
/// # Known Codecs
///
/// - `"identity"`: No-op codec (pass-through)
/// - `"zstd"`: Zstandard compression at `compression_level`
/// - `"checksum"`: CRC32 checksum trailer
pub fn get_codec(codec_id: &str, compression_level: i32) -> Result<Box<dyn DocumentCodec>, CodecError> {
    match codec_id {
        "identity" => Ok(Box::new(IdentityCodec)),
        "zstd" => Ok(Box::new(ZstdCodec::new(compression_level))),
        "checksum" => Ok(Box::new(ChecksumCodec)),
        _ => Err(CodecError::UnknownCodec(codec_id.to_string())),
    }
}
