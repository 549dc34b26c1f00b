//! Ordered codec pipeline.
//!
//! The first codec in the list sits closest to the stored bytes: encode runs
//! the list back to front, decode runs it front to back. An empty pipeline
//! stores the serialized column unchanged.

use std::fmt;
use std::sync::Arc;

use super::traits::{CodecError, DocumentCodec};
use super::get_codec;
use serde_json::Value as JsonValue;

/// Ordered list of document codecs
#[derive(Clone, Default)]
pub struct CodecPipeline {
    codecs: Vec<Arc<dyn DocumentCodec>>,
}

impl CodecPipeline {
    /// Empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from codec identifiers, in configuration order
    pub fn from_ids<S: AsRef<str>>(ids: &[S], compression_level: i32) -> Result<Self, CodecError> {
        let codecs = ids
            .iter()
            .map(|id| get_codec(id.as_ref(), compression_level).map(Arc::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { codecs })
    }

    /// Append a codec to the end of the list
    pub fn with(mut self, codec: impl DocumentCodec + 'static) -> Self {
        self.codecs.push(Arc::new(codec));
        self
    }

    /// Identifiers in configuration order
    pub fn codec_ids(&self) -> Vec<&str> {
        self.codecs.iter().map(|c| c.codec_id()).collect()
    }

    /// Number of codecs
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// True if no codecs are configured
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Run every codec's encode, last codec first
    pub fn encode(
        &self,
        key: &str,
        data: &JsonValue,
        metadata: &JsonValue,
        bytes: Vec<u8>,
    ) -> Result<Vec<u8>, CodecError> {
        self.codecs
            .iter()
            .rev()
            .try_fold(bytes, |acc, codec| codec.encode(key, data, metadata, acc))
    }

    /// Run every codec's decode, first codec first
    pub fn decode(&self, key: &str, metadata: &JsonValue, bytes: Vec<u8>) -> Result<Vec<u8>, CodecError> {
        self.codecs
            .iter()
            .try_fold(bytes, |acc, codec| codec.decode(key, metadata, acc))
    }
}

impl fmt::Debug for CodecPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecPipeline")
            .field("codecs", &self.codec_ids())
            .finish()
    }
}
