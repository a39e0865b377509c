//! Encoding facade
//!
//! [`Encoder`] is the one-stop entry point for turning a host value graph
//! into a framed byte stream. It bundles the choices that vary per use
//! (codec, chunk limit, extension hooks, version identity) behind a
//! builder, then drives the graph serializer and frame encoder in order.

use std::io::Write;

use crate::error::Result;
use valpack_core::{Value, VersionInfo};
use valpack_graph::{HookRegistry, Serializer};
use valpack_wire::{
    encode_frame, BufferSink, Codec, WriterSink, DEFAULT_CHUNK_LIMIT,
};

/// Configurable encoder for host value graphs
#[derive(Clone)]
pub struct Encoder {
    codec: Codec,
    chunk_limit: u64,
    hooks: HookRegistry,
    version: VersionInfo,
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

impl Encoder {
    /// Encoder with no compression, unbounded chunks, empty hook registry,
    /// and the running build's version identity
    pub fn new() -> Self {
        Encoder {
            codec: Codec::None,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            hooks: HookRegistry::new(),
            version: VersionInfo::current(),
        }
    }

    /// Select the compression codec (advisory; `Codec::None` is the default)
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Cap the uncompressed size of each chunk. Zero is rejected at encode
    /// time.
    pub fn with_chunk_limit(mut self, limit: u64) -> Self {
        self.chunk_limit = limit;
        self
    }

    /// Use the given hook registry for values with no native encoding
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override the version identity embedded in frames
    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    /// Encode a value graph into an owned byte buffer
    pub fn to_vec(&self, value: &Value) -> Result<Vec<u8>> {
        let mut sink = BufferSink::new();
        self.encode_into(value, &mut sink)?;
        Ok(sink.finish())
    }

    /// Encode a value graph to a [`Write`] implementor
    pub fn to_writer<W: Write>(&self, value: &Value, writer: W) -> Result<()> {
        let mut sink = WriterSink::new(writer);
        self.encode_into(value, &mut sink)?;
        sink.into_inner().map_err(valpack_wire::WireError::from)?;
        Ok(())
    }

    fn encode_into(&self, value: &Value, sink: &mut impl valpack_wire::ByteSink) -> Result<()> {
        let node = Serializer::new(&self.hooks).serialize(value)?;
        encode_frame(&node, &self.version, self.codec, self.chunk_limit, sink)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let enc = Encoder::new();
        assert_eq!(enc.codec, Codec::None);
        assert_eq!(enc.chunk_limit, DEFAULT_CHUNK_LIMIT);
        assert_eq!(enc.version, VersionInfo::current());
    }

    #[test]
    fn test_to_vec_produces_framed_bytes() {
        let bytes = Encoder::new().to_vec(&Value::Int(1)).unwrap();
        assert_eq!(&bytes[..4], b"VPK\0");
    }

    #[test]
    fn test_zero_chunk_limit_rejected() {
        let err = Encoder::new()
            .with_chunk_limit(0)
            .to_vec(&Value::Nil)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Wire(valpack_wire::WireError::InvalidChunkLimit)
        ));
    }

    #[test]
    fn test_to_writer_matches_to_vec() {
        let value = Value::str("same bytes");
        let enc = Encoder::new();
        let direct = enc.to_vec(&value).unwrap();
        let mut via_writer = Vec::new();
        enc.to_writer(&value, &mut via_writer).unwrap();
        assert_eq!(direct, via_writer);
    }
}
