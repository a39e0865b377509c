//! Decoding facade
//!
//! [`Decoder`] reverses [`Encoder`](crate::Encoder): it reads one frame
//! from bytes or a reader, decides the bytecode policy by comparing the
//! frame's embedded version identity against its own, and rebuilds the
//! host value graph. The codec named in the frame is authoritative; the
//! decoder has no codec knob.

use std::io::Read;

use crate::error::Result;
use valpack_core::{BytecodePolicy, Value, VersionInfo};
use valpack_graph::{Deserializer, HookRegistry};
use valpack_wire::{decode_frame, ByteSource, ReaderSource, SliceSource};

/// Configurable decoder for framed byte streams
#[derive(Clone)]
pub struct Decoder {
    hooks: HookRegistry,
    version: VersionInfo,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    /// Decoder with an empty hook registry and the running build's
    /// version identity
    pub fn new() -> Self {
        Decoder {
            hooks: HookRegistry::new(),
            version: VersionInfo::current(),
        }
    }

    /// Use the given hook registry for extension nodes
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override the version identity compared against embedded frames
    pub fn with_version(mut self, version: VersionInfo) -> Self {
        self.version = version;
        self
    }

    /// Decode one frame from a byte slice
    pub fn from_slice(&self, data: &[u8]) -> Result<Value> {
        let mut source = SliceSource::new(data);
        self.decode_from(&mut source)
    }

    /// Decode one frame from a [`Read`] implementor
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Value> {
        let mut source = ReaderSource::new(reader);
        self.decode_from(&mut source)
    }

    fn decode_from(&self, source: &mut impl ByteSource) -> Result<Value> {
        let frame = decode_frame(source)?;
        let policy = BytecodePolicy::decide(&frame.version, &self.version);
        let value = Deserializer::new(&self.hooks, policy).deserialize(&frame.node)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use valpack_wire::WireError;

    #[test]
    fn test_round_trip_scalar() {
        let bytes = Encoder::new().to_vec(&Value::Int(-3)).unwrap();
        let value = Decoder::new().from_slice(&bytes).unwrap();
        assert!(value.structural_eq(&Value::Int(-3)));
    }

    #[test]
    fn test_garbage_is_bad_magic() {
        let err = Decoder::new().from_slice(b"nope").unwrap_err();
        assert!(matches!(err, crate::Error::Wire(WireError::BadMagic)));
    }

    #[test]
    fn test_from_reader_matches_from_slice() {
        let bytes = Encoder::new().to_vec(&Value::str("via reader")).unwrap();
        let a = Decoder::new().from_slice(&bytes).unwrap();
        let b = Decoder::new()
            .from_reader(std::io::Cursor::new(bytes))
            .unwrap();
        assert!(a.structural_eq(&b));
    }
}
