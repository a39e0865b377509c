//! Wire-layer error types
//!
//! Failures split into three families: transport errors (I/O on the
//! underlying sink/source), format errors (bad framing or corruption), and
//! codec errors (unknown or unavailable compression). All of them are
//! terminal for the call that hit them; nothing here is retried.

use thiserror::Error;

/// I/O failure on a byte sink or source
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying handle failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream ended before the requested bytes were available
    #[error("unexpected end of stream: {needed} more bytes needed")]
    UnexpectedEof {
        /// Bytes still required when the stream ran dry
        needed: usize,
    },
}

/// All wire-format errors
#[derive(Debug, Error)]
pub enum WireError {
    /// Stream does not start with the frame magic
    #[error("bad magic: not a valpack frame")]
    BadMagic,

    /// Frame was written by a format this build does not understand
    #[error("unsupported format version {found} (this build reads {supported})")]
    UnsupportedFormatVersion {
        /// Version tag found in the header
        found: u16,
        /// Version this build supports
        supported: u16,
    },

    /// Frame ended mid-structure
    #[error("truncated frame while reading {context}")]
    Truncated {
        /// What was being read when the stream ran out
        context: &'static str,
    },

    /// Structurally invalid frame contents
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Chunk limit of zero bytes can never make progress
    #[error("invalid chunk limit: must be at least 1 byte")]
    InvalidChunkLimit,

    /// Stored chunk checksum does not match the payload
    #[error("chunk {index} checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Zero-based chunk index
        index: u64,
        /// Checksum recorded in the frame
        expected: u32,
        /// Checksum computed over the received bytes
        actual: u32,
    },

    /// Codec id not known to any build of this crate
    #[error("unknown codec id {id}")]
    UnknownCodec {
        /// The offending id byte
        id: u8,
    },

    /// Codec known but compiled out of this build
    #[error("codec {name} is not available in this build")]
    CodecUnavailable {
        /// Codec name
        name: &'static str,
    },

    /// Compression failed
    #[error("{codec} compression failed: {message}")]
    Compression {
        /// Codec name
        codec: &'static str,
        /// Underlying failure
        message: String,
    },

    /// Decompression failed
    #[error("{codec} decompression failed: {message}")]
    Decompression {
        /// Codec name
        codec: &'static str,
        /// Underlying failure
        message: String,
    },

    /// Transport failure while reading or writing the frame
    #[error(transparent)]
    Transport(#[from] TransportError),
}
