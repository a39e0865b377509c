//! Wire format for valpack
//!
//! This crate owns everything between a Portable Value Tree and bytes on a
//! transport: the flat node encoding, the versioned chunked frame around
//! it, the compression codec registry, and the byte sink/source adapters.
//!
//! It knows nothing about host value graphs; converting those to and from
//! [`Node`] trees is the job of `valpack-graph`.
//!
//! ## Frame anatomy
//!
//! | Part | Contents |
//! |------|----------|
//! | magic + format version | fail-fast compatibility gate |
//! | version strings | producer identity (bytecode-compat tag first) |
//! | codec id | one codec per frame, authoritative on decode |
//! | chunks | independently compressed, CRC32-checked slices |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod frame;
pub mod node;
pub mod transport;

pub use codec::Codec;
pub use error::{TransportError, WireError};
pub use frame::{
    decode_frame, encode_frame, DecodedFrame, DEFAULT_CHUNK_LIMIT, FORMAT_VERSION, FRAME_MAGIC,
};
pub use node::Node;
pub use transport::{BufferSink, ByteSink, ByteSource, ReaderSource, SliceSource, WriterSink};
