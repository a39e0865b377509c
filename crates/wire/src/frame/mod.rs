//! Frame encoding and decoding
//!
//! A frame is one complete encoded value graph. Its layout, all integers
//! little-endian:
//!
//! ```text
//! magic              [4]  b"VPK\0"
//! format_version     u16
//! bytecode_version   u32 length + bytes   (bytecode-compat tag)
//! interp_version     u32 length + bytes
//! codec_id           u8
//! chunk_count        u64
//! per chunk:
//!   uncompressed_len u64
//!   compressed_len   u64
//!   crc32            u32  (over the compressed bytes)
//!   compressed bytes
//! ```
//!
//! The serialized Portable Value Tree is split into chunks of at most the
//! caller's chunk limit and each chunk is compressed independently with the
//! frame codec. Chunk boundaries carry no meaning; the decoder reassembles
//! the logical byte sequence before parsing it. Header validation is
//! fail-fast: an unrecognized format version or codec id rejects the frame
//! before any chunk data is read.

mod decode;
mod encode;

pub use decode::{decode_frame, DecodedFrame};
pub use encode::encode_frame;

/// Leading bytes of every frame
pub const FRAME_MAGIC: [u8; 4] = *b"VPK\0";

/// Frame format revision this build reads and writes
pub const FORMAT_VERSION: u16 = 1;

/// Default chunk limit: effectively unbounded, one chunk per frame
pub const DEFAULT_CHUNK_LIMIT: u64 = u64::MAX;

/// Upper bound on embedded version strings; anything longer is corruption
pub(crate) const MAX_VERSION_STRING_LEN: u32 = 4096;

/// Recursion guard for node parsing
pub(crate) const MAX_NODE_DEPTH: usize = 1024;

/// Node tag bytes of the flat Portable Value Tree encoding
pub(crate) mod tag {
    pub const NIL: u8 = 0x00;
    pub const BOOL: u8 = 0x01;
    pub const INT: u8 = 0x02;
    pub const FLOAT: u8 = 0x03;
    pub const STR: u8 = 0x04;
    pub const TABLE: u8 = 0x05;
    pub const FUNCTION: u8 = 0x06;
    pub const EXTENSION: u8 = 0x07;
    pub const REF: u8 = 0x08;
}
