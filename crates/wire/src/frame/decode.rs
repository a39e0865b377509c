//! Frame decoder
//!
//! The mirror of the encoder: validate the header fail-fast, reassemble the
//! decompressed chunk payloads into one logical byte sequence, then parse
//! the Portable Value Tree out of it. A frame that fails any step produces
//! an error and no partial result.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::codec::Codec;
use crate::error::{TransportError, WireError};
use crate::frame::{tag, FORMAT_VERSION, FRAME_MAGIC, MAX_NODE_DEPTH, MAX_VERSION_STRING_LEN};
use crate::node::Node;
use crate::transport::ByteSource;
use tracing::debug;
use valpack_core::VersionInfo;

/// A fully decoded frame: the value tree plus the producer's identity
#[derive(Debug)]
pub struct DecodedFrame {
    /// Root of the Portable Value Tree
    pub node: Node,
    /// Version info embedded by the producer
    pub version: VersionInfo,
}

/// Decode one frame from `source`.
pub fn decode_frame(source: &mut impl ByteSource) -> Result<DecodedFrame, WireError> {
    let mut magic = [0u8; 4];
    fill(source, &mut magic, "magic")?;
    if magic != FRAME_MAGIC {
        return Err(WireError::BadMagic);
    }

    let format = read_u16(source, "format version")?;
    if format != FORMAT_VERSION {
        return Err(WireError::UnsupportedFormatVersion {
            found: format,
            supported: FORMAT_VERSION,
        });
    }

    let bytecode = read_version_string(source, "bytecode version")?;
    let interpreter = read_version_string(source, "interpreter version")?;

    let codec = Codec::from_id(read_u8(source, "codec id")?)?;
    // Authoritative: the header names the codec, and it must be linked in
    // before any decompression is attempted.
    codec.ensure_available()?;

    let chunk_count = read_u64(source, "chunk count")?;

    let mut payload = Vec::new();
    for index in 0..chunk_count {
        let uncompressed_len = read_u64(source, "chunk uncompressed length")?;
        let compressed_len = read_u64(source, "chunk compressed length")?;
        let stored_crc = read_u32(source, "chunk checksum")?;

        let compressed_len = usize::try_from(compressed_len)
            .map_err(|_| WireError::Malformed(format!("chunk {index}: compressed length overflow")))?;
        let uncompressed_len = usize::try_from(uncompressed_len).map_err(|_| {
            WireError::Malformed(format!("chunk {index}: uncompressed length overflow"))
        })?;

        let compressed = read_claimed(source, compressed_len, "chunk payload")?;

        let actual_crc = crc32fast::hash(&compressed);
        if actual_crc != stored_crc {
            return Err(WireError::ChecksumMismatch {
                index,
                expected: stored_crc,
                actual: actual_crc,
            });
        }

        let plain = codec.decompress(&compressed, uncompressed_len)?;
        if plain.len() != uncompressed_len {
            return Err(WireError::Malformed(format!(
                "chunk {index}: expected {uncompressed_len} uncompressed bytes, got {}",
                plain.len()
            )));
        }
        payload.extend_from_slice(&plain);
    }

    let node = node_from_bytes(&payload)?;
    debug!(
        codec = codec.name(),
        chunks = chunk_count,
        payload_bytes = payload.len(),
        "decoded frame"
    );

    Ok(DecodedFrame {
        node,
        version: VersionInfo::new(interpreter, bytecode),
    })
}

/// Parse a node tree out of a flat byte sequence
pub(crate) fn node_from_bytes(bytes: &[u8]) -> Result<Node, WireError> {
    let mut cursor = bytes;
    let node = read_node(&mut cursor, 0)?;
    if !cursor.is_empty() {
        return Err(WireError::Malformed(format!(
            "{} trailing bytes after value",
            cursor.len()
        )));
    }
    Ok(node)
}

fn read_node(r: &mut &[u8], depth: usize) -> Result<Node, WireError> {
    if depth > MAX_NODE_DEPTH {
        return Err(WireError::Malformed("value nesting too deep".into()));
    }

    let tag_byte = r.read_u8().map_err(|_| truncated("node tag"))?;
    match tag_byte {
        tag::NIL => Ok(Node::Nil),
        tag::BOOL => match r.read_u8().map_err(|_| truncated("bool"))? {
            0 => Ok(Node::Bool(false)),
            1 => Ok(Node::Bool(true)),
            other => Err(WireError::Malformed(format!("invalid bool byte {other}"))),
        },
        tag::INT => Ok(Node::Int(
            r.read_i64::<LittleEndian>().map_err(|_| truncated("int"))?,
        )),
        tag::FLOAT => Ok(Node::Float(
            r.read_f64::<LittleEndian>()
                .map_err(|_| truncated("float"))?,
        )),
        tag::STR => Ok(Node::Str(read_bytes_field(r, "string")?)),
        tag::TABLE => {
            let array_len = read_len(r, "table array length")?;
            let mut array = Vec::with_capacity(array_len.min(1024));
            for _ in 0..array_len {
                array.push(read_node(r, depth + 1)?);
            }
            let hash_len = read_len(r, "table hash length")?;
            let mut hash = Vec::with_capacity(hash_len.min(1024));
            for _ in 0..hash_len {
                let key = read_node(r, depth + 1)?;
                let value = read_node(r, depth + 1)?;
                hash.push((key, value));
            }
            Ok(Node::Table { array, hash })
        }
        tag::FUNCTION => {
            let bytecode = read_bytes_field(r, "function bytecode")?;
            let name = read_str_field(r, "function name")?;
            let source = read_str_field(r, "function source")?;
            let line = r
                .read_u32::<LittleEndian>()
                .map_err(|_| truncated("function line"))?;
            Ok(Node::Function {
                bytecode,
                name,
                source,
                line,
            })
        }
        tag::EXTENSION => {
            let ext_tag = read_str_field(r, "extension tag")?;
            let payload = read_bytes_field(r, "extension payload")?;
            Ok(Node::Extension {
                tag: ext_tag,
                payload,
            })
        }
        tag::REF => Ok(Node::Ref(
            r.read_u32::<LittleEndian>()
                .map_err(|_| truncated("back-reference"))?,
        )),
        other => Err(WireError::Malformed(format!(
            "unknown node tag {other:#04x}"
        ))),
    }
}

fn read_len(r: &mut &[u8], context: &'static str) -> Result<usize, WireError> {
    let len = r.read_u32::<LittleEndian>().map_err(|_| truncated(context))?;
    Ok(len as usize)
}

fn read_bytes_field(r: &mut &[u8], context: &'static str) -> Result<Vec<u8>, WireError> {
    let len = read_len(r, context)?;
    if r.len() < len {
        return Err(truncated(context));
    }
    let (head, tail) = r.split_at(len);
    let bytes = head.to_vec();
    *r = tail;
    Ok(bytes)
}

fn read_str_field(r: &mut &[u8], context: &'static str) -> Result<String, WireError> {
    let bytes = read_bytes_field(r, context)?;
    String::from_utf8(bytes)
        .map_err(|_| WireError::Malformed(format!("invalid UTF-8 in {context}")))
}

fn truncated(context: &'static str) -> WireError {
    WireError::Truncated { context }
}

/// Step size for reads whose length comes from an untrusted header field
const CLAIMED_READ_STEP: usize = 64 * 1024;

// Chunk headers are untrusted, so a claimed length must never drive an
// upfront allocation. The buffer grows only as bytes actually arrive; a
// forged multi-gigabyte claim runs out of stream and fails as truncation.
fn read_claimed(
    source: &mut impl ByteSource,
    len: usize,
    context: &'static str,
) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(len.min(CLAIMED_READ_STEP));
    while buf.len() < len {
        let step = (len - buf.len()).min(CLAIMED_READ_STEP);
        let start = buf.len();
        buf.resize(start + step, 0);
        fill(source, &mut buf[start..], context)?;
    }
    Ok(buf)
}

// Header fields come straight off the transport, so end-of-stream here is a
// framing error while a genuine I/O failure stays a transport error.
fn fill(
    source: &mut impl ByteSource,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), WireError> {
    match source.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(TransportError::UnexpectedEof { .. }) => Err(WireError::Truncated { context }),
        Err(e) => Err(WireError::Transport(e)),
    }
}

fn read_u8(source: &mut impl ByteSource, context: &'static str) -> Result<u8, WireError> {
    let mut buf = [0u8; 1];
    fill(source, &mut buf, context)?;
    Ok(buf[0])
}

fn read_u16(source: &mut impl ByteSource, context: &'static str) -> Result<u16, WireError> {
    let mut buf = [0u8; 2];
    fill(source, &mut buf, context)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(source: &mut impl ByteSource, context: &'static str) -> Result<u32, WireError> {
    let mut buf = [0u8; 4];
    fill(source, &mut buf, context)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(source: &mut impl ByteSource, context: &'static str) -> Result<u64, WireError> {
    let mut buf = [0u8; 8];
    fill(source, &mut buf, context)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_version_string(
    source: &mut impl ByteSource,
    context: &'static str,
) -> Result<String, WireError> {
    let len = read_u32(source, context)?;
    if len > MAX_VERSION_STRING_LEN {
        return Err(WireError::Malformed(format!(
            "{context} length {len} exceeds limit"
        )));
    }
    let mut buf = vec![0u8; len as usize];
    fill(source, &mut buf, context)?;
    String::from_utf8(buf)
        .map_err(|_| WireError::Malformed(format!("invalid UTF-8 in {context}")))
}
