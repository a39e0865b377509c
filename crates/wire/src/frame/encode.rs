//! Frame encoder
//!
//! Serializes a Portable Value Tree to its flat byte form, chunks it,
//! compresses each chunk, and writes the framed stream to a sink.

use crate::codec::Codec;
use crate::error::WireError;
use crate::frame::{tag, FRAME_MAGIC, FORMAT_VERSION};
use crate::node::Node;
use crate::transport::ByteSink;
use tracing::debug;
use valpack_core::VersionInfo;

/// Encode one frame to `sink`.
///
/// `chunk_limit` bounds the uncompressed size of each chunk; pass
/// [`crate::frame::DEFAULT_CHUNK_LIMIT`] for a single chunk. The codec is
/// validated up front so an unavailable codec fails at selection time, not
/// after half a frame has been written.
pub fn encode_frame(
    node: &Node,
    version: &VersionInfo,
    codec: Codec,
    chunk_limit: u64,
    sink: &mut impl ByteSink,
) -> Result<(), WireError> {
    if chunk_limit == 0 {
        return Err(WireError::InvalidChunkLimit);
    }
    codec.ensure_available()?;

    let payload = node_to_bytes(node)?;
    let limit = usize::try_from(chunk_limit).unwrap_or(usize::MAX);
    let chunk_count = payload.chunks(limit).count() as u64;

    let mut header = Vec::with_capacity(64);
    header.extend_from_slice(&FRAME_MAGIC);
    header.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    write_str_field(&mut header, &version.bytecode)?;
    write_str_field(&mut header, &version.interpreter)?;
    header.push(codec.id());
    header.extend_from_slice(&chunk_count.to_le_bytes());
    sink.write_bytes(&header)?;

    let mut compressed_total = 0u64;
    for chunk in payload.chunks(limit) {
        let compressed = codec.compress(chunk)?;
        let crc = crc32fast::hash(&compressed);

        let mut chunk_header = Vec::with_capacity(20);
        chunk_header.extend_from_slice(&(chunk.len() as u64).to_le_bytes());
        chunk_header.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        chunk_header.extend_from_slice(&crc.to_le_bytes());
        sink.write_bytes(&chunk_header)?;
        sink.write_bytes(&compressed)?;

        compressed_total += compressed.len() as u64;
    }

    debug!(
        codec = codec.name(),
        chunks = chunk_count,
        payload_bytes = payload.len(),
        compressed_bytes = compressed_total,
        "encoded frame"
    );
    Ok(())
}

/// Flatten a node tree to its tagged byte encoding
pub(crate) fn node_to_bytes(node: &Node) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::new();
    write_node(&mut buf, node)?;
    Ok(buf)
}

fn write_node(buf: &mut Vec<u8>, node: &Node) -> Result<(), WireError> {
    match node {
        Node::Nil => buf.push(tag::NIL),
        Node::Bool(b) => {
            buf.push(tag::BOOL);
            buf.push(*b as u8);
        }
        Node::Int(i) => {
            buf.push(tag::INT);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Node::Float(f) => {
            buf.push(tag::FLOAT);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Node::Str(s) => {
            buf.push(tag::STR);
            write_bytes_field(buf, s)?;
        }
        Node::Table { array, hash } => {
            buf.push(tag::TABLE);
            write_len(buf, array.len())?;
            for entry in array {
                write_node(buf, entry)?;
            }
            write_len(buf, hash.len())?;
            for (key, value) in hash {
                write_node(buf, key)?;
                write_node(buf, value)?;
            }
        }
        Node::Function {
            bytecode,
            name,
            source,
            line,
        } => {
            buf.push(tag::FUNCTION);
            write_bytes_field(buf, bytecode)?;
            write_str_field(buf, name)?;
            write_str_field(buf, source)?;
            buf.extend_from_slice(&line.to_le_bytes());
        }
        Node::Extension { tag: ext_tag, payload } => {
            buf.push(tag::EXTENSION);
            write_str_field(buf, ext_tag)?;
            write_bytes_field(buf, payload)?;
        }
        Node::Ref(index) => {
            buf.push(tag::REF);
            buf.extend_from_slice(&index.to_le_bytes());
        }
    }
    Ok(())
}

fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<(), WireError> {
    let len = u32::try_from(len)
        .map_err(|_| WireError::Malformed(format!("length {len} exceeds u32 field")))?;
    buf.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_bytes_field(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), WireError> {
    write_len(buf, bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn write_str_field(buf: &mut Vec<u8>, s: &str) -> Result<(), WireError> {
    write_bytes_field(buf, s.as_bytes())
}
