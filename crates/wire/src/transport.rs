//! Transport adapters
//!
//! A frame travels over exactly one of two capability-equivalent transports:
//! an in-memory buffer or a caller-supplied byte-stream handle. Both sides
//! reduce to a single-method contract ([`ByteSink`] / [`ByteSource`]); the
//! frame codec never sees anything richer. Ownership of a handle stays with
//! the caller, including closing it.

use crate::error::TransportError;
use std::io::{Read, Write};

/// Destination for encoded frame bytes
pub trait ByteSink {
    /// Write the whole buffer or fail; partial writes are never silent
    fn write_bytes(&mut self, buf: &[u8]) -> Result<(), TransportError>;
}

/// Source of encoded frame bytes
pub trait ByteSource {
    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// Short reads are allowed; `Ok(0)` means end of stream.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Fill `buf` completely, failing with [`TransportError::UnexpectedEof`]
    /// if the stream ends first.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_bytes(&mut buf[filled..])?;
            if n == 0 {
                return Err(TransportError::UnexpectedEof {
                    needed: buf.len() - filled,
                });
            }
            filled += n;
        }
        Ok(())
    }
}

/// Growable in-memory sink
///
/// Accumulates the encoded frame; [`BufferSink::finish`] hands the bytes
/// back to the caller.
#[derive(Debug, Default)]
pub struct BufferSink {
    bytes: Vec<u8>,
}

impl BufferSink {
    /// Create an empty sink
    pub fn new() -> Self {
        BufferSink::default()
    }

    /// Consume the sink and return the accumulated bytes
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

impl ByteSink for BufferSink {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.bytes.extend_from_slice(buf);
        Ok(())
    }
}

/// In-memory source over a borrowed byte slice
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Read from the given slice, starting at the beginning
    pub fn new(data: &'a [u8]) -> Self {
        SliceSource { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Sink over a caller-supplied, already-open writable handle
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap an open handle; the caller keeps ownership semantics via
    /// [`WriterSink::into_inner`] and is responsible for closing
    pub fn new(inner: W) -> Self {
        WriterSink { inner }
    }

    /// Flush and return the underlying handle
    pub fn into_inner(mut self) -> Result<W, TransportError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> ByteSink for WriterSink<W> {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.inner.write_all(buf)?;
        Ok(())
    }
}

/// Source over a caller-supplied, already-open readable handle
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    /// Wrap an open handle; the caller is responsible for closing it
    pub fn new(inner: R) -> Self {
        ReaderSource { inner }
    }

    /// Return the underlying handle
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};

    #[test]
    fn test_buffer_sink_accumulates() {
        let mut sink = BufferSink::new();
        sink.write_bytes(b"hello ").unwrap();
        sink.write_bytes(b"world").unwrap();
        assert_eq!(sink.finish(), b"hello world");
    }

    #[test]
    fn test_slice_source_short_reads() {
        let data = [1u8, 2, 3, 4, 5];
        let mut src = SliceSource::new(&data);

        let mut buf = [0u8; 3];
        assert_eq!(src.read_bytes(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);

        assert_eq!(src.read_bytes(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[4, 5]);

        // End of stream is exactly zero bytes
        assert_eq!(src.read_bytes(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_exact_fills_across_short_reads() {
        let data = [9u8; 10];
        let mut src = SliceSource::new(&data);
        let mut buf = [0u8; 10];
        src.read_exact(&mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn test_read_exact_reports_eof() {
        let data = [1u8, 2];
        let mut src = SliceSource::new(&data);
        let mut buf = [0u8; 4];
        let err = src.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, TransportError::UnexpectedEof { needed: 2 }));
    }

    #[test]
    fn test_file_handle_round_trip() {
        let mut file = tempfile::tempfile().unwrap();

        {
            let mut sink = WriterSink::new(&mut file);
            sink.write_bytes(b"framed bytes").unwrap();
            sink.into_inner().unwrap();
        }

        file.seek(SeekFrom::Start(0)).unwrap();

        let mut src = ReaderSource::new(&mut file);
        let mut buf = [0u8; 12];
        src.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"framed bytes");
        assert_eq!(src.read_bytes(&mut [0u8; 1]).unwrap(), 0);
    }

    #[test]
    fn test_writer_sink_propagates_io_error() {
        // A "device" that rejects every write
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = WriterSink::new(Full);
        let err = sink.write_bytes(b"x").unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
