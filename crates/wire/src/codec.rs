//! Compression codec registry
//!
//! A frame names its codec once in the header and every chunk in the frame
//! uses it. The choice is advisory at encode time (the caller picks) and
//! authoritative at decode time (the header wins). `None` is always
//! available; the real compressors are feature-gated, and a frame naming a
//! codec compiled out of the running build fails before any decompression
//! is attempted.

use crate::error::WireError;

/// Named compression algorithms understood by the wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// No compression; chunks are stored verbatim
    None,
    /// LZ4 block compression (fast, modest ratio)
    Lz4,
    /// Zlib/DEFLATE (slower, broadly compatible)
    Zlib,
    /// Zstandard (good ratio at reasonable speed)
    Zstd,
}

impl Codec {
    /// Wire id carried in the frame header
    pub const fn id(self) -> u8 {
        match self {
            Codec::None => 0,
            Codec::Lz4 => 1,
            Codec::Zlib => 2,
            Codec::Zstd => 3,
        }
    }

    /// Resolve a wire id; unknown ids fail before any payload is touched
    pub fn from_id(id: u8) -> Result<Codec, WireError> {
        match id {
            0 => Ok(Codec::None),
            1 => Ok(Codec::Lz4),
            2 => Ok(Codec::Zlib),
            3 => Ok(Codec::Zstd),
            _ => Err(WireError::UnknownCodec { id }),
        }
    }

    /// Codec name for errors and logging
    pub const fn name(self) -> &'static str {
        match self {
            Codec::None => "none",
            Codec::Lz4 => "lz4",
            Codec::Zlib => "zlib",
            Codec::Zstd => "zstd",
        }
    }

    /// Whether this codec is compiled into the running build
    pub fn available(self) -> bool {
        match self {
            Codec::None => true,
            Codec::Lz4 => cfg!(feature = "lz4"),
            Codec::Zlib => cfg!(feature = "zlib"),
            Codec::Zstd => cfg!(feature = "zstd"),
        }
    }

    /// Fail with [`WireError::CodecUnavailable`] if compiled out
    pub fn ensure_available(self) -> Result<(), WireError> {
        if self.available() {
            Ok(())
        } else {
            Err(WireError::CodecUnavailable { name: self.name() })
        }
    }

    /// Every codec this build knows about, available or not
    pub const fn all() -> &'static [Codec] {
        &[Codec::None, Codec::Lz4, Codec::Zlib, Codec::Zstd]
    }

    /// Compress one chunk
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>, WireError> {
        match self {
            Codec::None => Ok(data.to_vec()),

            #[cfg(feature = "lz4")]
            Codec::Lz4 => Ok(lz4_flex::block::compress(data)),

            #[cfg(feature = "zlib")]
            Codec::Zlib => {
                use std::io::Write;
                let mut encoder =
                    flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(|e| WireError::Compression {
                    codec: self.name(),
                    message: e.to_string(),
                })?;
                encoder.finish().map_err(|e| WireError::Compression {
                    codec: self.name(),
                    message: e.to_string(),
                })
            }

            #[cfg(feature = "zstd")]
            Codec::Zstd => zstd::bulk::compress(data, zstd::DEFAULT_COMPRESSION_LEVEL).map_err(
                |e| WireError::Compression {
                    codec: self.name(),
                    message: e.to_string(),
                },
            ),

            #[allow(unreachable_patterns)]
            _ => Err(WireError::CodecUnavailable { name: self.name() }),
        }
    }

    /// Decompress one chunk whose original size is known from the frame
    pub fn decompress(self, data: &[u8], uncompressed_len: usize) -> Result<Vec<u8>, WireError> {
        match self {
            Codec::None => Ok(data.to_vec()),

            #[cfg(feature = "lz4")]
            Codec::Lz4 => {
                // LZ4 cannot expand input more than 255x, so a claim past
                // that bound is a forged header, not a decompression job.
                if uncompressed_len > data.len().saturating_mul(255).saturating_add(16) {
                    return Err(WireError::Malformed(format!(
                        "lz4 chunk claims {uncompressed_len} bytes from {} compressed",
                        data.len()
                    )));
                }
                lz4_flex::block::decompress(data, uncompressed_len).map_err(|e| {
                    WireError::Decompression {
                        codec: self.name(),
                        message: e.to_string(),
                    }
                })
            }

            #[cfg(feature = "zlib")]
            Codec::Zlib => {
                use std::io::Write;
                // Capacity hint only; the claimed length must not drive the
                // allocation.
                let out = Vec::with_capacity(uncompressed_len.min(64 * 1024));
                let mut decoder = flate2::write::ZlibDecoder::new(out);
                decoder
                    .write_all(data)
                    .map_err(|e| WireError::Decompression {
                        codec: self.name(),
                        message: e.to_string(),
                    })?;
                decoder.finish().map_err(|e| WireError::Decompression {
                    codec: self.name(),
                    message: e.to_string(),
                })
            }

            #[cfg(feature = "zstd")]
            Codec::Zstd => {
                use std::io::Read;
                // Streaming decode grows the buffer with the bytes actually
                // produced instead of pre-allocating by the claimed length;
                // the cap at one extra byte lets the caller's exact-length
                // check catch an oversized payload.
                let mut decoder =
                    zstd::stream::read::Decoder::new(data).map_err(|e| {
                        WireError::Decompression {
                            codec: self.name(),
                            message: e.to_string(),
                        }
                    })?;
                let mut out = Vec::new();
                decoder
                    .take((uncompressed_len as u64).saturating_add(1))
                    .read_to_end(&mut out)
                    .map_err(|e| WireError::Decompression {
                        codec: self.name(),
                        message: e.to_string(),
                    })?;
                Ok(out)
            }

            #[allow(unreachable_patterns)]
            _ => Err(WireError::CodecUnavailable { name: self.name() }),
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::None
    }
}
