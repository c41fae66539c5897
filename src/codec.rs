//! The compression codec contract consumed by the chunk engine, plus the
//! concrete codecs the crate ships.
//!
//! The engine only ever asks a codec two things: compress a byte slice and
//! name yourself for the column metadata. Codec output is consumed
//! immediately by the framer, so implementations are free to reuse internal
//! scratch space between calls.

use serde::{Deserialize, Serialize};

use crate::error::ColpressError;
use crate::kernels::zstd;

/// Identifies a compression codec in column metadata and the file footer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CodecName {
    Uncompressed,
    Zstd,
}

/// The codec contract: compress bytes, name the codec.
pub trait BytesCompressor: Send + Sync {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, ColpressError>;
    fn codec_name(&self) -> CodecName;
}

/// The identity codec. Bodies pass through unchanged, so compressed and
/// uncompressed page sizes coincide.
#[derive(Debug, Default)]
pub struct Uncompressed;

impl BytesCompressor for Uncompressed {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, ColpressError> {
        Ok(input.to_vec())
    }

    fn codec_name(&self) -> CodecName {
        CodecName::Uncompressed
    }
}

/// Zstandard compression at a fixed level.
#[derive(Debug)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl BytesCompressor for ZstdCompressor {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, ColpressError> {
        let mut output = Vec::new();
        zstd::encode(input, &mut output, self.level)?;
        Ok(output)
    }

    fn codec_name(&self) -> CodecName {
        CodecName::Zstd
    }
}

/// Reader-side inverse of `BytesCompressor::compress`, dispatched on the
/// codec name recorded in the file.
pub fn decompress(codec: CodecName, input: &[u8]) -> Result<Vec<u8>, ColpressError> {
    match codec {
        CodecName::Uncompressed => Ok(input.to_vec()),
        CodecName::Zstd => {
            let mut output = Vec::new();
            zstd::decode(input, &mut output)?;
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_is_identity() {
        let codec = Uncompressed;
        let input = b"page body bytes".to_vec();
        assert_eq!(codec.compress(&input).unwrap(), input);
        assert_eq!(decompress(CodecName::Uncompressed, &input).unwrap(), input);
    }

    #[test]
    fn test_zstd_compress_decompress_roundtrip() {
        let codec = ZstdCompressor::default();
        let input = vec![7u8; 4096];

        let compressed = codec.compress(&input).unwrap();
        assert!(compressed.len() < input.len());

        let restored = decompress(CodecName::Zstd, &compressed).unwrap();
        assert_eq!(restored, input);
    }

    #[test]
    fn test_codec_names() {
        assert_eq!(Uncompressed.codec_name(), CodecName::Uncompressed);
        assert_eq!(ZstdCompressor::new(1).codec_name(), CodecName::Zstd);
    }
}
