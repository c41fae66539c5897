//! This module contains the pure, stateless kernels for Zstandard
//! compression and decompression.
//!
//! This is the final transform on every page body before it reaches the
//! file writer. The kernels are safe, panic-free wrappers around the `zstd`
//! crate's streaming API.

use std::io::Write;
use zstd::stream::{Decoder, Encoder};

use crate::error::ColpressError;

/// Compresses a byte slice using the Zstandard algorithm, writing into the
/// output buffer.
pub fn encode(input_bytes: &[u8], output_buf: &mut Vec<u8>, level: i32) -> Result<(), ColpressError> {
    output_buf.clear();
    let mut encoder =
        Encoder::new(output_buf, level).map_err(|e| ColpressError::ZstdError(e.to_string()))?;
    encoder
        .write_all(input_bytes)
        .map_err(|e| ColpressError::ZstdError(e.to_string()))?;

    // `finish` is essential to finalize the Zstd frame.
    encoder
        .finish()
        .map_err(|e| ColpressError::ZstdError(e.to_string()))?;
    Ok(())
}

/// Decompresses a Zstandard-compressed byte slice, writing into the output
/// buffer. The buffer grows as needed.
pub fn decode(input_bytes: &[u8], output_buf: &mut Vec<u8>) -> Result<(), ColpressError> {
    output_buf.clear();
    let mut decoder =
        Decoder::new(input_bytes).map_err(|e| ColpressError::ZstdError(e.to_string()))?;
    std::io::copy(&mut decoder, output_buf)
        .map_err(|e| ColpressError::ZstdError(e.to_string()))?;
    Ok(())
}
