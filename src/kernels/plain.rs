//! This module contains the pure, stateless kernel for the plain values
//! encoding.
//!
//! ### On-Disk Format
//! * Fixed-width types (`Int32`, `Int64`, `Float`, `Double`): the values'
//!   little-endian bytes, tightly packed.
//! * `Boolean`: one byte per value, `0` or `1`.
//! * `ByteArray`: `[len: u32 LE][bytes]` per value.
//!
//! Plain is both the dictionary page payload encoding (the distinct entries
//! are written plain) and the fallback values encoding for non-boolean
//! columns when a dictionary is abandoned.

use crate::error::ColpressError;
use crate::utils::{bytes_to_typed_vec, typed_slice_to_bytes};

/// Encodes a slice of fixed-width primitive values.
pub fn encode_fixed<T: bytemuck::Pod>(values: &[T], output_buf: &mut Vec<u8>) {
    output_buf.extend_from_slice(&typed_slice_to_bytes(values));
}

/// Decodes `num_values` fixed-width primitive values.
pub fn decode_fixed<T: bytemuck::Pod>(
    input_bytes: &[u8],
    num_values: usize,
) -> Result<Vec<T>, ColpressError> {
    let element_size = std::mem::size_of::<T>();
    let expected = num_values * element_size;
    let bytes = input_bytes.get(..expected).ok_or_else(|| {
        ColpressError::EncodingError(format!(
            "Plain decode: expected {} bytes for {} values, got {}",
            expected,
            num_values,
            input_bytes.len()
        ))
    })?;
    bytes_to_typed_vec(bytes)
}

/// Encodes a slice of booleans, one byte per value.
pub fn encode_bools(values: &[bool], output_buf: &mut Vec<u8>) {
    output_buf.extend(values.iter().map(|&b| b as u8));
}

/// Decodes `num_values` booleans.
pub fn decode_bools(input_bytes: &[u8], num_values: usize) -> Result<Vec<bool>, ColpressError> {
    let bytes = input_bytes.get(..num_values).ok_or_else(|| {
        ColpressError::EncodingError(format!(
            "Plain decode: expected {} boolean bytes, got {}",
            num_values,
            input_bytes.len()
        ))
    })?;
    Ok(bytes.iter().map(|&b| b != 0).collect())
}

/// Encodes a slice of byte arrays, each prefixed with its u32 LE length.
pub fn encode_byte_arrays<B: AsRef<[u8]>>(values: &[B], output_buf: &mut Vec<u8>) {
    for value in values {
        let bytes = value.as_ref();
        output_buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        output_buf.extend_from_slice(bytes);
    }
}

/// Decodes `num_values` length-prefixed byte arrays.
pub fn decode_byte_arrays(
    input_bytes: &[u8],
    num_values: usize,
) -> Result<Vec<Vec<u8>>, ColpressError> {
    let mut values = Vec::with_capacity(num_values);
    let mut offset = 0usize;

    for _ in 0..num_values {
        let len_bytes = input_bytes.get(offset..offset + 4).ok_or_else(|| {
            ColpressError::EncodingError(
                "Plain decode: truncated byte-array length prefix".to_string(),
            )
        })?;
        let len = u32::from_le_bytes(len_bytes.try_into().map_err(|_| {
            ColpressError::InternalError("4-byte slice is not 4 bytes".to_string())
        })?) as usize;
        offset += 4;

        let value = input_bytes.get(offset..offset + len).ok_or_else(|| {
            ColpressError::EncodingError("Plain decode: truncated byte-array payload".to_string())
        })?;
        offset += len;
        values.push(value.to_vec());
    }

    Ok(values)
}
