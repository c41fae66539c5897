//! This module contains the pure, stateless kernel for Run-Length Encoding
//! (RLE) and decoding.
//!
//! It is highly effective for data with low cardinality or long, contiguous
//! runs of identical values, which is exactly the shape of repetition and
//! definition level streams and of boolean value streams. The on-disk format
//! is a sequence of `(value, run_length)` pairs, where the `run_length` is
//! itself LEB128-encoded for space efficiency.

use num_traits::PrimInt;
use std::io::Cursor;

use super::leb128;
use crate::error::ColpressError;

/// The public-facing, generic encode function for this module.
pub fn encode<T>(input_slice: &[T], output_buf: &mut Vec<u8>) -> Result<(), ColpressError>
where
    T: PrimInt + PartialEq + bytemuck::Pod,
{
    output_buf.clear();

    if input_slice.is_empty() {
        return Ok(());
    }

    let mut current_val = input_slice[0];
    let mut run_count: u64 = 1;

    for &val in &input_slice[1..] {
        if val == current_val {
            run_count += 1;
        } else {
            output_buf.extend_from_slice(bytemuck::bytes_of(&current_val));
            leb128::encode_one(run_count, output_buf);
            current_val = val;
            run_count = 1;
        }
    }

    output_buf.extend_from_slice(bytemuck::bytes_of(&current_val));
    leb128::encode_one(run_count, output_buf);

    Ok(())
}

/// The public-facing, generic decode function for this module.
///
/// Decodes exactly `num_values` values; a stream that produces more or fewer
/// is rejected as corrupt.
pub fn decode<T>(input_bytes: &[u8], num_values: usize) -> Result<Vec<T>, ColpressError>
where
    T: PrimInt + bytemuck::Pod,
{
    let mut output = Vec::with_capacity(num_values);

    let element_size = std::mem::size_of::<T>();
    let mut cursor = Cursor::new(input_bytes);

    while (cursor.position() as usize) < input_bytes.len() {
        let start = cursor.position() as usize;
        let end = start + element_size;
        let value_bytes = input_bytes.get(start..end).ok_or_else(|| {
            ColpressError::RleDecodeError("Truncated buffer: cannot read value".to_string())
        })?;
        let value: T = bytemuck::pod_read_unaligned(value_bytes);

        cursor.set_position(end as u64);
        let run_length = leb128::decode_one(&mut cursor)?;

        for _ in 0..run_length {
            output.push(value);
        }
        if output.len() > num_values {
            break;
        }
    }

    if output.len() != num_values {
        return Err(ColpressError::RleDecodeError(format!(
            "Decoded to {} values, but expected {}",
            output.len(),
            num_values
        )));
    }

    Ok(output)
}
