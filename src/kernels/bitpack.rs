//! This module contains the pure, stateless kernel for fixed-width
//! bit-packing and unpacking of dictionary ids.
//!
//! Dictionary-encoded data pages carry `u32` ids into a dictionary of N
//! entries, so every id fits in `ceil(log2(N))` bits. Packing the ids at
//! that width eliminates all padding bits. The bit width travels with the
//! page payload, so the unpacker never has to rediscover it.

use bitvec::prelude::*;

use crate::error::ColpressError;

/// The number of bits required to represent ids into a dictionary of
/// `num_entries` entries. A one-entry (or empty) dictionary still packs at
/// width 1 so runs of id 0 stay representable.
pub fn num_required_bits(num_entries: u32) -> u8 {
    if num_entries <= 1 {
        return 1;
    }
    (32 - (num_entries - 1).leading_zeros()) as u8
}

/// Packs a slice of `u32` ids into a compact bit vector at the given width.
pub fn encode(
    input_slice: &[u32],
    output_buf: &mut Vec<u8>,
    bit_width: u8,
) -> Result<(), ColpressError> {
    output_buf.clear();
    if bit_width == 0 || bit_width > 32 {
        return Err(ColpressError::BitpackEncodeError(0, bit_width));
    }

    let max_val: u64 = (1u64 << bit_width) - 1;
    let mut bit_vec = BitVec::<u8, Lsb0>::with_capacity(input_slice.len() * bit_width as usize);

    for &val in input_slice {
        if u64::from(val) > max_val {
            return Err(ColpressError::BitpackEncodeError(u64::from(val), bit_width));
        }
        bit_vec.extend_from_bitslice(&val.view_bits::<Lsb0>()[..bit_width as usize]);
    }

    output_buf.extend_from_slice(bit_vec.as_raw_slice());
    Ok(())
}

/// Unpacks `num_values` ids from a bit-packed buffer at the given width.
pub fn decode(
    input_bytes: &[u8],
    bit_width: u8,
    num_values: usize,
) -> Result<Vec<u32>, ColpressError> {
    if bit_width == 0 || bit_width > 32 {
        return if num_values == 0 {
            Ok(Vec::new())
        } else {
            Err(ColpressError::BitpackDecodeError)
        };
    }

    let bits = BitSlice::<u8, Lsb0>::from_slice(input_bytes);
    if bits.len() < num_values * bit_width as usize {
        return Err(ColpressError::BitpackDecodeError);
    }

    let mut decoded = Vec::with_capacity(num_values);
    for chunk in bits.chunks(bit_width as usize).take(num_values) {
        let mut container = 0u32;
        for (i, bit) in chunk.iter().by_vals().enumerate() {
            if bit {
                container |= 1 << i;
            }
        }
        decoded.push(container);
    }

    Ok(decoded)
}
