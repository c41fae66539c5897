//! This module provides a small set of shared, low-level utility functions
//! used throughout the crate.
//!
//! Its primary responsibilities include:
//! 1.  Providing safe, validated conversions between raw byte slices and
//!     typed slices.
//! 2.  Keeping all byte-reinterpretation in one audited place.

use crate::error::ColpressError;

/// Safely reinterprets a byte slice as a vector of a primitive type.
///
/// This is the gateway for converting raw bytes from page bodies into
/// workable typed values. Reads are unaligned, so the input may sit at any
/// offset inside a larger page buffer.
///
/// # Errors
/// Returns a `ColpressError::InternalError` if the byte slice length is not
/// perfectly divisible by the size of the target type `T`.
pub fn bytes_to_typed_vec<T: bytemuck::Pod>(bytes: &[u8]) -> Result<Vec<T>, ColpressError> {
    let element_size = std::mem::size_of::<T>();
    if element_size == 0 || bytes.len() % element_size != 0 {
        return Err(ColpressError::InternalError(format!(
            "Byte slice of length {} is not a multiple of element size {}",
            bytes.len(),
            element_size
        )));
    }
    Ok(bytes
        .chunks_exact(element_size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

/// Converts a slice of primitive values into a `Vec<u8>`.
///
/// This performs a memory copy to create a new, owned byte vector.
pub fn typed_slice_to_bytes<T: bytemuck::Pod>(data: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(data).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_typed_vec_success() {
        let original_vec: Vec<i32> = vec![1, -2, 1_000_000];
        let bytes = typed_slice_to_bytes(&original_vec);

        let typed = bytes_to_typed_vec::<i32>(&bytes).unwrap();
        assert_eq!(typed, original_vec);
    }

    #[test]
    fn test_bytes_to_typed_vec_tolerates_unaligned_input() {
        // Prefix one byte so the i32 payload starts at an odd offset.
        let mut bytes = vec![0xAAu8];
        bytes.extend_from_slice(&typed_slice_to_bytes(&[7i32, -9]));

        let typed = bytes_to_typed_vec::<i32>(&bytes[1..]).unwrap();
        assert_eq!(typed, vec![7, -9]);
    }

    #[test]
    fn test_bytes_to_typed_vec_mismatch_error() {
        // 5 bytes is not divisible by size_of::<i32>(4).
        let bytes: Vec<u8> = vec![0, 1, 2, 3, 4];
        let result = bytes_to_typed_vec::<i32>(&bytes);
        assert!(matches!(result, Err(ColpressError::InternalError(_))));
    }
}
