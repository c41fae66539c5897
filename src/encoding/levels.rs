//! Repetition/definition level streams.
//!
//! Levels are small unsigned integers encoded with the RLE kernel. V1 page
//! bodies carry each present level stream as a length-prefixed section ahead
//! of the values (`[byte-len: u32 LE][RLE bytes]`); a stream is present iff
//! the column's maximum level for that axis is non-zero. V2 pages carry the
//! raw RLE bytes outside the values body, with lengths recorded in the page
//! header instead.

use crate::error::ColpressError;
use crate::kernels::rle;
use crate::schema::ColumnDescriptor;

/// Encodes a level stream with the RLE kernel (no section framing).
pub fn encode_levels(levels: &[u16]) -> Result<Vec<u8>, ColpressError> {
    let mut out = Vec::new();
    rle::encode(levels, &mut out)?;
    Ok(out)
}

/// Decodes a level stream of exactly `num_values` levels.
pub fn decode_levels(bytes: &[u8], num_values: usize) -> Result<Vec<u16>, ColpressError> {
    rle::decode(bytes, num_values)
}

/// Encodes a level stream as a v1 body section: `[byte-len: u32][RLE bytes]`.
pub fn encode_level_section(levels: &[u16]) -> Result<Vec<u8>, ColpressError> {
    let encoded = encode_levels(levels)?;
    let mut section = Vec::with_capacity(4 + encoded.len());
    section.extend_from_slice(&(encoded.len() as u32).to_le_bytes());
    section.extend_from_slice(&encoded);
    Ok(section)
}

fn read_section(bytes: &[u8], offset: usize) -> Result<(&[u8], usize), ColpressError> {
    let len_bytes = bytes.get(offset..offset + 4).ok_or_else(|| {
        ColpressError::EncodingError("Truncated level section length prefix".to_string())
    })?;
    let len = u32::from_le_bytes(len_bytes.try_into().map_err(|_| {
        ColpressError::InternalError("4-byte slice is not 4 bytes".to_string())
    })?) as usize;

    let start = offset + 4;
    let payload = bytes.get(start..start + len).ok_or_else(|| {
        ColpressError::EncodingError("Truncated level section payload".to_string())
    })?;
    Ok((payload, start + len))
}

/// A v1 page body split into its level sections and values region.
#[derive(Debug)]
pub struct V1Body<'a> {
    pub rep_levels: Option<&'a [u8]>,
    pub def_levels: Option<&'a [u8]>,
    /// Byte offset at which the values region begins.
    pub data_offset: usize,
}

/// Splits an uncompressed v1 page body into level sections and values.
///
/// The descriptor decides which sections exist: a section is present iff
/// the corresponding maximum level is non-zero.
pub fn split_v1_body<'a>(
    body: &'a [u8],
    descriptor: &ColumnDescriptor,
) -> Result<V1Body<'a>, ColpressError> {
    let mut offset = 0usize;

    let rep_levels = if descriptor.max_rep_level() > 0 {
        let (payload, next) = read_section(body, offset)?;
        offset = next;
        Some(payload)
    } else {
        None
    };

    let def_levels = if descriptor.max_def_level() > 0 {
        let (payload, next) = read_section(body, offset)?;
        offset = next;
        Some(payload)
    } else {
        None
    };

    Ok(V1Body {
        rep_levels,
        def_levels,
        data_offset: offset,
    })
}

/// Derives the null count of a v1 page from its definition level section.
///
/// A value is null iff its definition level is below the column's maximum;
/// with no definition levels every position holds a value.
pub fn count_def_nulls(
    def_level_bytes: Option<&[u8]>,
    value_count: usize,
    max_def_level: u16,
) -> Result<u64, ColpressError> {
    match def_level_bytes {
        None => Ok(0),
        Some(bytes) => {
            let levels = decode_levels(bytes, value_count)?;
            Ok(levels.iter().filter(|&&l| l < max_def_level).count() as u64)
        }
    }
}
