//! Dictionary machinery: the in-memory dictionary decoded from a dictionary
//! page, the bit-packed id streams dictionary-encoded data pages carry, and
//! the sorted-permutation construction used when a kept dictionary is
//! reordered for better downstream compression.
//!
//! ### Id stream on-disk format
//! `[bit_width: u8][bit-packed u32 ids]`. The width is derived from the
//! dictionary entry count, so the stream is self-describing given the count
//! of non-null values it encodes.

use std::cmp::Ordering;

use crate::encoding::values::FallbackEncoder;
use crate::error::ColpressError;
use crate::kernels::{bitpack, plain};
use crate::page::DictionaryPage;
use crate::schema::ColumnDescriptor;
use crate::types::{CellValue, PhysicalType};

//==================================================================================
// 1. Dictionary entries
//==================================================================================

/// The decoded entry set of a dictionary page, typed by the column's
/// primitive type. Entry order is id order: ids in data pages index into
/// this sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryEntries {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ByteArray(Vec<Vec<u8>>),
}

fn sort_fixed<T: Copy>(
    values: &[T],
    cmp: impl Fn(&T, &T) -> Ordering,
) -> (Vec<T>, Vec<u32>) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| cmp(&values[a], &values[b]));

    let sorted = order.iter().map(|&old| values[old]).collect();
    let mut id_map = vec![0u32; values.len()];
    for (new_id, &old_id) in order.iter().enumerate() {
        id_map[old_id] = new_id as u32;
    }
    (sorted, id_map)
}

impl DictionaryEntries {
    pub fn len(&self) -> u32 {
        (match self {
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::ByteArray(v) => v.len(),
        }) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes plain-encoded entries for a column's primitive type.
    pub fn from_plain_bytes(
        bytes: &[u8],
        physical_type: PhysicalType,
        num_entries: u32,
    ) -> Result<Self, ColpressError> {
        let n = num_entries as usize;
        match physical_type {
            PhysicalType::Int32 => Ok(Self::Int32(plain::decode_fixed(bytes, n)?)),
            PhysicalType::Int64 => Ok(Self::Int64(plain::decode_fixed(bytes, n)?)),
            PhysicalType::Float => Ok(Self::Float(plain::decode_fixed(bytes, n)?)),
            PhysicalType::Double => Ok(Self::Double(plain::decode_fixed(bytes, n)?)),
            PhysicalType::ByteArray => Ok(Self::ByteArray(plain::decode_byte_arrays(bytes, n)?)),
            PhysicalType::Boolean => Err(ColpressError::DictionaryError(
                "Boolean columns are never dictionary encoded".to_string(),
            )),
        }
    }

    /// Plain-encodes the entries, producing a dictionary page payload.
    pub fn to_plain_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Self::Int32(v) => plain::encode_fixed(v, &mut out),
            Self::Int64(v) => plain::encode_fixed(v, &mut out),
            Self::Float(v) => plain::encode_fixed(v, &mut out),
            Self::Double(v) => plain::encode_fixed(v, &mut out),
            Self::ByteArray(v) => plain::encode_byte_arrays(v, &mut out),
        }
        out
    }

    /// Produces the entries in natural sorted order together with the
    /// `old_id -> new_id` mapping.
    ///
    /// Integers sort numerically, floats by total order, byte arrays
    /// lexicographically.
    pub fn sorted_with_mapping(&self) -> (Self, Vec<u32>) {
        match self {
            Self::Int32(v) => {
                let (sorted, map) = sort_fixed(v, |a, b| a.cmp(b));
                (Self::Int32(sorted), map)
            }
            Self::Int64(v) => {
                let (sorted, map) = sort_fixed(v, |a, b| a.cmp(b));
                (Self::Int64(sorted), map)
            }
            Self::Float(v) => {
                let (sorted, map) = sort_fixed(v, |a, b| a.total_cmp(b));
                (Self::Float(sorted), map)
            }
            Self::Double(v) => {
                let (sorted, map) = sort_fixed(v, |a, b| a.total_cmp(b));
                (Self::Double(sorted), map)
            }
            Self::ByteArray(v) => {
                let mut order: Vec<usize> = (0..v.len()).collect();
                order.sort_by(|&a, &b| v[a].cmp(&v[b]));

                let sorted = order.iter().map(|&old| v[old].clone()).collect();
                let mut id_map = vec![0u32; v.len()];
                for (new_id, &old_id) in order.iter().enumerate() {
                    id_map[old_id] = new_id as u32;
                }
                (Self::ByteArray(sorted), id_map)
            }
        }
    }
}

//==================================================================================
// 2. The in-memory dictionary
//==================================================================================

/// An in-memory dictionary a dictionary-based values reader resolves ids
/// against.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: DictionaryEntries,
}

impl Dictionary {
    /// Decodes a buffered (uncompressed) dictionary page.
    pub fn from_page(
        page: &DictionaryPage,
        descriptor: &ColumnDescriptor,
    ) -> Result<Self, ColpressError> {
        let entries = DictionaryEntries::from_plain_bytes(
            page.bytes(),
            descriptor.physical_type(),
            page.num_entries(),
        )?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: DictionaryEntries) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> u32 {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &DictionaryEntries {
        &self.entries
    }

    /// Looks up one entry as a dynamically-typed value.
    pub fn value_at(&self, id: u32) -> Result<CellValue, ColpressError> {
        let idx = id as usize;
        let out_of_range = || {
            ColpressError::DictionaryError(format!(
                "Invalid dictionary id: {} (dictionary size is {})",
                id,
                self.entries.len()
            ))
        };
        match &self.entries {
            DictionaryEntries::Int32(v) => {
                v.get(idx).map(|&x| CellValue::Int32(x)).ok_or_else(out_of_range)
            }
            DictionaryEntries::Int64(v) => {
                v.get(idx).map(|&x| CellValue::Int64(x)).ok_or_else(out_of_range)
            }
            DictionaryEntries::Float(v) => {
                v.get(idx).map(|&x| CellValue::Float(x)).ok_or_else(out_of_range)
            }
            DictionaryEntries::Double(v) => {
                v.get(idx).map(|&x| CellValue::Double(x)).ok_or_else(out_of_range)
            }
            DictionaryEntries::ByteArray(v) => v
                .get(idx)
                .map(|x| CellValue::Bytes(x.clone()))
                .ok_or_else(out_of_range),
        }
    }

    /// The copy hook of the fallback procedure: resolves one id and writes
    /// the value into the fallback encoder.
    pub fn copy_value(&self, id: u32, sink: &mut FallbackEncoder) -> Result<(), ColpressError> {
        match self.value_at(id)? {
            CellValue::Int32(v) => sink.put_i32(v),
            CellValue::Int64(v) => sink.put_i64(v),
            CellValue::Float(v) => sink.put_f32(v),
            CellValue::Double(v) => sink.put_f64(v),
            CellValue::Bytes(v) => sink.put_bytes(&v),
            CellValue::Boolean(_) => Err(ColpressError::DictionaryError(
                "Boolean columns are never dictionary encoded".to_string(),
            )),
        }
    }
}

//==================================================================================
// 3. Bit-packed id streams
//==================================================================================

/// Writer for a dictionary-encoded values section.
#[derive(Debug, Default)]
pub struct DictIdWriter {
    ids: Vec<u32>,
}

impl DictIdWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, id: u32) {
        self.ids.push(id);
    }

    pub fn num_ids(&self) -> usize {
        self.ids.len()
    }

    /// Serializes the id stream against a dictionary of `num_entries`
    /// entries: `[bit_width][packed ids]`.
    pub fn into_bytes(self, num_entries: u32) -> Result<Vec<u8>, ColpressError> {
        let bit_width = bitpack::num_required_bits(num_entries);
        let mut packed = Vec::new();
        bitpack::encode(&self.ids, &mut packed, bit_width)?;

        let mut out = Vec::with_capacity(1 + packed.len());
        out.push(bit_width);
        out.extend_from_slice(&packed);
        Ok(out)
    }
}

/// Reader over a dictionary-encoded values section.
#[derive(Debug)]
pub struct DictIdReader {
    ids: Vec<u32>,
    pos: usize,
}

impl DictIdReader {
    /// Initializes the reader from a values section carrying `num_values`
    /// ids.
    pub fn new(bytes: &[u8], num_values: usize) -> Result<Self, ColpressError> {
        let (&bit_width, packed) = bytes.split_first().ok_or_else(|| {
            ColpressError::DictionaryError("Empty dictionary-id stream".to_string())
        })?;
        let ids = bitpack::decode(packed, bit_width, num_values)?;
        Ok(Self { ids, pos: 0 })
    }

    /// Reads the next dictionary id.
    pub fn read_id(&mut self) -> Result<u32, ColpressError> {
        let id = self.ids.get(self.pos).copied().ok_or_else(|| {
            ColpressError::DictionaryError("Dictionary-id stream exhausted".to_string())
        })?;
        self.pos += 1;
        Ok(id)
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_stream_roundtrip() {
        let mut writer = DictIdWriter::new();
        for id in [0u32, 1, 2, 2, 0] {
            writer.put(id);
        }
        let bytes = writer.into_bytes(3).unwrap();
        // 3 entries -> 2-bit ids, so 5 ids pack into 2 bytes plus the width tag.
        assert_eq!(bytes.len(), 3);
        assert_eq!(bytes[0], 2);

        let mut reader = DictIdReader::new(&bytes, 5).unwrap();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(reader.read_id().unwrap());
        }
        assert_eq!(ids, vec![0, 1, 2, 2, 0]);
        assert!(reader.read_id().is_err());
    }

    #[test]
    fn test_entries_plain_roundtrip_i32() {
        let entries = DictionaryEntries::Int32(vec![7, 3, 5]);
        let bytes = entries.to_plain_bytes();
        let restored =
            DictionaryEntries::from_plain_bytes(&bytes, PhysicalType::Int32, 3).unwrap();
        assert_eq!(restored, entries);
    }

    #[test]
    fn test_entries_plain_roundtrip_byte_arrays() {
        let entries =
            DictionaryEntries::ByteArray(vec![b"pear".to_vec(), b"apple".to_vec()]);
        let bytes = entries.to_plain_bytes();
        let restored =
            DictionaryEntries::from_plain_bytes(&bytes, PhysicalType::ByteArray, 2).unwrap();
        assert_eq!(restored, entries);
    }

    #[test]
    fn test_sorted_with_mapping_i32() {
        let entries = DictionaryEntries::Int32(vec![7, 3, 5]);
        let (sorted, id_map) = entries.sorted_with_mapping();
        assert_eq!(sorted, DictionaryEntries::Int32(vec![3, 5, 7]));
        // old id 0 (value 7) -> new id 2; old 1 (3) -> 0; old 2 (5) -> 1.
        assert_eq!(id_map, vec![2, 0, 1]);
    }

    #[test]
    fn test_sorted_with_mapping_byte_arrays() {
        let entries = DictionaryEntries::ByteArray(vec![
            b"pear".to_vec(),
            b"apple".to_vec(),
            b"fig".to_vec(),
        ]);
        let (sorted, id_map) = entries.sorted_with_mapping();
        assert_eq!(
            sorted,
            DictionaryEntries::ByteArray(vec![
                b"apple".to_vec(),
                b"fig".to_vec(),
                b"pear".to_vec()
            ])
        );
        assert_eq!(id_map, vec![2, 0, 1]);
    }

    #[test]
    fn test_dictionary_lookup_bounds() {
        let dictionary = Dictionary::from_entries(DictionaryEntries::Int64(vec![10, 20]));
        assert_eq!(dictionary.value_at(1).unwrap(), CellValue::Int64(20));
        let result = dictionary.value_at(2);
        assert!(matches!(result, Err(ColpressError::DictionaryError(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid dictionary id: 2"));
    }

    #[test]
    fn test_boolean_dictionary_rejected() {
        let result = DictionaryEntries::from_plain_bytes(&[1], PhysicalType::Boolean, 1);
        assert!(matches!(result, Err(ColpressError::DictionaryError(_))));
    }
}
