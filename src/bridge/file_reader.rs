//! Reads a finished file back into logical values.
//!
//! The reader is footer-driven: it validates the container framing, parses
//! the footer manifest, then walks each column chunk page by page:
//! resolving dictionary ids, decompressing bodies, and reconstructing null
//! positions from definition levels. It exists so the crate's round-trip
//! laws can be checked end to end, and doubles as the reference for what a
//! consumer of the format must implement.

use std::io::{Read, Seek, SeekFrom};

use crate::codec::decompress;
use crate::encoding::dictionary::{DictIdReader, Dictionary};
use crate::encoding::{levels, Encoding};
use crate::error::ColpressError;
use crate::kernels::{plain, rle};
use crate::page::header::{PageHeaderCodec, PageHeaderKind};
use crate::page::DictionaryPage;
use crate::schema::ColumnDescriptor;
use crate::types::{CellValue, PhysicalType};

use super::format::{ColumnChunkMeta, FileFooter, FILE_FORMAT_VERSION, FILE_MAGIC};

/// A reader over a finished colpress file.
#[derive(Debug)]
pub struct ChunkFileReader<R: Read + Seek> {
    source: R,
    footer: FileFooter,
    header_codec: PageHeaderCodec,
}

impl<R: Read + Seek> ChunkFileReader<R> {
    /// Validates the container framing and parses the footer.
    pub fn new(mut source: R) -> Result<Self, ColpressError> {
        let mut magic = [0u8; 4];
        source.read_exact(&mut magic)?;
        if magic != *FILE_MAGIC {
            return Err(ColpressError::FrameFormatError(
                "Invalid file magic number".to_string(),
            ));
        }

        let mut version_bytes = [0u8; 2];
        source.read_exact(&mut version_bytes)?;
        let version = u16::from_le_bytes(version_bytes);
        if version != FILE_FORMAT_VERSION {
            return Err(ColpressError::FrameFormatError(format!(
                "Unsupported file format version: expected {}, got {}",
                FILE_FORMAT_VERSION, version
            )));
        }

        let file_len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::End(-8))?;
        let mut len_bytes = [0u8; 8];
        source.read_exact(&mut len_bytes)?;
        let footer_len = u64::from_le_bytes(len_bytes);

        let fixed_overhead = (FILE_MAGIC.len() + 2 + 8) as u64;
        if footer_len + fixed_overhead > file_len {
            return Err(ColpressError::FrameFormatError(format!(
                "Footer length {} exceeds file size {}",
                footer_len, file_len
            )));
        }

        source.seek(SeekFrom::Start(file_len - 8 - footer_len))?;
        let mut footer_bytes = vec![0u8; footer_len as usize];
        source.read_exact(&mut footer_bytes)?;
        let footer: FileFooter = serde_json::from_slice(&footer_bytes)?;

        Ok(Self {
            source,
            footer,
            header_codec: PageHeaderCodec::new(),
        })
    }

    pub fn footer(&self) -> &FileFooter {
        &self.footer
    }

    /// Decodes one column chunk back into its logical value stream,
    /// including null positions.
    pub fn read_column(&mut self, path: &str) -> Result<Vec<Option<CellValue>>, ColpressError> {
        let meta = self
            .footer
            .column_chunks
            .iter()
            .find(|c| c.path == path)
            .cloned()
            .ok_or_else(|| {
                ColpressError::FrameFormatError(format!("No column chunk for path {:?}", path))
            })?;
        let descriptor = self
            .footer
            .schema
            .column(path)
            .cloned()
            .ok_or_else(|| {
                ColpressError::FrameFormatError(format!("No schema column for path {:?}", path))
            })?;

        self.source.seek(SeekFrom::Start(meta.chunk_start_offset))?;

        let dictionary = if meta.has_dictionary {
            Some(self.read_dictionary(&meta, &descriptor)?)
        } else {
            None
        };

        let mut values = Vec::new();
        for _ in 0..meta.data_page_count {
            self.read_data_page(&meta, &descriptor, dictionary.as_ref(), &mut values)?;
        }
        Ok(values)
    }

    fn read_body(&mut self, len: usize) -> Result<Vec<u8>, ColpressError> {
        let mut body = vec![0u8; len];
        self.source.read_exact(&mut body)?;
        Ok(body)
    }

    fn read_dictionary(
        &mut self,
        meta: &ColumnChunkMeta,
        descriptor: &ColumnDescriptor,
    ) -> Result<Dictionary, ColpressError> {
        let header = self.header_codec.read_header(&mut self.source)?;
        let PageHeaderKind::Dictionary {
            num_entries,
            encoding,
            ..
        } = header.kind
        else {
            return Err(ColpressError::FrameFormatError(
                "Expected a dictionary page at the start of the chunk".to_string(),
            ));
        };

        let body = self.read_body(header.compressed_page_size as usize)?;
        let bytes = decompress(meta.codec, &body)?;
        let page = DictionaryPage::new(bytes, header.uncompressed_page_size as u64, num_entries, encoding);
        Dictionary::from_page(&page, descriptor)
    }

    fn read_data_page(
        &mut self,
        meta: &ColumnChunkMeta,
        descriptor: &ColumnDescriptor,
        dictionary: Option<&Dictionary>,
        out: &mut Vec<Option<CellValue>>,
    ) -> Result<(), ColpressError> {
        let header = self.header_codec.read_header(&mut self.source)?;
        match header.kind {
            PageHeaderKind::DataV1 {
                value_count,
                values_encoding,
                ..
            } => {
                let body = self.read_body(header.compressed_page_size as usize)?;
                let body = decompress(meta.codec, &body)?;

                let split = levels::split_v1_body(&body, descriptor)?;
                let def_levels = split
                    .def_levels
                    .map(|bytes| levels::decode_levels(bytes, value_count as usize))
                    .transpose()?;
                let null_count = def_levels.as_ref().map_or(0, |levels| {
                    levels
                        .iter()
                        .filter(|&&l| l < descriptor.max_def_level())
                        .count()
                });
                let non_null_count = value_count as usize - null_count;

                let values = decode_values(
                    &body[split.data_offset..],
                    values_encoding,
                    descriptor.physical_type(),
                    non_null_count,
                    dictionary,
                )?;
                interleave_nulls(def_levels, descriptor.max_def_level(), values, out)
            }
            PageHeaderKind::DataV2 {
                value_count,
                null_count,
                values_encoding,
                rl_byte_len,
                dl_byte_len,
                ..
            } => {
                let _rep_levels = self.read_body(rl_byte_len as usize)?;
                let def_level_bytes = self.read_body(dl_byte_len as usize)?;
                let values_len = header.compressed_page_size as usize
                    - rl_byte_len as usize
                    - dl_byte_len as usize;
                let values_body = decompress(meta.codec, &self.read_body(values_len)?)?;

                let def_levels = if dl_byte_len > 0 {
                    Some(levels::decode_levels(&def_level_bytes, value_count as usize)?)
                } else {
                    None
                };
                let non_null_count = (value_count - null_count) as usize;

                let values = decode_values(
                    &values_body,
                    values_encoding,
                    descriptor.physical_type(),
                    non_null_count,
                    dictionary,
                )?;
                interleave_nulls(def_levels, descriptor.max_def_level(), values, out)
            }
            PageHeaderKind::Dictionary { .. } => Err(ColpressError::FrameFormatError(
                "Unexpected dictionary page among data pages".to_string(),
            )),
        }
    }
}

fn decode_values(
    bytes: &[u8],
    encoding: Encoding,
    physical_type: PhysicalType,
    num_values: usize,
    dictionary: Option<&Dictionary>,
) -> Result<Vec<CellValue>, ColpressError> {
    match encoding {
        Encoding::Plain => match physical_type {
            PhysicalType::Boolean => Ok(plain::decode_bools(bytes, num_values)?
                .into_iter()
                .map(CellValue::Boolean)
                .collect()),
            PhysicalType::Int32 => Ok(plain::decode_fixed::<i32>(bytes, num_values)?
                .into_iter()
                .map(CellValue::Int32)
                .collect()),
            PhysicalType::Int64 => Ok(plain::decode_fixed::<i64>(bytes, num_values)?
                .into_iter()
                .map(CellValue::Int64)
                .collect()),
            PhysicalType::Float => Ok(plain::decode_fixed::<f32>(bytes, num_values)?
                .into_iter()
                .map(CellValue::Float)
                .collect()),
            PhysicalType::Double => Ok(plain::decode_fixed::<f64>(bytes, num_values)?
                .into_iter()
                .map(CellValue::Double)
                .collect()),
            PhysicalType::ByteArray => Ok(plain::decode_byte_arrays(bytes, num_values)?
                .into_iter()
                .map(CellValue::Bytes)
                .collect()),
        },
        Encoding::Rle => match physical_type {
            PhysicalType::Boolean => Ok(rle::decode::<u8>(bytes, num_values)?
                .into_iter()
                .map(|b| CellValue::Boolean(b != 0))
                .collect()),
            other => Err(ColpressError::UnsupportedType(format!(
                "Run-length values encoding is only defined for booleans, not {}",
                other
            ))),
        },
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            let dictionary = dictionary.ok_or_else(|| {
                ColpressError::DictionaryError(
                    "Dictionary-encoded page in a chunk without a dictionary".to_string(),
                )
            })?;
            let mut reader = DictIdReader::new(bytes, num_values)?;
            let mut values = Vec::with_capacity(num_values);
            for _ in 0..num_values {
                values.push(dictionary.value_at(reader.read_id()?)?);
            }
            Ok(values)
        }
    }
}

fn interleave_nulls(
    def_levels: Option<Vec<u16>>,
    max_def_level: u16,
    values: Vec<CellValue>,
    out: &mut Vec<Option<CellValue>>,
) -> Result<(), ColpressError> {
    match def_levels {
        None => {
            out.extend(values.into_iter().map(Some));
            Ok(())
        }
        Some(levels) => {
            let mut values_iter = values.into_iter();
            for level in levels {
                if level >= max_def_level {
                    let value = values_iter.next().ok_or_else(|| {
                        ColpressError::FrameFormatError(
                            "Definition levels indicate more values than the page holds"
                                .to_string(),
                        )
                    })?;
                    out.push(Some(value));
                } else {
                    out.push(None);
                }
            }
            Ok(())
        }
    }
}
