//! The page header wire format.
//!
//! Every page on disk is prefixed by a serialized header describing its
//! sizes, counts, encodings, and statistics. The chunk engine treats the
//! serialized form as an opaque byte string for offset accounting; only its
//! length feeds the offset cursor. `PageHeaderCodec` is owned per writer;
//! there is no process-wide serializer state.
//!
//! ### On-Disk Format (all integers LE)
//! ```text
//! [page_type: u8]              0=dictionary, 1=data v1, 2=data v2
//! [uncompressed_page_size: i32]
//! [compressed_page_size: i32]
//! dictionary: [num_entries: u32][encoding: u8][sorted: u8]
//! data v1:    [value_count: u32][rl: u8][dl: u8][values: u8][stats]
//! data v2:    [value_count: u32][null_count: u32][row_count: u32]
//!             [values: u8][rl_byte_len: u32][dl_byte_len: u32][stats]
//! stats:      [flags: u8][null_count: u64]
//!             [min_len: u32][min]  (iff flags bit 0)
//!             [max_len: u32][max]  (iff flags bit 1)
//! ```

use std::io::Read;

use crate::encoding::Encoding;
use crate::error::{to_i32_with_check, ColpressError};
use crate::statistics::Statistics;

pub const PAGE_TYPE_DICTIONARY: u8 = 0;
pub const PAGE_TYPE_DATA_V1: u8 = 1;
pub const PAGE_TYPE_DATA_V2: u8 = 2;

const STATS_HAS_MIN: u8 = 0b01;
const STATS_HAS_MAX: u8 = 0b10;

/// The byte-oriented statistics embedding carried by data page headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatisticsBlock {
    pub null_count: u64,
    pub min: Option<Vec<u8>>,
    pub max: Option<Vec<u8>>,
}

impl From<&Statistics> for StatisticsBlock {
    fn from(statistics: &Statistics) -> Self {
        Self {
            null_count: statistics.null_count(),
            min: statistics.min_bytes(),
            max: statistics.max_bytes(),
        }
    }
}

/// The variant-specific fields of a page header.
#[derive(Debug, Clone, PartialEq)]
pub enum PageHeaderKind {
    Dictionary {
        num_entries: u32,
        encoding: Encoding,
        sorted: bool,
    },
    DataV1 {
        value_count: u32,
        rl_encoding: Encoding,
        dl_encoding: Encoding,
        values_encoding: Encoding,
        statistics: StatisticsBlock,
    },
    DataV2 {
        value_count: u32,
        null_count: u32,
        row_count: u32,
        values_encoding: Encoding,
        rl_byte_len: u32,
        dl_byte_len: u32,
        statistics: StatisticsBlock,
    },
}

/// The parsed form of a page header.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub kind: PageHeaderKind,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
}

impl PageHeader {
    pub fn page_type(&self) -> u8 {
        match self.kind {
            PageHeaderKind::Dictionary { .. } => PAGE_TYPE_DICTIONARY,
            PageHeaderKind::DataV1 { .. } => PAGE_TYPE_DATA_V1,
            PageHeaderKind::DataV2 { .. } => PAGE_TYPE_DATA_V2,
        }
    }
}

/// A serialized page header paired with the absolute byte offset at which
/// the page's body begins on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeaderWithOffset {
    pub header: PageHeader,
    pub offset: u64,
}

fn write_stats(out: &mut Vec<u8>, stats: &StatisticsBlock) {
    let mut flags = 0u8;
    if stats.min.is_some() {
        flags |= STATS_HAS_MIN;
    }
    if stats.max.is_some() {
        flags |= STATS_HAS_MAX;
    }
    out.push(flags);
    out.extend_from_slice(&stats.null_count.to_le_bytes());
    if let Some(min) = &stats.min {
        out.extend_from_slice(&(min.len() as u32).to_le_bytes());
        out.extend_from_slice(min);
    }
    if let Some(max) = &stats.max {
        out.extend_from_slice(&(max.len() as u32).to_le_bytes());
        out.extend_from_slice(max);
    }
}

fn read_exact_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N], ColpressError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, ColpressError> {
    Ok(read_exact_array::<R, 1>(reader)?[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ColpressError> {
    Ok(u32::from_le_bytes(read_exact_array::<R, 4>(reader)?))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32, ColpressError> {
    Ok(i32::from_le_bytes(read_exact_array::<R, 4>(reader)?))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64, ColpressError> {
    Ok(u64::from_le_bytes(read_exact_array::<R, 8>(reader)?))
}

fn read_encoding<R: Read>(reader: &mut R) -> Result<Encoding, ColpressError> {
    Encoding::from_wire_tag(read_u8(reader)?)
}

fn read_stats<R: Read>(reader: &mut R) -> Result<StatisticsBlock, ColpressError> {
    let flags = read_u8(reader)?;
    let null_count = read_u64(reader)?;
    let mut read_blob = |present: bool| -> Result<Option<Vec<u8>>, ColpressError> {
        if !present {
            return Ok(None);
        }
        let len = read_u32(reader)? as usize;
        let mut blob = vec![0u8; len];
        reader.read_exact(&mut blob)?;
        Ok(Some(blob))
    };
    let min = read_blob(flags & STATS_HAS_MIN != 0)?;
    let max = read_blob(flags & STATS_HAS_MAX != 0)?;
    Ok(StatisticsBlock {
        null_count,
        min,
        max,
    })
}

/// Per-writer page header serializer.
#[derive(Debug, Default)]
pub struct PageHeaderCodec;

impl PageHeaderCodec {
    pub fn new() -> Self {
        Self
    }

    /// Serializes a v1 data page header, appending to `out` and returning
    /// the parsed form. Size fields past the 32-bit signed ceiling fail
    /// with `PageTooLarge`.
    #[allow(clippy::too_many_arguments)]
    pub fn write_data_page_header(
        &self,
        uncompressed_size: u64,
        compressed_size: u64,
        value_count: u32,
        statistics: &Statistics,
        rl_encoding: Encoding,
        dl_encoding: Encoding,
        values_encoding: Encoding,
        out: &mut Vec<u8>,
    ) -> Result<PageHeader, ColpressError> {
        let header = PageHeader {
            kind: PageHeaderKind::DataV1 {
                value_count,
                rl_encoding,
                dl_encoding,
                values_encoding,
                statistics: StatisticsBlock::from(statistics),
            },
            uncompressed_page_size: to_i32_with_check(uncompressed_size)?,
            compressed_page_size: to_i32_with_check(compressed_size)?,
        };
        self.serialize(&header, out);
        Ok(header)
    }

    /// Serializes a v2 data page header, appending to `out` and returning
    /// the parsed form.
    #[allow(clippy::too_many_arguments)]
    pub fn write_data_page_v2_header(
        &self,
        uncompressed_size: u64,
        compressed_size: u64,
        value_count: u32,
        null_count: u32,
        row_count: u32,
        statistics: &Statistics,
        values_encoding: Encoding,
        rl_byte_len: u64,
        dl_byte_len: u64,
        out: &mut Vec<u8>,
    ) -> Result<PageHeader, ColpressError> {
        let header = PageHeader {
            kind: PageHeaderKind::DataV2 {
                value_count,
                null_count,
                row_count,
                values_encoding,
                rl_byte_len: to_i32_with_check(rl_byte_len)? as u32,
                dl_byte_len: to_i32_with_check(dl_byte_len)? as u32,
                statistics: StatisticsBlock::from(statistics),
            },
            uncompressed_page_size: to_i32_with_check(uncompressed_size)?,
            compressed_page_size: to_i32_with_check(compressed_size)?,
        };
        self.serialize(&header, out);
        Ok(header)
    }

    /// Serializes a dictionary page header, appending to `out` and
    /// returning the parsed form.
    pub fn write_dictionary_page_header(
        &self,
        uncompressed_size: u64,
        compressed_size: u64,
        num_entries: u32,
        encoding: Encoding,
        sorted: bool,
        out: &mut Vec<u8>,
    ) -> Result<PageHeader, ColpressError> {
        let header = PageHeader {
            kind: PageHeaderKind::Dictionary {
                num_entries,
                encoding,
                sorted,
            },
            uncompressed_page_size: to_i32_with_check(uncompressed_size)?,
            compressed_page_size: to_i32_with_check(compressed_size)?,
        };
        self.serialize(&header, out);
        Ok(header)
    }

    fn serialize(&self, header: &PageHeader, out: &mut Vec<u8>) {
        out.push(header.page_type());
        out.extend_from_slice(&header.uncompressed_page_size.to_le_bytes());
        out.extend_from_slice(&header.compressed_page_size.to_le_bytes());

        match &header.kind {
            PageHeaderKind::Dictionary {
                num_entries,
                encoding,
                sorted,
            } => {
                out.extend_from_slice(&num_entries.to_le_bytes());
                out.push(encoding.wire_tag());
                out.push(*sorted as u8);
            }
            PageHeaderKind::DataV1 {
                value_count,
                rl_encoding,
                dl_encoding,
                values_encoding,
                statistics,
            } => {
                out.extend_from_slice(&value_count.to_le_bytes());
                out.push(rl_encoding.wire_tag());
                out.push(dl_encoding.wire_tag());
                out.push(values_encoding.wire_tag());
                write_stats(out, statistics);
            }
            PageHeaderKind::DataV2 {
                value_count,
                null_count,
                row_count,
                values_encoding,
                rl_byte_len,
                dl_byte_len,
                statistics,
            } => {
                out.extend_from_slice(&value_count.to_le_bytes());
                out.extend_from_slice(&null_count.to_le_bytes());
                out.extend_from_slice(&row_count.to_le_bytes());
                out.push(values_encoding.wire_tag());
                out.extend_from_slice(&rl_byte_len.to_le_bytes());
                out.extend_from_slice(&dl_byte_len.to_le_bytes());
                write_stats(out, statistics);
            }
        }
    }

    /// Parses one page header from a byte stream.
    pub fn read_header<R: Read>(&self, reader: &mut R) -> Result<PageHeader, ColpressError> {
        let page_type = read_u8(reader)?;
        let uncompressed_page_size = read_i32(reader)?;
        let compressed_page_size = read_i32(reader)?;

        let kind = match page_type {
            PAGE_TYPE_DICTIONARY => PageHeaderKind::Dictionary {
                num_entries: read_u32(reader)?,
                encoding: read_encoding(reader)?,
                sorted: read_u8(reader)? != 0,
            },
            PAGE_TYPE_DATA_V1 => PageHeaderKind::DataV1 {
                value_count: read_u32(reader)?,
                rl_encoding: read_encoding(reader)?,
                dl_encoding: read_encoding(reader)?,
                values_encoding: read_encoding(reader)?,
                statistics: read_stats(reader)?,
            },
            PAGE_TYPE_DATA_V2 => PageHeaderKind::DataV2 {
                value_count: read_u32(reader)?,
                null_count: read_u32(reader)?,
                row_count: read_u32(reader)?,
                values_encoding: read_encoding(reader)?,
                rl_byte_len: read_u32(reader)?,
                dl_byte_len: read_u32(reader)?,
                statistics: read_stats(reader)?,
            },
            other => return Err(ColpressError::InvalidPageType(other)),
        };

        Ok(PageHeader {
            kind,
            uncompressed_page_size,
            compressed_page_size,
        })
    }
}
