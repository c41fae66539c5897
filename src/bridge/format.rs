//! Defines the on-disk container structures for a finished file.
//!
//! A file is `[magic][version][column chunks...][footer JSON][footer len]`.
//! The footer carries the schema and one metadata entry per column chunk;
//! it is the single source of truth a reader navigates by.

use serde::{Deserialize, Serialize};

use crate::codec::CodecName;
use crate::encoding::Encoding;
use crate::schema::MessageSchema;
use crate::statistics::Statistics;
use crate::types::PhysicalType;

/// The magic number identifying the start of a colpress file.
pub const FILE_MAGIC: &[u8; 4] = b"CPRS";
/// The current version of the file container format.
pub const FILE_FORMAT_VERSION: u16 = 1;

/// Metadata for one column chunk written to the file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ColumnChunkMeta {
    pub path: String,
    pub physical_type: PhysicalType,
    pub codec: CodecName,
    pub num_values: u64,
    pub total_uncompressed_size: u64,
    pub total_compressed_size: u64,
    /// Number of data pages (the dictionary page, if any, is not counted).
    pub data_page_count: u32,
    pub has_dictionary: bool,
    pub dictionary_sorted: bool,
    /// Absolute offset of the chunk's first page header (the dictionary
    /// page when present, the first data page otherwise).
    pub chunk_start_offset: u64,
    /// Absolute offset of the first data page's body, when any pages exist.
    pub first_data_page_offset: Option<u64>,
    /// Ordered list of data encodings observed across the chunk, including
    /// the dictionary page's own encoding when one was written.
    pub data_encodings: Vec<Encoding>,
    pub rl_encodings: Vec<Encoding>,
    pub dl_encodings: Vec<Encoding>,
    pub statistics: Option<Statistics>,
}

/// The file footer: schema, chunk manifest, and the writer's version string.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileFooter {
    pub schema: MessageSchema,
    pub column_chunks: Vec<ColumnChunkMeta>,
    pub writer_version: String,
}
