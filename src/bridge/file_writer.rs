//! The downstream file-writer contract, and a serialized implementation
//! over any `io::Write` sink.
//!
//! The chunk engine drives a `ChunkFileWriter` through a strict per-column
//! protocol: `start_column`, optionally `write_dictionary_page`, one
//! `write_data_pages` with the concatenated page stream, `end_column`.
//! Columns are written strictly sequentially; the writer's position only
//! moves forward.

use std::collections::HashSet;

use log::debug;

use crate::codec::CodecName;
use crate::encoding::Encoding;
use crate::error::ColpressError;
use crate::page::header::{PageHeaderCodec, PageHeaderWithOffset};
use crate::page::DictionaryPage;
use crate::schema::{ColumnDescriptor, MessageSchema};
use crate::statistics::Statistics;
use crate::types::PhysicalType;

use super::format::{ColumnChunkMeta, FileFooter, FILE_FORMAT_VERSION, FILE_MAGIC};

/// The file-writer operations the chunk engine consumes.
pub trait ChunkFileWriter {
    /// Current absolute byte position of the sink.
    fn pos(&self) -> u64;

    /// Opens a column chunk.
    fn start_column(
        &mut self,
        descriptor: &ColumnDescriptor,
        total_value_count: u64,
        codec: CodecName,
    ) -> Result<(), ColpressError>;

    /// Writes the column's dictionary page (already compressed).
    fn write_dictionary_page(
        &mut self,
        page: DictionaryPage,
        sorted: bool,
    ) -> Result<(), ColpressError>;

    /// Writes the concatenated `[header][body]` stream of every data page
    /// in the chunk, together with the column aggregates.
    #[allow(clippy::too_many_arguments)]
    fn write_data_pages(
        &mut self,
        bytes: Vec<u8>,
        uncompressed_length: u64,
        compressed_length: u64,
        statistics: &Statistics,
        rl_encodings: &HashSet<Encoding>,
        dl_encodings: &HashSet<Encoding>,
        data_encodings: &[Encoding],
        page_headers: Vec<PageHeaderWithOffset>,
    ) -> Result<(), ColpressError>;

    /// Closes the column chunk.
    fn end_column(&mut self) -> Result<(), ColpressError>;
}

struct CurrentColumn {
    path: String,
    physical_type: PhysicalType,
    codec: CodecName,
    num_values: u64,
    chunk_start_offset: u64,
    has_dictionary: bool,
    dictionary_sorted: bool,
    data_page_count: u32,
    total_uncompressed_size: u64,
    total_compressed_size: u64,
    first_data_page_offset: Option<u64>,
    data_encodings: Vec<Encoding>,
    rl_encodings: Vec<Encoding>,
    dl_encodings: Vec<Encoding>,
    statistics: Option<Statistics>,
}

/// A `ChunkFileWriter` that serializes chunks into an `io::Write` sink and
/// finishes with a JSON footer plus a little-endian length trailer.
pub struct SerializedFileWriter<W: std::io::Write> {
    sink: W,
    bytes_written: u64,
    schema: MessageSchema,
    column_chunks: Vec<ColumnChunkMeta>,
    current: Option<CurrentColumn>,
    header_codec: PageHeaderCodec,
    scratch: Vec<u8>,
}

impl<W: std::io::Write> SerializedFileWriter<W> {
    /// Opens the file: writes the magic number and format version.
    pub fn new(mut sink: W, schema: MessageSchema) -> Result<Self, ColpressError> {
        sink.write_all(FILE_MAGIC)?;
        sink.write_all(&FILE_FORMAT_VERSION.to_le_bytes())?;
        Ok(Self {
            sink,
            bytes_written: (FILE_MAGIC.len() + 2) as u64,
            schema,
            column_chunks: Vec::new(),
            current: None,
            header_codec: PageHeaderCodec::new(),
            scratch: Vec::new(),
        })
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ColpressError> {
        self.sink.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn current_mut(&mut self) -> Result<&mut CurrentColumn, ColpressError> {
        self.current.as_mut().ok_or_else(|| {
            ColpressError::FrameFormatError("No column chunk is currently open".to_string())
        })
    }

    /// Writes the footer and returns the underlying sink.
    pub fn finish(mut self) -> Result<W, ColpressError> {
        if self.current.is_some() {
            return Err(ColpressError::FrameFormatError(
                "Cannot finish the file while a column chunk is open".to_string(),
            ));
        }

        let footer = FileFooter {
            schema: std::mem::take(&mut self.schema),
            column_chunks: std::mem::take(&mut self.column_chunks),
            writer_version: crate::VERSION.to_string(),
        };
        let footer_bytes = serde_json::to_vec(&footer)?;
        let footer_len = footer_bytes.len() as u64;

        self.write_bytes(&footer_bytes)?;
        self.write_bytes(&footer_len.to_le_bytes())?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}

impl<W: std::io::Write> ChunkFileWriter for SerializedFileWriter<W> {
    fn pos(&self) -> u64 {
        self.bytes_written
    }

    fn start_column(
        &mut self,
        descriptor: &ColumnDescriptor,
        total_value_count: u64,
        codec: CodecName,
    ) -> Result<(), ColpressError> {
        if self.current.is_some() {
            return Err(ColpressError::FrameFormatError(
                "A column chunk is already open".to_string(),
            ));
        }
        debug!(
            "starting column chunk for {} at offset {}",
            descriptor, self.bytes_written
        );
        self.current = Some(CurrentColumn {
            path: descriptor.path().to_string(),
            physical_type: descriptor.physical_type(),
            codec,
            num_values: total_value_count,
            chunk_start_offset: self.bytes_written,
            has_dictionary: false,
            dictionary_sorted: false,
            data_page_count: 0,
            total_uncompressed_size: 0,
            total_compressed_size: 0,
            first_data_page_offset: None,
            data_encodings: Vec::new(),
            rl_encodings: Vec::new(),
            dl_encodings: Vec::new(),
            statistics: None,
        });
        Ok(())
    }

    fn write_dictionary_page(
        &mut self,
        page: DictionaryPage,
        sorted: bool,
    ) -> Result<(), ColpressError> {
        self.current_mut()?;

        self.scratch.clear();
        let mut header_bytes = std::mem::take(&mut self.scratch);
        self.header_codec.write_dictionary_page_header(
            page.uncompressed_size(),
            page.bytes().len() as u64,
            page.num_entries(),
            page.encoding(),
            sorted,
            &mut header_bytes,
        )?;
        self.write_bytes(&header_bytes)?;
        self.write_bytes(page.bytes())?;
        self.scratch = header_bytes;

        let current = self.current_mut()?;
        current.has_dictionary = true;
        current.dictionary_sorted = sorted;
        Ok(())
    }

    fn write_data_pages(
        &mut self,
        bytes: Vec<u8>,
        uncompressed_length: u64,
        compressed_length: u64,
        statistics: &Statistics,
        rl_encodings: &HashSet<Encoding>,
        dl_encodings: &HashSet<Encoding>,
        data_encodings: &[Encoding],
        page_headers: Vec<PageHeaderWithOffset>,
    ) -> Result<(), ColpressError> {
        self.write_bytes(&bytes)?;

        let current = self.current_mut()?;
        current.data_page_count = page_headers.len() as u32;
        current.first_data_page_offset = page_headers.first().map(|h| h.offset);
        current.total_uncompressed_size = uncompressed_length;
        current.total_compressed_size = compressed_length;
        current.data_encodings = data_encodings.to_vec();
        current.rl_encodings = rl_encodings.iter().copied().collect();
        current.dl_encodings = dl_encodings.iter().copied().collect();
        current.statistics = Some(statistics.clone());
        Ok(())
    }

    fn end_column(&mut self) -> Result<(), ColpressError> {
        let current = self.current.take().ok_or_else(|| {
            ColpressError::FrameFormatError("No column chunk is currently open".to_string())
        })?;
        self.column_chunks.push(ColumnChunkMeta {
            path: current.path,
            physical_type: current.physical_type,
            codec: current.codec,
            num_values: current.num_values,
            total_uncompressed_size: current.total_uncompressed_size,
            total_compressed_size: current.total_compressed_size,
            data_page_count: current.data_page_count,
            has_dictionary: current.has_dictionary,
            dictionary_sorted: current.dictionary_sorted,
            chunk_start_offset: current.chunk_start_offset,
            first_data_page_offset: current.first_data_page_offset,
            data_encodings: current.data_encodings,
            rl_encodings: current.rl_encodings,
            dl_encodings: current.dl_encodings,
            statistics: current.statistics,
        });
        Ok(())
    }
}
