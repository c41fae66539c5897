//! The per-column page writer: accepts encoded pages, owns the buffered
//! chunk, and orchestrates finalization against the downstream file writer.
//!
//! Finalization runs a strict phase order: dictionary fallback check, then
//! dictionary sort, then emit. A failure mid-emit leaves the file writer in
//! a partially-started column and buffered buffers unreleased; the writer
//! (and its store) must be treated as terminal and discarded.

use std::sync::Arc;

use log::info;

use crate::bridge::file_writer::ChunkFileWriter;
use crate::codec::BytesCompressor;
use crate::config::WriterProperties;
use crate::encoding::Encoding;
use crate::error::{to_i32_with_check, ColpressError};
use crate::page::holder::{PageHolder, PageV1Holder, PageV2Holder};
use crate::page::DictionaryPage;
use crate::schema::ColumnDescriptor;
use crate::statistics::Statistics;

use super::framer::PageFramer;
use super::{fallback, sorter};

/// Buffers one column's pages and writes them as a contiguous column chunk.
pub struct ColumnChunkPageWriter {
    descriptor: Arc<ColumnDescriptor>,
    compressor: Arc<dyn BytesCompressor>,
    properties: Arc<WriterProperties>,

    buffered_dictionary_page: Option<DictionaryPage>,
    buffered_pages: Vec<PageHolder>,
    // Allocator-owned buffers registered for bulk release at end-of-chunk.
    registered_buffers: Vec<Vec<u8>>,

    total_value_count: u64,
    buffered_size: u64,
    page_count: u32,
    dictionary_encoding_used_for_all_pages: bool,
    total_statistics: Statistics,
    framer: PageFramer,
}

impl ColumnChunkPageWriter {
    pub(crate) fn new(
        descriptor: Arc<ColumnDescriptor>,
        compressor: Arc<dyn BytesCompressor>,
        properties: Arc<WriterProperties>,
    ) -> Self {
        let total_statistics = Statistics::new_for(descriptor.physical_type());
        Self {
            descriptor,
            compressor,
            properties,
            buffered_dictionary_page: None,
            buffered_pages: Vec::new(),
            registered_buffers: Vec::new(),
            total_value_count: 0,
            buffered_size: 0,
            page_count: 0,
            dictionary_encoding_used_for_all_pages: true,
            total_statistics,
            framer: PageFramer::new(),
        }
    }

    /// Buffers a v1 data page.
    ///
    /// Dictionary-encoded bodies are stored uncompressed: they may have to
    /// be rewritten at finalize time, and dictionary ids compress to almost
    /// nothing anyway, so compressing twice would be wasted work. All other
    /// bodies are compressed immediately.
    pub fn write_page(
        &mut self,
        data: Vec<u8>,
        value_count: u32,
        statistics: Statistics,
        rl_encoding: Encoding,
        dl_encoding: Encoding,
        values_encoding: Encoding,
    ) -> Result<(), ColpressError> {
        self.total_value_count += u64::from(value_count);
        self.page_count += 1;
        self.total_statistics.merge(&statistics)?;
        let uncompressed_size = data.len() as u64;

        self.dictionary_encoding_used_for_all_pages &= values_encoding.uses_dictionary();

        let compressed = !values_encoding.uses_dictionary();
        let bytes = if compressed {
            self.compressor.compress(&data)?
        } else {
            data
        };
        self.buffered_size += bytes.len() as u64;

        self.buffered_pages.push(PageHolder::V1(PageV1Holder::new(
            self.descriptor.clone(),
            bytes,
            value_count,
            statistics,
            rl_encoding,
            dl_encoding,
            values_encoding,
            compressed,
            uncompressed_size,
        )));
        Ok(())
    }

    /// Buffers a v2 data page. Only the values body is compressible; the
    /// level streams are stored and emitted verbatim.
    #[allow(clippy::too_many_arguments)]
    pub fn write_page_v2(
        &mut self,
        row_count: u32,
        null_count: u32,
        value_count: u32,
        repetition_levels: Vec<u8>,
        definition_levels: Vec<u8>,
        data_encoding: Encoding,
        data: Vec<u8>,
        statistics: Statistics,
    ) -> Result<(), ColpressError> {
        self.total_value_count += u64::from(value_count);
        self.page_count += 1;
        self.total_statistics.merge(&statistics)?;

        let total_size = to_i32_with_check(
            (data.len() + repetition_levels.len() + definition_levels.len()) as u64,
        )?;
        self.buffered_size += total_size as u64;
        let uncompressed_values_size = data.len() as u64;

        let uses_dictionary = data_encoding.uses_dictionary();
        self.dictionary_encoding_used_for_all_pages &= uses_dictionary;

        let compressed = !uses_dictionary;
        let bytes = if compressed {
            self.compressor.compress(&data)?
        } else {
            data
        };

        self.buffered_pages.push(PageHolder::V2(PageV2Holder::new(
            self.descriptor.clone(),
            row_count,
            null_count,
            value_count,
            repetition_levels,
            definition_levels,
            data_encoding,
            bytes,
            statistics,
            compressed,
            uncompressed_values_size,
        )));
        Ok(())
    }

    /// Buffers the column's dictionary page. At most one is accepted.
    ///
    /// The bytes are copied into an allocator-owned buffer registered for
    /// release at end-of-chunk. Compression is deferred to emit time so an
    /// abandoned dictionary costs no compression work.
    pub fn write_dictionary_page(&mut self, page: DictionaryPage) -> Result<(), ColpressError> {
        if self.buffered_dictionary_page.is_some() {
            return Err(ColpressError::DuplicateDictionary);
        }

        let uncompressed_size = page.bytes().len() as u64;
        let mut copy = self.properties.allocator().allocate(page.bytes().len());
        copy.extend_from_slice(page.bytes());

        self.buffered_dictionary_page = Some(DictionaryPage::new(
            copy,
            uncompressed_size,
            page.num_entries(),
            page.encoding(),
        ));
        Ok(())
    }

    /// Bytes currently buffered for this column.
    pub fn mem_size(&self) -> u64 {
        self.buffered_size
    }

    pub fn allocated_size(&self) -> u64 {
        self.buffered_size
    }

    pub fn mem_usage_string(&self, prefix: &str) -> String {
        format!(
            "{}ColumnChunkPageWriter: {} bytes, {} pages",
            prefix,
            self.buffered_size,
            self.buffered_pages.len()
        )
    }

    /// Finalizes the chunk: fallback check, dictionary sort, emit.
    pub fn write_to_file_writer(
        &mut self,
        writer: &mut dyn ChunkFileWriter,
    ) -> Result<(), ColpressError> {
        self.check_dictionary_encoding()?;

        let sorted_dictionary_page = match self.buffered_dictionary_page.take() {
            Some(page) => {
                let sorted = sorter::sort_dictionary(
                    &self.descriptor,
                    &self.properties,
                    &page,
                    &mut self.buffered_pages,
                )?;
                // The original dictionary buffer stays alive until release;
                // its readers are done but the allocator owns it.
                self.registered_buffers.push(page.into_bytes());
                Some(sorted)
            }
            None => None,
        };

        self.write_buffered_pages(writer, sorted_dictionary_page)
    }

    /// Undoes dictionary encoding when the dictionary was not used all the
    /// way through the chunk.
    fn check_dictionary_encoding(&mut self) -> Result<(), ColpressError> {
        if !self.dictionary_encoding_used_for_all_pages {
            if let Some(page) = self.buffered_dictionary_page.take() {
                fallback::abandon_dictionary(
                    &self.descriptor,
                    &self.properties,
                    &page,
                    &mut self.buffered_pages,
                )?;
                self.registered_buffers.push(page.into_bytes());
            }
        }
        Ok(())
    }

    fn write_buffered_pages(
        &mut self,
        writer: &mut dyn ChunkFileWriter,
        dictionary_page: Option<DictionaryPage>,
    ) -> Result<(), ColpressError> {
        writer.start_column(
            &self.descriptor,
            self.total_value_count,
            self.compressor.codec_name(),
        )?;

        if let Some(dictionary_page) = &dictionary_page {
            // Compress the dictionary page only now that it is certain to
            // be written.
            let compressed = self.compressor.compress(dictionary_page.bytes())?;
            writer.write_dictionary_page(
                DictionaryPage::new(
                    compressed,
                    dictionary_page.uncompressed_size(),
                    dictionary_page.num_entries(),
                    dictionary_page.encoding(),
                ),
                true,
            )?;
            // Column metadata lists the dictionary's own encoding among the
            // column's encodings.
            self.framer.push_data_encoding(dictionary_page.encoding());
        }

        // Page offsets are absolute: start from the file position observed
        // after the dictionary page (if any) has been written.
        let mut page_offset = writer.pos();
        let mut output = Vec::with_capacity(self.buffered_size as usize);
        let mut page_headers = Vec::with_capacity(self.buffered_pages.len());

        for holder in self.buffered_pages.iter_mut() {
            holder.compress_if_needed(self.compressor.as_ref())?;
            let framed = match holder {
                PageHolder::V1(h) => self.framer.frame_v1(h, page_offset, &mut output)?,
                PageHolder::V2(h) => self.framer.frame_v2(h, page_offset, &mut output)?,
            };
            // The next page header begins right after this page's body.
            page_offset = framed.offset + framed.header.compressed_page_size as u64;
            page_headers.push(framed);
        }

        let total_size = output.len() as u64;
        writer.write_data_pages(
            output,
            self.framer.uncompressed_length(),
            self.framer.compressed_length(),
            &self.total_statistics,
            self.framer.rl_encodings(),
            self.framer.dl_encodings(),
            self.framer.data_encodings(),
            page_headers,
        )?;
        writer.end_column()?;

        info!(
            "written {}B for {}: {} values, {}B raw, {}B comp, {} pages, encodings: {:?}{}",
            total_size,
            self.descriptor,
            self.total_value_count,
            self.framer.uncompressed_length(),
            self.framer.compressed_length(),
            self.page_count,
            self.framer.data_encodings(),
            match &dictionary_page {
                Some(d) => format!(
                    ", dic {{ {} entries, {}B raw }}",
                    d.num_entries(),
                    d.uncompressed_size()
                ),
                None => String::new(),
            }
        );

        for holder in self.buffered_pages.drain(..) {
            holder.release();
        }
        drop(dictionary_page);
        for buffer in self.registered_buffers.drain(..) {
            self.properties.allocator().release(buffer);
        }

        self.framer.clear();
        self.page_count = 0;
        self.total_value_count = 0;
        self.buffered_size = 0;
        self.total_statistics = Statistics::new_for(self.descriptor.physical_type());
        self.dictionary_encoding_used_for_all_pages = true;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn push_holder_for_test(&mut self, holder: PageHolder) {
        self.page_count += 1;
        self.buffered_pages.push(holder);
    }
}
