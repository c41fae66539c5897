//! Page framing: turning a buffered page holder into serialized header
//! bytes plus body bytes at a known on-disk offset, while accumulating the
//! column-level aggregates the file writer needs at end-of-chunk.
//!
//! Concatenation order on disk is `[header][body]` for v1 pages and
//! `[header][rl][dl][values]` for v2 pages. The offset recorded for each
//! page is the absolute position at which its *body* begins.

use std::collections::HashSet;

use crate::encoding::Encoding;
use crate::error::ColpressError;
use crate::page::header::{PageHeaderCodec, PageHeaderWithOffset};
use crate::page::holder::{PageV1Holder, PageV2Holder};

/// Frames pages and accumulates per-column aggregates across them.
#[derive(Debug, Default)]
pub struct PageFramer {
    header_codec: PageHeaderCodec,
    // One scratch buffer reused across pages; headers are serialized here
    // before landing in the output stream.
    scratch: Vec<u8>,
    uncompressed_length: u64,
    compressed_length: u64,
    rl_encodings: HashSet<Encoding>,
    dl_encodings: HashSet<Encoding>,
    data_encodings: Vec<Encoding>,
}

impl PageFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames a v1 page at `current_pos`, appending header and body to
    /// `out`.
    pub fn frame_v1(
        &mut self,
        holder: &PageV1Holder,
        current_pos: u64,
        out: &mut Vec<u8>,
    ) -> Result<PageHeaderWithOffset, ColpressError> {
        let uncompressed_size = holder.uncompressed_page_body_size();
        let body = holder.body();
        let compressed_size = body.len() as u64;

        self.scratch.clear();
        let header = self.header_codec.write_data_page_header(
            uncompressed_size,
            compressed_size,
            holder.value_count(),
            holder.statistics(),
            holder.rl_encoding(),
            holder.dl_encoding(),
            holder.values_encoding(),
            &mut self.scratch,
        )?;

        self.uncompressed_length += uncompressed_size;
        self.compressed_length += compressed_size;

        // Appending into one output buffer means a single concatenated
        // allocation reaches the file writer.
        out.extend_from_slice(&self.scratch);
        out.extend_from_slice(body);

        self.rl_encodings.insert(holder.rl_encoding());
        self.dl_encodings.insert(holder.dl_encoding());
        self.data_encodings.push(holder.values_encoding());

        Ok(PageHeaderWithOffset {
            header,
            offset: current_pos + self.scratch.len() as u64,
        })
    }

    /// Frames a v2 page at `current_pos`, appending header, level streams,
    /// and values body to `out`.
    pub fn frame_v2(
        &mut self,
        holder: &PageV2Holder,
        current_pos: u64,
        out: &mut Vec<u8>,
    ) -> Result<PageHeaderWithOffset, ColpressError> {
        let rl_byte_len = holder.rep_levels().len() as u64;
        let dl_byte_len = holder.def_levels().len() as u64;
        let uncompressed_size = holder.uncompressed_values_size() + rl_byte_len + dl_byte_len;
        let compressed_size = holder.values().len() as u64 + rl_byte_len + dl_byte_len;

        self.scratch.clear();
        let header = self.header_codec.write_data_page_v2_header(
            uncompressed_size,
            compressed_size,
            holder.value_count(),
            holder.null_count(),
            holder.row_count(),
            holder.statistics(),
            holder.values_encoding(),
            rl_byte_len,
            dl_byte_len,
            &mut self.scratch,
        )?;

        self.uncompressed_length += uncompressed_size;
        self.compressed_length += compressed_size;

        out.extend_from_slice(&self.scratch);
        out.extend_from_slice(holder.rep_levels());
        out.extend_from_slice(holder.def_levels());
        out.extend_from_slice(holder.values());

        // Repetition/definition level encodings are a v1 concern; only the
        // values encoding is recorded for v2 pages.
        self.data_encodings.push(holder.values_encoding());

        Ok(PageHeaderWithOffset {
            header,
            offset: current_pos + self.scratch.len() as u64,
        })
    }

    /// Records an encoding in the ordered data-encodings list without
    /// framing a page. Used for the dictionary page's own encoding.
    pub fn push_data_encoding(&mut self, encoding: Encoding) {
        self.data_encodings.push(encoding);
    }

    pub fn uncompressed_length(&self) -> u64 {
        self.uncompressed_length
    }

    pub fn compressed_length(&self) -> u64 {
        self.compressed_length
    }

    pub fn rl_encodings(&self) -> &HashSet<Encoding> {
        &self.rl_encodings
    }

    pub fn dl_encodings(&self) -> &HashSet<Encoding> {
        &self.dl_encodings
    }

    pub fn data_encodings(&self) -> &[Encoding] {
        &self.data_encodings
    }

    /// Resets all aggregates at end-of-chunk.
    pub fn clear(&mut self) {
        self.uncompressed_length = 0;
        self.compressed_length = 0;
        self.rl_encodings.clear();
        self.dl_encodings.clear();
        self.data_encodings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;
    use crate::statistics::Statistics;
    use crate::types::PhysicalType;
    use std::sync::Arc;

    fn plain_v1_holder(body: Vec<u8>) -> PageV1Holder {
        let uncompressed = body.len() as u64;
        PageV1Holder::new(
            Arc::new(ColumnDescriptor::required("c", PhysicalType::Int32)),
            body,
            3,
            Statistics::new_for(PhysicalType::Int32),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
            true,
            uncompressed,
        )
    }

    #[test]
    fn test_frame_v1_offset_points_past_header() {
        let mut framer = PageFramer::new();
        let holder = plain_v1_holder(vec![1, 2, 3, 4]);
        let mut out = Vec::new();

        let framed = framer.frame_v1(&holder, 1000, &mut out).unwrap();
        let header_len = out.len() - 4;
        assert_eq!(framed.offset, 1000 + header_len as u64);
        assert_eq!(&out[header_len..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_aggregates_accumulate_across_pages() {
        let mut framer = PageFramer::new();
        let mut out = Vec::new();

        framer.frame_v1(&plain_v1_holder(vec![0; 10]), 0, &mut out).unwrap();
        framer.frame_v1(&plain_v1_holder(vec![0; 6]), 100, &mut out).unwrap();

        assert_eq!(framer.uncompressed_length(), 16);
        assert_eq!(framer.compressed_length(), 16);
        assert_eq!(framer.data_encodings(), &[Encoding::Plain, Encoding::Plain]);
        assert_eq!(framer.rl_encodings().len(), 1);

        framer.clear();
        assert_eq!(framer.uncompressed_length(), 0);
        assert!(framer.data_encodings().is_empty());
    }

    #[test]
    fn test_frame_v1_oversized_claim_fails() {
        let mut framer = PageFramer::new();
        let holder = PageV1Holder::new(
            Arc::new(ColumnDescriptor::required("c", PhysicalType::Int32)),
            vec![0; 4],
            1,
            Statistics::new_for(PhysicalType::Int32),
            Encoding::Rle,
            Encoding::Rle,
            Encoding::Plain,
            true,
            1u64 << 31,
        );
        let mut out = Vec::new();
        let result = framer.frame_v1(&holder, 0, &mut out);
        assert!(matches!(result, Err(ColpressError::PageTooLarge(_))));
    }
}
