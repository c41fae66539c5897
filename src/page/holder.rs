//! Buffered page holders.
//!
//! A holder owns one buffered page's bytes and metadata between submission
//! and emit. Two invariants shape the API:
//!
//! * `compressed` transitions false -> true at most once, via
//!   `compress_if_needed`, never the reverse. A rewrite under dictionary
//!   fallback or sorting installs freshly encoded bytes and resets the flag
//!   so the emit path compresses them.
//! * The values region is only addressable while the body is uncompressed;
//!   the fallback and sorting passes run strictly before emit-time
//!   compression, so a compressed body at that point is a logic error.

use std::sync::Arc;

use crate::codec::BytesCompressor;
use crate::encoding::levels;
use crate::encoding::Encoding;
use crate::error::ColpressError;
use crate::schema::ColumnDescriptor;
use crate::statistics::Statistics;

/// One buffered data page, v1 or v2.
#[derive(Debug)]
pub enum PageHolder {
    V1(PageV1Holder),
    V2(PageV2Holder),
}

impl PageHolder {
    pub fn values_encoding(&self) -> Encoding {
        match self {
            Self::V1(h) => h.values_encoding,
            Self::V2(h) => h.values_encoding,
        }
    }

    pub fn value_count(&self) -> u32 {
        match self {
            Self::V1(h) => h.value_count,
            Self::V2(h) => h.value_count,
        }
    }

    /// The count of values actually present in the values region. Only
    /// non-null positions are dictionary encoded.
    pub fn non_null_value_count(&self) -> Result<u64, ColpressError> {
        match self {
            Self::V1(h) => h.non_null_value_count(),
            Self::V2(h) => Ok(h.non_null_value_count()),
        }
    }

    /// Compresses the page body if it is still uncompressed. Idempotent.
    pub fn compress_if_needed(
        &mut self,
        compressor: &dyn BytesCompressor,
    ) -> Result<(), ColpressError> {
        match self {
            Self::V1(h) => h.compress_if_needed(compressor),
            Self::V2(h) => h.compress_if_needed(compressor),
        }
    }

    /// Replaces the page's values region with freshly encoded bytes and the
    /// encoding they carry. Resets the `compressed` flag.
    pub fn update_data(&mut self, values: Vec<u8>, encoding: Encoding) -> Result<(), ColpressError> {
        match self {
            Self::V1(h) => h.update_data(values, encoding),
            Self::V2(h) => h.update_data(values, encoding),
        }
    }

    /// The uncompressed values region, for the dictionary-based readers of
    /// the fallback and sorting passes.
    pub fn values_slice(&self) -> Result<&[u8], ColpressError> {
        match self {
            Self::V1(h) => h.values_slice(),
            Self::V2(h) => h.values_slice(),
        }
    }

    /// Bytes currently buffered for this page.
    pub fn buffered_size(&self) -> u64 {
        match self {
            Self::V1(h) => h.body.len() as u64,
            Self::V2(h) => (h.rep_levels.len() + h.def_levels.len() + h.values.len()) as u64,
        }
    }

    /// Releases the page's owned buffers.
    pub fn release(self) {
        drop(self);
    }
}

/// A buffered v1 page: level sections and values live concatenated in one
/// body that compresses as a unit.
#[derive(Debug)]
pub struct PageV1Holder {
    descriptor: Arc<ColumnDescriptor>,
    body: Vec<u8>,
    value_count: u32,
    statistics: Statistics,
    rl_encoding: Encoding,
    dl_encoding: Encoding,
    values_encoding: Encoding,
    compressed: bool,
    uncompressed_size: u64,
}

impl PageV1Holder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        descriptor: Arc<ColumnDescriptor>,
        body: Vec<u8>,
        value_count: u32,
        statistics: Statistics,
        rl_encoding: Encoding,
        dl_encoding: Encoding,
        values_encoding: Encoding,
        compressed: bool,
        uncompressed_size: u64,
    ) -> Self {
        Self {
            descriptor,
            body,
            value_count,
            statistics,
            rl_encoding,
            dl_encoding,
            values_encoding,
            compressed,
            uncompressed_size,
        }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn value_count(&self) -> u32 {
        self.value_count
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn rl_encoding(&self) -> Encoding {
        self.rl_encoding
    }

    pub fn dl_encoding(&self) -> Encoding {
        self.dl_encoding
    }

    pub fn values_encoding(&self) -> Encoding {
        self.values_encoding
    }

    /// The original uncompressed size of the full page body.
    pub fn uncompressed_page_body_size(&self) -> u64 {
        self.uncompressed_size
    }

    fn require_uncompressed(&self) -> Result<(), ColpressError> {
        if self.compressed {
            return Err(ColpressError::InternalError(
                "V1 page body is compressed; values are no longer addressable".to_string(),
            ));
        }
        Ok(())
    }

    /// Byte offset of the values region: skips the rl+dl level sections.
    pub fn data_offset(&self) -> Result<usize, ColpressError> {
        self.require_uncompressed()?;
        Ok(levels::split_v1_body(&self.body, &self.descriptor)?.data_offset)
    }

    pub fn values_slice(&self) -> Result<&[u8], ColpressError> {
        let offset = self.data_offset()?;
        Ok(&self.body[offset..])
    }

    /// Value count minus nulls derived from the definition level section.
    pub fn non_null_value_count(&self) -> Result<u64, ColpressError> {
        self.require_uncompressed()?;
        let split = levels::split_v1_body(&self.body, &self.descriptor)?;
        let nulls = levels::count_def_nulls(
            split.def_levels,
            self.value_count as usize,
            self.descriptor.max_def_level(),
        )?;
        Ok(u64::from(self.value_count) - nulls)
    }

    pub fn compress_if_needed(
        &mut self,
        compressor: &dyn BytesCompressor,
    ) -> Result<(), ColpressError> {
        if self.compressed {
            return Ok(());
        }
        self.body = compressor.compress(&self.body)?;
        self.compressed = true;
        Ok(())
    }

    /// Swaps in rewritten values, keeping the level sections in place.
    pub fn update_data(&mut self, values: Vec<u8>, encoding: Encoding) -> Result<(), ColpressError> {
        let offset = self.data_offset()?;
        self.body.truncate(offset);
        self.body.extend_from_slice(&values);
        self.values_encoding = encoding;
        self.compressed = false;
        self.uncompressed_size = self.body.len() as u64;
        Ok(())
    }
}

/// A buffered v2 page: level streams stay uncompressed and separate from
/// the values body, which is the only compressible region.
#[derive(Debug)]
pub struct PageV2Holder {
    #[allow(dead_code)]
    descriptor: Arc<ColumnDescriptor>,
    rep_levels: Vec<u8>,
    def_levels: Vec<u8>,
    values: Vec<u8>,
    row_count: u32,
    null_count: u32,
    value_count: u32,
    values_encoding: Encoding,
    statistics: Statistics,
    compressed: bool,
    uncompressed_values_size: u64,
}

impl PageV2Holder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        descriptor: Arc<ColumnDescriptor>,
        row_count: u32,
        null_count: u32,
        value_count: u32,
        rep_levels: Vec<u8>,
        def_levels: Vec<u8>,
        values_encoding: Encoding,
        values: Vec<u8>,
        statistics: Statistics,
        compressed: bool,
        uncompressed_values_size: u64,
    ) -> Self {
        Self {
            descriptor,
            rep_levels,
            def_levels,
            values,
            row_count,
            null_count,
            value_count,
            values_encoding,
            statistics,
            compressed,
            uncompressed_values_size,
        }
    }

    pub fn rep_levels(&self) -> &[u8] {
        &self.rep_levels
    }

    pub fn def_levels(&self) -> &[u8] {
        &self.def_levels
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn null_count(&self) -> u32 {
        self.null_count
    }

    pub fn value_count(&self) -> u32 {
        self.value_count
    }

    pub fn values_encoding(&self) -> Encoding {
        self.values_encoding
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn uncompressed_values_size(&self) -> u64 {
        self.uncompressed_values_size
    }

    pub fn non_null_value_count(&self) -> u64 {
        u64::from(self.value_count) - u64::from(self.null_count)
    }

    pub fn values_slice(&self) -> Result<&[u8], ColpressError> {
        if self.compressed {
            return Err(ColpressError::InternalError(
                "V2 values body is compressed; values are no longer addressable".to_string(),
            ));
        }
        Ok(&self.values)
    }

    pub fn compress_if_needed(
        &mut self,
        compressor: &dyn BytesCompressor,
    ) -> Result<(), ColpressError> {
        if self.compressed {
            return Ok(());
        }
        self.values = compressor.compress(&self.values)?;
        self.compressed = true;
        Ok(())
    }

    pub fn update_data(&mut self, values: Vec<u8>, encoding: Encoding) -> Result<(), ColpressError> {
        if self.compressed {
            return Err(ColpressError::InternalError(
                "Cannot rewrite a compressed v2 values body".to_string(),
            ));
        }
        self.uncompressed_values_size = values.len() as u64;
        self.values = values;
        self.values_encoding = encoding;
        Ok(())
    }
}
