//! The single source of truth for writer configuration.
//!
//! `WriterProperties` is created once at the application boundary and passed
//! down through the store via a shared, read-only `Arc`. It owns the shared
//! byte-buffer allocator and the per-type encoder factories consulted during
//! dictionary fallback and sorting.

use std::fmt;
use std::sync::Arc;

use crate::allocator::{ByteBufferAllocator, HeapAllocator};
use crate::encoding::dictionary::DictIdWriter;
use crate::encoding::values::{BooleanRleValuesWriter, FallbackEncoder, PlainValuesWriter};
use crate::schema::ColumnDescriptor;
use crate::types::PhysicalType;

/// The unified configuration for a page-write store.
pub struct WriterProperties {
    allocator: Arc<dyn ByteBufferAllocator>,
}

impl WriterProperties {
    pub fn builder() -> WriterPropertiesBuilder {
        WriterPropertiesBuilder::default()
    }

    pub fn allocator(&self) -> &Arc<dyn ByteBufferAllocator> {
        &self.allocator
    }

    /// Constructs the values writer a page is rewritten with when the
    /// dictionary is abandoned: plain for every type except booleans, which
    /// fall back to run-length.
    pub fn new_fallback_values_writer(&self, descriptor: &ColumnDescriptor) -> FallbackEncoder {
        match descriptor.physical_type() {
            PhysicalType::Boolean => FallbackEncoder::BooleanRle(BooleanRleValuesWriter::default()),
            _ => FallbackEncoder::Plain(PlainValuesWriter::default()),
        }
    }

    /// Constructs the id writer used when rewriting a page against a sorted
    /// dictionary.
    pub fn new_dictionary_id_writer(&self) -> DictIdWriter {
        DictIdWriter::new()
    }
}

impl Default for WriterProperties {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for WriterProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterProperties").finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct WriterPropertiesBuilder {
    allocator: Option<Arc<dyn ByteBufferAllocator>>,
}

impl WriterPropertiesBuilder {
    pub fn with_allocator(mut self, allocator: Arc<dyn ByteBufferAllocator>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn build(self) -> WriterProperties {
        WriterProperties {
            allocator: self
                .allocator
                .unwrap_or_else(|| Arc::new(HeapAllocator::new())),
        }
    }
}
