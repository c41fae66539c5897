//! The page-write store: one `ColumnChunkPageWriter` per column descriptor,
//! flushed in schema iteration order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::allocator::ByteBufferAllocator;
use crate::bridge::file_writer::ChunkFileWriter;
use crate::codec::BytesCompressor;
use crate::config::WriterProperties;
use crate::error::ColpressError;
use crate::schema::{ColumnDescriptor, MessageSchema};

use super::page_writer::ColumnChunkPageWriter;

/// Container mapping each column of a schema to its page writer.
pub struct PageWriteStore {
    writers: HashMap<String, ColumnChunkPageWriter>,
    schema: MessageSchema,
}

impl PageWriteStore {
    /// Builds a store with default properties around the given allocator.
    pub fn new(
        compressor: Arc<dyn BytesCompressor>,
        schema: MessageSchema,
        allocator: Arc<dyn ByteBufferAllocator>,
    ) -> Self {
        Self::with_properties(
            compressor,
            schema,
            Arc::new(WriterProperties::builder().with_allocator(allocator).build()),
        )
    }

    /// Builds a store from a full properties bundle.
    pub fn with_properties(
        compressor: Arc<dyn BytesCompressor>,
        schema: MessageSchema,
        properties: Arc<WriterProperties>,
    ) -> Self {
        let writers = schema
            .columns()
            .iter()
            .map(|descriptor| {
                (
                    descriptor.path().to_string(),
                    ColumnChunkPageWriter::new(
                        Arc::new(descriptor.clone()),
                        compressor.clone(),
                        properties.clone(),
                    ),
                )
            })
            .collect();
        Self { writers, schema }
    }

    pub fn schema(&self) -> &MessageSchema {
        &self.schema
    }

    /// The page writer for a column, or `None` for a descriptor not in the
    /// schema.
    pub fn page_writer_mut(
        &mut self,
        descriptor: &ColumnDescriptor,
    ) -> Option<&mut ColumnChunkPageWriter> {
        self.writers.get_mut(descriptor.path())
    }

    /// Finalizes every column, strictly sequentially, in schema iteration
    /// order. Ordering matters: the shared file writer's position advances
    /// column by column, so chunks land on disk exactly in schema order.
    ///
    /// A failure leaves the file writer mid-column; the store must be
    /// discarded.
    pub fn flush_to_file_writer(
        &mut self,
        writer: &mut dyn ChunkFileWriter,
    ) -> Result<(), ColpressError> {
        for descriptor in self.schema.columns() {
            let page_writer = self.writers.get_mut(descriptor.path()).ok_or_else(|| {
                ColpressError::InternalError(format!(
                    "No page writer for schema column {:?}",
                    descriptor.path()
                ))
            })?;
            page_writer.write_to_file_writer(writer)?;
        }
        Ok(())
    }
}
