//! Page-level building blocks: the dictionary page, the buffered page
//! holders, and the page header wire format.

pub mod header;
pub mod holder;

use crate::encoding::Encoding;

/// A column chunk's dictionary page: the distinct values, plain-encoded,
/// referenced by index from subsequent data pages.
///
/// While buffered the bytes are uncompressed; compression is deferred to
/// emit time so an abandoned dictionary costs no compression work.
#[derive(Debug, Clone)]
pub struct DictionaryPage {
    bytes: Vec<u8>,
    uncompressed_size: u64,
    num_entries: u32,
    encoding: Encoding,
}

impl DictionaryPage {
    pub fn new(bytes: Vec<u8>, uncompressed_size: u64, num_entries: u32, encoding: Encoding) -> Self {
        Self {
            bytes,
            uncompressed_size,
            num_entries,
            encoding,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    pub fn num_entries(&self) -> u32 {
        self.num_entries
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Surrenders the underlying buffer, for release back to the allocator.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
