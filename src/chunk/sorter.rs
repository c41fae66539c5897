//! Dictionary sorting with id remapping.
//!
//! When every page of a chunk stayed dictionary encoded, the dictionary is
//! kept and its entries are reordered into the type's natural order, which
//! improves downstream compression of the entry payload. Every buffered
//! page's id stream is rewritten from old ids to new ids, and the sorted
//! dictionary page is what reaches the file writer.

use log::debug;

use crate::config::WriterProperties;
use crate::encoding::dictionary::{DictIdReader, DictionaryEntries};
use crate::error::ColpressError;
use crate::page::holder::PageHolder;
use crate::page::DictionaryPage;
use crate::schema::ColumnDescriptor;

/// A dictionary rebuilt in sorted order, with the `old id -> new id`
/// mapping derived from the sort permutation.
#[derive(Debug)]
pub struct SortedDictionary {
    sorted_page: DictionaryPage,
    id_map: Vec<u32>,
}

impl SortedDictionary {
    /// Decodes the buffered dictionary page and builds the sorted entry set
    /// plus the id mapping. The page encoding is preserved.
    pub fn new(
        page: &DictionaryPage,
        descriptor: &ColumnDescriptor,
    ) -> Result<Self, ColpressError> {
        let entries = DictionaryEntries::from_plain_bytes(
            page.bytes(),
            descriptor.physical_type(),
            page.num_entries(),
        )?;
        let (sorted_entries, id_map) = entries.sorted_with_mapping();

        let bytes = sorted_entries.to_plain_bytes();
        let uncompressed_size = bytes.len() as u64;
        let sorted_page = DictionaryPage::new(
            bytes,
            uncompressed_size,
            page.num_entries(),
            page.encoding(),
        );

        Ok(Self {
            sorted_page,
            id_map,
        })
    }

    pub fn new_id(&self, old_id: u32) -> Result<u32, ColpressError> {
        self.id_map.get(old_id as usize).copied().ok_or_else(|| {
            ColpressError::DictionaryError(format!(
                "Invalid dictionary id: {} (dictionary size is {})",
                old_id,
                self.id_map.len()
            ))
        })
    }

    pub fn size(&self) -> u32 {
        self.id_map.len() as u32
    }

    pub fn into_sorted_page(self) -> DictionaryPage {
        self.sorted_page
    }
}

/// Builds the sorted dictionary and rewrites every buffered page's id
/// stream against it. By precondition every buffered page is dictionary
/// encoded at this point.
pub(crate) fn sort_dictionary(
    descriptor: &ColumnDescriptor,
    properties: &WriterProperties,
    dictionary_page: &DictionaryPage,
    pages: &mut [PageHolder],
) -> Result<DictionaryPage, ColpressError> {
    debug!(
        "sorting dictionary for {}: {} entries across {} pages",
        descriptor,
        dictionary_page.num_entries(),
        pages.len()
    );

    let sorted = SortedDictionary::new(dictionary_page, descriptor)?;

    for holder in pages.iter_mut() {
        let non_null_count = holder.non_null_value_count()?;
        let mut id_writer = properties.new_dictionary_id_writer();
        {
            let values = holder.values_slice()?;
            let mut reader = DictIdReader::new(values, non_null_count as usize)?;
            for _ in 0..non_null_count {
                let old_id = reader.read_id()?;
                id_writer.put(sorted.new_id(old_id)?);
            }
        }

        // The page stays dictionary encoded; only the ids change.
        let encoding = holder.values_encoding();
        holder.update_data(id_writer.into_bytes(sorted.size())?, encoding)?;
    }

    Ok(sorted.into_sorted_page())
}
