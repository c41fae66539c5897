//! Dictionary abandonment.
//!
//! Pages arrive dictionary-encoded as a guess. If any page in the chunk did
//! not use the dictionary, the dictionary becomes dead weight and the pages
//! encoded against it could never be decoded by a reader that will not see
//! it. The fix is retroactive: materialize the dictionary one last time,
//! pump every still-dictionary-encoded page through it into the column's
//! fallback values writer, and drop the dictionary.

use log::debug;

use crate::config::WriterProperties;
use crate::encoding::dictionary::DictIdReader;
use crate::error::ColpressError;
use crate::page::holder::PageHolder;
use crate::page::DictionaryPage;
use crate::schema::ColumnDescriptor;

/// Re-encodes every dictionary-encoded buffered page with the column's
/// fallback encoding. Pages already carrying a non-dictionary encoding are
/// left untouched.
pub(crate) fn abandon_dictionary(
    descriptor: &ColumnDescriptor,
    properties: &WriterProperties,
    dictionary_page: &DictionaryPage,
    pages: &mut [PageHolder],
) -> Result<(), ColpressError> {
    debug!(
        "abandoning dictionary for {}: not all pages stayed dictionary encoded",
        descriptor
    );

    let dictionary = dictionary_page
        .encoding()
        .init_dictionary(descriptor, dictionary_page)?;

    for holder in pages.iter_mut() {
        if !holder.values_encoding().uses_dictionary() {
            continue;
        }

        let non_null_count = holder.non_null_value_count()?;
        let mut values_writer = properties.new_fallback_values_writer(descriptor);
        {
            let values = holder.values_slice()?;
            let mut reader = DictIdReader::new(values, non_null_count as usize)?;
            for _ in 0..non_null_count {
                dictionary.copy_value(reader.read_id()?, &mut values_writer)?;
            }
        }

        let encoding = values_writer.encoding();
        holder.update_data(values_writer.into_bytes()?, encoding)?;
    }

    Ok(())
}
