//! Value encodings: the `Encoding` contract plus the dictionary, level, and
//! fallback-values machinery built on the kernels.
//!
//! The chunk engine never encodes caller values itself; pages arrive already
//! encoded. What it does need is (a) to know whether an encoding references
//! a dictionary, (b) to materialize a dictionary from a buffered dictionary
//! page, and (c) to re-encode page values when the dictionary is abandoned
//! or sorted. That surface lives here.

pub mod dictionary;
pub mod levels;
pub mod values;

use serde::{Deserialize, Serialize};

use crate::error::ColpressError;
use crate::page::DictionaryPage;
use crate::schema::ColumnDescriptor;

/// The scheme used to encode a page's payload.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Values as-is: LE fixed width, one byte per boolean, length-prefixed
    /// byte arrays.
    Plain,
    /// `(value, run-length)` pairs. Used for level streams and as the
    /// boolean fallback values encoding.
    Rle,
    /// Dictionary ids, bit-packed; the dictionary page payload is plain.
    PlainDictionary,
    /// Dictionary ids, bit-packed, with run-aware id streams reserved for
    /// v2 pages. The buffering engine treats it identically to
    /// `PlainDictionary`.
    RleDictionary,
}

impl Encoding {
    /// Returns `true` if pages with this encoding reference a dictionary
    /// page and therefore cannot stand alone.
    pub fn uses_dictionary(&self) -> bool {
        matches!(self, Self::PlainDictionary | Self::RleDictionary)
    }

    /// The single-byte tag this encoding carries in page headers.
    pub fn wire_tag(&self) -> u8 {
        match self {
            Self::Plain => 0,
            Self::Rle => 1,
            Self::PlainDictionary => 2,
            Self::RleDictionary => 3,
        }
    }

    pub fn from_wire_tag(tag: u8) -> Result<Self, ColpressError> {
        match tag {
            0 => Ok(Self::Plain),
            1 => Ok(Self::Rle),
            2 => Ok(Self::PlainDictionary),
            3 => Ok(Self::RleDictionary),
            other => Err(ColpressError::FrameFormatError(format!(
                "Unknown encoding tag {}",
                other
            ))),
        }
    }

    /// Materializes an in-memory dictionary from a buffered dictionary page.
    ///
    /// Only dictionary encodings can do this; asking a plain encoding for a
    /// dictionary is a caller bug.
    pub fn init_dictionary(
        &self,
        descriptor: &ColumnDescriptor,
        page: &DictionaryPage,
    ) -> Result<dictionary::Dictionary, ColpressError> {
        if !self.uses_dictionary() {
            return Err(ColpressError::DictionaryError(format!(
                "Encoding {:?} does not reference a dictionary",
                self
            )));
        }
        dictionary::Dictionary::from_page(page, descriptor)
    }
}
