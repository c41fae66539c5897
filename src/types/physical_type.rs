//! This module defines the canonical, type-safe representation of the
//! primitive column types used throughout the colpress pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical, internal representation of a column's primitive type.
///
/// The physical type drives three decisions in the engine: which statistics
/// implementation a column carries, how dictionary entries are decoded and
/// compared, and which fallback encoding a page is rewritten with when the
/// dictionary is abandoned.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    ByteArray,
}

impl PhysicalType {
    /// Fixed element size in bytes, or `None` for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Boolean => Some(1),
            Self::Int32 | Self::Float => Some(4),
            Self::Int64 | Self::Double => Some(8),
            Self::ByteArray => None,
        }
    }

    /// Returns `true` if values of this type can be dictionary encoded.
    ///
    /// Boolean columns never are: two distinct values cannot justify a
    /// dictionary, and the fallback path assumes one exists.
    pub fn supports_dictionary(&self) -> bool {
        !matches!(self, Self::Boolean)
    }
}

/// Provides the canonical string representation for a `PhysicalType`.
impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(PhysicalType::Boolean.fixed_size(), Some(1));
        assert_eq!(PhysicalType::Int32.fixed_size(), Some(4));
        assert_eq!(PhysicalType::Float.fixed_size(), Some(4));
        assert_eq!(PhysicalType::Int64.fixed_size(), Some(8));
        assert_eq!(PhysicalType::Double.fixed_size(), Some(8));
        assert_eq!(PhysicalType::ByteArray.fixed_size(), None);
    }

    #[test]
    fn test_dictionary_support() {
        assert!(PhysicalType::Int32.supports_dictionary());
        assert!(PhysicalType::ByteArray.supports_dictionary());
        assert!(!PhysicalType::Boolean.supports_dictionary());
    }

    #[test]
    fn test_display_matches_debug() {
        assert_eq!(PhysicalType::Int64.to_string(), "Int64");
        assert_eq!(PhysicalType::ByteArray.to_string(), "ByteArray");
    }
}
