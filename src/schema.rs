//! Schema representation: column descriptors and the message schema that
//! owns them.
//!
//! The engine only needs a flat view of the schema: an ordered list of
//! column descriptors, each carrying a dotted path, a primitive type, and
//! the maximum repetition/definition levels that decide whether v1 page
//! bodies carry level sections. Columns iterate in insertion order, which
//! is also the order chunks land on disk at flush time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::types::PhysicalType;

/// Identifies a single column: its dotted path, primitive type, and the
/// maximum repetition and definition levels of its position in the schema
/// tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    path: String,
    physical_type: PhysicalType,
    max_rep_level: u16,
    max_def_level: u16,
}

impl ColumnDescriptor {
    pub fn new(
        path: impl Into<String>,
        physical_type: PhysicalType,
        max_rep_level: u16,
        max_def_level: u16,
    ) -> Self {
        Self {
            path: path.into(),
            physical_type,
            max_rep_level,
            max_def_level,
        }
    }

    /// A required (non-nullable, non-repeated) top-level column.
    pub fn required(path: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self::new(path, physical_type, 0, 0)
    }

    /// An optional (nullable) top-level column: definition level 1 marks a
    /// present value, 0 a null.
    pub fn optional(path: impl Into<String>, physical_type: PhysicalType) -> Self {
        Self::new(path, physical_type, 0, 1)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    pub fn max_rep_level(&self) -> u16 {
        self.max_rep_level
    }

    pub fn max_def_level(&self) -> u16 {
        self.max_def_level
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.physical_type)
    }
}

/// The flat schema handed to the page-write store: an ordered list of column
/// descriptors with name lookup.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MessageSchema {
    columns: Vec<ColumnDescriptor>,
    #[serde(skip)]
    path_to_idx: HashMap<String, usize>,
}

impl MessageSchema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        let path_to_idx = columns
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.path.clone(), idx))
            .collect();
        Self {
            columns,
            path_to_idx,
        }
    }

    /// Columns in schema iteration order (the order they were declared).
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, path: &str) -> Option<&ColumnDescriptor> {
        // The lookup map is skipped by serde; fall back to a scan when the
        // schema was deserialized from a footer.
        if self.path_to_idx.is_empty() && !self.columns.is_empty() {
            return self.columns.iter().find(|c| c.path == path);
        }
        self.path_to_idx.get(path).map(|&idx| &self.columns[idx])
    }

    pub fn column_index(&self, path: &str) -> Option<usize> {
        if self.path_to_idx.is_empty() && !self.columns.is_empty() {
            return self.columns.iter().position(|c| c.path == path);
        }
        self.path_to_idx.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
