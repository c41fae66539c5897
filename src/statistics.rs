//! Typed min/max/null-count statistics, tracked per page and merged into a
//! per-column total during buffering.
//!
//! Each physical type gets its own variant so comparisons stay in the
//! type's natural order: integers numerically, floats by total order,
//! byte arrays lexicographically. The wire embedding into page headers is
//! byte-oriented (`min_bytes`/`max_bytes`); the typed form also lands in
//! the file footer via serde.

use serde::{Deserialize, Serialize};

use crate::error::ColpressError;
use crate::types::PhysicalType;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Statistics {
    Boolean {
        min: Option<bool>,
        max: Option<bool>,
        null_count: u64,
    },
    Int32 {
        min: Option<i32>,
        max: Option<i32>,
        null_count: u64,
    },
    Int64 {
        min: Option<i64>,
        max: Option<i64>,
        null_count: u64,
    },
    Float {
        min: Option<f32>,
        max: Option<f32>,
        null_count: u64,
    },
    Double {
        min: Option<f64>,
        max: Option<f64>,
        null_count: u64,
    },
    ByteArray {
        min: Option<Vec<u8>>,
        max: Option<Vec<u8>>,
        null_count: u64,
    },
}

fn narrow<T: Copy + PartialOrd>(min: &mut Option<T>, max: &mut Option<T>, value: T) {
    match min {
        Some(m) if value >= *m => {}
        _ => *min = Some(value),
    }
    match max {
        Some(m) if value <= *m => {}
        _ => *max = Some(value),
    }
}

impl Statistics {
    /// Creates empty statistics appropriate for a column's primitive type.
    pub fn new_for(physical_type: PhysicalType) -> Self {
        match physical_type {
            PhysicalType::Boolean => Self::Boolean {
                min: None,
                max: None,
                null_count: 0,
            },
            PhysicalType::Int32 => Self::Int32 {
                min: None,
                max: None,
                null_count: 0,
            },
            PhysicalType::Int64 => Self::Int64 {
                min: None,
                max: None,
                null_count: 0,
            },
            PhysicalType::Float => Self::Float {
                min: None,
                max: None,
                null_count: 0,
            },
            PhysicalType::Double => Self::Double {
                min: None,
                max: None,
                null_count: 0,
            },
            PhysicalType::ByteArray => Self::ByteArray {
                min: None,
                max: None,
                null_count: 0,
            },
        }
    }

    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Self::Boolean { .. } => PhysicalType::Boolean,
            Self::Int32 { .. } => PhysicalType::Int32,
            Self::Int64 { .. } => PhysicalType::Int64,
            Self::Float { .. } => PhysicalType::Float,
            Self::Double { .. } => PhysicalType::Double,
            Self::ByteArray { .. } => PhysicalType::ByteArray,
        }
    }

    pub fn null_count(&self) -> u64 {
        match self {
            Self::Boolean { null_count, .. }
            | Self::Int32 { null_count, .. }
            | Self::Int64 { null_count, .. }
            | Self::Float { null_count, .. }
            | Self::Double { null_count, .. }
            | Self::ByteArray { null_count, .. } => *null_count,
        }
    }

    pub fn increment_null_count(&mut self, by: u64) {
        match self {
            Self::Boolean { null_count, .. }
            | Self::Int32 { null_count, .. }
            | Self::Int64 { null_count, .. }
            | Self::Float { null_count, .. }
            | Self::Double { null_count, .. }
            | Self::ByteArray { null_count, .. } => *null_count += by,
        }
    }

    pub fn update_bool(&mut self, value: bool) {
        if let Self::Boolean { min, max, .. } = self {
            narrow(min, max, value);
        }
    }

    pub fn update_i32(&mut self, value: i32) {
        if let Self::Int32 { min, max, .. } = self {
            narrow(min, max, value);
        }
    }

    pub fn update_i64(&mut self, value: i64) {
        if let Self::Int64 { min, max, .. } = self {
            narrow(min, max, value);
        }
    }

    pub fn update_f32(&mut self, value: f32) {
        if let Self::Float { min, max, .. } = self {
            if min.map_or(true, |m| value.total_cmp(&m).is_lt()) {
                *min = Some(value);
            }
            if max.map_or(true, |m| value.total_cmp(&m).is_gt()) {
                *max = Some(value);
            }
        }
    }

    pub fn update_f64(&mut self, value: f64) {
        if let Self::Double { min, max, .. } = self {
            if min.map_or(true, |m| value.total_cmp(&m).is_lt()) {
                *min = Some(value);
            }
            if max.map_or(true, |m| value.total_cmp(&m).is_gt()) {
                *max = Some(value);
            }
        }
    }

    pub fn update_bytes(&mut self, value: &[u8]) {
        if let Self::ByteArray { min, max, .. } = self {
            if min.as_deref().map_or(true, |m| value < m) {
                *min = Some(value.to_vec());
            }
            if max.as_deref().map_or(true, |m| value > m) {
                *max = Some(value.to_vec());
            }
        }
    }

    /// Merges per-page statistics into this running total.
    ///
    /// Both sides must carry the same physical type; the store creates one
    /// statistics value per column so a mismatch is a caller bug.
    pub fn merge(&mut self, other: &Statistics) -> Result<(), ColpressError> {
        if self.physical_type() != other.physical_type() {
            return Err(ColpressError::InternalError(format!(
                "Cannot merge {} statistics into {} statistics",
                other.physical_type(),
                self.physical_type()
            )));
        }

        self.increment_null_count(other.null_count());
        match other {
            Self::Boolean { min, max, .. } => {
                if let Some(v) = min {
                    self.update_bool(*v);
                }
                if let Some(v) = max {
                    self.update_bool(*v);
                }
            }
            Self::Int32 { min, max, .. } => {
                if let Some(v) = min {
                    self.update_i32(*v);
                }
                if let Some(v) = max {
                    self.update_i32(*v);
                }
            }
            Self::Int64 { min, max, .. } => {
                if let Some(v) = min {
                    self.update_i64(*v);
                }
                if let Some(v) = max {
                    self.update_i64(*v);
                }
            }
            Self::Float { min, max, .. } => {
                if let Some(v) = min {
                    self.update_f32(*v);
                }
                if let Some(v) = max {
                    self.update_f32(*v);
                }
            }
            Self::Double { min, max, .. } => {
                if let Some(v) = min {
                    self.update_f64(*v);
                }
                if let Some(v) = max {
                    self.update_f64(*v);
                }
            }
            Self::ByteArray { min, max, .. } => {
                if let Some(v) = min {
                    self.update_bytes(v);
                }
                if let Some(v) = max {
                    self.update_bytes(v);
                }
            }
        }
        Ok(())
    }

    /// The minimum value's wire bytes (LE for fixed-width types, raw for
    /// byte arrays), or `None` when no value was observed.
    pub fn min_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Boolean { min, .. } => min.map(|v| vec![v as u8]),
            Self::Int32 { min, .. } => min.map(|v| v.to_le_bytes().to_vec()),
            Self::Int64 { min, .. } => min.map(|v| v.to_le_bytes().to_vec()),
            Self::Float { min, .. } => min.map(|v| v.to_le_bytes().to_vec()),
            Self::Double { min, .. } => min.map(|v| v.to_le_bytes().to_vec()),
            Self::ByteArray { min, .. } => min.clone(),
        }
    }

    /// The maximum value's wire bytes, or `None` when no value was observed.
    pub fn max_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Boolean { max, .. } => max.map(|v| vec![v as u8]),
            Self::Int32 { max, .. } => max.map(|v| v.to_le_bytes().to_vec()),
            Self::Int64 { max, .. } => max.map(|v| v.to_le_bytes().to_vec()),
            Self::Float { max, .. } => max.map(|v| v.to_le_bytes().to_vec()),
            Self::Double { max, .. } => max.map(|v| v.to_le_bytes().to_vec()),
            Self::ByteArray { max, .. } => max.clone(),
        }
    }
}
