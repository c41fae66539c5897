//! Fallback values writers.
//!
//! When a dictionary is abandoned mid-chunk, every buffered page that was
//! dictionary-encoded is re-encoded with the column's fallback encoding:
//! plain for every type except booleans, which fall back to run-length.
//! The writers here are the sinks of that re-encode pump.

use crate::encoding::Encoding;
use crate::error::ColpressError;
use crate::kernels::{plain, rle};

/// Accumulates plain-encoded values.
#[derive(Debug, Default)]
pub struct PlainValuesWriter {
    buf: Vec<u8>,
}

impl PlainValuesWriter {
    pub fn put_i32(&mut self, value: i32) {
        plain::encode_fixed(&[value], &mut self.buf);
    }

    pub fn put_i64(&mut self, value: i64) {
        plain::encode_fixed(&[value], &mut self.buf);
    }

    pub fn put_f32(&mut self, value: f32) {
        plain::encode_fixed(&[value], &mut self.buf);
    }

    pub fn put_f64(&mut self, value: f64) {
        plain::encode_fixed(&[value], &mut self.buf);
    }

    pub fn put_bool(&mut self, value: bool) {
        plain::encode_bools(&[value], &mut self.buf);
    }

    pub fn put_bytes(&mut self, value: &[u8]) {
        plain::encode_byte_arrays(&[value], &mut self.buf);
    }
}

/// Accumulates boolean values for run-length encoding at finish time.
#[derive(Debug, Default)]
pub struct BooleanRleValuesWriter {
    values: Vec<u8>,
}

impl BooleanRleValuesWriter {
    pub fn put_bool(&mut self, value: bool) {
        self.values.push(value as u8);
    }
}

/// A fallback values writer, picked per column primitive type.
#[derive(Debug)]
pub enum FallbackEncoder {
    Plain(PlainValuesWriter),
    BooleanRle(BooleanRleValuesWriter),
}

impl FallbackEncoder {
    /// The encoding the rewritten page will carry.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Plain(_) => Encoding::Plain,
            Self::BooleanRle(_) => Encoding::Rle,
        }
    }

    pub fn put_i32(&mut self, value: i32) -> Result<(), ColpressError> {
        match self {
            Self::Plain(w) => {
                w.put_i32(value);
                Ok(())
            }
            Self::BooleanRle(_) => Err(type_mismatch("Int32")),
        }
    }

    pub fn put_i64(&mut self, value: i64) -> Result<(), ColpressError> {
        match self {
            Self::Plain(w) => {
                w.put_i64(value);
                Ok(())
            }
            Self::BooleanRle(_) => Err(type_mismatch("Int64")),
        }
    }

    pub fn put_f32(&mut self, value: f32) -> Result<(), ColpressError> {
        match self {
            Self::Plain(w) => {
                w.put_f32(value);
                Ok(())
            }
            Self::BooleanRle(_) => Err(type_mismatch("Float")),
        }
    }

    pub fn put_f64(&mut self, value: f64) -> Result<(), ColpressError> {
        match self {
            Self::Plain(w) => {
                w.put_f64(value);
                Ok(())
            }
            Self::BooleanRle(_) => Err(type_mismatch("Double")),
        }
    }

    pub fn put_bool(&mut self, value: bool) -> Result<(), ColpressError> {
        match self {
            Self::Plain(w) => {
                w.put_bool(value);
                Ok(())
            }
            Self::BooleanRle(w) => {
                w.put_bool(value);
                Ok(())
            }
        }
    }

    pub fn put_bytes(&mut self, value: &[u8]) -> Result<(), ColpressError> {
        match self {
            Self::Plain(w) => {
                w.put_bytes(value);
                Ok(())
            }
            Self::BooleanRle(_) => Err(type_mismatch("ByteArray")),
        }
    }

    /// Serializes the accumulated values into a page values section.
    pub fn into_bytes(self) -> Result<Vec<u8>, ColpressError> {
        match self {
            Self::Plain(w) => Ok(w.buf),
            Self::BooleanRle(w) => {
                let mut out = Vec::new();
                rle::encode(&w.values, &mut out)?;
                Ok(out)
            }
        }
    }
}

fn type_mismatch(value_type: &str) -> ColpressError {
    ColpressError::EncodingError(format!(
        "Boolean run-length fallback writer cannot accept {} values",
        value_type
    ))
}
