//! This module defines the single, unified error type for the entire colpress
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use thiserror::Error;

/// The maximum size, in bytes, any single page-header size field may describe.
/// Header size fields are 32-bit signed on disk.
pub const MAX_PAGE_SIZE: u64 = i32::MAX as u64;

#[derive(Error, Debug)]
pub enum ColpressError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to the chunk engine)
    // =========================================================================
    #[error("Cannot write page larger than {MAX_PAGE_SIZE} bytes: {0}")]
    PageTooLarge(u64),

    #[error("Only one dictionary page is allowed per column chunk")]
    DuplicateDictionary,

    #[error("Invalid page type {0}")]
    InvalidPageType(u8),

    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Frame serialization/deserialization failed: {0}")]
    FrameFormatError(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, raised during footer serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    // =========================================================================
    // === Low-Level Encoding/Kernel Errors
    // =========================================================================
    #[error("Value encoding failed: {0}")]
    EncodingError(String),

    #[error("Dictionary encoding/decoding failed: {0}")]
    DictionaryError(String),

    #[error("RLE decoding error: {0}")]
    RleDecodeError(String),

    #[error("LEB128 decoding error: {0}")]
    Leb128DecodeError(String),

    #[error("Bitpack decoding failed due to truncated buffer or data corruption")]
    BitpackDecodeError,

    #[error("Bitpack encoding error: value {0} exceeds bit width {1}")]
    BitpackEncodeError(u64, u8),

    #[error("Zstd operation failed: {0}")]
    ZstdError(String),
}

/// Checks a size against the 32-bit signed page-size ceiling.
///
/// Every size field that lands in a page header passes through this check;
/// a value past the ceiling fails with `PageTooLarge`.
pub fn to_i32_with_check(size: u64) -> Result<i32, ColpressError> {
    if size > MAX_PAGE_SIZE {
        return Err(ColpressError::PageTooLarge(size));
    }
    Ok(size as i32)
}
