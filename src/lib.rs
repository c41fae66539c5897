//! This file is the root of the `colpress` Rust crate.
//!
//! `colpress` is the per-column page buffering and finalization engine of a
//! columnar file writer. For each column of a schema it accepts a stream of
//! already-encoded data pages (two page-format variants, v1 and v2) plus an
//! optional dictionary page, buffers them in memory, and at flush time writes
//! a single contiguous column chunk to a downstream file writer.
//!
//! The interesting machinery lives in three places:
//! 1.  Deferred encoding commitment: pages arrive dictionary-encoded
//!     speculatively, and the dictionary is either kept (and sorted) or
//!     retroactively abandoned with every affected page re-encoded.
//! 2.  Dictionary sorting with id remapping across all buffered pages.
//! 3.  Binary-exact page framing, where every serialized header and byte
//!     offset must describe the layout the file writer observes on disk.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod allocator;
pub mod bridge;
pub mod chunk;
pub mod codec;
pub mod config;
pub mod encoding;
pub mod error;
pub mod kernels;
pub mod page;
pub mod schema;
pub mod statistics;
pub mod types;

mod utils;
