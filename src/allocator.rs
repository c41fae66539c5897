//! The byte-buffer allocator contract shared by every column's page writer.
//!
//! Buffers are opaque byte regions: the engine fills them, keeps them alive
//! for the lifetime of the buffered chunk, and hands every one of them back
//! through `release` exactly once at end-of-chunk. Nothing is released
//! piecewise on intermediate rewrites; a dictionary buffer must outlive any
//! reader still decoding against it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// The allocator contract.
pub trait ByteBufferAllocator: Send + Sync + fmt::Debug {
    /// Returns an empty buffer with at least `capacity` bytes reserved.
    fn allocate(&self, capacity: usize) -> Vec<u8>;

    /// Returns a buffer to the allocator. Called exactly once per buffer,
    /// at end-of-chunk.
    fn release(&self, buffer: Vec<u8>);
}

/// The default allocator: plain heap vectors, with a running count of live
/// allocations so tests can assert balanced release.
#[derive(Debug, Default)]
pub struct HeapAllocator {
    outstanding: AtomicU64,
}

impl HeapAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated buffers not yet released.
    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::Relaxed)
    }
}

impl ByteBufferAllocator for HeapAllocator {
    fn allocate(&self, capacity: usize) -> Vec<u8> {
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        Vec::with_capacity(capacity)
    }

    fn release(&self, buffer: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        drop(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_allocator_balances() {
        let allocator = HeapAllocator::new();
        let a = allocator.allocate(16);
        let b = allocator.allocate(32);
        assert_eq!(allocator.outstanding(), 2);

        allocator.release(a);
        allocator.release(b);
        assert_eq!(allocator.outstanding(), 0);
    }

    #[test]
    fn test_allocate_reserves_capacity() {
        let allocator = HeapAllocator::new();
        let buf = allocator.allocate(1024);
        assert!(buf.capacity() >= 1024);
        assert!(buf.is_empty());
        allocator.release(buf);
    }
}
