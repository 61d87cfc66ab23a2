// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bump-pointer arena over a fixed, zero-initialized byte region.
//!
//! The [`Arena`] is the single allocator behind all tensor storage. It hands
//! out raw byte ranges from a region of fixed capacity and never frees an
//! individual allocation — the whole region is released when the arena (and
//! therefore its owning isolate) is dropped.
//!
//! # Allocation direction
//! The watermark starts at the *top* of the region and moves *down*. This
//! keeps alignment bookkeeping to a single mask operation and makes the
//! consumed-bytes query a plain subtraction.
//!
//! # Failure
//! Exhaustion is fatal. Tensor storage that does not fit the configured
//! capacity is a configuration error, not a runtime condition to recover
//! from, so [`Arena::alloc_raw`] never returns a failure value.
//!
//! # Thread Safety
//! The watermark and allocation counter are atomics; `Arena` is
//! `Send + Sync` and allocation takes `&self`.

use crate::{ArenaCapacity, ArenaStats};
use std::alloc::{self, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Region alignment. Covers every scalar alignment the kernels use.
const REGION_ALIGN: usize = 64;

/// A fixed-capacity bump allocator serving raw aligned byte ranges.
///
/// # Example
/// ```
/// use tensor_arena::{Arena, ArenaCapacity};
///
/// let arena = Arena::new(ArenaCapacity::from_kib(4));
/// let p = arena.alloc_aligned(64, 32);
/// assert_eq!(p.as_ptr() as usize % 32, 0);
/// assert_eq!(arena.num_allocations(), 1);
/// ```
pub struct Arena {
    /// Base address of the region.
    region: NonNull<u8>,
    /// Region size in bytes.
    capacity: usize,
    /// Offset of the watermark from the region base. Starts at `capacity`
    /// and only ever decreases.
    watermark: AtomicUsize,
    /// Number of allocations served.
    num_allocs: AtomicUsize,
}

impl Arena {
    /// Allocates a zero-initialized region of the given capacity.
    ///
    /// # Panics
    /// Panics if the capacity is zero or the system allocator fails.
    pub fn new(capacity: ArenaCapacity) -> Self {
        let bytes = capacity.as_bytes();
        if bytes == 0 {
            tracing::error!("cannot create arena with zero capacity");
            panic!("cannot create arena with zero capacity");
        }
        let layout = Layout::from_size_align(bytes, REGION_ALIGN)
            .expect("arena capacity does not form a valid layout");
        // SAFETY: layout has non-zero size; the region is owned exclusively
        // by this arena and freed in `Drop` with the same layout.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let region = match NonNull::new(raw) {
            Some(p) => p,
            None => alloc::handle_alloc_error(layout),
        };
        tracing::info!("created arena region of {capacity}");
        Self {
            region,
            capacity: bytes,
            watermark: AtomicUsize::new(bytes),
            num_allocs: AtomicUsize::new(0),
        }
    }

    /// Serves `size` bytes from the region without alignment guarantees
    /// beyond the region's own.
    ///
    /// # Panics
    /// Panics when the remaining region is smaller than `size`.
    pub fn alloc_raw(&self, size: usize) -> NonNull<u8> {
        let offset = self
            .watermark
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |top| top.checked_sub(size))
            .unwrap_or_else(|top| {
                tracing::error!(
                    "arena exhausted: requested {size} bytes, {top} of {} remaining",
                    self.capacity
                );
                panic!(
                    "arena exhausted: requested {size} bytes, {top} of {} remaining",
                    self.capacity
                );
            })
            - size;
        self.num_allocs.fetch_add(1, Ordering::SeqCst);
        // SAFETY: `offset + size <= capacity` is guaranteed by the
        // checked_sub above, so the result stays inside the region.
        unsafe { NonNull::new_unchecked(self.region.as_ptr().add(offset)) }
    }

    /// Serves `size` bytes whose address is a multiple of `align`.
    ///
    /// Over-allocates by `align - 1` and masks the address up, so the
    /// consumed byte count includes the padding.
    ///
    /// # Panics
    /// Panics when `align` is not a power of two or the region is exhausted.
    pub fn alloc_aligned(&self, size: usize, align: usize) -> NonNull<u8> {
        assert!(
            align.is_power_of_two(),
            "alignment {align} is not a power of two"
        );
        let mask = align - 1;
        let raw = self.alloc_raw(size + mask).as_ptr() as usize;
        let aligned = (raw + mask) & !mask;
        // SAFETY: `aligned` lies within the padded range just allocated and
        // `aligned + size` does not exceed its end.
        unsafe { NonNull::new_unchecked(aligned as *mut u8) }
    }

    /// Returns the fixed capacity of the region in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of bytes consumed so far (including alignment
    /// padding).
    pub fn bytes_allocated(&self) -> usize {
        self.capacity - self.watermark.load(Ordering::SeqCst)
    }

    /// Returns the number of bytes still available.
    pub fn remaining(&self) -> usize {
        self.watermark.load(Ordering::SeqCst)
    }

    /// Returns the number of allocations served.
    pub fn num_allocations(&self) -> usize {
        self.num_allocs.load(Ordering::SeqCst)
    }

    /// Returns a snapshot of the arena's usage counters.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity_bytes: self.capacity,
            bytes_allocated: self.bytes_allocated(),
            num_allocations: self.num_allocations(),
        }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: the region was allocated in `new` with exactly this layout
        // and is not referenced after the arena is gone — tensors hold their
        // isolate (and thus this arena) alive for as long as they exist.
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, REGION_ALIGN);
            alloc::dealloc(self.region.as_ptr(), layout);
        }
    }
}

// SAFETY: the region pointer is exclusively owned and all interior
// mutability goes through atomics.
unsafe impl Send for Arena {}
unsafe impl Sync for Arena {}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("bytes_allocated", &self.bytes_allocated())
            .field("num_allocations", &self.num_allocations())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_region() {
        let arena = Arena::new(ArenaCapacity::from_bytes(0xff));
        assert_eq!(arena.capacity(), 0xff);
        assert_eq!(arena.bytes_allocated(), 0);
        assert_eq!(arena.num_allocations(), 0);
        assert_eq!(arena.remaining(), 0xff);
    }

    #[test]
    fn test_alloc_unaligned() {
        let arena = Arena::new(ArenaCapacity::from_bytes(0xff));
        let p = arena.alloc_raw(4);
        assert_eq!(arena.num_allocations(), 1);
        assert_eq!(arena.bytes_allocated(), 4);
        // The region is writable.
        unsafe { p.as_ptr().cast::<u32>().write_unaligned(0xdead_beef) };
        assert_eq!(unsafe { p.as_ptr().cast::<u32>().read_unaligned() }, 0xdead_beef);
    }

    #[test]
    fn test_alloc_aligned() {
        let arena = Arena::new(ArenaCapacity::from_bytes(0xff));
        let p = arena.alloc_aligned(4, 32);
        assert_eq!(arena.num_allocations(), 1);
        // Aligned allocation consumes the padding too.
        assert_eq!(arena.bytes_allocated(), 32 + 4 - 1);
        assert_eq!(p.as_ptr() as usize % 32, 0);
    }

    #[test]
    fn test_alignment_sweep() {
        let arena = Arena::new(ArenaCapacity::from_kib(4));
        for align in [1usize, 2, 4, 8, 16, 32, 64] {
            let p = arena.alloc_aligned(8, align);
            assert_eq!(p.as_ptr() as usize % align, 0, "align {align}");
        }
    }

    #[test]
    fn test_accounting_lower_bound() {
        let arena = Arena::new(ArenaCapacity::from_kib(64));
        let sizes = [13usize, 256, 1, 4096, 77];
        for (i, s) in sizes.iter().enumerate() {
            let _ = arena.alloc_raw(*s);
            assert_eq!(arena.num_allocations(), i + 1);
        }
        assert!(arena.bytes_allocated() >= sizes.iter().sum());
        assert_eq!(arena.num_allocations(), sizes.len());
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn test_exhaustion_is_fatal() {
        let arena = Arena::new(ArenaCapacity::from_bytes(4096));
        let _ = arena.alloc_raw(4097);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn test_exhaustion_after_partial_use() {
        let arena = Arena::new(ArenaCapacity::from_bytes(64));
        let _ = arena.alloc_raw(60);
        let _ = arena.alloc_raw(8);
    }

    #[test]
    #[should_panic(expected = "not a power of two")]
    fn test_bad_alignment() {
        let arena = Arena::new(ArenaCapacity::from_bytes(64));
        let _ = arena.alloc_aligned(4, 3);
    }

    #[test]
    fn test_region_is_zeroed() {
        let arena = Arena::new(ArenaCapacity::from_bytes(256));
        let p = arena.alloc_raw(256);
        let bytes = unsafe { std::slice::from_raw_parts(p.as_ptr(), 256) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_allocations_do_not_overlap() {
        let arena = Arena::new(ArenaCapacity::from_bytes(1024));
        let a = arena.alloc_raw(128).as_ptr() as usize;
        let b = arena.alloc_raw(128).as_ptr() as usize;
        // Downward bump: the second allocation sits strictly below the first.
        assert!(b + 128 <= a);
    }

    #[test]
    fn test_stats_snapshot() {
        let arena = Arena::new(ArenaCapacity::from_bytes(512));
        let _ = arena.alloc_raw(100);
        let stats = arena.stats();
        assert_eq!(stats.capacity_bytes, 512);
        assert_eq!(stats.bytes_allocated, 100);
        assert_eq!(stats.num_allocations, 1);
    }

    #[test]
    fn test_debug_format() {
        let arena = Arena::new(ArenaCapacity::from_bytes(64));
        let dbg = format!("{arena:?}");
        assert!(dbg.contains("Arena"));
        assert!(dbg.contains("capacity"));
    }
}
