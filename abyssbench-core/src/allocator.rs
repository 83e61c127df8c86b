//! Allocation Tracking
//!
//! `TrackingAllocator` wraps the system allocator and keeps a process-wide
//! count of live heap bytes. Install it as the global allocator to get exact
//! live-byte memory deltas instead of resident-set snapshots:
//!
//! ```ignore
//! #[global_allocator]
//! static GLOBAL: abyssbench::TrackingAllocator = abyssbench::TrackingAllocator;
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static LIVE_BYTES: AtomicI64 = AtomicI64::new(0);
static ALLOC_COUNT: AtomicU64 = AtomicU64::new(0);

/// Global allocator that counts live bytes and allocation calls.
pub struct TrackingAllocator;

impl TrackingAllocator {
    #[inline(always)]
    fn record_alloc(size: usize) {
        LIVE_BYTES.fetch_add(size as i64, Ordering::Relaxed);
        ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    fn record_dealloc(size: usize) {
        LIVE_BYTES.fetch_sub(size as i64, Ordering::Relaxed);
    }
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded verbatim to the system allocator.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            Self::record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded verbatim to the system allocator.
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            Self::record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: caller guarantees `ptr` came from this allocator with `layout`.
        unsafe { System.dealloc(ptr, layout) };
        Self::record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: caller upholds the GlobalAlloc::realloc contract.
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            Self::record_dealloc(layout.size());
            Self::record_alloc(new_size);
        }
        new_ptr
    }
}

/// Live heap bytes as seen by the tracking allocator.
///
/// Always 0 when `TrackingAllocator` is not the global allocator.
pub fn live_bytes() -> i64 {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Total allocation calls observed since process start.
pub fn allocation_count() -> u64 {
    ALLOC_COUNT.load(Ordering::Relaxed)
}

/// Whether `TrackingAllocator` is the global allocator.
///
/// Checked once per process by making a heap allocation through the global
/// allocator and watching the counter. Direct calls to
/// `TrackingAllocator::alloc` from another thread at that same moment can
/// produce a false positive.
pub fn is_installed() -> bool {
    static INSTALLED: OnceLock<bool> = OnceLock::new();
    *INSTALLED.get_or_init(|| {
        let before = ALLOC_COUNT.load(Ordering::SeqCst);
        drop(std::hint::black_box(Box::new(0u64)));
        ALLOC_COUNT.load(Ordering::SeqCst) != before
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The test binary does not install the allocator, so drive it directly.
    #[test]
    fn test_alloc_and_dealloc_balance() {
        let before = live_bytes();
        let count_before = allocation_count();
        let layout = Layout::from_size_align(256, 8).unwrap();

        unsafe {
            let ptr = TrackingAllocator.alloc(layout);
            assert!(!ptr.is_null());
            assert!(live_bytes() - before >= 256);
            TrackingAllocator.dealloc(ptr, layout);
        }

        assert!(allocation_count() > count_before);
    }

    #[test]
    fn test_realloc_tracks_new_size() {
        let layout = Layout::from_size_align(64, 8).unwrap();

        unsafe {
            let ptr = TrackingAllocator.alloc(layout);
            assert!(!ptr.is_null());
            let grown = TrackingAllocator.realloc(ptr, layout, 4096);
            assert!(!grown.is_null());
            TrackingAllocator.dealloc(grown, Layout::from_size_align(4096, 8).unwrap());
        }
    }
}
