//! Allocations - Exact heap deltas with `TrackingAllocator`
//!
//! Installing `TrackingAllocator` as the global allocator lets the harness read
//! live heap bytes instead of the resident set size, so the
//! `Used memory` figures below reflect exactly what each closure keeps alive.
//!
//! Run with: cargo run --example allocations -p abyssbench-demos --release

use abyssbench::{Harness, MemorySource, TrackingAllocator, allocation_count, live_bytes};

// Install the tracking allocator for the entire process.
#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn main() -> abyssbench::Result<()> {
    let harness = Harness::new(MemorySource::Allocator);
    println!("memory source: {:?}", harness.memory_source());

    // Retained: every run leaks a 1 MiB buffer into `kept`.
    let mut kept: Vec<Vec<u8>> = Vec::new();
    println!(
        "{}",
        harness.benchmark_section_with("Retain 1 MiB", 10, || kept.push(vec![0u8; 1 << 20]))?
    );

    // Transient: the buffer is dropped before the end snapshot.
    println!(
        "{}",
        harness.benchmark_section_with("Transient 1 MiB", 10, || vec![0u8; 1 << 20].len())?
    );

    // Released: each run frees one retained buffer, so the delta is negative.
    println!(
        "{}",
        harness.benchmark_section_with("Release 1 MiB", 10, || kept.pop())?
    );

    println!(
        "live: {} bytes, allocations: {}",
        live_bytes(),
        allocation_count()
    );
    Ok(())
}
