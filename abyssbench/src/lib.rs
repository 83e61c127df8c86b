#![warn(missing_docs)]
//! # AbyssBench
//!
//! Micro-benchmark harness for ad-hoc performance probing.
//!
//! AbyssBench measures wall-clock time and memory footprint change of
//! arbitrary code:
//! - **Tag-based discovery**: `#[benchmarks]` turns an `impl` block into an
//!   operation registry; methods marked `#[benchmark]` are run in order
//! - **Warm-up**: every measurement is preceded by untimed invocations
//! - **Memory deltas**: live heap bytes from `TrackingAllocator`, or the
//!   resident set size when no tracking allocator is installed
//! - **Sections**: average a closure over many runs
//! - **Runner**: `abyssbench::run()` lists and runs registered targets
//!
//! ## Quick Start
//!
//! ```ignore
//! use abyssbench::prelude::*;
//!
//! #[derive(Default)]
//! struct Hashing { data: Vec<u8> }
//!
//! #[benchmarks]
//! impl Hashing {
//!     #[benchmark]
//!     pub fn checksum(&self) -> u64 {
//!         self.data.iter().map(|&b| b as u64).sum()
//!     }
//! }
//!
//! let report = abyssbench::run_all_benchmarks(&Hashing::default())?;
//! print!("{report}");
//! ```
//!
//! ## Sections
//!
//! ```ignore
//! let report = abyssbench::benchmark_section("Sort 1k", || {
//!     let mut v: Vec<u32> = (0..1000).rev().collect();
//!     v.sort();
//!     v
//! })?;
//! println!("{report}");
//! ```
//!
//! The free functions use a default [`Harness`]; build one with
//! [`Harness::new`] to pick a [`MemorySource`] explicitly.

use std::time::Duration;

// Re-export core types
pub use abyssbench_core::{
    AggregateResult, Bencher, Benchmarkable, BoxError, DEFAULT_REPETITIONS, DEFAULT_TIME_LABEL,
    DiscoveredOperation, Harness, HarnessError, MemoryProbe, MemorySource, OperationInfo,
    OperationRegistry, OperationRegistryBuilder, Result, Sample, TargetDef, TrackingAllocator,
    UNTRACKED_ALLOCATOR_WARNING, WARMUP_ITERATIONS, allocation_count, discover_operations,
    find_target, is_installed, list_operations, live_bytes, operations_of, registered_targets,
    resolve_operation, run_registered, run_registered_method, try_discover_operations,
};

// Re-export report types
pub use abyssbench_report::{BatchReport, CallableReport, MethodReport, SectionReport};

// Re-export macros
pub use abyssbench_macros::{benchmark, benchmarks};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Benchmarkable, Harness, HarnessError, MemorySource, OperationRegistry, benchmark,
        benchmark_section, benchmarks, measure_time, run_all_benchmarks, run_benchmark_fn,
        run_benchmark_method,
    };
}

/// Measure every `#[benchmark]` operation of `target` in declaration order.
///
/// Returns one `Method:` block per operation. The first failing operation
/// aborts the batch and its error is returned.
pub fn run_all_benchmarks<T: Benchmarkable>(target: &T) -> Result<String> {
    Harness::default().run_all_benchmarks(target)
}

/// Measure the operation of `target` named `name`, tagged or not.
pub fn run_benchmark_method<T: Benchmarkable>(target: &T, name: &str) -> Result<String> {
    Harness::default().run_benchmark_method(target, name)
}

/// Warm up and measure a closure once.
pub fn run_benchmark_fn<R, F>(f: F) -> String
where
    F: FnMut() -> R,
{
    Harness::default().run_benchmark_fn(f)
}

/// Warm up and measure a fallible closure once.
pub fn try_run_benchmark_fn<R, E, F>(f: F) -> Result<String>
where
    F: FnMut() -> std::result::Result<R, E>,
    E: Into<BoxError>,
{
    Harness::default().try_run_benchmark_fn(f)
}

/// Average `f` over [`DEFAULT_REPETITIONS`] runs after a warm-up.
pub fn benchmark_section<R, F>(name: &str, f: F) -> Result<String>
where
    F: FnMut() -> R,
{
    Harness::default().benchmark_section(name, f)
}

/// Average `f` over `repetitions` runs after a warm-up.
pub fn benchmark_section_with<R, F>(name: &str, repetitions: usize, f: F) -> Result<String>
where
    F: FnMut() -> R,
{
    Harness::default().benchmark_section_with(name, repetitions, f)
}

/// Time a single run of `f` and log it under `label`.
pub fn measure_time<R, F>(label: &str, f: F) -> Duration
where
    F: FnOnce() -> R,
{
    abyssbench_core::measure_time(label, f)
}

/// Run the AbyssBench CLI runner over all registered targets.
///
/// Call this from a benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     abyssbench::run()
/// }
/// ```
pub use abyssbench_cli::run;
