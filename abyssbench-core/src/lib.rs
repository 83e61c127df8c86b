#![warn(missing_docs)]
//! AbyssBench Core - Measurement Engine
//!
//! This crate provides the execution machinery behind the harness:
//! - `Bencher` for the warm-up / trial / average sequence
//! - Monotonic-clock timing of a single invocation
//! - Memory snapshots from `TrackingAllocator` or the resident set size
//! - `OperationRegistry` and tag-based discovery of benchmarkable methods
//! - `Harness`, which ties the above into report-producing entry points

mod allocator;
mod bencher;
mod catalog;
mod error;
mod harness;
mod measure;
mod memory;
mod registry;

pub use allocator::{TrackingAllocator, allocation_count, is_installed, live_bytes};
pub use bencher::{
    AggregateResult, Bencher, DEFAULT_REPETITIONS, Sample, WARMUP_ITERATIONS, run_trials,
};
pub use catalog::{
    TargetDef, find_target, operations_of, registered_targets, run_registered,
    run_registered_method,
};
pub use error::{BoxError, HarnessError, Result};
pub use harness::{
    DEFAULT_TIME_LABEL, Harness, callable_report, measure_time, method_report, section_report,
};
pub use measure::Timer;
pub use memory::{MemoryProbe, MemorySource, UNTRACKED_ALLOCATOR_WARNING, resident_bytes};
pub use registry::{
    Benchmarkable, DiscoveredOperation, OperationInfo, OperationRegistry,
    OperationRegistryBuilder, discover_operations, list_operations, resolve_operation,
    try_discover_operations,
};

/// Anchor to prevent LTO from stripping inventory entries
#[used]
#[doc(hidden)]
pub static REGISTRY_ANCHOR: fn() = || {
    for _ in inventory::iter::<TargetDef> {}
};
