#![warn(missing_docs)]
//! AbyssBench Report - Text Rendering
//!
//! Value types for the three report shapes the harness produces:
//! - `MethodReport` (one named operation, also concatenated into `BatchReport`)
//! - `CallableReport` (an anonymous callable)
//! - `SectionReport` (per-run averages of a named section)
//!
//! Times are rendered in milliseconds and memory in megabytes
//! (1 MB = 1024 × 1024 bytes), both with four decimal places.

mod report;

pub use report::{
    BYTES_PER_MB, BatchReport, CallableReport, MethodReport, SectionReport, bytes_to_mb,
};
