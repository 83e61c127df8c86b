//! Report Data Structures
//!
//! Each report type renders itself through `Display`; the rendered string is
//! what the harness hands back to callers.

use std::fmt;

/// Bytes per reported megabyte (1 MiB)
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Convert a byte count to fractional megabytes
pub fn bytes_to_mb(bytes: f64) -> f64 {
    bytes / BYTES_PER_MB
}

/// Result of measuring one named operation once
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReport {
    /// Operation name
    pub name: String,
    /// Elapsed time in milliseconds
    pub elapsed_ms: f64,
    /// Memory delta in megabytes (may be negative)
    pub memory_mb: f64,
}

impl fmt::Display for MethodReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Method: {}", self.name)?;
        writeln!(f, "Execution time: {:.4} ms", self.elapsed_ms)?;
        writeln!(f, "Used memory: {:.4} MB", self.memory_mb)?;
        writeln!(f)
    }
}

/// Result of measuring an anonymous callable once
#[derive(Debug, Clone, PartialEq)]
pub struct CallableReport {
    /// Elapsed time in milliseconds
    pub elapsed_ms: f64,
    /// Memory delta in megabytes (may be negative)
    pub memory_mb: f64,
}

impl fmt::Display for CallableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution time: {:.4} ms", self.elapsed_ms)?;
        write!(f, "Used memory: {:.4} MB", self.memory_mb)
    }
}

/// Per-run averages of a named section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    /// Section label
    pub name: String,
    /// Number of measured runs averaged
    pub repetitions: usize,
    /// Mean elapsed time per run in milliseconds
    pub mean_elapsed_ms: f64,
    /// Mean memory delta per run in megabytes
    pub mean_memory_mb: f64,
}

impl fmt::Display for SectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Section: {}", self.name)?;
        writeln!(f, "Execution time average: {:.4} ms", self.mean_elapsed_ms)?;
        writeln!(f, "Used memory average: {:.4} MB", self.mean_memory_mb)?;
        write!(f, "Averaged over {} runs", self.repetitions)
    }
}

/// Cumulative report for every discovered operation of a target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Per-operation blocks in discovery order
    pub methods: Vec<MethodReport>,
}

impl BatchReport {
    /// Append one operation's block
    pub fn push(&mut self, method: MethodReport) {
        self.methods.push(method);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for method in &self.methods {
            write!(f, "{}", method)?;
        }
        Ok(())
    }
}
