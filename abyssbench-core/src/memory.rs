//! Memory Snapshots
//!
//! Rust has no collector to force, so a snapshot is either the tracking
//! allocator's live-byte count or the process resident set size. RSS moves in
//! whole pages: small allocations can show a zero delta, and freed memory the
//! allocator keeps cached still counts as resident.

use crate::allocator;
use serde::{Deserialize, Serialize};
use std::sync::Once;

/// Where memory snapshots come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemorySource {
    /// `Allocator` when `TrackingAllocator` is installed, otherwise `Resident`
    #[default]
    Auto,
    /// Live heap bytes from `TrackingAllocator`
    Allocator,
    /// Resident set size reported by the OS
    Resident,
}

impl MemorySource {
    /// Resolve `Auto` against the running process.
    pub fn resolve(self) -> MemorySource {
        match self {
            MemorySource::Auto if allocator::is_installed() => MemorySource::Allocator,
            MemorySource::Auto => MemorySource::Resident,
            other => other,
        }
    }
}

impl std::str::FromStr for MemorySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(MemorySource::Auto),
            "allocator" | "alloc" => Ok(MemorySource::Allocator),
            "resident" | "rss" => Ok(MemorySource::Resident),
            other => Err(format!("Unknown memory source: {}", other)),
        }
    }
}

/// Logged when the allocator source is selected but not installed.
pub const UNTRACKED_ALLOCATOR_WARNING: &str = "memory source is `allocator` but TrackingAllocator \
     is not the #[global_allocator]; memory deltas will be 0";

/// Takes memory snapshots from a resolved source.
#[derive(Debug, Clone, Copy)]
pub struct MemoryProbe {
    source: MemorySource,
}

impl MemoryProbe {
    /// Create a probe, resolving `Auto` once up front.
    ///
    /// Asking for `Allocator` without `TrackingAllocator` installed logs a
    /// warning once: every delta will read 0.
    pub fn new(source: MemorySource) -> Self {
        let probe = Self {
            source: source.resolve(),
        };
        if let Some(warning) = probe.warning() {
            static WARN_ONCE: Once = Once::new();
            WARN_ONCE.call_once(|| tracing::warn!("{warning}"));
        }
        probe
    }

    /// Why this probe's readings cannot be trusted, if they cannot.
    pub fn warning(&self) -> Option<&'static str> {
        (self.source == MemorySource::Allocator && !allocator::is_installed())
            .then_some(UNTRACKED_ALLOCATOR_WARNING)
    }

    /// The concrete source this probe reads.
    pub fn source(&self) -> MemorySource {
        self.source
    }

    /// Current footprint in bytes.
    pub fn snapshot(&self) -> i64 {
        match self.source {
            MemorySource::Allocator => allocator::live_bytes(),
            _ => resident_bytes(),
        }
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new(MemorySource::Auto)
    }
}

/// Resident set size from `/proc/self/statm`.
#[cfg(target_os = "linux")]
pub fn resident_bytes() -> i64 {
    let content = match std::fs::read_to_string("/proc/self/statm") {
        Ok(content) => content,
        Err(e) => {
            warn_unsupported(&format!("cannot read /proc/self/statm: {e}"));
            return 0;
        }
    };

    let rss_pages = content
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);

    rss_pages * page_size()
}

/// Resident set size; unsupported off Linux, always 0.
#[cfg(not(target_os = "linux"))]
pub fn resident_bytes() -> i64 {
    warn_unsupported("resident set size is only read on Linux");
    0
}

#[cfg(target_os = "linux")]
fn page_size() -> i64 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as i64 } else { 4096 }
}

fn warn_unsupported(reason: &str) {
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        tracing::warn!("memory snapshots unavailable ({reason}); reporting 0");
    });
}
