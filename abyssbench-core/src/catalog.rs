//! Target Catalog
//!
//! Types annotated with `#[benchmarks(register)]` submit a [`TargetDef`] at
//! link time so a runner can list and measure them by name without holding
//! an instance.

use crate::error::{HarnessError, Result};
use crate::harness::Harness;
use crate::registry::{Benchmarkable, OperationInfo, list_operations};

/// Catalog entry for a registered benchmark target
#[derive(Debug, Clone)]
pub struct TargetDef {
    /// Type name
    pub name: &'static str,
    /// Module path of the annotated impl block
    pub module_path: &'static str,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
    /// Operation metadata in declaration order
    pub operations: fn() -> Vec<OperationInfo>,
    /// Build a fresh instance and measure its tagged operations that pass the filter
    pub run: fn(&Harness, &dyn Fn(&str) -> bool) -> Result<String>,
    /// Build a fresh instance and measure one operation by name
    pub run_method: fn(&Harness, &str) -> Result<String>,
}

inventory::collect!(TargetDef);

/// `TargetDef::operations` for a registered type
pub fn operations_of<T: Benchmarkable>() -> Vec<OperationInfo> {
    list_operations::<T>()
}

/// `TargetDef::run` for a registered type
pub fn run_registered<T: Benchmarkable + Default>(
    harness: &Harness,
    keep: &dyn Fn(&str) -> bool,
) -> Result<String> {
    let target = T::default();
    harness.run_benchmarks_where(&target, keep)
}

/// `TargetDef::run_method` for a registered type
pub fn run_registered_method<T: Benchmarkable + Default>(
    harness: &Harness,
    name: &str,
) -> Result<String> {
    let target = T::default();
    harness.run_benchmark_method(&target, name)
}

/// All registered targets, sorted by name for deterministic runs.
pub fn registered_targets() -> Vec<&'static TargetDef> {
    let mut targets: Vec<_> = inventory::iter::<TargetDef>.into_iter().collect();
    targets.sort_by_key(|t| t.name);
    targets
}

/// Look up a registered target by exact name.
pub fn find_target(name: &str) -> Result<&'static TargetDef> {
    registered_targets()
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| HarnessError::InvalidTarget(format!("no registered target named {}", name)))
}
