//! Run Planner
//!
//! Selects which registered targets and operations a run covers.
//!
//! Filtering options:
//! - Exact target name
//! - Regex pattern matching on operation name
//!
//! Targets keep the catalog's alphabetical order; operations keep declaration
//! order. Only tagged operations are planned: untagged ones are reachable
//! through `--method` alone.

use abyssbench_core::{HarnessError, OperationInfo, TargetDef};
use regex::Regex;

/// A target and the operations selected from it
pub struct PlannedTarget<'a> {
    /// Catalog entry
    pub def: &'a TargetDef,
    /// Tagged operations that passed the filter, in declaration order
    pub operations: Vec<OperationInfo>,
}

/// Execution plan for a run
pub struct ExecutionPlan<'a> {
    /// Targets with at least one selected operation
    pub targets: Vec<PlannedTarget<'a>>,
}

impl ExecutionPlan<'_> {
    /// Total number of operations that will be measured
    pub fn operation_count(&self) -> usize {
        self.targets.iter().map(|t| t.operations.len()).sum()
    }
}

/// Build execution plan from registered targets.
///
/// Naming a target that is not registered fails with `InvalidTarget`.
pub fn build_plan<'a>(
    targets: impl IntoIterator<Item = &'a TargetDef>,
    target: Option<&str>,
    filter: Option<&Regex>,
) -> Result<ExecutionPlan<'a>, HarnessError> {
    let candidates: Vec<&TargetDef> = targets
        .into_iter()
        .filter(|def| target.is_none_or(|name| def.name == name))
        .collect();

    if let Some(name) = target {
        if candidates.is_empty() {
            return Err(HarnessError::InvalidTarget(format!(
                "no registered target named {}",
                name
            )));
        }
    }

    let targets = candidates
        .into_iter()
        .filter_map(|def| {
            let operations: Vec<_> = (def.operations)()
                .into_iter()
                .filter(|op| op.tagged && matches(filter, &op.name))
                .collect();
            (!operations.is_empty()).then_some(PlannedTarget { def, operations })
        })
        .collect();

    Ok(ExecutionPlan { targets })
}

/// Whether `name` passes the optional operation filter
pub fn matches(filter: Option<&Regex>, name: &str) -> bool {
    filter.is_none_or(|re| re.is_match(name))
}
