//! Integration tests for AbyssBench
//!
//! These tests drive the public API end to end, with registries generated by
//! the `#[benchmarks]` macro.

use abyssbench::{
    Benchmarkable, Harness, HarnessError, MemorySource, WARMUP_ITERATIONS, benchmark_section,
    benchmark_section_with, benchmarks, find_target, list_operations, measure_time,
    run_all_benchmarks, run_benchmark_fn, run_benchmark_method, try_discover_operations,
    try_run_benchmark_fn,
};
use std::cell::Cell;
use std::time::Duration;

/// Counts invocations of each operation.
#[derive(Default)]
struct Counter {
    first: Cell<usize>,
    second: Cell<usize>,
    helper: Cell<usize>,
}

#[benchmarks]
impl Counter {
    #[benchmark]
    pub fn first(&self) {
        self.first.set(self.first.get() + 1);
    }

    /// Visible but untagged: runnable by name only.
    pub fn helper(&self) -> usize {
        self.helper.set(self.helper.get() + 1);
        self.helper.get()
    }

    #[benchmark]
    fn second(&self) -> Vec<u64> {
        self.second.set(self.second.get() + 1);
        (0..256).collect()
    }

    #[allow(dead_code)]
    fn private_helper(&self) {}

    #[allow(dead_code)]
    pub fn takes_args(&self, _n: usize) {}
}

struct Empty;

#[benchmarks]
impl Empty {
    #[allow(dead_code)]
    fn unrelated(&self) {}
}

#[derive(Debug)]
struct Corrupt(&'static str);

impl std::fmt::Display for Corrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "corrupt input: {}", self.0)
    }
}

impl std::error::Error for Corrupt {}

#[derive(Default)]
struct Flaky {
    ok_calls: Cell<usize>,
}

#[benchmarks]
impl Flaky {
    #[benchmark(name = "Healthy")]
    pub fn healthy(&self) -> u32 {
        self.ok_calls.set(self.ok_calls.get() + 1);
        7
    }

    #[benchmark(fallible)]
    pub fn decode(&self) -> Result<u32, Corrupt> {
        Err(Corrupt("header"))
    }

    #[benchmark]
    pub fn never_reached(&self) {
        self.ok_calls.set(self.ok_calls.get() + 1000);
    }
}

struct Exploding;

#[benchmarks]
impl Exploding {
    #[benchmark]
    pub fn explode(&self) {
        panic!("boom");
    }
}

struct Conditional;

#[benchmarks]
impl Conditional {
    #[benchmark]
    pub fn always(&self) {}

    #[cfg(any())]
    #[benchmark]
    pub fn compiled_out(&self) {}

    #[cfg(any())]
    pub fn compiled_out_helper(&self) {}

    #[cfg(all())]
    pub fn compiled_in_helper(&self) {}

    /// Requires an `unsafe` block to call, so it is never registered.
    #[allow(dead_code)]
    pub unsafe fn raw_helper(&self) {}
}

#[derive(Default)]
struct Registered;

#[benchmarks(register)]
impl Registered {
    #[benchmark]
    pub fn spin(&self) -> u64 {
        (0..1000u64).sum()
    }
}

/// Parse the number after `label` on its line, checking the 4-decimal format.
fn field(report: &str, label: &str, unit: &str) -> f64 {
    let line = report
        .lines()
        .find(|l| l.starts_with(label))
        .unwrap_or_else(|| panic!("no `{label}` line in {report:?}"));
    let value = line
        .strip_prefix(label)
        .and_then(|rest| rest.strip_suffix(unit))
        .unwrap_or_else(|| panic!("malformed line {line:?}"));
    let decimals = value.rsplit('.').next().unwrap();
    assert_eq!(decimals.len(), 4, "expected 4 decimals in {line:?}");
    value.parse().unwrap()
}

#[test]
fn test_discovery_follows_declaration_order() {
    let counter = Counter::default();
    let report = run_all_benchmarks(&counter).unwrap();

    let first = report.find("Method: first\n").unwrap();
    let second = report.find("Method: second\n").unwrap();
    assert!(first < second);
    assert!(!report.contains("helper"));
    assert_eq!(report.matches("Method: ").count(), 2);
    assert!(report.ends_with("MB\n\n"));
}

#[test]
fn test_each_operation_runs_warmup_plus_one() {
    let counter = Counter::default();
    run_all_benchmarks(&counter).unwrap();

    assert_eq!(counter.first.get(), WARMUP_ITERATIONS + 1);
    assert_eq!(counter.second.get(), WARMUP_ITERATIONS + 1);
    assert_eq!(counter.helper.get(), 0);
}

#[test]
fn test_registry_lists_tagged_and_visible_untagged() {
    let ops = list_operations::<Counter>();
    let listed: Vec<_> = ops.iter().map(|o| (o.name.as_str(), o.tagged)).collect();
    assert_eq!(listed, [("first", true), ("helper", false), ("second", true)]);
}

#[test]
fn test_cfg_gated_and_unsafe_methods_are_left_out() {
    let ops = list_operations::<Conditional>();
    let listed: Vec<_> = ops.iter().map(|o| (o.name.as_str(), o.tagged)).collect();
    assert_eq!(listed, [("always", true), ("compiled_in_helper", false)]);

    assert!(run_benchmark_method(&Conditional, "compiled_in_helper").is_ok());
    assert!(run_benchmark_method(&Conditional, "raw_helper").is_err());
    let report = run_all_benchmarks(&Conditional).unwrap();
    assert_eq!(report.matches("Method: ").count(), 1);
}

#[test]
fn test_untagged_method_runs_by_name() {
    let counter = Counter::default();
    let report = run_benchmark_method(&counter, "helper").unwrap();

    assert!(report.starts_with("Method: helper\nExecution time: "));
    assert_eq!(counter.helper.get(), WARMUP_ITERATIONS + 1);
    field(&report, "Execution time: ", " ms");
    field(&report, "Used memory: ", " MB");
}

#[test]
fn test_missing_method_is_reported() {
    let counter = Counter::default();
    let err = run_benchmark_method(&counter, "NonExistentName").unwrap_err();

    assert_eq!(err.to_string(), "Method NonExistentName not found.");
    assert_eq!(counter.first.get() + counter.second.get(), 0);

    // Private and argument-taking methods are not registered
    assert!(run_benchmark_method(&counter, "private_helper").is_err());
    assert!(run_benchmark_method(&counter, "takes_args").is_err());
    // Lookup is case-sensitive
    assert!(run_benchmark_method(&counter, "First").is_err());
}

#[test]
fn test_empty_target_yields_empty_report() {
    assert_eq!(run_all_benchmarks(&Empty).unwrap(), "");
    assert!(Empty::operations().is_empty());
}

#[test]
fn test_absent_target_is_invalid() {
    let err = try_discover_operations::<Counter>(None).unwrap_err();
    assert!(matches!(err, HarnessError::InvalidTarget(_)));
}

#[test]
fn test_name_override_and_failure_aborts_batch() {
    let flaky = Flaky::default();
    let err = run_all_benchmarks(&flaky).unwrap_err();

    // "Healthy" ran, "decode" failed during warm-up, "never_reached" never ran
    assert_eq!(flaky.ok_calls.get(), WARMUP_ITERATIONS + 1);
    assert_eq!(err.to_string(), "corrupt input: header");
    match err {
        HarnessError::Invocation(inner) => {
            assert!(inner.downcast_ref::<Corrupt>().is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let report = run_benchmark_method(&flaky, "Healthy").unwrap();
    assert!(report.starts_with("Method: Healthy\n"));
    assert!(run_benchmark_method(&flaky, "healthy").is_err());
}

#[test]
#[should_panic(expected = "boom")]
fn test_panics_propagate() {
    let _ = run_all_benchmarks(&Exploding);
}

#[test]
fn test_registered_target_in_catalog() {
    let def = find_target("Registered").unwrap();
    assert_eq!((def.operations)().len(), 1);

    let harness = Harness::new(MemorySource::Resident);
    let report = (def.run_method)(&harness, "spin").unwrap();
    assert!(report.starts_with("Method: spin\n"));
}

#[test]
fn test_callable_report_format() {
    let mut calls = 0;
    let report = run_benchmark_fn(|| {
        calls += 1;
        vec![0u8; 1024]
    });

    assert_eq!(calls, WARMUP_ITERATIONS + 1);
    assert!(report.starts_with("Execution time: "));
    assert_eq!(report.lines().count(), 2);
    field(&report, "Execution time: ", " ms");
    field(&report, "Used memory: ", " MB");
}

#[test]
fn test_reported_time_covers_sleep() {
    let report = run_benchmark_fn(|| std::thread::sleep(Duration::from_millis(2)));
    assert!(field(&report, "Execution time: ", " ms") >= 2.0);
}

#[test]
fn test_fallible_callable_error_surfaces() {
    let err = try_run_benchmark_fn(|| "not a number".parse::<i32>()).unwrap_err();
    assert!(matches!(err, HarnessError::Invocation(_)));
}

#[test]
fn test_section_runs_repetitions_plus_warmup() {
    let mut calls = 0;
    let report = benchmark_section_with("Counting", 10, || calls += 1).unwrap();

    assert_eq!(calls, 10 + WARMUP_ITERATIONS);
    assert!(report.starts_with("Section: Counting\nExecution time average: "));
    assert!(report.ends_with("Averaged over 10 runs"));
    field(&report, "Execution time average: ", " ms");
    field(&report, "Used memory average: ", " MB");
}

#[test]
fn test_section_default_repetitions() {
    let mut calls = 0;
    let report = benchmark_section("Default", || calls += 1).unwrap();

    assert_eq!(calls, 50 + WARMUP_ITERATIONS);
    assert!(report.ends_with("Averaged over 50 runs"));
}

#[test]
fn test_section_single_and_zero_repetitions() {
    let report = benchmark_section_with("Once", 1, || ()).unwrap();
    assert!(report.ends_with("Averaged over 1 runs"));

    let mut calls = 0;
    let err = benchmark_section_with("Never", 0, || calls += 1).unwrap_err();
    assert!(matches!(err, HarnessError::Configuration(_)));
    assert_eq!(calls, 0);
}

#[test]
fn test_section_mutations_are_visible_to_caller() {
    let mut sink = Vec::new();
    benchmark_section_with("Accumulate", 3, || sink.push(sink.len())).unwrap();
    assert_eq!(sink.len(), 3 + WARMUP_ITERATIONS);
}

#[test]
fn test_measure_time_is_single_shot() {
    let mut calls = 0;
    let elapsed = measure_time("Sleep", || {
        calls += 1;
        std::thread::sleep(Duration::from_millis(1));
    });
    assert_eq!(calls, 1);
    assert!(elapsed >= Duration::from_millis(1));
}

#[test]
fn test_structured_measurements() {
    let harness = Harness::new(MemorySource::Resident);
    assert_eq!(harness.memory_source(), MemorySource::Resident);

    let sample = harness.measure(|| std::thread::sleep(Duration::from_millis(1)));
    assert!(sample.elapsed >= Duration::from_millis(1));

    let aggregate = harness.measure_section(4, || (0..100u32).sum::<u32>()).unwrap();
    assert_eq!(aggregate.trials, 4);
    let expected = aggregate.total_elapsed.as_nanos() as f64 / 4.0;
    assert!((aggregate.mean_elapsed_ns - expected).abs() < 1e-6);
}
