//! Harness - Measurement Entry Points
//!
//! Every entry point follows the same sequence: warm-up, trial(s), aggregate,
//! format. There are no retries: the first failure ends the call and no
//! report is produced.
//!
//! Memory figures come from process-wide accounting. Measurements are not
//! reliable while other threads in the same process allocate.

use crate::bencher::{AggregateResult, Bencher, DEFAULT_REPETITIONS, Sample, run_trials};
use crate::error::{BoxError, HarnessError, Result};
use crate::memory::{MemoryProbe, MemorySource};
use crate::registry::{Benchmarkable, DiscoveredOperation, discover_operations, resolve_operation};
use abyssbench_report::{BatchReport, CallableReport, MethodReport, SectionReport, bytes_to_mb};
use std::convert::Infallible;
use std::time::{Duration, Instant};

/// Label used by [`measure_time`] callers that have nothing better.
pub const DEFAULT_TIME_LABEL: &str = "Elapsed time";

/// Measurement engine configured with a memory source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Harness {
    probe: MemoryProbe,
}

impl Harness {
    /// Create a harness reading memory from `source`
    pub fn new(source: MemorySource) -> Self {
        Self {
            probe: MemoryProbe::new(source),
        }
    }

    /// The resolved memory source
    pub fn memory_source(&self) -> MemorySource {
        self.probe.source()
    }

    /// Set when memory figures from this harness will be meaningless
    pub fn memory_warning(&self) -> Option<&'static str> {
        self.probe.warning()
    }

    fn bencher(&self) -> Bencher {
        Bencher::new(self.probe)
    }

    /// Warm up, then measure one trial of an infallible callable.
    pub fn measure<R, F>(&self, mut f: F) -> Sample
    where
        F: FnMut() -> R,
    {
        let mut wrapped = || {
            std::hint::black_box(f());
            Ok::<(), Infallible>(())
        };

        let mut bencher = self.bencher();
        unwrap_infallible(bencher.warm_up(&mut wrapped));
        unwrap_infallible(bencher.trial(&mut wrapped))
    }

    /// Warm up, then measure one trial of a fallible callable.
    pub fn try_measure<R, E, F>(&self, mut f: F) -> Result<Sample>
    where
        F: FnMut() -> std::result::Result<R, E>,
        E: Into<BoxError>,
    {
        let mut wrapped = || {
            f().map(|value| {
                std::hint::black_box(value);
            })
        };

        let mut bencher = self.bencher();
        bencher.warm_up(&mut wrapped).map_err(HarnessError::invocation)?;
        bencher.trial(&mut wrapped).map_err(HarnessError::invocation)
    }

    /// Warm up once, then average `repetitions` trials.
    pub fn measure_section<R, F>(&self, repetitions: usize, mut f: F) -> Result<AggregateResult>
    where
        F: FnMut() -> R,
    {
        run_trials(
            self.bencher(),
            || {
                std::hint::black_box(f());
                Ok::<(), Infallible>(())
            },
            repetitions,
        )
    }

    /// Fallible counterpart of [`Harness::measure_section`].
    pub fn try_measure_section<R, E, F>(
        &self,
        repetitions: usize,
        mut f: F,
    ) -> Result<AggregateResult>
    where
        F: FnMut() -> std::result::Result<R, E>,
        E: Into<BoxError>,
    {
        run_trials(
            self.bencher(),
            || {
                f().map(|value| {
                    std::hint::black_box(value);
                })
            },
            repetitions,
        )
    }

    /// Warm up and measure one bound operation.
    pub fn measure_operation<T>(&self, op: &DiscoveredOperation<'_, T>) -> Result<MethodReport> {
        tracing::debug!(operation = op.name(), "measuring operation");
        let sample = self.try_measure(|| op.invoke())?;
        Ok(method_report(op.name(), &sample))
    }

    /// Measure every tagged operation of `target`, in discovery order.
    pub fn run_all_benchmarks<T: Benchmarkable>(&self, target: &T) -> Result<String> {
        self.run_benchmarks_where(target, |_| true)
    }

    /// Measure the tagged operations of `target` whose name satisfies `keep`.
    pub fn run_benchmarks_where<T, P>(&self, target: &T, keep: P) -> Result<String>
    where
        T: Benchmarkable,
        P: Fn(&str) -> bool,
    {
        let mut batch = BatchReport::default();
        for op in discover_operations(target) {
            if keep(op.name()) {
                batch.push(self.measure_operation(&op)?);
            }
        }
        Ok(batch.to_string())
    }

    /// Resolve `name` on `target`, warm it up and measure it once.
    pub fn run_benchmark_method<T: Benchmarkable>(&self, target: &T, name: &str) -> Result<String> {
        let op = resolve_operation(target, name)?;
        Ok(self.measure_operation(&op)?.to_string())
    }

    /// Warm up and measure a bare callable once.
    pub fn run_benchmark_fn<R, F>(&self, f: F) -> String
    where
        F: FnMut() -> R,
    {
        callable_report(&self.measure(f)).to_string()
    }

    /// Fallible counterpart of [`Harness::run_benchmark_fn`].
    pub fn try_run_benchmark_fn<R, E, F>(&self, f: F) -> Result<String>
    where
        F: FnMut() -> std::result::Result<R, E>,
        E: Into<BoxError>,
    {
        Ok(callable_report(&self.try_measure(f)?).to_string())
    }

    /// Average a named section over [`DEFAULT_REPETITIONS`] runs.
    pub fn benchmark_section<R, F>(&self, name: &str, f: F) -> Result<String>
    where
        F: FnMut() -> R,
    {
        self.benchmark_section_with(name, DEFAULT_REPETITIONS, f)
    }

    /// Average a named section over `repetitions` runs (must be >= 1).
    pub fn benchmark_section_with<R, F>(
        &self,
        name: &str,
        repetitions: usize,
        f: F,
    ) -> Result<String>
    where
        F: FnMut() -> R,
    {
        let aggregate = self.measure_section(repetitions, f)?;
        tracing::debug!(section = name, trials = aggregate.trials, "section complete");
        Ok(section_report(name, &aggregate).to_string())
    }
}

/// Run `f` once and return how long it took; logs `"{label}: {elapsed:?}"`.
///
/// No warm-up and no memory snapshot: this is a plain stopwatch.
pub fn measure_time<R, F>(label: &str, f: F) -> Duration
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    std::hint::black_box(f());
    let elapsed = start.elapsed();

    tracing::info!("{}: {:?}", label, elapsed);
    elapsed
}

/// Build the per-operation report block for a sample.
pub fn method_report(name: &str, sample: &Sample) -> MethodReport {
    MethodReport {
        name: name.to_string(),
        elapsed_ms: sample.elapsed_ms(),
        memory_mb: bytes_to_mb(sample.memory_delta_bytes as f64),
    }
}

/// Build the anonymous-callable report for a sample.
pub fn callable_report(sample: &Sample) -> CallableReport {
    CallableReport {
        elapsed_ms: sample.elapsed_ms(),
        memory_mb: bytes_to_mb(sample.memory_delta_bytes as f64),
    }
}

/// Build the section report for an aggregate.
pub fn section_report(name: &str, aggregate: &AggregateResult) -> SectionReport {
    SectionReport {
        name: name.to_string(),
        repetitions: aggregate.trials,
        mean_elapsed_ms: aggregate.mean_elapsed_ms(),
        mean_memory_mb: bytes_to_mb(aggregate.mean_memory_delta_bytes),
    }
}

fn unwrap_infallible<T>(result: std::result::Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencher::WARMUP_ITERATIONS;
    use crate::registry::OperationRegistry;
    use std::cell::Cell;

    fn harness() -> Harness {
        Harness::new(MemorySource::Resident)
    }

    #[derive(Default)]
    struct Ticker {
        calls: Cell<u32>,
    }

    impl Benchmarkable for Ticker {
        fn operations() -> OperationRegistry<Self> {
            OperationRegistry::builder("Ticker")
                .benchmark("first", |t: &Ticker| t.calls.set(t.calls.get() + 1))
                .benchmark("second", |t: &Ticker| t.calls.set(t.calls.get() + 1))
                .operation("quiet", |t: &Ticker| t.calls.get())
                .try_benchmark("broken", |_: &Ticker| "x".parse::<u32>())
                .build()
        }
    }

    #[test]
    fn test_measure_invokes_six_times() {
        let mut calls = 0;
        let sample = harness().measure(|| calls += 1);
        assert_eq!(calls, WARMUP_ITERATIONS + 1);
        assert!(sample.elapsed >= Duration::ZERO);
    }

    #[test]
    fn test_section_invokes_r_plus_warmup() {
        let mut calls = 0;
        let aggregate = harness().measure_section(7, || calls += 1).unwrap();
        assert_eq!(aggregate.trials, 7);
        assert_eq!(calls, 7 + WARMUP_ITERATIONS);
    }

    #[test]
    fn test_section_rejects_zero() {
        let err = harness().benchmark_section_with("empty", 0, || ()).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }

    #[test]
    fn test_single_repetition_equals_raw_sample() {
        let aggregate = harness()
            .measure_section(1, || std::hint::black_box(3 * 7))
            .unwrap();
        assert_eq!(aggregate.trials, 1);
        let total_ns = aggregate.total_elapsed.as_nanos() as f64;
        assert!((aggregate.mean_elapsed_ns - total_ns).abs() < 1e-9);
    }

    #[test]
    fn test_run_benchmark_method_resolves_untagged() {
        let ticker = Ticker::default();
        let report = harness().run_benchmark_method(&ticker, "quiet").unwrap();
        assert!(report.starts_with("Method: quiet\n"));
    }

    #[test]
    fn test_run_benchmark_method_not_found() {
        let ticker = Ticker::default();
        let err = harness()
            .run_benchmark_method(&ticker, "NonExistentName")
            .unwrap_err();
        assert!(matches!(err, HarnessError::OperationNotFound { .. }));
        assert_eq!(ticker.calls.get(), 0);
    }

    #[test]
    fn test_batch_aborts_on_first_failure() {
        let ticker = Ticker::default();
        let err = harness().run_all_benchmarks(&ticker).unwrap_err();

        // Both operations before "broken" ran their warm-up and trial.
        assert_eq!(ticker.calls.get(), 2 * (WARMUP_ITERATIONS as u32 + 1));
        match err {
            HarnessError::Invocation(inner) => {
                assert!(inner.downcast_ref::<std::num::ParseIntError>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_filtered_batch_skips_failure() {
        let ticker = Ticker::default();
        let report = harness()
            .run_benchmarks_where(&ticker, |name| name != "broken")
            .unwrap();
        assert_eq!(report.matches("Method: ").count(), 2);
    }

    #[test]
    fn test_try_run_fn_propagates_error() {
        let mut calls = 0;
        let err = harness()
            .try_run_benchmark_fn(|| {
                calls += 1;
                if calls > 2 {
                    Err("exhausted")
                } else {
                    Ok(calls)
                }
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "exhausted");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_measure_time_brackets_sleep() {
        let elapsed = measure_time(DEFAULT_TIME_LABEL, || {
            std::thread::sleep(Duration::from_millis(5))
        });
        assert!(elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_negative_delta_is_not_clamped() {
        let sample = Sample {
            elapsed: Duration::from_millis(1),
            memory_delta_bytes: -(2 * 1024 * 1024),
        };
        let report = callable_report(&sample).to_string();
        assert!(report.contains("Used memory: -2.0000 MB"));
    }
}
