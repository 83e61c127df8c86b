//! Bencher - Warm-up, Trials and Averaging
//!
//! A `Bencher` drives one workload through the fixed warm-up phase and then
//! any number of measured trials, accumulating totals so the mean can be
//! taken at the end. Each trial is bracketed by its own memory snapshots;
//! the timer window holds the invocation and nothing else.

use crate::error::{HarnessError, Result};
use crate::measure::Timer;
use crate::memory::MemoryProbe;
use std::time::Duration;

/// Discarded invocations before the first measured trial.
pub const WARMUP_ITERATIONS: usize = 5;

/// Trials used by `benchmark_section` when no count is given.
pub const DEFAULT_REPETITIONS: usize = 50;

/// Result of a single measured trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Wall-clock time of the invocation
    pub elapsed: Duration,
    /// End footprint minus baseline footprint; negative when the workload
    /// released more than it kept
    pub memory_delta_bytes: i64,
}

impl Sample {
    /// Elapsed time in fractional milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / 1_000_000.0
    }
}

/// Mean over one or more trials
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    /// Number of trials averaged (always >= 1)
    pub trials: usize,
    /// Sum of elapsed times
    pub total_elapsed: Duration,
    /// Mean elapsed time in nanoseconds
    pub mean_elapsed_ns: f64,
    /// Mean memory delta in bytes
    pub mean_memory_delta_bytes: f64,
}

impl AggregateResult {
    /// Mean elapsed time in fractional milliseconds
    pub fn mean_elapsed_ms(&self) -> f64 {
        self.mean_elapsed_ns / 1_000_000.0
    }
}

/// Drives warm-up and trials for one workload.
pub struct Bencher {
    probe: MemoryProbe,
    total_elapsed: Duration,
    total_memory_delta: i128,
    trials: usize,
    invocations: u64,
}

impl Bencher {
    /// Create a Bencher that snapshots memory through `probe`
    pub fn new(probe: MemoryProbe) -> Self {
        Self {
            probe,
            total_elapsed: Duration::ZERO,
            total_memory_delta: 0,
            trials: 0,
            invocations: 0,
        }
    }

    /// Invoke the workload `WARMUP_ITERATIONS` times, discarding results.
    ///
    /// The first failure is returned immediately.
    pub fn warm_up<E, F>(&mut self, f: &mut F) -> Result<(), E>
    where
        F: FnMut() -> Result<(), E>,
    {
        for i in 0..WARMUP_ITERATIONS {
            self.invocations += 1;
            f()?;
            tracing::trace!(iteration = i + 1, "warm-up invocation done");
        }
        tracing::debug!(iterations = WARMUP_ITERATIONS, "warm-up complete");
        Ok(())
    }

    /// Run one measured trial and add it to the running totals.
    ///
    /// Sequence: baseline snapshot, start timer, invoke once, stop timer,
    /// ending snapshot.
    pub fn trial<E, F>(&mut self, f: &mut F) -> Result<Sample, E>
    where
        F: FnMut() -> Result<(), E>,
    {
        let baseline = self.probe.snapshot();
        self.invocations += 1;

        let timer = Timer::start();
        let outcome = f();
        let elapsed = timer.stop();

        outcome?;
        let end = self.probe.snapshot();

        let sample = Sample {
            elapsed,
            memory_delta_bytes: end - baseline,
        };
        self.accumulate(sample);

        tracing::debug!(
            trial = self.trials,
            elapsed_ns = sample.elapsed.as_nanos() as u64,
            memory_delta = sample.memory_delta_bytes,
            "trial complete"
        );
        Ok(sample)
    }

    fn accumulate(&mut self, sample: Sample) {
        self.total_elapsed += sample.elapsed;
        self.total_memory_delta += sample.memory_delta_bytes as i128;
        self.trials += 1;
    }

    /// Total workload invocations so far, warm-up included
    pub fn invocation_count(&self) -> u64 {
        self.invocations
    }

    /// Measured trials so far
    pub fn trial_count(&self) -> usize {
        self.trials
    }

    /// Divide the accumulated totals by the trial count.
    pub fn finish(self) -> Result<AggregateResult> {
        if self.trials == 0 {
            return Err(HarnessError::Configuration(
                "at least one trial is required to compute an average".to_string(),
            ));
        }

        let n = self.trials as f64;
        Ok(AggregateResult {
            trials: self.trials,
            total_elapsed: self.total_elapsed,
            mean_elapsed_ns: self.total_elapsed.as_nanos() as f64 / n,
            mean_memory_delta_bytes: self.total_memory_delta as f64 / n,
        })
    }
}

/// Warm up once, then run `repetitions` trials and average them.
///
/// `repetitions` must be at least 1; the check happens before the workload
/// is invoked at all.
pub fn run_trials<E, F>(
    mut bencher: Bencher,
    mut f: F,
    repetitions: usize,
) -> Result<AggregateResult>
where
    F: FnMut() -> Result<(), E>,
    E: Into<crate::error::BoxError>,
{
    if repetitions < 1 {
        return Err(HarnessError::Configuration(format!(
            "repetitions must be at least 1 (got {})",
            repetitions
        )));
    }

    bencher.warm_up(&mut f).map_err(HarnessError::invocation)?;
    for _ in 0..repetitions {
        bencher.trial(&mut f).map_err(HarnessError::invocation)?;
    }

    bencher.finish()
}
