//! Sorting - Stopwatch, sections and bare callables
//!
//! `measure_time` logs a single run; `benchmark_section` averages a closure
//! over many runs. Closures may mutate captured state, and the mutation is
//! visible after the call.
//!
//! Run with: cargo run --example sorting -p abyssbench-demos --release

use abyssbench::{DEFAULT_TIME_LABEL, benchmark_section, measure_time, run_benchmark_fn};
use abyssbench_demos::Sorting;

fn main() -> abyssbench::Result<()> {
    tracing_subscriber_init();

    let mut list = vec![1, 5, 3, 2, 10];
    measure_time("Unordered list", || list.sort());
    measure_time("Ordered list", || list.sort());
    measure_time(DEFAULT_TIME_LABEL, || list.iter().sum::<i32>());

    let workload = Sorting::default();
    println!("{}", benchmark_section("Stable sort", || workload.stable())?);
    println!("{}", benchmark_section("Unstable sort", || workload.unstable())?);

    let mut runs = 0;
    println!("{}", run_benchmark_fn(|| {
        runs += 1;
        workload.unstable()
    }));
    println!("closure ran {runs} times");

    Ok(())
}

fn tracing_subscriber_init() {
    tracing_subscriber::fmt()
        .with_env_filter("abyssbench=info")
        .init();
}
