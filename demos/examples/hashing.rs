//! Hashing - Tag-based discovery over a workload type
//!
//! Runs every `#[benchmark]` method of `Sha256VsSha512` in declaration order,
//! then a single method by name, including one that is not tagged.
//!
//! Run with: cargo run --example hashing -p abyssbench-demos --release

use abyssbench_demos::Sha256VsSha512;

fn main() -> abyssbench::Result<()> {
    let workload = Sha256VsSha512::default();

    print!("{}", abyssbench::run_all_benchmarks(&workload)?);

    println!("--- single method ---");
    print!("{}", abyssbench::run_benchmark_method(&workload, "sha512")?);

    println!("--- untagged method ---");
    print!("{}", abyssbench::run_benchmark_method(&workload, "sha256_hex")?);

    if let Err(e) = abyssbench::run_benchmark_method(&workload, "md5") {
        println!("{e}");
    }

    Ok(())
}
