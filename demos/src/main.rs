//! `abyss` runner over the demo workloads.

// Link the workloads so their catalog entries are collected.
use abyssbench_demos as _;

fn main() -> anyhow::Result<()> {
    abyssbench::run()
}
