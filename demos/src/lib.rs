//! AbyssBench Demos
//!
//! Sample workloads registered with the runner, plus runnable examples. This
//! crate is not published.
//!
//! Run the registered workloads with:
//! ```sh
//! cargo run -p abyssbench-demos --release -- list
//! cargo run -p abyssbench-demos --release -- run Sha256VsSha512
//! ```
//!
//! | Example | Feature |
//! |---------|---------|
//! | `hashing` | `run_all_benchmarks`, `run_benchmark_method`, fallible operations |
//! | `sorting` | `measure_time`, `benchmark_section`, `run_benchmark_fn` |
//! | `allocations` | `TrackingAllocator` as the memory source |

use abyssbench::benchmarks;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::{Digest, Sha256, Sha512};

/// Size of the hashed buffer in bytes
pub const HASH_INPUT_LEN: usize = 10_000;

/// Seed shared by every demo workload
pub const SEED: u64 = 42;

/// SHA-256 against SHA-512 over the same seeded buffer.
pub struct Sha256VsSha512 {
    data: Vec<u8>,
}

impl Default for Sha256VsSha512 {
    fn default() -> Self {
        let mut data = vec![0u8; HASH_INPUT_LEN];
        StdRng::seed_from_u64(SEED).fill_bytes(&mut data);
        Self { data }
    }
}

#[benchmarks(register)]
impl Sha256VsSha512 {
    /// SHA-256 digest of the buffer
    #[benchmark]
    pub fn sha256(&self) -> Vec<u8> {
        Sha256::digest(&self.data).to_vec()
    }

    /// SHA-512 digest of the buffer
    #[benchmark]
    pub fn sha512(&self) -> Vec<u8> {
        Sha512::digest(&self.data).to_vec()
    }

    /// Hex-encode the SHA-256 digest; runnable by name only
    pub fn sha256_hex(&self) -> String {
        self.sha256().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Input length, kept out of discovery
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the input is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Sorting a seeded list of integers, stable and unstable.
pub struct Sorting {
    values: Vec<i32>,
}

impl Sorting {
    /// `len` seeded values in `0..1_000_000`
    pub fn with_len(len: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(SEED);
        Self {
            values: (0..len).map(|_| rng.gen_range(0..1_000_000)).collect(),
        }
    }
}

impl Default for Sorting {
    fn default() -> Self {
        Self::with_len(100_000)
    }
}

#[benchmarks(register)]
impl Sorting {
    /// Stable merge sort on a fresh copy
    #[benchmark]
    pub fn stable(&self) -> Vec<i32> {
        let mut values = self.values.clone();
        values.sort();
        values
    }

    /// Pattern-defeating quicksort on a fresh copy
    #[benchmark]
    pub fn unstable(&self) -> Vec<i32> {
        let mut values = self.values.clone();
        values.sort_unstable();
        values
    }

    /// Parse the values back from their decimal form
    #[benchmark(fallible)]
    pub fn parse_roundtrip(&self) -> Result<Vec<i32>, std::num::ParseIntError> {
        self.values
            .iter()
            .take(1_000)
            .map(|v| v.to_string().parse())
            .collect()
    }
}
