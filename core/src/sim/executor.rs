//! Strategies for evaluating every cell of a lattice.

use num::BigUint;
use rayon::prelude::*;
use std::fmt;
use std::ops::Range;

use crate::error::{SimError, SimResult};

/// Function that evaluates a contiguous range of cells and returns their
/// contributions to the next state, each at its own bit position.
pub type CellRangeFn<'a> = dyn 'a + Fn(Range<usize>) -> BigUint + Sync;

/// Strategy for evaluating all the cells of a lattice for one generation.
pub trait Executor: fmt::Debug + Send {
    /// Returns the number of workers that evaluate cells concurrently.
    fn workers(&self) -> usize;
    /// Evaluates cells `0..len` and returns the union of all their
    /// contributions.
    fn reduce(&self, len: usize, eval: &CellRangeFn<'_>) -> BigUint;
}

/// Executor that evaluates all cells on the calling thread.
#[derive(Debug, Default, Copy, Clone)]
pub struct SequentialExecutor;
impl Executor for SequentialExecutor {
    fn workers(&self) -> usize {
        1
    }
    fn reduce(&self, len: usize, eval: &CellRangeFn<'_>) -> BigUint {
        eval(0..len)
    }
}

/// Executor that splits the cells into one contiguous chunk per worker and
/// evaluates the chunks on a fixed-size thread pool.
pub struct PoolExecutor {
    pool: rayon::ThreadPool,
    workers: usize,
}
impl fmt::Debug for PoolExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolExecutor")
            .field("workers", &self.workers)
            .finish()
    }
}
impl PoolExecutor {
    /// Constructs an executor with a pool of `workers` threads.
    pub fn new(workers: usize) -> SimResult<Self> {
        if workers == 0 {
            return Err(SimError::ZeroWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ndtorus-worker-{}", i))
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;
        Ok(Self { pool, workers })
    }
}
impl Executor for PoolExecutor {
    fn workers(&self) -> usize {
        self.workers
    }
    fn reduce(&self, len: usize, eval: &CellRangeFn<'_>) -> BigUint {
        let chunks: Vec<Range<usize>> = chunks(len, self.workers).collect();
        self.pool.install(|| {
            chunks
                .into_par_iter()
                .map(|cells| eval(cells))
                .reduce(BigUint::default, |a, b| a | b)
        })
    }
}

/// Splits `0..len` into at most `workers` contiguous ranges of (nearly) equal
/// size.
pub fn chunks(len: usize, workers: usize) -> impl Iterator<Item = Range<usize>> {
    let chunk_size = std::cmp::max(1, (len + workers.max(1) - 1) / workers.max(1));
    (0..len)
        .step_by(chunk_size)
        .map(move |start| start..std::cmp::min(start + chunk_size, len))
}
