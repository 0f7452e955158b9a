//! Simulation parameters.

use num::BigUint;

use crate::error::{SimError, SimResult};
use crate::lattice::{Lattice, Neighborhood};
use crate::rule::RuleKind;

/// Default neighborhood radius.
pub const DEFAULT_RADIUS: usize = 1;

/// Everything needed to start a simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Extent of the lattice along each axis.
    pub dimensions: Vec<usize>,
    /// Rule family to decode `rule` as.
    pub kind: RuleKind,
    /// Rule integer.
    pub rule: BigUint,
    /// Moore neighborhood radius.
    pub radius: usize,
    /// Initial state, or `None` for a uniformly random one.
    pub initial_state: Option<BigUint>,
    /// Seed for the random initial state, or `None` to seed from entropy.
    pub seed: Option<u64>,
    /// Number of generations to simulate, or `None` to never stop.
    pub iterations: Option<u64>,
    /// Whether to evaluate cells on a thread pool.
    pub parallel: bool,
    /// Number of threads in the pool. Only used if `parallel` is set; if
    /// `None`, one less than the available parallelism.
    pub workers: Option<usize>,
    /// Whether to leave the initial state out of the sequence of states.
    pub skip_initial_state: bool,
}

impl SimulationConfig {
    /// Constructs an unbounded, sequential configuration with a random
    /// initial state and the default radius.
    pub fn new(dimensions: Vec<usize>, kind: RuleKind, rule: impl Into<BigUint>) -> Self {
        Self {
            dimensions,
            kind,
            rule: rule.into(),
            radius: DEFAULT_RADIUS,
            initial_state: None,
            seed: None,
            iterations: None,
            parallel: false,
            workers: None,
            skip_initial_state: false,
        }
    }

    /// Sets the neighborhood radius.
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }
    /// Sets an explicit initial state.
    pub fn with_initial_state(mut self, state: impl Into<BigUint>) -> Self {
        self.initial_state = Some(state.into());
        self
    }
    /// Sets the seed used to generate a random initial state.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    /// Stops the simulation after the given number of generations.
    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }
    /// Lets the simulation run forever.
    pub fn unbounded(mut self) -> Self {
        self.iterations = None;
        self
    }
    /// Enables or disables the thread pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    /// Enables the thread pool with a fixed number of threads.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.parallel = true;
        self.workers = Some(workers);
        self
    }
    /// Leaves the initial state out of the sequence of states.
    pub fn skip_initial_state(mut self, skip: bool) -> Self {
        self.skip_initial_state = skip;
        self
    }

    /// Returns the number of workers that evaluate cells each generation.
    pub fn worker_count(&self) -> SimResult<usize> {
        if !self.parallel {
            return Ok(1);
        }
        match self.workers {
            Some(0) => Err(SimError::ZeroWorkers),
            Some(n) => Ok(n),
            None => Ok(default_worker_count()),
        }
    }

    /// Checks that a simulation can be constructed from this configuration.
    pub fn validate(&self) -> SimResult<()> {
        let lattice = Lattice::new(&self.dimensions)?;
        Neighborhood::new(lattice.ndim(), self.radius)?;
        self.worker_count()?;
        Ok(())
    }
}

/// Returns one less than the available parallelism, and at least 1.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}
