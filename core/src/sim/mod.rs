//! Simulation driver.
//!
//! A `Simulation` is a lazy iterator over the states of a lattice. Each call
//! to `next()` computes at most one generation, so an unbounded simulation
//! only does as much work as its consumer asks for.

use log::{debug, trace, warn};
use num::bigint::RandBigInt;
use num::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::any::Any;
use std::convert::TryFrom;
use std::iter::FusedIterator;
use std::panic::{self, AssertUnwindSafe};

mod executor;

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::lattice::{Lattice, Neighborhood};
use crate::rule::{evaluate_range, Rule, Transition};
pub use executor::{chunks, CellRangeFn, Executor, PoolExecutor, SequentialExecutor};

/// Lazily-evaluated sequence of lattice states.
///
/// The first element is the initial state (unless the configuration skips
/// it), and every following element is one generation after the previous
/// one. A simulation cannot be restarted; once it returns `None` it always
/// returns `None`. If a step fails, the error is returned once and the
/// simulation ends.
#[derive(Debug)]
pub struct Simulation {
    lattice: Lattice,
    neighborhood: Neighborhood,
    rule: Rule,
    executor: Box<dyn Executor>,
    /// Most recent state, or `None` once the simulation has ended.
    state: Option<BigUint>,
    /// Whether the current state still has to be yielded.
    emit_current: bool,
    generation: u64,
    iterations: Option<u64>,
}

impl Simulation {
    /// Sets up a simulation, failing if the configuration is invalid.
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        let lattice = Lattice::new(&config.dimensions)?;
        let neighborhood = Neighborhood::new(lattice.ndim(), config.radius)?;
        let workers = config.worker_count()?;
        let executor: Box<dyn Executor> = if workers == 1 {
            Box::new(SequentialExecutor)
        } else {
            Box::new(PoolExecutor::new(workers)?)
        };
        let rule = Rule::decode(config.kind, &config.rule, &neighborhood);

        let initial_state = match config.initial_state {
            Some(state) => {
                if state.bits() > lattice.len() as u64 {
                    warn!(
                        "Initial state has {} bits but the lattice only has {} cells; \
                         the extra bits are not part of the lattice",
                        state.bits(),
                        lattice.len(),
                    );
                }
                state
            }
            None => random_state(&lattice, config.seed),
        };

        debug!(
            "Simulating {:?} lattice with {} rule {} ({}-cell neighborhood) on {} worker(s)",
            lattice.dimensions(),
            rule.kind(),
            rule,
            neighborhood.len(),
            executor.workers(),
        );

        Ok(Self {
            lattice,
            neighborhood,
            rule,
            executor,
            state: Some(initial_state),
            emit_current: !config.skip_initial_state,
            generation: 0,
            iterations: config.iterations,
        })
    }

    /// Returns the lattice being simulated.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }
    /// Returns the neighborhood used by the rule.
    pub fn neighborhood(&self) -> &Neighborhood {
        &self.neighborhood
    }
    /// Returns the decoded rule.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
    /// Returns the number of workers used for each step.
    pub fn workers(&self) -> usize {
        self.executor.workers()
    }
    /// Returns the number of generations computed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
    /// Returns whether the simulation never ends on its own.
    pub fn is_unbounded(&self) -> bool {
        self.iterations.is_none()
    }
    /// Returns the number of generations left to compute, or `None` if the
    /// simulation is unbounded.
    pub fn remaining(&self) -> Option<u64> {
        if self.state.is_none() {
            return Some(0);
        }
        self.iterations
            .map(|iterations| iterations.saturating_sub(self.generation))
    }

    /// Computes the generation after `state`.
    fn step(&self, state: &BigUint) -> SimResult<BigUint> {
        let generation = self.generation + 1;
        match &self.rule {
            Rule::Count(rule) => step_with(
                &*self.executor,
                &self.lattice,
                &self.neighborhood,
                rule,
                state,
                generation,
            ),
            Rule::Pattern(rule) => step_with(
                &*self.executor,
                &self.lattice,
                &self.neighborhood,
                rule,
                state,
                generation,
            ),
        }
    }
}

impl Iterator for Simulation {
    type Item = SimResult<BigUint>;

    fn next(&mut self) -> Option<SimResult<BigUint>> {
        if self.emit_current {
            self.emit_current = false;
            return self.state.clone().map(Ok);
        }
        if self.remaining() == Some(0) {
            self.state = None;
            return None;
        }

        let state = self.state.take()?;
        match self.step(&state) {
            Ok(next) => {
                self.generation += 1;
                trace!(
                    "Generation {}: population {}",
                    self.generation,
                    self.lattice.population(&next),
                );
                self.state = Some(next.clone());
                Some(Ok(next))
            }
            Err(e) => Some(Err(e)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining() {
            Some(steps) => {
                let len = usize::try_from(steps)
                    .ok()
                    .and_then(|steps| steps.checked_add(self.emit_current as usize));
                match len {
                    Some(n) => (n, Some(n)),
                    None => (usize::MAX, None),
                }
            }
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Simulation {}

/// Computes one generation of a rule on an executor. A panic while
/// evaluating cells fails the whole step.
pub(crate) fn step_with<T: Transition>(
    executor: &dyn Executor,
    lattice: &Lattice,
    neighborhood: &Neighborhood,
    rule: &T,
    state: &BigUint,
    generation: u64,
) -> SimResult<BigUint> {
    panic::catch_unwind(AssertUnwindSafe(|| {
        executor.reduce(lattice.len(), &|cells| {
            evaluate_range(rule, lattice, neighborhood, state, cells)
        })
    }))
    .map_err(|payload| SimError::WorkerPanicked {
        generation,
        message: panic_message(&*payload),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Returns a uniformly random state of the lattice.
fn random_state(lattice: &Lattice, seed: Option<u64>) -> BigUint {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rng.gen_biguint(lattice.len() as u64)
}
