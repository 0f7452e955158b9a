//! Errors produced while configuring or running a simulation.

use thiserror::Error;

/// Result type returned by fallible simulation routines.
pub type SimResult<T> = Result<T, SimError>;

/// Error encountered while setting up or stepping a simulation.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SimError {
    #[error("lattice must have at least one dimension")]
    NoDimensions,
    #[error("axis {axis} has size zero")]
    ZeroDimension { axis: usize },
    #[error("lattice with dimensions {0:?} has too many cells")]
    LatticeTooLarge(Vec<usize>),
    #[error("radius-{radius} neighborhood in {ndim} dimensions has too many cells")]
    NeighborhoodTooLarge { ndim: usize, radius: usize },
    #[error("unknown rule kind {0:?}; expected \"count\" or \"pattern\"")]
    UnknownRuleKind(String),
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("unable to build worker pool: {0}")]
    ThreadPool(String),
    #[error("worker panicked during generation {generation}: {message}")]
    WorkerPanicked { generation: u64, message: String },
}
