//! N-dimensional toroidal binary cellular automaton simulation backend.
//!
//! The whole lattice is stored as one arbitrary-size unsigned integer, with
//! bit `i` holding the cell at linear index `i`. A `Simulation` decodes a
//! rule integer once and then lazily yields one state per generation.

#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![deny(clippy::correctness)]

pub mod config;
pub mod error;
pub mod lattice;
pub mod rule;
pub mod sim;

pub use num::BigUint;

pub mod prelude {
    //! Commonly used types.

    pub use crate::config::SimulationConfig;
    pub use crate::error::{SimError, SimResult};
    pub use crate::lattice::{Lattice, Neighborhood};
    pub use crate::rule::{CountRule, PatternRule, Rule, RuleKind, Transition};
    pub use crate::sim::{Executor, PoolExecutor, SequentialExecutor, Simulation};
    pub use num::BigUint;
}

#[cfg(test)]
mod tests;
