//! Parsing command-line arguments.

use clap::builder::PossibleValuesParser;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;

use ndtorus_core::prelude::{BigUint, RuleKind};

use crate::presets;
use crate::settings::{Dimensions, InitialState, Settings};

/// Simulate n-dimensional binary cellular automata on a torus.
///
/// Each state of the simulation is printed as a decimal integer on its own
/// line, with bit `i` holding the cell at linear index `i`. Settings are taken
/// from presets, then from files, then from flags, with later sources
/// overriding earlier ones.
#[derive(Debug, Parser)]
#[command(name = "ndtorus", version, author)]
pub struct Args {
    /// Dimensions of the lattice, formatted as N[xN[xN[...]]]
    #[arg(short, long)]
    pub dimensions: Option<Dimensions>,
    /// Rule family ("count" or "pattern")
    #[arg(short, long)]
    pub method: Option<RuleKind>,
    /// Rule to simulate
    #[arg(short, long)]
    pub rule: Option<BigUint>,
    /// Number of generations to simulate (negative to run forever)
    #[arg(short, long, allow_hyphen_values = true)]
    pub iterations: Option<i64>,
    /// Radius of the Moore neighborhood
    #[arg(short = 'n', long)]
    pub neighborhood_radius: Option<usize>,
    /// Initial state of the lattice (negative for a random state)
    #[arg(long, allow_hyphen_values = true)]
    pub initial_state: Option<InitialState>,
    /// Seed for the random initial state
    #[arg(long)]
    pub seed: Option<u64>,
    /// Evaluate cells on a thread pool
    #[arg(long)]
    pub parallelize: bool,
    /// Number of threads in the pool (implies --parallelize)
    #[arg(long)]
    pub workers: Option<usize>,
    /// Do not print the initial state
    #[arg(long)]
    pub skip_initial_state: bool,
    /// Built-in preset to load settings from (may be repeated)
    #[arg(short, long, value_parser = PossibleValuesParser::new(presets::NAMES))]
    pub preset: Vec<String>,
    /// YAML file to load settings from (may be repeated)
    #[arg(short, long)]
    pub file: Vec<PathBuf>,
    /// Log more details to stderr (may be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Returns the settings given on the command line.
    pub fn settings(&self) -> Settings {
        Settings {
            dimensions: self.dimensions.clone(),
            method: self.method,
            rule: self.rule.clone(),
            iterations: self.iterations,
            neighborhood_radius: self.neighborhood_radius,
            initial_state: self.initial_state.clone(),
            seed: self.seed,
            parallelize: if self.parallelize || self.workers.is_some() {
                Some(true)
            } else {
                None
            },
            workers: self.workers,
            skip_initial_state: if self.skip_initial_state {
                Some(true)
            } else {
                None
            },
        }
    }

    /// Returns the maximum level of log messages to show.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
