//! Checks that splitting a generation across workers never changes the
//! result.

use itertools::Itertools;
use num::bigint::RandBigInt;
use num::Zero;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

use crate::prelude::*;
use crate::rule::evaluate_range;
use crate::sim::step_with;

/// Returns a random partition of `0..len` into contiguous (possibly empty)
/// ranges.
fn random_partition(rng: &mut StdRng, len: usize) -> Vec<Range<usize>> {
    let mut cuts = (0..rng.gen_range(0..8))
        .map(|_| rng.gen_range(0..=len))
        .collect_vec();
    cuts.push(0);
    cuts.push(len);
    cuts.sort_unstable();
    cuts.into_iter().tuple_windows().map(|(a, b)| a..b).collect()
}

fn check_partitions<T: Transition>(dims: &[usize], radius: usize, rule: &T, seed: u64) {
    let lattice = Lattice::new(dims).unwrap();
    let nbhd = Neighborhood::new(lattice.ndim(), radius).unwrap();
    let pool = PoolExecutor::new(3).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);

    for _ in 0..60 {
        let state = rng.gen_biguint(lattice.len() as u64);
        let sequential = evaluate_range(rule, &lattice, &nbhd, &state, 0..lattice.len());

        let parts = random_partition(&mut rng, lattice.len())
            .into_iter()
            .map(|cells| evaluate_range(rule, &lattice, &nbhd, &state, cells))
            .collect_vec();
        let or = parts.iter().fold(BigUint::zero(), |acc, part| acc | part);
        let sum = parts.iter().fold(BigUint::zero(), |acc, part| acc + part);
        assert_eq!(sequential, or);
        assert_eq!(sequential, sum);

        let pooled = step_with(&pool, &lattice, &nbhd, rule, &state, 1).unwrap();
        assert_eq!(sequential, pooled);
    }
}

#[test]
fn test_count_rule_partitions() {
    let life = CountRule::decode(&CountRule::encode(8, &[3], &[2, 3]), 8);
    check_partitions(&[7, 6], 1, &life, 1);

    let nbhd = Neighborhood::new(3, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let rule = CountRule::decode(&rng.gen_biguint(60), nbhd.neighbor_count());
    check_partitions(&[3, 4, 5], 1, &rule, 3);
}

#[test]
fn test_pattern_rule_partitions() {
    let mut rng = StdRng::seed_from_u64(4);
    let rule = PatternRule::decode(&rng.gen_biguint(512), 9);
    check_partitions(&[5, 8], 1, &rule, 5);
}

#[test]
fn test_parallel_simulation_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(6);
    for &kind in RuleKind::ALL {
        let config = SimulationConfig::new(vec![9, 7], kind, rng.gen_biguint(512))
            .with_seed(rng.gen())
            .with_iterations(12);
        let sequential: Vec<_> = Simulation::new(config.clone()).unwrap().collect();
        let sim = Simulation::new(config.with_workers(4)).unwrap();
        assert_eq!(4, sim.workers());
        let parallel: Vec<_> = sim.collect();
        assert_eq!(13, sequential.len());
        assert_eq!(sequential, parallel);
    }
}

#[test]
fn test_default_parallelism_matches_sequential() {
    let life = CountRule::encode(8, &[3], &[2, 3]);
    let config = SimulationConfig::new(vec![16, 16], RuleKind::Count, life)
        .with_seed(7)
        .with_iterations(6);
    let sequential: Vec<_> = Simulation::new(config.clone()).unwrap().collect();
    let parallel: Vec<_> = Simulation::new(config.parallel(true)).unwrap().collect();
    assert_eq!(sequential, parallel);
}
