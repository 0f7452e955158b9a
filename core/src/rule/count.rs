use itertools::Itertools;
use log::debug;
use num::BigUint;
use std::fmt;

use super::Transition;
use crate::lattice::{Lattice, Neighborhood};

/// A 2-state outer totalistic rule with a Moore neighborhood of any radius and
/// dimensionality.
///
/// The rule integer holds two bitmasks, each `n + 2` bits wide for a
/// neighborhood of `n` neighbors: the birth mask in the low bits and the
/// survival mask starting at bit `n + 1`. Bit `c` of a mask is set if a cell
/// with exactly `c` live neighbors is born (or survives).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRule {
    birth: Box<[bool]>,
    survival: Box<[bool]>,
}

impl CountRule {
    /// Decodes a rule integer for a neighborhood with `neighbor_count`
    /// neighbors (not counting the center cell).
    pub fn decode(rule: &BigUint, neighbor_count: usize) -> Self {
        let width = neighbor_count + 2;
        let survival_start = neighbor_count as u64 + 1;
        let used_bits = survival_start + width as u64;
        if rule.bits() > used_bits {
            debug!(
                "Ignoring bits above {} in count rule {} for {} neighbors",
                used_bits, rule, neighbor_count,
            );
        }

        Self {
            birth: (0..width as u64).map(|c| rule.bit(c)).collect(),
            survival: (0..width as u64)
                .map(|c| rule.bit(survival_start + c))
                .collect(),
        }
    }

    /// Encodes lists of birth and survival conditions as a rule integer for a
    /// neighborhood with `neighbor_count` neighbors.
    ///
    /// # Panics
    ///
    /// This function panics if any count exceeds `neighbor_count`.
    pub fn encode(neighbor_count: usize, births: &[usize], survivals: &[usize]) -> BigUint {
        let mut rule = BigUint::default();
        for &c in births {
            assert!(c <= neighbor_count, "Birth condition out of range");
            rule.set_bit(c as u64, true);
        }
        for &c in survivals {
            assert!(c <= neighbor_count, "Survival condition out of range");
            rule.set_bit((neighbor_count + 1 + c) as u64, true);
        }
        rule
    }

    /// Returns the number of neighbors the rule was decoded for.
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.birth.len() - 2
    }

    /// Returns whether a dead cell with `count` live neighbors is born.
    #[inline]
    pub fn births_on(&self, count: usize) -> bool {
        self.birth.get(count).copied().unwrap_or(false)
    }
    /// Returns whether a live cell with `count` live neighbors survives.
    #[inline]
    pub fn survives_on(&self, count: usize) -> bool {
        self.survival.get(count).copied().unwrap_or(false)
    }

    /// Returns the birth bitmask.
    pub fn birth_mask(&self) -> BigUint {
        to_mask(&self.birth)
    }
    /// Returns the survival bitmask.
    pub fn survive_mask(&self) -> BigUint {
        to_mask(&self.survival)
    }
}

fn to_mask(bits: &[bool]) -> BigUint {
    let mut mask = BigUint::default();
    for (c, &bit) in bits.iter().enumerate() {
        if bit {
            mask.set_bit(c as u64, true);
        }
    }
    mask
}

impl fmt::Display for CountRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.neighbor_count();
        let sep = if n > 9 { "," } else { "" };
        let conditions = |on: &dyn Fn(usize) -> bool| (0..=n).filter(|&c| on(c)).join(sep);
        write!(
            f,
            "B{}/S{}",
            conditions(&|c| self.births_on(c)),
            conditions(&|c| self.survives_on(c)),
        )
    }
}

impl Transition for CountRule {
    fn next_cell(
        &self,
        lattice: &Lattice,
        neighborhood: &Neighborhood,
        state: &BigUint,
        i: usize,
    ) -> bool {
        let center = neighborhood.center();
        let live_neighbors = neighborhood
            .offsets()
            .enumerate()
            .filter(|&(j, offsets)| {
                j != center && state.bit(lattice.neighbor_index(i, offsets) as u64)
            })
            .count();
        if state.bit(i as u64) {
            self.survives_on(live_neighbors)
        } else {
            self.births_on(live_neighbors)
        }
    }
}
