use log::debug;
use num::BigUint;
use std::fmt;

use super::Transition;
use crate::lattice::{Lattice, Neighborhood};

/// A 2-state rule that looks up the next state of a cell from the exact
/// configuration of its neighborhood, including the cell itself.
///
/// The neighborhood is packed into a pattern index with the cell at
/// enumeration position `j` of the neighborhood as bit `j`. Bit `p` of the
/// rule integer is the output for pattern index `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    /// Rule integer, truncated to the bits that can be reached.
    rule: BigUint,
    /// Output bits, 64 per word.
    table: Box<[u64]>,
    /// Number of meaningful bits in `table`. Every pattern at or beyond this
    /// index maps to 0.
    table_len: usize,
    pattern_bits: usize,
}

impl PatternRule {
    /// Decodes a rule integer for a neighborhood of `pattern_bits` cells
    /// (including the center cell).
    pub fn decode(rule: &BigUint, pattern_bits: usize) -> Self {
        let pattern_count = if pattern_bits < usize::BITS as usize {
            1_usize << pattern_bits
        } else {
            usize::MAX
        };
        let table_len = std::cmp::min(rule.bits(), pattern_count as u64) as usize;
        if (table_len as u64) < rule.bits() {
            debug!(
                "Ignoring bits above {} in pattern rule for {}-cell neighborhood",
                table_len, pattern_bits,
            );
        }

        let mut table = rule.to_u64_digits();
        table.truncate((table_len + 63) / 64);
        if let Some(last) = table.last_mut() {
            if table_len % 64 != 0 {
                *last &= (1 << (table_len % 64)) - 1;
            }
        }
        let table = table.into_boxed_slice();

        let mut rule = BigUint::default();
        for (word_index, &word) in table.iter().enumerate() {
            rule |= BigUint::from(word) << (word_index * 64);
        }

        Self {
            rule,
            table,
            table_len,
            pattern_bits,
        }
    }

    /// Returns the output for a pattern index.
    #[inline]
    pub fn output(&self, pattern: usize) -> bool {
        pattern < self.table_len && self.table[pattern / 64] >> (pattern % 64) & 1 != 0
    }

    /// Returns the number of pattern indices with an explicit table entry.
    #[inline]
    pub fn table_len(&self) -> usize {
        self.table_len
    }
    /// Returns the number of cells in a pattern.
    #[inline]
    pub fn pattern_bits(&self) -> usize {
        self.pattern_bits
    }
}

impl fmt::Display for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.rule)
    }
}

impl Transition for PatternRule {
    fn next_cell(
        &self,
        lattice: &Lattice,
        neighborhood: &Neighborhood,
        state: &BigUint,
        i: usize,
    ) -> bool {
        let mut pattern = 0_usize;
        for (j, offsets) in neighborhood.offsets().enumerate() {
            if state.bit(lattice.neighbor_index(i, offsets) as u64) {
                if j >= usize::BITS as usize {
                    // Pattern index is past the end of any table.
                    return false;
                }
                pattern |= 1 << j;
            }
        }
        self.output(pattern)
    }
}
