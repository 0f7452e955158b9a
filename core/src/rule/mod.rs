//! Everything related to the description of a cellular automaton rule,
//! primarily the transition function.
//!
//! Both rule families are decoded from a single arbitrary-size integer. Rule
//! integers wider than a family needs are accepted, and the extra high bits
//! are ignored.

use num::BigUint;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

mod count;
mod pattern;

use crate::error::SimError;
use crate::lattice::{Lattice, Neighborhood};
pub use count::CountRule;
pub use pattern::PatternRule;

/// Computes the next state of a single cell.
pub trait Transition: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the next value of cell `i` given the current `state` of the
    /// whole lattice.
    fn next_cell(
        &self,
        lattice: &Lattice,
        neighborhood: &Neighborhood,
        state: &BigUint,
        i: usize,
    ) -> bool;
}

/// Applies a transition function to a contiguous range of cells.
///
/// The result has bit `i` set for every cell `i` in `cells` that is alive in
/// the next generation and no other bits set, so the results for disjoint
/// ranges may be combined in any order using bitwise OR or addition.
pub fn evaluate_range<T: Transition + ?Sized>(
    rule: &T,
    lattice: &Lattice,
    neighborhood: &Neighborhood,
    state: &BigUint,
    cells: Range<usize>,
) -> BigUint {
    let mut digits = vec![0_u32; (cells.end + 31) / 32];
    for i in cells {
        if rule.next_cell(lattice, neighborhood, state, i) {
            digits[i / 32] |= 1 << (i % 32);
        }
    }
    BigUint::new(digits)
}

/// Selector for a rule family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Outer totalistic rule that depends on the number of live neighbors.
    Count,
    /// Rule that maps every configuration of the neighborhood to an output.
    Pattern,
}
impl RuleKind {
    /// List of all rule kinds.
    pub const ALL: &'static [RuleKind] = &[RuleKind::Count, RuleKind::Pattern];

    /// Returns the name of the rule kind.
    pub const fn name(self) -> &'static str {
        match self {
            RuleKind::Count => "count",
            RuleKind::Pattern => "pattern",
        }
    }
}
impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl FromStr for RuleKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, SimError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SimError::UnknownRuleKind(s.to_owned()))
    }
}

/// Decoded cellular automaton rule of either family.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Count(CountRule),
    Pattern(PatternRule),
}
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Count(r) => write!(f, "{}", r),
            Rule::Pattern(r) => write!(f, "{}", r),
        }
    }
}
impl From<CountRule> for Rule {
    fn from(r: CountRule) -> Self {
        Self::Count(r)
    }
}
impl From<PatternRule> for Rule {
    fn from(r: PatternRule) -> Self {
        Self::Pattern(r)
    }
}

impl Rule {
    /// Decodes a rule integer for the given family and neighborhood.
    pub fn decode(kind: RuleKind, rule: &BigUint, neighborhood: &Neighborhood) -> Self {
        match kind {
            RuleKind::Count => CountRule::decode(rule, neighborhood.neighbor_count()).into(),
            RuleKind::Pattern => PatternRule::decode(rule, neighborhood.len()).into(),
        }
    }

    /// Returns the family of the rule.
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Count(_) => RuleKind::Count,
            Rule::Pattern(_) => RuleKind::Pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_from_str() {
        assert_eq!(Ok(RuleKind::Count), "count".parse());
        assert_eq!(Ok(RuleKind::Pattern), " Pattern ".parse());
        assert_eq!(
            Err(SimError::UnknownRuleKind("hashlife".to_owned())),
            "hashlife".parse::<RuleKind>(),
        );
        for &kind in RuleKind::ALL {
            assert_eq!(Ok(kind), kind.to_string().parse());
        }
    }

    #[test]
    fn test_decode_selects_family() {
        let nbhd = Neighborhood::new(1, 1).unwrap();
        let rule = BigUint::from(30_u32);
        assert_eq!(RuleKind::Count, Rule::decode(RuleKind::Count, &rule, &nbhd).kind());
        assert_eq!(
            RuleKind::Pattern,
            Rule::decode(RuleKind::Pattern, &rule, &nbhd).kind(),
        );
    }

    #[test]
    fn test_evaluate_range_is_confined_to_range() {
        let lattice = Lattice::new(&[40]).unwrap();
        let nbhd = Neighborhood::new(1, 1).unwrap();
        // Every pattern maps to 1.
        let rule = PatternRule::decode(&BigUint::from(0xFF_u32), nbhd.len());
        let state = BigUint::from(0_u32);
        let result = evaluate_range(&rule, &lattice, &nbhd, &state, 33..36);
        assert_eq!(BigUint::from(0b111_u64 << 33), result);
        assert_eq!(
            BigUint::from(0_u32),
            evaluate_range(&rule, &lattice, &nbhd, &state, 5..5),
        );
    }
}
