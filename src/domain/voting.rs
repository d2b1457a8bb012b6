//! Quorum validation of payment amounts across redundant calculators
//!
//! Three independent calculators each report the amount they consider correct. The
//! largest group of identical results wins the vote and becomes the authoritative
//! amount; every calculator outside the majority is retired from future votes. When
//! retirement would leave fewer than two voters, all retirements are lifted since a
//! single calculator cannot be cross-checked.

use super::Amount;
use log::warn;
use std::collections::{BTreeMap, HashSet};

/// Names of the redundant calculators, in roster order
pub const CALCULATOR_ROSTER: [&str; 3] = ["calc_a", "calc_b", "calc_c"];

/// Redundant computation of the amount to charge
pub trait AmountCalculator: Send + Sync {
    /// Name under which the calculator votes
    fn name(&self) -> &str;

    /// Amount this calculator considers correct for the requested one
    fn compute(&self, amount: Amount) -> Amount;
}

/// Calculator reporting the requested amount unchanged
pub struct ReferenceCalculator {
    name: String,
}

impl ReferenceCalculator {
    /// Creates a new instance voting under the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl AmountCalculator for ReferenceCalculator {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, amount: Amount) -> Amount {
        amount
    }
}

/// Deterministically faulty calculator adding a fixed offset
///
/// Used for fault-injection drills to watch one roster member get outvoted and retired.
pub struct SkewedCalculator {
    name: String,
    offset: Amount,
}

impl SkewedCalculator {
    /// Creates a new instance voting under the given name
    pub fn new(name: &str, offset: Amount) -> Self {
        Self {
            name: name.to_owned(),
            offset,
        }
    }
}

impl AmountCalculator for SkewedCalculator {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, amount: Amount) -> Amount {
        amount + self.offset
    }
}

/// Result of a single vote
#[derive(Debug)]
pub struct VoteOutcome {
    /// Value reported by each active calculator
    pub results: BTreeMap<String, Amount>,
    /// Authoritative amount established by the majority
    pub majority_value: Amount,
    /// Calculators that voted for the majority value
    pub majority_group: Vec<String>,
    /// Whether any calculator disagreed with the majority
    pub divergence: bool,
    /// Calculators retired by this vote
    pub newly_retired: Vec<String>,
    /// Calculators still trusted after this vote
    pub active_calculators: Vec<String>,
}

/// Majority voting engine with permanent retirement of divergent calculators
pub struct VotingEngine {
    calculators: Vec<Box<dyn AmountCalculator>>,
    retired: HashSet<String>,
}

impl VotingEngine {
    /// Creates a new instance voting across the given calculators
    pub fn new(calculators: Vec<Box<dyn AmountCalculator>>) -> Self {
        Self {
            calculators,
            retired: HashSet::new(),
        }
    }

    /// Creates the default three-member roster, optionally replacing one member
    /// with a skewed calculator for fault-injection drills
    pub fn with_roster(skew: Option<(&str, Amount)>) -> Self {
        let calculators = CALCULATOR_ROSTER
            .iter()
            .map(|name| match &skew {
                Some((skewed_name, offset)) if skewed_name == name => {
                    Box::new(SkewedCalculator::new(name, *offset)) as Box<dyn AmountCalculator>
                }
                _ => Box::new(ReferenceCalculator::new(name)) as Box<dyn AmountCalculator>,
            })
            .collect();

        Self::new(calculators)
    }

    /// Names of currently retired calculators
    pub fn retired(&self) -> Vec<String> {
        let mut names: Vec<_> = self.retired.iter().cloned().collect();
        names.sort();
        names
    }

    /// Names of currently trusted calculators, in roster order
    pub fn active(&self) -> Vec<String> {
        self.calculators
            .iter()
            .filter(|c| !self.retired.contains(c.name()))
            .map(|c| c.name().to_owned())
            .collect()
    }

    /// Establishes the authoritative amount for a payment by majority vote
    ///
    /// Retires every calculator outside the majority. Ties between equally large
    /// groups resolve to the group encountered first in roster order.
    pub fn validate(&mut self, amount: Amount) -> VoteOutcome {
        // A lone calculator cannot be cross-checked. Losing redundancy is preferable
        // to losing the quorum entirely, so all retirements are lifted.
        if self.active().len() < 2 {
            warn!(
                "Fewer than two active calculators remain, reinstating {:?}",
                self.retired()
            );
            self.retired.clear();
        }

        let mut results = BTreeMap::new();
        let mut groups: Vec<(Amount, Vec<String>)> = Vec::new();

        for calculator in self
            .calculators
            .iter()
            .filter(|c| !self.retired.contains(c.name()))
        {
            let value = calculator.compute(amount);
            results.insert(calculator.name().to_owned(), value);

            match groups.iter_mut().find(|(group_value, _)| *group_value == value) {
                Some((_, members)) => members.push(calculator.name().to_owned()),
                None => groups.push((value, vec![calculator.name().to_owned()])),
            }
        }

        // Strictly-greater comparison keeps the first-encountered group on ties
        let mut majority = &groups[0];
        for group in &groups[1..] {
            if group.1.len() > majority.1.len() {
                majority = group;
            }
        }

        let (majority_value, majority_group) = (majority.0, majority.1.clone());
        let divergence = groups.len() > 1;

        let newly_retired: Vec<String> = results
            .keys()
            .filter(|name| !majority_group.contains(name))
            .cloned()
            .collect();

        for name in &newly_retired {
            warn!("Retiring divergent calculator {}", name);
            self.retired.insert(name.clone());
        }

        VoteOutcome {
            results,
            majority_value,
            majority_group,
            divergence,
            newly_retired,
            active_calculators: self.active(),
        }
    }
}
