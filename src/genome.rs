//! Evolving individuals: attacker kill chains and defender rule sets.
//!
//! Both genome kinds carry a two-objective [MultiFitness] and implement the
//! [Genome] trait, which is the seam the selection, hall-of-fame and
//! immigrant machinery is generic over.
pub mod attack;
pub mod defense;

use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// A two-objective fitness vector. Both objectives are maximized with equal
/// weight under the non-dominated selection.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiFitness {
    pub objectives: [f64; 2],
}

impl MultiFitness {
    pub fn new(primary: f64, secondary: f64) -> Self {
        Self {
            objectives: [primary, secondary],
        }
    }

    pub fn primary(&self) -> f64 {
        self.objectives[0]
    }
    pub fn secondary(&self) -> f64 {
        self.objectives[1]
    }

    /// Pareto dominance: at least as good on both objectives and strictly
    /// better on one.
    pub fn dominates(&self, other: &MultiFitness) -> bool {
        let at_least_as_good = self
            .objectives
            .iter()
            .zip(other.objectives.iter())
            .all(|(a, b)| a >= b);
        let strictly_better = self
            .objectives
            .iter()
            .zip(other.objectives.iter())
            .any(|(a, b)| a > b);
        at_least_as_good && strictly_better
    }
}

/// Common surface of the two genome kinds.
pub trait Genome: Clone + Send + Sync + std::fmt::Debug {
    /// Canonical identity used for hall-of-fame deduplication.
    type Key: Clone + Eq + Ord + Hash + Send + Sync;

    fn fitness(&self) -> Option<MultiFitness>;
    fn set_fitness(&mut self, fitness: MultiFitness);
    fn invalidate_fitness(&mut self);
    fn canonical_key(&self) -> Self::Key;
}
