//! Attacker genomes: ordered kill chains of technique steps.
use super::{Genome, MultiFitness};
use crate::network::host::HostRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy for picking the target host of a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSelector {
    HighestCriticality,
    LeastDefended,
    MostConnected,
    RandomReachable,
    SpecificRole,
}

impl TargetSelector {
    pub const ALL: [TargetSelector; 5] = [
        TargetSelector::HighestCriticality,
        TargetSelector::LeastDefended,
        TargetSelector::MostConnected,
        TargetSelector::RandomReachable,
        TargetSelector::SpecificRole,
    ];
}

/// A single step in an attack chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackGene {
    pub technique_id: String,
    pub target_selector: TargetSelector,
    #[serde(default)]
    pub target_role: Option<HostRole>,
    #[serde(default)]
    pub fallback_technique: Option<String>,
    pub stealth_modifier: f64,
}

impl AttackGene {
    pub fn new(technique_id: &str) -> Self {
        Self {
            technique_id: technique_id.to_string(),
            target_selector: TargetSelector::RandomReachable,
            target_role: None,
            fallback_technique: None,
            stealth_modifier: 0.0,
        }
    }
}

/// Variable-length ordered sequence of [AttackGene]s, one kill chain.
///
/// Invariants, enforced by the operators:
/// * `genes[0]` is an initial access technique
/// * `2 <= genes.len() <= max_length`
/// * every technique id exists in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackGenome {
    pub genes: Vec<AttackGene>,
    pub max_length: usize,
    #[serde(default)]
    pub fitness: Option<MultiFitness>,
}

impl AttackGenome {
    pub fn new(genes: Vec<AttackGene>, max_length: usize) -> Self {
        Self {
            genes,
            max_length,
            fitness: None,
        }
    }

    /// The technique id sequence of the chain.
    pub fn kill_chain(&self) -> Vec<&str> {
        self.genes.iter().map(|g| g.technique_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl Genome for AttackGenome {
    type Key = Vec<String>;

    fn fitness(&self) -> Option<MultiFitness> {
        self.fitness
    }
    fn set_fitness(&mut self, fitness: MultiFitness) {
        self.fitness = Some(fitness);
    }
    fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }
    fn canonical_key(&self) -> Self::Key {
        self.genes.iter().map(|g| g.technique_id.clone()).collect()
    }
}

impl fmt::Display for AttackGenome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kill_chain().join(" -> "))
    }
}
