//! Run configuration and its validation.
use crate::simulation::scoring::ScoringWeights;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a configuration value is out of range. Contains a
/// descriptive message naming the offending field.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConfigError(pub &'static str);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Central configuration for a co-evolution run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoevolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,

    pub max_attack_chain_length: usize,
    pub defender_budget: usize,

    pub matchups_per_eval: usize,
    pub hall_of_fame_size: usize,
    pub hof_opponent_fraction: f64,

    pub stagnation_window: usize,
    pub immigrant_fraction: f64,

    pub seed: u64,

    pub scoring: ScoringWeights,
}

impl Default for CoevolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 80,
            num_generations: 300,
            tournament_size: 5,
            crossover_rate: 0.7,
            mutation_rate: 0.2,
            max_attack_chain_length: 12,
            defender_budget: 15,
            matchups_per_eval: 5,
            hall_of_fame_size: 10,
            hof_opponent_fraction: 0.2,
            stagnation_window: 20,
            immigrant_fraction: 0.1,
            seed: 42,
            scoring: ScoringWeights::default(),
        }
    }
}

impl CoevolutionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError("population_size must be at least 2"));
        }
        if self.num_generations == 0 {
            return Err(ConfigError("num_generations must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(ConfigError("tournament_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(ConfigError("crossover_rate must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError("mutation_rate must be within [0, 1]"));
        }
        if self.max_attack_chain_length < 3 {
            return Err(ConfigError("max_attack_chain_length must be at least 3"));
        }
        if self.defender_budget < 3 {
            return Err(ConfigError("defender_budget must be at least 3"));
        }
        if self.matchups_per_eval == 0 {
            return Err(ConfigError("matchups_per_eval must be at least 1"));
        }
        if self.hall_of_fame_size == 0 {
            return Err(ConfigError("hall_of_fame_size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.hof_opponent_fraction) {
            return Err(ConfigError("hof_opponent_fraction must be within [0, 1]"));
        }
        if self.stagnation_window == 0 {
            return Err(ConfigError("stagnation_window must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.immigrant_fraction) {
            return Err(ConfigError("immigrant_fraction must be within [0, 1]"));
        }
        if self
            .scoring
            .all()
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(ConfigError("scoring weights must be finite and non-negative"));
        }
        Ok(())
    }
}
