//! Aggregates matchup results into two-objective fitness vectors.
use crate::genome::defense::DefenseGenome;
use crate::genome::MultiFitness;
use crate::simulation::state::MatchResult;
use serde::{Deserialize, Serialize};

/// Weights used in fitness scoring.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub host_criticality_multiplier: f64,
    pub credential_value: f64,
    pub exfiltration_bonus: f64,
    pub kill_chain_length_value: f64,
    pub detection_value: f64,
    pub no_exfiltration_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            host_criticality_multiplier: 10.0,
            credential_value: 3.0,
            exfiltration_bonus: 50.0,
            kill_chain_length_value: 2.0,
            detection_value: 10.0,
            no_exfiltration_bonus: 30.0,
        }
    }
}

impl ScoringWeights {
    pub fn all(&self) -> [f64; 6] {
        [
            self.host_criticality_multiplier,
            self.credential_value,
            self.exfiltration_bonus,
            self.kill_chain_length_value,
            self.detection_value,
            self.no_exfiltration_bonus,
        ]
    }
}

/// Attacker fitness (effectiveness, stealth), each averaged over the
/// matchups of one generation.
pub fn attacker_fitness(results: &[MatchResult], weights: &ScoringWeights) -> MultiFitness {
    if results.is_empty() {
        return MultiFitness::new(0.0, 0.0);
    }

    let mut total_effectiveness = 0.0;
    let mut total_stealth = 0.0;
    for result in results {
        total_effectiveness += result.max_criticality_reached
            * result.hosts_compromised as f64
            * weights.host_criticality_multiplier
            + result.credentials_obtained as f64 * weights.credential_value
            + if result.data_exfiltrated {
                weights.exfiltration_bonus
            } else {
                0.0
            }
            + result.kill_chain_length as f64 * weights.kill_chain_length_value;

        let attempted = result.techniques_attempted.max(1) as f64;
        total_stealth += 1.0 - result.techniques_detected as f64 / attempted;
    }

    let count = results.len() as f64;
    MultiFitness::new(total_effectiveness / count, total_stealth / count)
}

/// Defender coverage, averaged over the matchups of one generation. The
/// efficiency objective is a property of the genome itself, see
/// [defender_efficiency].
pub fn defender_coverage(results: &[MatchResult], weights: &ScoringWeights) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let mut total_coverage = 0.0;
    for result in results {
        let attempted = result.techniques_attempted.max(1) as f64;
        let detection_rate = result.techniques_detected as f64 / attempted;
        total_coverage += detection_rate * 50.0
            + result.techniques_detected as f64 * weights.detection_value
            + if result.data_exfiltrated {
                0.0
            } else {
                weights.no_exfiltration_bonus
            };
    }
    total_coverage / results.len() as f64
}

/// Defender efficiency, computed once per genome rather than per matchup:
/// a small rule set with a low false-positive load scores high.
pub fn defender_efficiency(defender: &DefenseGenome) -> f64 {
    let rules_ratio = defender.rules.len() as f64 / defender.budget.max(1) as f64;
    (1.0 / (1.0 + defender.false_positive_load())) * (1.0 - rules_ratio * 0.5)
}
