//! Per-generation statistics and the stagnation detector.
use crate::genome::attack::AttackGenome;
use crate::genome::defense::DefenseGenome;
use crate::genome::Genome;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of one generation, emitted to the progress callback and kept in
/// the run history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    pub generation: usize,
    pub attacker_effectiveness_mean: f64,
    pub attacker_effectiveness_max: f64,
    pub attacker_effectiveness_min: f64,
    pub attacker_effectiveness_std: f64,
    pub attacker_stealth_mean: f64,
    pub defender_coverage_mean: f64,
    pub defender_coverage_max: f64,
    pub defender_efficiency_mean: f64,
    /// Technique usage normalized by the total gene count of the attacker
    /// population.
    pub technique_frequencies: BTreeMap<String, f64>,
    /// Fraction of techniques present in the attacker population covered by
    /// at least one defender rule.
    pub detection_coverage_ratio: f64,
    pub attacker_diversity: f64,
    pub defender_diversity: f64,
    pub unique_kill_chains: usize,
}

/// Collected per-generation metrics for a whole run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsHistory {
    records: Vec<GenerationMetrics>,
}

impl MetricsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute and store the snapshot for one evaluated generation.
    pub fn record(
        &mut self,
        generation: usize,
        attackers: &[AttackGenome],
        defenders: &[DefenseGenome],
    ) -> GenerationMetrics {
        let mut metrics = GenerationMetrics {
            generation,
            ..GenerationMetrics::default()
        };

        let attacker_primary: Vec<f64> = attackers
            .iter()
            .filter_map(|a| a.fitness)
            .map(|f| f.primary())
            .collect();
        let attacker_stealth: Vec<f64> = attackers
            .iter()
            .filter_map(|a| a.fitness)
            .map(|f| f.secondary())
            .collect();
        if !attacker_primary.is_empty() {
            metrics.attacker_effectiveness_mean = stats::mean(attacker_primary.iter().copied());
            metrics.attacker_effectiveness_max =
                attacker_primary.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            metrics.attacker_effectiveness_min =
                attacker_primary.iter().copied().fold(f64::INFINITY, f64::min);
            metrics.attacker_effectiveness_std = stats::stddev(attacker_primary.iter().copied());
        }
        if !attacker_stealth.is_empty() {
            metrics.attacker_stealth_mean = stats::mean(attacker_stealth.iter().copied());
        }

        let defender_primary: Vec<f64> = defenders
            .iter()
            .filter_map(|d| d.fitness)
            .map(|f| f.primary())
            .collect();
        let defender_secondary: Vec<f64> = defenders
            .iter()
            .filter_map(|d| d.fitness)
            .map(|f| f.secondary())
            .collect();
        if !defender_primary.is_empty() {
            metrics.defender_coverage_mean = stats::mean(defender_primary.iter().copied());
            metrics.defender_coverage_max =
                defender_primary.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        }
        if !defender_secondary.is_empty() {
            metrics.defender_efficiency_mean = stats::mean(defender_secondary.iter().copied());
        }

        let mut technique_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_genes = 0usize;
        for attacker in attackers {
            for gene in &attacker.genes {
                *technique_counts.entry(gene.technique_id.clone()).or_insert(0) += 1;
                total_genes += 1;
            }
        }
        if total_genes > 0 {
            metrics.technique_frequencies = technique_counts
                .iter()
                .map(|(id, count)| (id.clone(), *count as f64 / total_genes as f64))
                .collect();
        }

        if !technique_counts.is_empty() {
            let covered = technique_counts
                .keys()
                .filter(|id| defenders.iter().any(|d| d.covers(id)))
                .count();
            metrics.detection_coverage_ratio = covered as f64 / technique_counts.len() as f64;
        }

        let kill_chains: FxHashSet<Vec<String>> =
            attackers.iter().map(|a| a.canonical_key()).collect();
        metrics.unique_kill_chains = kill_chains.len();
        metrics.attacker_diversity = kill_chains.len() as f64 / attackers.len().max(1) as f64;

        let coverage_sets: FxHashSet<Vec<String>> =
            defenders.iter().map(|d| d.canonical_key()).collect();
        metrics.defender_diversity = coverage_sets.len() as f64 / defenders.len().max(1) as f64;

        self.records.push(metrics.clone());
        metrics
    }

    /// Stagnation: max attacker effectiveness moved by at most 0.5 over the
    /// last `window` generations. False until the window is full.
    pub fn stagnated(&self, window: usize) -> bool {
        if self.records.len() < window || window == 0 {
            return false;
        }
        let recent = &self.records[self.records.len() - window..];
        let maximum = recent
            .iter()
            .map(|m| m.attacker_effectiveness_max)
            .fold(f64::NEG_INFINITY, f64::max);
        let minimum = recent
            .iter()
            .map(|m| m.attacker_effectiveness_max)
            .fold(f64::INFINITY, f64::min);
        maximum - minimum <= 0.5
    }

    pub fn records(&self) -> &[GenerationMetrics] {
        &self.records
    }
    pub fn last(&self) -> Option<&GenerationMetrics> {
        self.records.last()
    }
    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
