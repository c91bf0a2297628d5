//! Per-generation progress reporting.
use super::metrics::GenerationMetrics;

/// Observer fired once per generation, after evaluation and metrics
/// recording. It receives a snapshot and cannot touch the populations.
pub trait CoevolutionReporter {
    fn on_generation(&mut self, _generation: usize, _total: usize, _metrics: &GenerationMetrics) {}
}

/// The noop reporter, silences reporting.
#[derive(Clone, Debug, Default)]
pub struct Noop;

impl Noop {
    pub fn new() -> Self {
        Self
    }
}

impl CoevolutionReporter for Noop {}

/// Logs a one-line generation summary every `period` generations.
#[derive(Clone, Debug)]
pub struct LogProgress {
    pub period: usize,
}

impl LogProgress {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CoevolutionReporter for LogProgress {
    fn on_generation(&mut self, generation: usize, total: usize, metrics: &GenerationMetrics) {
        if generation % self.period == 0 || generation + 1 == total {
            log::info!(
                "gen {:04}/{} | atk eff={:.1} stl={:.2} | def cov={:.1} eff={:.2} | chains={}",
                generation,
                total,
                metrics.attacker_effectiveness_mean,
                metrics.attacker_stealth_mean,
                metrics.defender_coverage_mean,
                metrics.defender_efficiency_mean,
                metrics.unique_kill_chains
            );
        }
    }
}
