//! Defender genomes: unordered sets of detection rules under a deploy budget.
use super::{Genome, MultiFitness};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Detection logic kinds, each with a fixed deploy cost and a typical
/// false-positive range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DetectionLogic {
    Signature,
    Behavioral,
    Correlation,
    MlAnomaly,
}

impl DetectionLogic {
    pub const ALL: [DetectionLogic; 4] = [
        DetectionLogic::Signature,
        DetectionLogic::Behavioral,
        DetectionLogic::Correlation,
        DetectionLogic::MlAnomaly,
    ];

    pub fn deploy_cost(&self) -> f64 {
        match self {
            DetectionLogic::Signature => 1.0,
            DetectionLogic::Behavioral => 2.0,
            DetectionLogic::Correlation => 3.0,
            DetectionLogic::MlAnomaly => 2.5,
        }
    }

    pub fn false_positive_range(&self) -> (f64, f64) {
        match self {
            DetectionLogic::Signature => (0.01, 0.10),
            DetectionLogic::Behavioral => (0.05, 0.25),
            DetectionLogic::Correlation => (0.02, 0.15),
            DetectionLogic::MlAnomaly => (0.05, 0.20),
        }
    }
}

/// Response taken when a rule fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseAction {
    AlertOnly,
    IsolateHost,
    KillProcess,
    RevokeCredential,
    BlockTraffic,
}

impl ResponseAction {
    pub const ALL: [ResponseAction; 5] = [
        ResponseAction::AlertOnly,
        ResponseAction::IsolateHost,
        ResponseAction::KillProcess,
        ResponseAction::RevokeCredential,
        ResponseAction::BlockTraffic,
    ];
}

/// A single deployed detection rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRule {
    pub technique_detected: String,
    pub data_source: String,
    pub detection_logic: DetectionLogic,
    pub confidence: f64,
    pub false_positive_rate: f64,
    pub response_action: ResponseAction,
}

impl DetectionRule {
    pub fn deploy_cost(&self) -> f64 {
        self.detection_logic.deploy_cost()
    }

    /// Uniqueness key within a genome.
    pub fn key(&self) -> (&str, DetectionLogic) {
        (self.technique_detected.as_str(), self.detection_logic)
    }
}

/// Unordered set of [DetectionRule]s.
///
/// Invariants, enforced by the operators:
/// * `rules.len() <= budget`
/// * no two rules share (technique, detection logic)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefenseGenome {
    pub rules: Vec<DetectionRule>,
    pub budget: usize,
    #[serde(default)]
    pub fitness: Option<MultiFitness>,
}

impl DefenseGenome {
    pub fn new(rules: Vec<DetectionRule>, budget: usize) -> Self {
        Self {
            rules,
            budget,
            fitness: None,
        }
    }

    pub fn covers(&self, technique_id: &str) -> bool {
        self.rules.iter().any(|r| r.technique_detected == technique_id)
    }

    /// The best detection chance against a technique at the given effective
    /// stealth, with the matching rule. The strongest rule is the one with
    /// the highest `confidence * (1 - stealth)`.
    pub fn best_detection(
        &self,
        technique_id: &str,
        effective_stealth: f64,
    ) -> Option<(f64, &DetectionRule)> {
        self.rules
            .iter()
            .filter(|r| r.technique_detected == technique_id)
            .map(|r| (r.confidence * (1.0 - effective_stealth), r))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
    }

    /// Summed false-positive rate across all deployed rules.
    pub fn false_positive_load(&self) -> f64 {
        self.rules.iter().map(|r| r.false_positive_rate).sum()
    }

    pub fn total_deploy_cost(&self) -> f64 {
        self.rules.iter().map(|r| r.deploy_cost()).sum()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Genome for DefenseGenome {
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
        self.rules
            .iter()
            .map(|r| r.technique_detected.clone())
            .sorted()
            .collect()
    }
}
