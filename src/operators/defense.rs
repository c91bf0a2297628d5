//! Operators on defender genomes: random initialization, uniform crossover
//! over the pooled rule set and the six mutation kinds.
use super::{round2, round3};
use crate::catalog::{Technique, TechniqueCatalog};
use crate::genome::defense::{DefenseGenome, DetectionLogic, DetectionRule, ResponseAction};
use crate::genome::Genome;
use rand::prelude::*;
use rustc_hash::FxHashSet;

fn random_rule<R: Rng>(technique: &Technique, logic: DetectionLogic, rng: &mut R) -> DetectionRule {
    let data_source = technique
        .data_sources
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| "Generic".to_string());
    let (fp_low, fp_high) = logic.false_positive_range();
    DetectionRule {
        technique_detected: technique.id.clone(),
        data_source,
        detection_logic: logic,
        confidence: round2(rng.gen_range(0.3..0.9)),
        false_positive_rate: round3(rng.gen_range(fp_low..fp_high)),
        response_action: ResponseAction::ALL[rng.gen_range(0..ResponseAction::ALL.len())],
    }
}

fn random_logic<R: Rng>(rng: &mut R) -> DetectionLogic {
    DetectionLogic::ALL[rng.gen_range(0..DetectionLogic::ALL.len())]
}

/// Generates a random valid defender genome with 5..=budget rules over
/// distinct techniques.
#[derive(Clone, Debug)]
pub struct RandomDefender {
    pub budget: usize,
}

impl RandomDefender {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn call<R: Rng>(&self, catalog: &TechniqueCatalog, rng: &mut R) -> DefenseGenome {
        let ids = catalog.ids();
        let rule_count = rng.gen_range(self.budget.min(5)..=self.budget);
        let selected: Vec<&&str> = ids.choose_multiple(rng, rule_count.min(ids.len())).collect();

        let mut rules: Vec<DetectionRule> = Vec::with_capacity(selected.len());
        let mut seen: FxHashSet<(String, DetectionLogic)> = FxHashSet::default();
        for technique_id in selected {
            let technique = catalog.get(technique_id);
            let logic = random_logic(rng);
            if !seen.insert((technique.id.clone(), logic)) {
                continue;
            }
            rules.push(random_rule(technique, logic, rng));
        }
        DefenseGenome::new(rules, self.budget)
    }
}

/// Uniform crossover: pool both parents' rules and deal each one to a child
/// with equal probability, then repair each child against its budget and the
/// floor of three rules.
#[derive(Clone, Debug)]
pub struct CrossoverDefense;

impl CrossoverDefense {
    pub fn call<R: Rng>(
        &self,
        father: &mut DefenseGenome,
        mother: &mut DefenseGenome,
        rng: &mut R,
    ) {
        let father_rules = father.rules.clone();
        let mother_rules = mother.rules.clone();

        let mut first: Vec<DetectionRule> = Vec::new();
        let mut second: Vec<DetectionRule> = Vec::new();
        for rule in father_rules.iter().chain(mother_rules.iter()) {
            if rng.gen::<f64>() < 0.5 {
                first.push(rule.clone());
            } else {
                second.push(rule.clone());
            }
        }

        let first = deduplicate_and_trim(first, father.budget);
        let second = deduplicate_and_trim(second, mother.budget);

        father.rules = if first.len() < 3 {
            refill(&father_rules)
        } else {
            first
        };
        mother.rules = if second.len() < 3 {
            refill(&mother_rules)
        } else {
            second
        };

        father.invalidate_fitness();
        mother.invalidate_fitness();
    }
}

/// Drop duplicate (technique, logic) pairs keeping the first occurrence,
/// then trim over-budget sets dropping the lowest-confidence rules first.
fn deduplicate_and_trim(rules: Vec<DetectionRule>, budget: usize) -> Vec<DetectionRule> {
    let mut seen: FxHashSet<(String, DetectionLogic)> = FxHashSet::default();
    let mut unique: Vec<DetectionRule> = Vec::with_capacity(rules.len());
    for rule in rules {
        if seen.insert((rule.technique_detected.clone(), rule.detection_logic)) {
            unique.push(rule);
        }
    }
    if unique.len() > budget {
        unique.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        unique.truncate(budget);
    }
    unique
}

fn refill(parent_rules: &[DetectionRule]) -> Vec<DetectionRule> {
    parent_rules[..parent_rules.len().min(3)].to_vec()
}

#[derive(Copy, Clone, Debug)]
enum DefenseMutation {
    AddRule,
    RemoveRule,
    ChangeLogic,
    TuneConfidence,
    ChangeResponse,
    Retarget,
}

const DEFENSE_MUTATIONS: [DefenseMutation; 6] = [
    DefenseMutation::AddRule,
    DefenseMutation::RemoveRule,
    DefenseMutation::ChangeLogic,
    DefenseMutation::TuneConfidence,
    DefenseMutation::ChangeResponse,
    DefenseMutation::Retarget,
];

/// Applies one uniformly chosen mutation. Kinds that would break the budget,
/// the floor of three rules or the (technique, logic) uniqueness are no-ops.
#[derive(Clone, Debug)]
pub struct MutateDefense;

impl MutateDefense {
    pub fn call<R: Rng>(
        &self,
        catalog: &TechniqueCatalog,
        genome: &mut DefenseGenome,
        rng: &mut R,
    ) {
        let mutation = DEFENSE_MUTATIONS[rng.gen_range(0..DEFENSE_MUTATIONS.len())];
        match mutation {
            DefenseMutation::AddRule => {
                if genome.rules.len() < genome.budget {
                    let ids = catalog.ids();
                    let technique_id = ids[rng.gen_range(0..ids.len())];
                    let logic = random_logic(rng);
                    let duplicate = genome
                        .rules
                        .iter()
                        .any(|r| r.key() == (technique_id, logic));
                    if !duplicate {
                        genome
                            .rules
                            .push(random_rule(catalog.get(technique_id), logic, rng));
                    }
                }
            }
            DefenseMutation::RemoveRule => {
                if genome.rules.len() > 3 {
                    let index = rng.gen_range(0..genome.rules.len());
                    genome.rules.remove(index);
                }
            }
            DefenseMutation::ChangeLogic => {
                if !genome.rules.is_empty() {
                    let index = rng.gen_range(0..genome.rules.len());
                    let new_logic = random_logic(rng);
                    let technique = genome.rules[index].technique_detected.clone();
                    let duplicate = genome.rules.iter().enumerate().any(|(i, r)| {
                        i != index
                            && r.technique_detected == technique
                            && r.detection_logic == new_logic
                    });
                    if !duplicate {
                        let (fp_low, fp_high) = new_logic.false_positive_range();
                        let rule = &mut genome.rules[index];
                        rule.detection_logic = new_logic;
                        rule.false_positive_rate = round3(rng.gen_range(fp_low..fp_high));
                    }
                }
            }
            DefenseMutation::TuneConfidence => {
                if !genome.rules.is_empty() {
                    let index = rng.gen_range(0..genome.rules.len());
                    let delta = rng.gen_range(-0.1..0.1);
                    let rule = &mut genome.rules[index];
                    rule.confidence = round2((rule.confidence + delta).clamp(0.1, 1.0));
                }
            }
            DefenseMutation::ChangeResponse => {
                if !genome.rules.is_empty() {
                    let index = rng.gen_range(0..genome.rules.len());
                    genome.rules[index].response_action =
                        ResponseAction::ALL[rng.gen_range(0..ResponseAction::ALL.len())];
                }
            }
            DefenseMutation::Retarget => {
                if !genome.rules.is_empty() {
                    let index = rng.gen_range(0..genome.rules.len());
                    let ids = catalog.ids();
                    let new_technique_id = ids[rng.gen_range(0..ids.len())];
                    let logic = genome.rules[index].detection_logic;
                    let duplicate = genome.rules.iter().enumerate().any(|(i, r)| {
                        i != index && r.key() == (new_technique_id, logic)
                    });
                    if !duplicate {
                        let technique = catalog.get(new_technique_id);
                        let rule = &mut genome.rules[index];
                        rule.technique_detected = technique.id.clone();
                        if let Some(data_source) = technique.data_sources.choose(rng) {
                            rule.data_source = data_source.clone();
                        }
                    }
                }
            }
        }
        genome.invalidate_fitness();
    }
}
