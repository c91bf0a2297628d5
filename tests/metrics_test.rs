mod support;

#[cfg(test)]
use crate::support::*;
use adversarial_coevolution::coevolution::{GenerationMetrics, MetricsHistory};
use approx::assert_relative_eq;

fn attacker(primary: f64, stealth: f64) -> AttackGenome {
    let mut genome = attacker_from_chain(&["T1566.001", "T1059.001"]);
    genome.set_fitness(MultiFitness::new(primary, stealth));
    genome
}

fn defender(coverage: f64, efficiency: f64, technique: &str) -> DefenseGenome {
    let mut genome = defender_with_rules(vec![rule(technique, 0.8, ResponseAction::AlertOnly)]);
    genome.set_fitness(MultiFitness::new(coverage, efficiency));
    genome
}

#[test]
fn records_generation_statistics() {
    let mut history = MetricsHistory::new();
    let attackers = vec![attacker(10.0, 0.8), attacker(30.0, 0.6)];
    let defenders = vec![
        defender(50.0, 0.5, "T1566.001"),
        defender(70.0, 0.7, "T1486"),
    ];

    let metrics = history.record(0, &attackers, &defenders);

    assert_eq!(metrics.generation, 0);
    assert_relative_eq!(metrics.attacker_effectiveness_mean, 20.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.attacker_effectiveness_max, 30.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.attacker_effectiveness_min, 10.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.attacker_stealth_mean, 0.7, epsilon = 1e-9);
    assert_relative_eq!(metrics.defender_coverage_mean, 60.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.defender_coverage_max, 70.0, epsilon = 1e-9);
    assert_relative_eq!(metrics.defender_efficiency_mean, 0.6, epsilon = 1e-9);
    assert_eq!(history.len(), 1);
}

#[test]
fn technique_frequencies_are_normalized() {
    let mut history = MetricsHistory::new();
    let attackers = vec![
        attacker_from_chain(&["T1566.001", "T1059.001"]),
        attacker_from_chain(&["T1566.001", "T1003.001"]),
    ];
    let metrics = history.record(0, &attackers, &[]);

    assert_relative_eq!(metrics.technique_frequencies["T1566.001"], 0.5, epsilon = 1e-9);
    assert_relative_eq!(metrics.technique_frequencies["T1059.001"], 0.25, epsilon = 1e-9);
    let total: f64 = metrics.technique_frequencies.values().sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);
}

#[test]
fn detection_coverage_ratio_counts_covered_techniques() {
    let mut history = MetricsHistory::new();
    let attackers = vec![attacker_from_chain(&["T1566.001", "T1059.001"])];
    let defenders = vec![defender(0.0, 0.0, "T1566.001")];
    let metrics = history.record(0, &attackers, &defenders);
    assert_relative_eq!(metrics.detection_coverage_ratio, 0.5, epsilon = 1e-9);
}

#[test]
fn diversity_counts_unique_shapes() {
    let mut history = MetricsHistory::new();
    let attackers = vec![
        attacker_from_chain(&["T1566.001", "T1059.001"]),
        attacker_from_chain(&["T1566.001", "T1059.001"]),
        attacker_from_chain(&["T1190", "T1018"]),
        attacker_from_chain(&["T1190", "T1018"]),
    ];
    let metrics = history.record(0, &attackers, &[]);
    assert_eq!(metrics.unique_kill_chains, 2);
    assert_relative_eq!(metrics.attacker_diversity, 0.5, epsilon = 1e-9);
}

fn history_with_maxima(values: &[f64]) -> MetricsHistory {
    let mut history = MetricsHistory::new();
    for (generation, value) in values.iter().enumerate() {
        let attackers = vec![attacker(*value, 0.5)];
        history.record(generation, &attackers, &[]);
    }
    history
}

#[test]
fn stagnation_requires_a_full_window() {
    let history = history_with_maxima(&[10.0, 10.1, 10.2]);
    assert!(!history.stagnated(5));
}

#[test]
fn stagnation_boundary_is_half_a_point() {
    // spread exactly 0.5 counts as stagnant
    let flat = history_with_maxima(&[10.0, 10.2, 10.5, 10.1, 10.3]);
    assert!(flat.stagnated(5));

    let moving = history_with_maxima(&[10.0, 10.2, 10.6, 10.1, 10.3]);
    assert!(!moving.stagnated(5));
}

#[test]
fn stagnation_looks_only_at_the_window_tail() {
    let history = history_with_maxima(&[0.0, 50.0, 50.1, 50.2, 50.3]);
    assert!(history.stagnated(4));
    assert!(!history.stagnated(5));
}

#[test]
fn history_round_trips_through_serde() {
    let mut history = MetricsHistory::new();
    let attackers = vec![attacker(12.5, 0.75), attacker(8.25, 0.5)];
    let defenders = vec![defender(40.0, 0.6, "T1190")];
    history.record(0, &attackers, &defenders);
    history.record(1, &attackers, &defenders);

    let json = serde_json::to_string(&history).unwrap();
    let reloaded: MetricsHistory = serde_json::from_str(&json).unwrap();
    assert_eq!(history, reloaded);

    let record_json = serde_json::to_string(history.last().unwrap()).unwrap();
    let record: GenerationMetrics = serde_json::from_str(&record_json).unwrap();
    assert_eq!(&record, history.last().unwrap());
}
