mod support;

#[cfg(test)]
use crate::support::*;
use adversarial_coevolution::coevolution::reporter::CoevolutionReporter;
use adversarial_coevolution::coevolution::{
    BuildError, Coevolution, CoevolutionConfig, GenerationMetrics,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn small_config() -> CoevolutionConfig {
    CoevolutionConfig {
        population_size: 20,
        num_generations: 30,
        matchups_per_eval: 3,
        ..CoevolutionConfig::default()
    }
}

#[test]
fn thirty_generations_fill_history_and_hall_of_fame() {
    let coevolution = Coevolution::builder()
        .with_config(small_config())
        .build()
        .unwrap();
    let result = coevolution.run();

    assert_eq!(result.generations_run, 30);
    assert_eq!(result.history.len(), 30);
    assert!(!result.attacker_hall_of_fame.is_empty());
    assert!(!result.defender_hall_of_fame.is_empty());
    assert_eq!(result.final_attackers.len(), 20);
    assert_eq!(result.final_defenders.len(), 20);
    assert!(result
        .attacker_hall_of_fame
        .iter()
        .all(|entry| entry.fitness.is_some()));
}

#[test]
fn attacker_fitness_does_not_collapse() {
    let coevolution = Coevolution::builder()
        .with_config(small_config())
        .build()
        .unwrap();
    let result = coevolution.run();

    let maxima: Vec<f64> = result
        .history
        .records()
        .iter()
        .map(|m| m.attacker_effectiveness_max)
        .collect();
    let early = maxima[..10].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let late = maxima[20..].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert!(
        late >= 0.8 * early,
        "late maximum {} regressed below 0.8 * early maximum {}",
        late,
        early
    );
}

#[test]
fn runs_are_deterministic_for_equal_seeds() {
    let config = CoevolutionConfig {
        population_size: 12,
        num_generations: 8,
        matchups_per_eval: 2,
        ..CoevolutionConfig::default()
    };
    let first = Coevolution::builder()
        .with_config(config.clone())
        .build()
        .unwrap()
        .run();
    let second = Coevolution::builder()
        .with_config(config)
        .build()
        .unwrap()
        .run();

    assert_eq!(first.history, second.history);
    assert_eq!(first.final_attackers, second.final_attackers);
    assert_eq!(first.final_defenders, second.final_defenders);
}

#[test]
fn different_seeds_diverge() {
    let config = CoevolutionConfig {
        population_size: 12,
        num_generations: 5,
        matchups_per_eval: 2,
        ..CoevolutionConfig::default()
    };
    let first = Coevolution::builder()
        .with_config(CoevolutionConfig { seed: 1, ..config.clone() })
        .build()
        .unwrap()
        .run();
    let second = Coevolution::builder()
        .with_config(CoevolutionConfig { seed: 2, ..config })
        .build()
        .unwrap()
        .run();
    assert_ne!(first.final_attackers, second.final_attackers);
}

#[test]
fn genome_invariants_hold_in_final_populations() {
    let catalog = TechniqueCatalog::builtin();
    let result = Coevolution::builder()
        .with_config(small_config())
        .build()
        .unwrap()
        .run();

    for attacker in &result.final_attackers {
        assert!(attacker.genes.len() >= 2 && attacker.genes.len() <= 12);
        assert_eq!(
            catalog.get(&attacker.genes[0].technique_id).tactic,
            Tactic::InitialAccess
        );
        for gene in &attacker.genes {
            assert!((0.0..=1.0).contains(&gene.stealth_modifier));
        }
    }
    for defender in &result.final_defenders {
        assert!(defender.rules.len() >= 3 && defender.rules.len() <= 15);
        let mut keys: Vec<(String, DetectionLogic)> = defender
            .rules
            .iter()
            .map(|r| (r.technique_detected.clone(), r.detection_logic))
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), defender.rules.len());
    }
}

struct CountingReporter {
    calls: usize,
    totals_seen: Vec<usize>,
}

impl CoevolutionReporter for CountingReporter {
    fn on_generation(&mut self, generation: usize, total: usize, metrics: &GenerationMetrics) {
        assert_eq!(metrics.generation, generation);
        self.calls += 1;
        self.totals_seen.push(total);
    }
}

#[test]
fn reporter_fires_once_per_generation() {
    let config = CoevolutionConfig {
        population_size: 10,
        num_generations: 6,
        matchups_per_eval: 2,
        ..CoevolutionConfig::default()
    };
    let mut reporter = CountingReporter {
        calls: 0,
        totals_seen: Vec::new(),
    };
    Coevolution::builder()
        .with_config(config)
        .build()
        .unwrap()
        .run_with(&mut reporter);

    assert_eq!(reporter.calls, 6);
    assert!(reporter.totals_seen.iter().all(|&total| total == 6));
}

#[test]
fn abort_flag_stops_before_the_first_generation() {
    let abort = Arc::new(AtomicBool::new(true));
    let result = Coevolution::builder()
        .with_config(small_config())
        .with_abort_flag(abort)
        .build()
        .unwrap()
        .run();
    assert_eq!(result.generations_run, 0);
    assert!(result.history.is_empty());
}

#[test]
fn abort_flag_untouched_runs_to_completion() {
    let abort = Arc::new(AtomicBool::new(false));
    let config = CoevolutionConfig {
        population_size: 10,
        num_generations: 4,
        matchups_per_eval: 2,
        ..CoevolutionConfig::default()
    };
    let result = Coevolution::builder()
        .with_config(config)
        .with_abort_flag(abort.clone())
        .build()
        .unwrap()
        .run();
    assert_eq!(result.generations_run, 4);
    assert!(!abort.load(Ordering::Relaxed));
}

#[test]
fn rejects_undersized_population() {
    let config = CoevolutionConfig {
        population_size: 1,
        ..CoevolutionConfig::default()
    };
    assert!(matches!(
        Coevolution::builder().with_config(config).build(),
        Err(BuildError::Config(_))
    ));
}

#[test]
fn rejects_undersized_defender_budget() {
    let config = CoevolutionConfig {
        defender_budget: 2,
        ..CoevolutionConfig::default()
    };
    assert!(matches!(
        Coevolution::builder().with_config(config).build(),
        Err(BuildError::Config(_))
    ));
}

#[test]
fn rejects_out_of_range_rates() {
    let config = CoevolutionConfig {
        crossover_rate: 1.5,
        ..CoevolutionConfig::default()
    };
    assert!(Coevolution::builder().with_config(config).build().is_err());

    let config = CoevolutionConfig {
        scoring: adversarial_coevolution::simulation::scoring::ScoringWeights {
            exfiltration_bonus: -1.0,
            ..Default::default()
        },
        ..CoevolutionConfig::default()
    };
    assert!(Coevolution::builder().with_config(config).build().is_err());
}

#[test]
fn rejects_broken_networks() {
    let mut network = Network::new();
    network.add_host(Host::new("a", "a", OsType::Ubuntu22, HostRole::Server));
    assert!(matches!(
        Coevolution::builder().with_network(network).build(),
        Err(BuildError::Network(_))
    ));
}

#[test]
fn run_result_serializes() {
    let config = CoevolutionConfig {
        population_size: 8,
        num_generations: 3,
        matchups_per_eval: 2,
        ..CoevolutionConfig::default()
    };
    let result = Coevolution::builder()
        .with_config(config)
        .build()
        .unwrap()
        .run();
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("attacker_hall_of_fame"));
    assert!(json.contains("kill_chain"));
}
