use adversarial_coevolution::coevolution::reporter::LogProgress;
use adversarial_coevolution::coevolution::{Coevolution, CoevolutionConfig};

// cargo run --example basic_run --release
// RUST_LOG=info for per-generation progress lines
fn main() {
    env_logger::init();

    let config = CoevolutionConfig {
        population_size: 30,
        num_generations: 40,
        matchups_per_eval: 3,
        ..CoevolutionConfig::default()
    };

    let coevolution = Coevolution::builder()
        .with_config(config)
        .build()
        .unwrap_or_else(|error| panic!("driver construction failed: {}", error));

    let result = coevolution.run_with(&mut LogProgress::new(5));

    println!(
        "finished after {} generations, {} unique kill chains in the last one",
        result.generations_run,
        result.history.last().map(|m| m.unique_kill_chains).unwrap_or(0)
    );

    println!("\ntop attacker kill chains:");
    for entry in result.attacker_hall_of_fame.iter().take(3) {
        let fitness = entry.fitness.map(|f| f.primary()).unwrap_or(0.0);
        println!("  {:8.2}  {}", fitness, entry.kill_chain.join(" -> "));
    }

    println!("\ntop defender rule sets:");
    for entry in result.defender_hall_of_fame.iter().take(3) {
        let fitness = entry.fitness.map(|f| f.primary()).unwrap_or(0.0);
        let techniques: Vec<&str> = entry
            .rules
            .iter()
            .map(|r| r.technique_detected.as_str())
            .collect();
        println!("  {:8.2}  [{}]", fitness, techniques.join(", "));
    }

    let report = serde_json::to_string_pretty(&result.history).expect("history serializes");
    std::fs::write("evolution_log.json", report).expect("history written");
    println!("\nmetrics history written to evolution_log.json");
}
