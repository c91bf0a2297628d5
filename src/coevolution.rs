//! The co-evolutionary driver.
//!
//! Runs both populations through per-generation evaluation, non-dominated
//! selection, variation, elitism, hall-of-fame maintenance and
//! stagnation-triggered immigrant injection. Matchups inside one evaluation
//! phase are independent and dispatched across worker threads; every matchup
//! draws from its own deterministic random sub-stream, so a run is fully
//! reproducible for a given seed. The selection, variation and injection
//! phases stay on the driver thread.
pub mod config;
pub mod hall_of_fame;
pub mod metrics;
pub mod reporter;
pub mod select;
mod streams;

pub use self::config::{CoevolutionConfig, ConfigError};
pub use self::hall_of_fame::HallOfFame;
pub use self::metrics::{GenerationMetrics, MetricsHistory};
pub use self::reporter::CoevolutionReporter;
pub use self::select::select_nsga2;

use self::streams::StreamRole;
use crate::catalog::TechniqueCatalog;
use crate::genome::attack::{AttackGene, AttackGenome};
use crate::genome::defense::{DefenseGenome, DetectionRule};
use crate::genome::{Genome, MultiFitness};
use crate::network::{topology, Network, NetworkError};
use crate::operators::attack::{CrossoverAttack, MutateAttack, RandomAttacker};
use crate::operators::defense::{CrossoverDefense, MutateDefense, RandomDefender};
use crate::simulation::scoring;
use crate::simulation::{MatchResult, SimulationEngine};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned when the driver cannot be constructed from the given
/// configuration and network.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    Config(ConfigError),
    Network(NetworkError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::Config(error) => write!(f, "{}", error),
            BuildError::Network(error) => write!(f, "invalid network: {}", error),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<ConfigError> for BuildError {
    fn from(error: ConfigError) -> Self {
        BuildError::Config(error)
    }
}
impl From<NetworkError> for BuildError {
    fn from(error: NetworkError) -> Self {
        BuildError::Network(error)
    }
}

/// Builder for [Coevolution]. Configuration and network default to
/// [CoevolutionConfig::default] and [topology::corporate_medium].
#[derive(Default)]
pub struct Builder {
    config: Option<CoevolutionConfig>,
    catalog: Option<TechniqueCatalog>,
    network: Option<Network>,
    abort: Option<Arc<AtomicBool>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CoevolutionConfig) -> Self {
        self.config = Some(config);
        self
    }
    pub fn with_catalog(mut self, catalog: TechniqueCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }
    /// The flag is checked between generations; setting it stops the run
    /// after the in-flight generation completes.
    pub fn with_abort_flag(mut self, abort: Arc<AtomicBool>) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn build(self) -> Result<Coevolution, BuildError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let catalog = self.catalog.unwrap_or_else(TechniqueCatalog::builtin);
        let network = self.network.unwrap_or_else(topology::corporate_medium);
        network.validate()?;
        Ok(Coevolution {
            config,
            catalog,
            network,
            abort: self.abort,
        })
    }
}

/// Hall-of-fame attacker, exported with its chain and gene details.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttackerHofEntry {
    pub kill_chain: Vec<String>,
    pub fitness: Option<MultiFitness>,
    pub genes: Vec<AttackGene>,
}

/// Hall-of-fame defender, exported with its rule set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefenderHofEntry {
    pub rules: Vec<DetectionRule>,
    pub fitness: Option<MultiFitness>,
}

/// Everything a finished run produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub config: CoevolutionConfig,
    pub history: MetricsHistory,
    pub attacker_hall_of_fame: Vec<AttackerHofEntry>,
    pub defender_hall_of_fame: Vec<DefenderHofEntry>,
    pub final_attackers: Vec<AttackGenome>,
    pub final_defenders: Vec<DefenseGenome>,
    pub generations_run: usize,
}

/// The co-evolution strategy over the two populations.
pub struct Coevolution {
    config: CoevolutionConfig,
    catalog: TechniqueCatalog,
    network: Network,
    abort: Option<Arc<AtomicBool>>,
}

impl Coevolution {
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn config(&self) -> &CoevolutionConfig {
        &self.config
    }
    pub fn network(&self) -> &Network {
        &self.network
    }
    pub fn catalog(&self) -> &TechniqueCatalog {
        &self.catalog
    }

    pub fn run(&self) -> RunResult {
        self.run_with(&mut reporter::Noop)
    }

    pub fn run_with<SR: CoevolutionReporter>(&self, reporter: &mut SR) -> RunResult {
        let config = &self.config;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let random_attacker = RandomAttacker::new(config.max_attack_chain_length);
        let random_defender = RandomDefender::new(config.defender_budget);

        let mut attackers: Vec<AttackGenome> = (0..config.population_size)
            .map(|_| random_attacker.call(&self.catalog, &mut rng))
            .collect();
        let mut defenders: Vec<DefenseGenome> = (0..config.population_size)
            .map(|_| random_defender.call(&self.catalog, &mut rng))
            .collect();

        let mut attacker_hof: HallOfFame<AttackGenome> =
            HallOfFame::new(config.hall_of_fame_size);
        let mut defender_hof: HallOfFame<DefenseGenome> =
            HallOfFame::new(config.hall_of_fame_size);
        let mut history = MetricsHistory::new();

        for generation in 0..config.num_generations {
            if let Some(abort) = &self.abort {
                if abort.load(Ordering::Relaxed) {
                    log::debug!("### aborted before generation {}", generation);
                    break;
                }
            }

            self.evaluate_attackers(generation, &mut attackers, &defenders, &defender_hof, &mut rng);
            self.evaluate_defenders(generation, &mut defenders, &attackers, &attacker_hof, &mut rng);

            let generation_metrics = history.record(generation, &attackers, &defenders);
            attacker_hof.update(&attackers);
            defender_hof.update(&defenders);
            reporter.on_generation(generation, config.num_generations, &generation_metrics);

            let selected = select_nsga2(&attackers, config.population_size);
            attackers = self.vary_attackers(selected, &mut rng);
            let selected = select_nsga2(&defenders, config.population_size);
            defenders = self.vary_defenders(selected, &mut rng);

            inject_elites(&mut attackers, &attacker_hof);
            inject_elites(&mut defenders, &defender_hof);

            if history.stagnated(config.stagnation_window) {
                log::debug!("### stagnation at generation {}, injecting immigrants", generation);
                inject_immigrants(&mut attackers, config.immigrant_fraction, &mut rng, |rng| {
                    random_attacker.call(&self.catalog, rng)
                });
                inject_immigrants(&mut defenders, config.immigrant_fraction, &mut rng, |rng| {
                    random_defender.call(&self.catalog, rng)
                });
            }
        }

        RunResult {
            config: config.clone(),
            generations_run: history.len(),
            attacker_hall_of_fame: attacker_hof
                .members()
                .iter()
                .map(|member| AttackerHofEntry {
                    kill_chain: member
                        .kill_chain()
                        .iter()
                        .map(|id| id.to_string())
                        .collect(),
                    fitness: member.fitness,
                    genes: member.genes.clone(),
                })
                .collect(),
            defender_hall_of_fame: defender_hof
                .members()
                .iter()
                .map(|member| DefenderHofEntry {
                    rules: member.rules.clone(),
                    fitness: member.fitness,
                })
                .collect(),
            history,
            final_attackers: attackers,
            final_defenders: defenders,
        }
    }

    fn evaluate_attackers<R: Rng>(
        &self,
        generation: usize,
        attackers: &mut [AttackGenome],
        defenders: &[DefenseGenome],
        defender_hof: &HallOfFame<DefenseGenome>,
        rng: &mut R,
    ) {
        let opponent_sets: Vec<Vec<DefenseGenome>> = (0..attackers.len())
            .map(|_| self.sample_opponents(defenders, defender_hof, rng))
            .collect();

        let engine = SimulationEngine::new(&self.catalog);
        let weights = self.config.scoring;
        let seed = self.config.seed;
        let network = &self.network;

        let fitnesses: Vec<MultiFitness> = attackers
            .par_iter()
            .zip(opponent_sets.par_iter())
            .enumerate()
            .map(|(individual, (attacker, opponents))| {
                let results: Vec<MatchResult> = opponents
                    .iter()
                    .enumerate()
                    .map(|(opponent, defender)| {
                        let mut matchup_rng = streams::matchup_rng(
                            seed,
                            generation,
                            individual,
                            opponent,
                            StreamRole::AttackerEval,
                        );
                        engine.simulate(attacker, defender, network, &mut matchup_rng)
                    })
                    .collect();
                scoring::attacker_fitness(&results, &weights)
            })
            .collect();

        for (attacker, fitness) in attackers.iter_mut().zip(fitnesses) {
            attacker.set_fitness(fitness);
        }
    }

    fn evaluate_defenders<R: Rng>(
        &self,
        generation: usize,
        defenders: &mut [DefenseGenome],
        attackers: &[AttackGenome],
        attacker_hof: &HallOfFame<AttackGenome>,
        rng: &mut R,
    ) {
        let opponent_sets: Vec<Vec<AttackGenome>> = (0..defenders.len())
            .map(|_| self.sample_opponents(attackers, attacker_hof, rng))
            .collect();

        let engine = SimulationEngine::new(&self.catalog);
        let weights = self.config.scoring;
        let seed = self.config.seed;
        let network = &self.network;

        let fitnesses: Vec<MultiFitness> = defenders
            .par_iter()
            .zip(opponent_sets.par_iter())
            .enumerate()
            .map(|(individual, (defender, opponents))| {
                let results: Vec<MatchResult> = opponents
                    .iter()
                    .enumerate()
                    .map(|(opponent, attacker)| {
                        let mut matchup_rng = streams::matchup_rng(
                            seed,
                            generation,
                            individual,
                            opponent,
                            StreamRole::DefenderEval,
                        );
                        engine.simulate(attacker, defender, network, &mut matchup_rng)
                    })
                    .collect();
                // efficiency is a property of the rule set, not of the
                // sampled matchups
                MultiFitness::new(
                    scoring::defender_coverage(&results, &weights),
                    scoring::defender_efficiency(defender),
                )
            })
            .collect();

        for (defender, fitness) in defenders.iter_mut().zip(fitnesses) {
            defender.set_fitness(fitness);
        }
    }

    /// Sample matchup opponents from the population, replacing a fraction
    /// with hall-of-fame members once the hall is populated.
    fn sample_opponents<G: Genome, R: Rng>(
        &self,
        pool: &[G],
        hall_of_fame: &HallOfFame<G>,
        rng: &mut R,
    ) -> Vec<G> {
        let matchups = self.config.matchups_per_eval.min(pool.len());
        let mut opponents: Vec<G> = pool.choose_multiple(rng, matchups).cloned().collect();
        if !hall_of_fame.is_empty() && self.config.hof_opponent_fraction > 0.0 {
            let wanted = (matchups as f64 * self.config.hof_opponent_fraction).ceil() as usize;
            let sample = hall_of_fame.sample(wanted.min(matchups), rng);
            opponents.truncate(matchups - sample.len());
            opponents.extend(sample);
        }
        opponents
    }

    fn vary_attackers<R: Rng>(
        &self,
        selected: Vec<AttackGenome>,
        rng: &mut R,
    ) -> Vec<AttackGenome> {
        let mut offspring = selected;
        offspring.iter_mut().for_each(|g| g.invalidate_fitness());

        let crossover = CrossoverAttack;
        for index in (1..offspring.len()).step_by(2) {
            if rng.gen::<f64>() < self.config.crossover_rate {
                let (left, right) = offspring.split_at_mut(index);
                crossover.call(&self.catalog, &mut left[index - 1], &mut right[0], rng);
            }
        }

        let mutate = MutateAttack;
        for genome in offspring.iter_mut() {
            if rng.gen::<f64>() < self.config.mutation_rate {
                mutate.call(&self.catalog, genome, rng);
            }
        }
        offspring
    }

    fn vary_defenders<R: Rng>(
        &self,
        selected: Vec<DefenseGenome>,
        rng: &mut R,
    ) -> Vec<DefenseGenome> {
        let mut offspring = selected;
        offspring.iter_mut().for_each(|g| g.invalidate_fitness());

        let crossover = CrossoverDefense;
        for index in (1..offspring.len()).step_by(2) {
            if rng.gen::<f64>() < self.config.crossover_rate {
                let (left, right) = offspring.split_at_mut(index);
                crossover.call(&mut left[index - 1], &mut right[0], rng);
            }
        }

        let mutate = MutateDefense;
        for genome in offspring.iter_mut() {
            if rng.gen::<f64>() < self.config.mutation_rate {
                mutate.call(&self.catalog, genome, rng);
            }
        }
        offspring
    }
}

/// Overwrite the first offspring positions with clones of the best
/// hall-of-fame members, fitness included.
fn inject_elites<G: Genome>(population: &mut [G], hall_of_fame: &HallOfFame<G>) {
    let elites = hall_of_fame.len().min(2).min(population.len());
    for index in 0..elites {
        population[index] = hall_of_fame.members()[index].clone();
    }
}

/// Replace the worst individuals by primary objective with fresh random
/// ones, keeping the population size unchanged. Individuals without a
/// fitness count as worst.
fn inject_immigrants<G: Genome, R: Rng, F: FnMut(&mut R) -> G>(
    population: &mut [G],
    fraction: f64,
    rng: &mut R,
    mut factory: F,
) {
    let count = (population.len() as f64 * fraction).ceil() as usize;
    let count = count.min(population.len());
    if count == 0 {
        return;
    }
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| primary(&population[a]).total_cmp(&primary(&population[b])));
    for &index in order.iter().take(count) {
        population[index] = factory(rng);
    }
}

fn primary<G: Genome>(genome: &G) -> f64 {
    genome
        .fitness()
        .map(|f| f.primary())
        .unwrap_or(f64::NEG_INFINITY)
}
