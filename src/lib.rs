//! A co-evolutionary adversarial simulator for enterprise network security.
//!
//! Two populations evolve against each other: attackers are ordered kill
//! chains of adversary techniques, defenders are unordered sets of detection
//! rules. Fitness comes from repeated head-to-head simulation on a modeled
//! corporate network, and survivors are picked by non-dominated sorting over
//! two objectives per side.
//!
//! There are four main elements:
//! * The [TechniqueCatalog](crate::catalog::TechniqueCatalog) (what attackers can do)
//! * The [Network](crate::network::Network) (where it happens)
//! * The [SimulationEngine](crate::simulation::SimulationEngine) (one matchup)
//! * The [Coevolution](crate::coevolution::Coevolution) driver (the search)
//!
//! ## Quick Usage
//!
//! ```rust
//! use adversarial_coevolution::coevolution::{Coevolution, CoevolutionConfig};
//!
//! let config = CoevolutionConfig {
//!     population_size: 8,         // 8 attackers and 8 defenders
//!     num_generations: 3,         // evolve for 3 generations
//!     matchups_per_eval: 2,       // 2 sampled opponents per evaluation
//!     ..CoevolutionConfig::default()
//! };
//!
//! let result = Coevolution::builder()
//!     .with_config(config)        // network defaults to corporate_medium
//!     .build()
//!     .unwrap()
//!     .run();
//!
//! assert_eq!(result.generations_run, 3);
//! for entry in &result.attacker_hall_of_fame {
//!     println!("{}", entry.kill_chain.join(" -> "));
//! }
//! ```
//!
//! Runs are deterministic for a given `seed`: every matchup draws from its
//! own random sub-stream derived from the run seed and the matchup
//! coordinates, independent of worker-thread scheduling.

pub mod catalog;
pub mod coevolution;
pub mod genome;
pub mod network;
pub mod operators;
pub mod simulation;
