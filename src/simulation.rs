//! The per-matchup simulator: state, engine and scoring.
pub mod engine;
pub mod scoring;
pub mod state;

pub use self::engine::SimulationEngine;
pub use self::state::{EventOutcome, FailureReason, MatchResult, SimEvent, SimulationState};
