//! Genetic operators for both populations.
//!
//! Every operator takes an explicit random source, so populations stay
//! byte-reproducible for a given seed. Repair steps (truncation, dedup,
//! initial-access restoration) are silent.
pub mod attack;
pub mod defense;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
