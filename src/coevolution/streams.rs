//! Deterministic per-matchup random sub-streams.
//!
//! Each matchup gets its own generator, seeded from the run seed and the
//! matchup coordinates. Results are therefore reproducible regardless of
//! how matchups are scheduled across worker threads.
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Which evaluation pass a matchup belongs to.
#[derive(Copy, Clone, Debug)]
pub(crate) enum StreamRole {
    AttackerEval = 1,
    DefenderEval = 2,
}

fn splitmix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e3779b97f4a7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d049bb133111eb);
    value ^ (value >> 31)
}

pub(crate) fn matchup_rng(
    seed: u64,
    generation: usize,
    individual: usize,
    opponent: usize,
    role: StreamRole,
) -> SmallRng {
    let mut mixed = seed;
    for coordinate in [
        role as u64,
        generation as u64,
        individual as u64,
        opponent as u64,
    ] {
        mixed = splitmix64(mixed ^ coordinate);
    }
    SmallRng::seed_from_u64(mixed)
}
