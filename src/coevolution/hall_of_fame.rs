//! Archive of the best individuals seen across all generations.
//!
//! Members are independent clones whose lifetime outlives any single
//! generation. They are reinjected as evaluation opponents to resist
//! cyclic forgetting between the two populations.
use crate::genome::Genome;
use rand::prelude::*;
use rustc_hash::FxHashSet;

#[derive(Clone, Debug)]
pub struct HallOfFame<G: Genome> {
    members: Vec<G>,
    max_size: usize,
}

impl<G: Genome> HallOfFame<G> {
    pub fn new(max_size: usize) -> Self {
        Self {
            members: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Insert clones of the generation's top individuals, deduplicated by
    /// canonical key, then trim back to capacity by primary objective.
    pub fn update(&mut self, population: &[G]) {
        let mut candidates: Vec<&G> = population.iter().filter(|g| g.fitness().is_some()).collect();
        candidates.sort_by(|a, b| primary(*b).total_cmp(&primary(*a)));

        let mut known_keys: FxHashSet<G::Key> =
            self.members.iter().map(|m| m.canonical_key()).collect();
        for candidate in candidates.into_iter().take(self.max_size) {
            if known_keys.insert(candidate.canonical_key()) {
                log::trace!("hall of fame insert at fitness {:?}", candidate.fitness());
                self.members.push(candidate.clone());
            }
        }

        self.members.sort_by(|a, b| primary(b).total_cmp(&primary(a)));
        self.members.truncate(self.max_size);
    }

    /// Best members first.
    pub fn members(&self) -> &[G] {
        &self.members
    }

    pub fn sample<R: Rng>(&self, amount: usize, rng: &mut R) -> Vec<G> {
        self.members
            .choose_multiple(rng, amount.min(self.members.len()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn primary<G: Genome>(genome: &G) -> f64 {
    genome
        .fitness()
        .map(|f| f.primary())
        .unwrap_or(f64::NEG_INFINITY)
}
