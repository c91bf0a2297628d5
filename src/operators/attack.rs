//! Operators on attacker genomes: random initialization, single-point
//! crossover and the six mutation kinds.
use super::round2;
use crate::catalog::{Tactic, TechniqueCatalog};
use crate::genome::attack::{AttackGene, AttackGenome, TargetSelector};
use crate::genome::Genome;
use crate::network::host::HostRole;
use rand::prelude::*;

fn random_gene<R: Rng>(technique_id: &str, rng: &mut R) -> AttackGene {
    let target_selector = TargetSelector::ALL[rng.gen_range(0..TargetSelector::ALL.len())];
    let target_role = if rng.gen::<f64>() < 0.3 {
        Some(HostRole::ALL[rng.gen_range(0..HostRole::ALL.len())])
    } else {
        None
    };
    AttackGene {
        technique_id: technique_id.to_string(),
        target_selector,
        target_role,
        fallback_technique: None,
        stealth_modifier: round2(rng.gen_range(0.0..0.5)),
    }
}

/// Generates a random valid attacker genome: an initial access gene followed
/// by 2..=min(8, max_length - 1) genes drawn from the post-entry tactics.
#[derive(Clone, Debug)]
pub struct RandomAttacker {
    pub max_chain_length: usize,
}

impl RandomAttacker {
    pub fn new(max_chain_length: usize) -> Self {
        Self { max_chain_length }
    }

    pub fn call<R: Rng>(&self, catalog: &TechniqueCatalog, rng: &mut R) -> AttackGenome {
        let initial_access = catalog.initial_access();
        assert!(
            !initial_access.is_empty(),
            "catalog has no initial access techniques"
        );
        let entry = initial_access[rng.gen_range(0..initial_access.len())];

        let mut genes = vec![random_gene(&entry.id, rng)];
        let chain_length = rng.gen_range(2..=(self.max_chain_length - 1).min(8));
        for _ in 0..chain_length {
            let tactic = Tactic::POST_INITIAL_ACCESS
                [rng.gen_range(0..Tactic::POST_INITIAL_ACCESS.len())];
            let candidates = catalog.by_tactic(tactic);
            if let Some(technique) = candidates.choose(rng) {
                genes.push(random_gene(&technique.id, rng));
            }
        }
        AttackGenome::new(genes, self.max_chain_length)
    }
}

/// Single-point crossover on gene sequences, in place on both parents.
/// Preserves the initial access gene at position 0 through repair.
#[derive(Clone, Debug)]
pub struct CrossoverAttack;

impl CrossoverAttack {
    pub fn call<R: Rng>(
        &self,
        catalog: &TechniqueCatalog,
        father: &mut AttackGenome,
        mother: &mut AttackGenome,
        rng: &mut R,
    ) {
        let father_head: Vec<AttackGene> = father.genes[..father.genes.len().min(2)].to_vec();
        let mother_head: Vec<AttackGene> = mother.genes[..mother.genes.len().min(2)].to_vec();

        let father_cut = cut_point(father.genes.len(), rng);
        let mother_cut = cut_point(mother.genes.len(), rng);

        let father_tail = father.genes.split_off(father_cut);
        let mother_tail = mother.genes.split_off(mother_cut);
        father.genes.extend(mother_tail);
        mother.genes.extend(father_tail);

        father.genes.truncate(father.max_length);
        mother.genes.truncate(mother.max_length);

        // children shorter than two genes fall back to their originating parent
        if father.genes.len() < 2 {
            father.genes = father_head.clone();
        }
        if mother.genes.len() < 2 {
            mother.genes = mother_head.clone();
        }

        repair_initial_access(catalog, father, &father_head[0]);
        repair_initial_access(catalog, mother, &mother_head[0]);

        father.invalidate_fitness();
        mother.invalidate_fitness();
    }
}

fn cut_point<R: Rng>(length: usize, rng: &mut R) -> usize {
    if length > 1 {
        rng.gen_range(1..length)
    } else {
        length
    }
}

fn repair_initial_access(
    catalog: &TechniqueCatalog,
    genome: &mut AttackGenome,
    template: &AttackGene,
) {
    if genome.genes.is_empty() {
        genome.genes.push(template.clone());
        return;
    }
    if catalog.get(&genome.genes[0].technique_id).tactic != Tactic::InitialAccess {
        genome.genes[0] = template.clone();
    }
}

#[derive(Copy, Clone, Debug)]
enum AttackMutation {
    AddGene,
    RemoveGene,
    SwapGenes,
    ModifyTechnique,
    ModifyTargeting,
    ModifyStealth,
}

const ATTACK_MUTATIONS: [AttackMutation; 6] = [
    AttackMutation::AddGene,
    AttackMutation::RemoveGene,
    AttackMutation::SwapGenes,
    AttackMutation::ModifyTechnique,
    AttackMutation::ModifyTargeting,
    AttackMutation::ModifyStealth,
];

/// Applies one uniformly chosen mutation. Kinds whose guard does not hold
/// (e.g. adding to a full chain) leave the genes untouched.
#[derive(Clone, Debug)]
pub struct MutateAttack;

impl MutateAttack {
    pub fn call<R: Rng>(
        &self,
        catalog: &TechniqueCatalog,
        genome: &mut AttackGenome,
        rng: &mut R,
    ) {
        let mutation = ATTACK_MUTATIONS[rng.gen_range(0..ATTACK_MUTATIONS.len())];
        match mutation {
            AttackMutation::AddGene => {
                if genome.genes.len() < genome.max_length {
                    let tactic =
                        Tactic::KILL_CHAIN[rng.gen_range(0..Tactic::KILL_CHAIN.len())];
                    let candidates = catalog.by_tactic(tactic);
                    if let Some(technique) = candidates.choose(rng) {
                        let gene = random_gene(&technique.id, rng);
                        // never at position 0
                        let position = rng.gen_range(1..=genome.genes.len());
                        genome.genes.insert(position, gene);
                    }
                }
            }
            AttackMutation::RemoveGene => {
                if genome.genes.len() > 2 {
                    let index = rng.gen_range(1..genome.genes.len());
                    genome.genes.remove(index);
                }
            }
            AttackMutation::SwapGenes => {
                if genome.genes.len() > 2 {
                    let i = rng.gen_range(1..genome.genes.len());
                    let j = rng.gen_range(1..genome.genes.len());
                    genome.genes.swap(i, j);
                }
            }
            AttackMutation::ModifyTechnique => {
                let index = rng.gen_range(0..genome.genes.len());
                let candidates = if index == 0 {
                    catalog.initial_access()
                } else {
                    let tactic = catalog.get(&genome.genes[index].technique_id).tactic;
                    catalog.by_tactic(tactic)
                };
                if let Some(technique) = candidates.choose(rng) {
                    genome.genes[index].technique_id = technique.id.clone();
                }
            }
            AttackMutation::ModifyTargeting => {
                let index = rng.gen_range(0..genome.genes.len());
                let gene = &mut genome.genes[index];
                gene.target_selector =
                    TargetSelector::ALL[rng.gen_range(0..TargetSelector::ALL.len())];
                if gene.target_selector == TargetSelector::SpecificRole {
                    gene.target_role = Some(HostRole::ALL[rng.gen_range(0..HostRole::ALL.len())]);
                }
            }
            AttackMutation::ModifyStealth => {
                let index = rng.gen_range(0..genome.genes.len());
                let gene = &mut genome.genes[index];
                let delta = rng.gen_range(-0.1..0.1);
                gene.stealth_modifier = round2((gene.stealth_modifier + delta).clamp(0.0, 1.0));
            }
        }
        genome.invalidate_fitness();
    }
}
