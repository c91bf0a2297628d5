//! Executes a single attacker-vs-defender matchup.
//!
//! Each gene runs through an explicit step state machine: a target is
//! resolved, preconditions are checked, a success roll and a detection roll
//! are made, and only then are effects applied. A detected step never
//! applies effects, a successful step never records a detection.
use crate::catalog::{Effect, Technique, TechniqueCatalog};
use crate::genome::attack::{AttackGene, AttackGenome, TargetSelector};
use crate::genome::defense::{DefenseGenome, DetectionRule, ResponseAction};
use crate::network::host::PrivilegeLevel;
use crate::network::{Network, EXTERNAL_ID};
use crate::simulation::state::{
    EventOutcome, FailureReason, MatchResult, SimEvent, SimulationState,
};
use rand::prelude::*;

/// Stateless matchup executor. One matchup is a pure function of the two
/// genomes, the base network and the random source.
#[derive(Clone, Debug)]
pub struct SimulationEngine<'a> {
    catalog: &'a TechniqueCatalog,
}

enum StepPhase<'t, 'd> {
    PreTarget {
        technique: &'t Technique,
    },
    Targeted {
        technique: &'t Technique,
        target: String,
    },
    ResolvedSuccess {
        technique: &'t Technique,
        target: String,
    },
    ResolvedDetected {
        technique: &'t Technique,
        target: String,
        rule: &'d DetectionRule,
    },
    ResolvedFailed {
        technique_id: String,
        target: Option<String>,
        reason: FailureReason,
    },
}

impl<'a> SimulationEngine<'a> {
    pub fn new(catalog: &'a TechniqueCatalog) -> Self {
        Self { catalog }
    }

    /// Run the attacker's genes in order against the defender on a fresh
    /// clone of the network.
    pub fn simulate<R: Rng>(
        &self,
        attacker: &AttackGenome,
        defender: &DefenseGenome,
        network: &Network,
        rng: &mut R,
    ) -> MatchResult {
        let mut state = SimulationState::new(network);
        let mut result = MatchResult::default();
        let mut consecutive_successes = 0usize;
        let mut max_consecutive = 0usize;

        for (step, gene) in attacker.genes.iter().enumerate() {
            result.techniques_attempted += 1;

            let mut phase = StepPhase::PreTarget {
                technique: self.catalog.get(&gene.technique_id),
            };
            let resolved = loop {
                phase = match phase {
                    StepPhase::PreTarget { technique } => {
                        self.acquire_target(gene, technique, &state, rng)
                    }
                    StepPhase::Targeted { technique, target } => {
                        self.resolve(gene, technique, target, defender, &state, rng)
                    }
                    resolved => break resolved,
                };
            };

            match resolved {
                StepPhase::ResolvedSuccess { technique, target } => {
                    self.apply_effects(technique, &target, &mut state);
                    result.techniques_successful += 1;
                    consecutive_successes += 1;
                    max_consecutive = max_consecutive.max(consecutive_successes);
                    state.record_event(SimEvent {
                        step,
                        technique_id: technique.id.clone(),
                        target: Some(target),
                        outcome: EventOutcome::Success,
                        failure_reason: None,
                        detection_rule: None,
                        response_action: None,
                    });
                }
                StepPhase::ResolvedDetected {
                    technique,
                    target,
                    rule,
                } => {
                    result.techniques_detected += 1;
                    self.apply_response(rule.response_action, &target, &mut state);
                    state.record_event(SimEvent {
                        step,
                        technique_id: technique.id.clone(),
                        target: Some(target),
                        outcome: EventOutcome::Detected,
                        failure_reason: None,
                        detection_rule: Some(rule.technique_detected.clone()),
                        response_action: Some(rule.response_action),
                    });
                    consecutive_successes = 0;
                }
                StepPhase::ResolvedFailed {
                    technique_id,
                    target,
                    reason,
                } => {
                    state.record_event(SimEvent {
                        step,
                        technique_id,
                        target,
                        outcome: EventOutcome::PreconditionFailure,
                        failure_reason: Some(reason),
                        detection_rule: None,
                        response_action: None,
                    });
                    consecutive_successes = 0;
                }
                StepPhase::PreTarget { .. } | StepPhase::Targeted { .. } => {
                    unreachable!("step loop only breaks on resolved phases")
                }
            }
        }

        result.hosts_compromised = state.compromised_hosts.len();
        result.credentials_obtained = state.obtained_credentials.len();
        result.data_exfiltrated = state.data_exfiltrated;
        result.kill_chain_length = max_consecutive;
        result.max_criticality_reached = state
            .compromised_hosts
            .iter()
            .filter_map(|h| state.network.host(h))
            .map(|h| h.criticality)
            .fold(0.0, f64::max);
        result.events = state.events;
        result
    }

    fn acquire_target<'d, R: Rng>(
        &self,
        gene: &AttackGene,
        technique: &'a Technique,
        state: &SimulationState,
        rng: &mut R,
    ) -> StepPhase<'a, 'd> {
        if let Some(target) = self.target_for(gene, technique, state, rng) {
            return StepPhase::Targeted { technique, target };
        }
        if let Some(fallback_id) = &gene.fallback_technique {
            if let Some(fallback) = self.catalog.try_get(fallback_id) {
                if let Some(target) = self.target_for(gene, fallback, state, rng) {
                    return StepPhase::Targeted {
                        technique: fallback,
                        target,
                    };
                }
            }
        }
        StepPhase::ResolvedFailed {
            technique_id: gene.technique_id.clone(),
            target: None,
            reason: FailureReason::NoTarget,
        }
    }

    fn resolve<'d, R: Rng>(
        &self,
        gene: &AttackGene,
        technique: &'a Technique,
        target: String,
        defender: &'d DefenseGenome,
        state: &SimulationState,
        rng: &mut R,
    ) -> StepPhase<'a, 'd> {
        let mut technique = technique;
        if !self.preconditions_hold(technique, &target, state) {
            let fallback = gene
                .fallback_technique
                .as_ref()
                .and_then(|id| self.catalog.try_get(id))
                .filter(|t| self.preconditions_hold(t, &target, state));
            match fallback {
                Some(fallback) => technique = fallback,
                None => {
                    return StepPhase::ResolvedFailed {
                        technique_id: gene.technique_id.clone(),
                        target: Some(target),
                        reason: FailureReason::PreconditionsUnmet,
                    }
                }
            }
        }

        if rng.gen::<f64>() >= technique.base_success_rate {
            return StepPhase::ResolvedFailed {
                technique_id: technique.id.clone(),
                target: Some(target),
                reason: FailureReason::TechniqueFailed,
            };
        }

        let effective_stealth = (gene.stealth_modifier + state.stealth_bonus).clamp(0.0, 1.0);
        if let Some((probability, rule)) = defender.best_detection(&technique.id, effective_stealth)
        {
            let reduction = state.detection_reduction.get(&target).copied().unwrap_or(0.0);
            let probability = (probability - reduction).max(0.0);
            if probability > 0.0 && rng.gen::<f64>() < probability {
                return StepPhase::ResolvedDetected {
                    technique,
                    target,
                    rule,
                };
            }
        }

        StepPhase::ResolvedSuccess { technique, target }
    }

    fn target_for<R: Rng>(
        &self,
        gene: &AttackGene,
        technique: &Technique,
        state: &SimulationState,
        rng: &mut R,
    ) -> Option<String> {
        // an external-only technique has no target once the attacker is inside
        if technique.requires_external_position() && state.attacker_position.is_some() {
            return None;
        }

        let reachable = state.reachable_hosts();

        let candidates: Vec<String> = if technique.gains_foothold() {
            reachable
                .into_iter()
                .filter(|h| !state.compromised_hosts.contains(h) && h != EXTERNAL_ID)
                .collect()
        } else if technique.requires_position_on_host() && !state.compromised_hosts.is_empty() {
            let mut owned: Vec<String> = state
                .compromised_hosts
                .iter()
                .filter(|h| !state.isolated_hosts.contains(*h))
                .cloned()
                .collect();
            owned.sort_unstable();
            owned
        } else {
            reachable.into_iter().filter(|h| h != EXTERNAL_ID).collect()
        };

        if candidates.is_empty() {
            return None;
        }

        let criticality = |host_id: &str| {
            state
                .network
                .host(host_id)
                .map(|h| h.criticality)
                .unwrap_or(0.0)
        };

        match gene.target_selector {
            TargetSelector::HighestCriticality => {
                let best = candidates
                    .iter()
                    .map(|h| criticality(h))
                    .fold(f64::NEG_INFINITY, f64::max);
                let ties: Vec<&String> = candidates
                    .iter()
                    .filter(|h| criticality(h) == best)
                    .collect();
                ties.choose(rng).map(|h| (*h).clone())
            }
            TargetSelector::MostConnected => {
                let best = candidates
                    .iter()
                    .map(|h| state.network.out_degree(h))
                    .max()
                    .unwrap_or(0);
                let ties: Vec<&String> = candidates
                    .iter()
                    .filter(|h| state.network.out_degree(h) == best)
                    .collect();
                ties.choose(rng).map(|h| (*h).clone())
            }
            TargetSelector::SpecificRole => {
                let matches: Vec<&String> = match gene.target_role {
                    Some(role) => candidates
                        .iter()
                        .filter(|h| state.network.host(h).map(|host| host.role) == Some(role))
                        .collect(),
                    None => Vec::new(),
                };
                if matches.is_empty() {
                    candidates.choose(rng).cloned()
                } else {
                    matches.choose(rng).map(|h| (*h).clone())
                }
            }
            // defender internals are invisible to the attacker, so least
            // defended degenerates to a random pick
            TargetSelector::LeastDefended | TargetSelector::RandomReachable => {
                candidates.choose(rng).cloned()
            }
        }
    }

    fn preconditions_hold(
        &self,
        technique: &Technique,
        target: &str,
        state: &SimulationState,
    ) -> bool {
        use crate::catalog::Precondition::*;

        let host = match state.network.host(target) {
            Some(host) => host,
            None => return false,
        };

        technique.preconditions.iter().all(|precondition| match precondition {
            PositionExternal => state.attacker_position.is_none(),
            PositionInternal => {
                state.attacker_position.is_some() || !state.compromised_hosts.is_empty()
            }
            PositionOnHost => state.compromised_hosts.contains(target),
            PrivilegeAtLeastUser => state.attacker_privilege(target) >= PrivilegeLevel::User,
            PrivilegeAtLeastAdmin => state.attacker_privilege(target) >= PrivilegeLevel::Admin,
            ServiceRunning { service } => host.has_service(service),
            VulnerabilityExists => host.vulnerability_for(&technique.id).is_some(),
            CredentialAvailable => state.has_usable_credential_for(target),
            HostNotIsolated => !state.isolated_hosts.contains(target),
            OsWindows => host.is_windows(),
            OsLinux => host.is_linux(),
            HostIsDomainController => host.is_domain_controller(),
            HasCredentialCache => host.has_credential_cache,
            DataStaged => host.data_staged,
        })
    }

    fn apply_response(&self, action: ResponseAction, target: &str, state: &mut SimulationState) {
        match action {
            ResponseAction::IsolateHost => {
                state.isolated_hosts.insert(target.to_string());
            }
            ResponseAction::RevokeCredential => {
                let revoked: Vec<String> = state
                    .obtained_credentials
                    .iter()
                    .filter_map(|id| state.network.credential(id))
                    .filter(|c| c.is_valid_on(target))
                    .map(|c| c.id.clone())
                    .collect();
                state.revoked_credentials.extend(revoked);
            }
            // the technique is already recorded as detected, nothing else changes
            ResponseAction::AlertOnly
            | ResponseAction::KillProcess
            | ResponseAction::BlockTraffic => {}
        }
    }

    fn apply_effects(&self, technique: &Technique, target: &str, state: &mut SimulationState) {
        for effect in &technique.effects {
            match effect {
                Effect::GainFoothold { privilege } => {
                    let mut level = privilege.unwrap_or(PrivilegeLevel::User);
                    if technique.requires_credential() {
                        if let Some(credential_level) = state.usable_credential_privilege(target) {
                            level = level.max(credential_level);
                        }
                    }
                    state.network.compromise_host(target, level);
                    state.compromised_hosts.insert(target.to_string());
                    state.attacker_position = Some(target.to_string());
                }
                Effect::ElevatePrivilege { privilege } => {
                    state.network.compromise_host(target, *privilege);
                }
                Effect::HarvestCredentials => {
                    let cached: Vec<String> = state
                        .network
                        .cached_credentials(target)
                        .iter()
                        .map(|c| c.id.clone())
                        .collect();
                    for credential_id in cached {
                        if state.revoked_credentials.contains(&credential_id) {
                            continue;
                        }
                        state.obtained_credentials.insert(credential_id.clone());
                        if let Some(credential) = state.network.credential_mut(&credential_id) {
                            credential.compromised = true;
                        }
                    }
                }
                Effect::EstablishPersistence => {
                    state.persistent_hosts.insert(target.to_string());
                }
                Effect::MoveLaterally => {
                    let level = state
                        .usable_credential_privilege(target)
                        .map_or(PrivilegeLevel::User, |l| l.max(PrivilegeLevel::User));
                    state.network.compromise_host(target, level);
                    state.compromised_hosts.insert(target.to_string());
                    state.attacker_position = Some(target.to_string());
                }
                Effect::ExfiltrateData => {
                    state.data_exfiltrated = true;
                }
                Effect::ReduceDetection { amount } => {
                    *state
                        .detection_reduction
                        .entry(target.to_string())
                        .or_insert(0.0) += amount;
                }
                Effect::IncreaseStealth { amount } => {
                    state.stealth_bonus += amount;
                }
                Effect::StageData => {
                    if let Some(host) = state.network.host_mut(target) {
                        host.data_staged = true;
                    }
                }
                // recorded in the event log only
                Effect::ExecuteCommand
                | Effect::DiscoverHosts
                | Effect::EncryptHost
                | Effect::StopServices => {}
            }
        }
    }
}
