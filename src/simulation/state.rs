//! Mutable per-matchup state and the immutable matchup outcome.
use crate::genome::defense::ResponseAction;
use crate::network::host::PrivilegeLevel;
use crate::network::{Network, EXTERNAL_ID};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Outcome of a single simulation step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    Success,
    Detected,
    PreconditionFailure,
}

/// Why a step resolved as a precondition failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    NoTarget,
    PreconditionsUnmet,
    TechniqueFailed,
}

/// Record of a single simulation step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEvent {
    pub step: usize,
    pub technique_id: String,
    #[serde(default)]
    pub target: Option<String>,
    pub outcome: EventOutcome,
    #[serde(default)]
    pub failure_reason: Option<FailureReason>,
    #[serde(default)]
    pub detection_rule: Option<String>,
    #[serde(default)]
    pub response_action: Option<ResponseAction>,
}

/// Result of a single attacker-vs-defender matchup. Immutable once the
/// simulation returns it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub techniques_attempted: usize,
    pub techniques_successful: usize,
    pub techniques_detected: usize,
    pub hosts_compromised: usize,
    pub max_criticality_reached: f64,
    pub credentials_obtained: usize,
    pub data_exfiltrated: bool,
    /// Longest run of consecutive successful steps.
    pub kill_chain_length: usize,
    pub events: Vec<SimEvent>,
}

/// Mutable state for one matchup. Owns a deep clone of the base network and
/// is discarded when the matchup ends, never shared across matchups.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub network: Network,
    /// Current foothold of the attacker, `None` while still external.
    pub attacker_position: Option<String>,
    pub compromised_hosts: FxHashSet<String>,
    pub persistent_hosts: FxHashSet<String>,
    pub isolated_hosts: FxHashSet<String>,
    pub obtained_credentials: FxHashSet<String>,
    pub revoked_credentials: FxHashSet<String>,
    pub data_exfiltrated: bool,
    /// Accumulated bonus from stealth-increasing techniques, applies globally.
    pub stealth_bonus: f64,
    /// Per-host detection probability reduction from log clearing.
    pub detection_reduction: FxHashMap<String, f64>,
    pub events: Vec<SimEvent>,
}

impl SimulationState {
    pub fn new(network: &Network) -> Self {
        Self {
            network: network.clone(),
            attacker_position: None,
            compromised_hosts: FxHashSet::default(),
            persistent_hosts: FxHashSet::default(),
            isolated_hosts: FxHashSet::default(),
            obtained_credentials: FxHashSet::default(),
            revoked_credentials: FxHashSet::default(),
            data_exfiltrated: false,
            stealth_bonus: 0.0,
            detection_reduction: FxHashMap::default(),
            events: Vec::new(),
        }
    }

    /// Whether a host can currently be reached. Isolated hosts are
    /// unreachable regardless of the compromised set.
    pub fn is_host_reachable(&self, host_id: &str) -> bool {
        if self.isolated_hosts.contains(host_id) {
            return false;
        }
        self.reachable_hosts().iter().any(|h| h == host_id)
    }

    /// All hosts reachable from the current position plus every compromised,
    /// non-isolated host. Sorted so selector tie-breaking only depends on
    /// the random source.
    pub fn reachable_hosts(&self) -> Vec<String> {
        let mut reachable: FxHashSet<&str> = FxHashSet::default();
        let position = self.attacker_position.as_deref().unwrap_or(EXTERNAL_ID);
        reachable.extend(self.network.neighbors(position, None));
        for compromised in &self.compromised_hosts {
            if !self.isolated_hosts.contains(compromised) {
                reachable.extend(self.network.neighbors(compromised, None));
            }
        }
        let mut hosts: Vec<String> = reachable
            .into_iter()
            .filter(|h| !self.isolated_hosts.contains(*h))
            .map(|h| h.to_string())
            .collect();
        hosts.sort_unstable();
        hosts
    }

    /// Current privilege on a host, `None` level if not compromised.
    pub fn attacker_privilege(&self, host_id: &str) -> PrivilegeLevel {
        if !self.compromised_hosts.contains(host_id) {
            return PrivilegeLevel::None;
        }
        self.network
            .host(host_id)
            .map(|h| h.privilege_level)
            .unwrap_or(PrivilegeLevel::None)
    }

    /// Whether an obtained, unrevoked credential is valid on the target.
    pub fn has_usable_credential_for(&self, host_id: &str) -> bool {
        self.usable_credential_privilege(host_id).is_some()
    }

    /// Highest privilege among obtained, unrevoked credentials valid on the
    /// target, if any.
    pub fn usable_credential_privilege(&self, host_id: &str) -> Option<PrivilegeLevel> {
        self.obtained_credentials
            .iter()
            .filter(|id| !self.revoked_credentials.contains(*id))
            .filter_map(|id| self.network.credential(id))
            .filter(|c| c.is_valid_on(host_id))
            .map(|c| c.privilege)
            .max()
    }

    pub fn record_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }
}
