//! Static registry of adversary techniques with precondition and effect semantics.
//!
//! The catalog is an immutable value built once (usually via
//! [TechniqueCatalog::builtin]) and passed by shared reference to the genetic
//! operators and the simulator. Unknown technique ids are programmer errors.
mod builtin;

use crate::network::host::PrivilegeLevel;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adversary goals in kill-chain order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tactic {
    InitialAccess,
    Execution,
    Persistence,
    PrivilegeEscalation,
    DefenseEvasion,
    CredentialAccess,
    Discovery,
    LateralMovement,
    Collection,
    Exfiltration,
    Impact,
}

impl Tactic {
    pub const KILL_CHAIN: [Tactic; 11] = [
        Tactic::InitialAccess,
        Tactic::Execution,
        Tactic::Persistence,
        Tactic::PrivilegeEscalation,
        Tactic::DefenseEvasion,
        Tactic::CredentialAccess,
        Tactic::Discovery,
        Tactic::LateralMovement,
        Tactic::Collection,
        Tactic::Exfiltration,
        Tactic::Impact,
    ];

    /// The nine tactics between execution and exfiltration, used when
    /// drawing post-entry chain genes.
    pub const POST_INITIAL_ACCESS: [Tactic; 9] = [
        Tactic::Execution,
        Tactic::Persistence,
        Tactic::PrivilegeEscalation,
        Tactic::DefenseEvasion,
        Tactic::CredentialAccess,
        Tactic::Discovery,
        Tactic::LateralMovement,
        Tactic::Collection,
        Tactic::Exfiltration,
    ];
}

/// A condition checked against simulation state before a technique step runs.
/// Each variant carries only the parameters it needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Precondition {
    PositionExternal,
    PositionInternal,
    PositionOnHost,
    PrivilegeAtLeastUser,
    PrivilegeAtLeastAdmin,
    ServiceRunning { service: String },
    VulnerabilityExists,
    CredentialAvailable,
    HostNotIsolated,
    OsWindows,
    OsLinux,
    HostIsDomainController,
    HasCredentialCache,
    DataStaged,
}

/// A state mutation applied when a technique step succeeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    GainFoothold { privilege: Option<PrivilegeLevel> },
    ElevatePrivilege { privilege: PrivilegeLevel },
    HarvestCredentials,
    EstablishPersistence,
    MoveLaterally,
    ExfiltrateData,
    ExecuteCommand,
    DiscoverHosts,
    ReduceDetection { amount: f64 },
    IncreaseStealth { amount: f64 },
    StageData,
    EncryptHost,
    StopServices,
}

/// Definition of a single adversary technique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub tactic: Tactic,
    pub preconditions: Vec<Precondition>,
    pub effects: Vec<Effect>,
    pub base_success_rate: f64,
    pub stealth_base: f64,
    pub data_sources: Vec<String>,
}

impl Technique {
    pub fn requires_external_position(&self) -> bool {
        self.preconditions.contains(&Precondition::PositionExternal)
    }
    pub fn requires_position_on_host(&self) -> bool {
        self.preconditions.contains(&Precondition::PositionOnHost)
    }
    pub fn requires_credential(&self) -> bool {
        self.preconditions.contains(&Precondition::CredentialAvailable)
    }

    /// True for techniques that take a new host (foothold or lateral move),
    /// which therefore target hosts the attacker does not own yet.
    pub fn gains_foothold(&self) -> bool {
        self.effects.iter().any(|e| {
            matches!(
                e,
                Effect::GainFoothold { .. } | Effect::MoveLaterally
            )
        })
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.name)
    }
}

/// Read-only technique registry, indexed by id.
#[derive(Clone, Debug)]
pub struct TechniqueCatalog {
    techniques: Vec<Technique>,
    index: FxHashMap<String, usize>,
}

impl TechniqueCatalog {
    /// The built-in catalog covering all eleven tactics.
    pub fn builtin() -> Self {
        Self::from_techniques(builtin::techniques())
    }

    pub fn from_techniques(techniques: Vec<Technique>) -> Self {
        let mut index = FxHashMap::default();
        for (position, technique) in techniques.iter().enumerate() {
            let previous = index.insert(technique.id.clone(), position);
            assert!(
                previous.is_none(),
                "duplicate technique id in catalog: {}",
                technique.id
            );
        }
        Self { techniques, index }
    }

    /// Lookup by id. Panics on unknown ids, which indicate a broken genome
    /// or catalog rather than user input.
    pub fn get(&self, technique_id: &str) -> &Technique {
        match self.try_get(technique_id) {
            Some(technique) => technique,
            None => panic!("unknown technique id: {}", technique_id),
        }
    }

    pub fn try_get(&self, technique_id: &str) -> Option<&Technique> {
        self.index
            .get(technique_id)
            .map(|&position| &self.techniques[position])
    }

    pub fn contains(&self, technique_id: &str) -> bool {
        self.index.contains_key(technique_id)
    }

    pub fn by_tactic(&self, tactic: Tactic) -> Vec<&Technique> {
        self.techniques
            .iter()
            .filter(|t| t.tactic == tactic)
            .collect()
    }

    pub fn initial_access(&self) -> Vec<&Technique> {
        self.by_tactic(Tactic::InitialAccess)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.techniques.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn len(&self) -> usize {
        self.techniques.len()
    }
    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }
}
