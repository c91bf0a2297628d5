#[allow(unused_imports)]
pub use adversarial_coevolution::catalog::{Tactic, TechniqueCatalog};
#[allow(unused_imports)]
pub use adversarial_coevolution::genome::attack::{AttackGene, AttackGenome, TargetSelector};
#[allow(unused_imports)]
pub use adversarial_coevolution::genome::defense::{
    DefenseGenome, DetectionLogic, DetectionRule, ResponseAction,
};
#[allow(unused_imports)]
pub use adversarial_coevolution::genome::{Genome, MultiFitness};
#[allow(unused_imports)]
pub use adversarial_coevolution::network::host::{
    Credential, Host, HostRole, OsType, PrivilegeLevel, Service,
};
#[allow(unused_imports)]
pub use adversarial_coevolution::network::{topology, Network, EXTERNAL_ID};
#[allow(unused_imports)]
pub use adversarial_coevolution::simulation::{
    EventOutcome, MatchResult, SimulationEngine, SimulationState,
};
#[allow(unused_imports)]
pub use rand::rngs::SmallRng;
#[allow(unused_imports)]
pub use rand::SeedableRng;

#[allow(dead_code)]
pub fn rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// An attacker with default targeting over the given chain.
#[allow(dead_code)]
pub fn attacker_from_chain(chain: &[&str]) -> AttackGenome {
    let genes = chain.iter().map(|id| AttackGene::new(id)).collect();
    AttackGenome::new(genes, 12)
}

#[allow(dead_code)]
pub fn rule(technique_id: &str, confidence: f64, response_action: ResponseAction) -> DetectionRule {
    DetectionRule {
        technique_detected: technique_id.to_string(),
        data_source: "Generic".to_string(),
        detection_logic: DetectionLogic::Behavioral,
        confidence,
        false_positive_rate: 0.05,
        response_action,
    }
}

#[allow(dead_code)]
pub fn defender_with_rules(rules: Vec<DetectionRule>) -> DefenseGenome {
    DefenseGenome::new(rules, 15)
}

#[allow(dead_code)]
pub fn empty_defender() -> DefenseGenome {
    DefenseGenome::new(Vec::new(), 15)
}

/// Smallest network that passes validation: the external pseudo-host and two
/// internal hosts behind it.
#[allow(dead_code)]
pub fn tiny_network() -> Network {
    let mut network = Network::new();
    network.add_host(Host {
        segment: "external".to_string(),
        ..Host::new(EXTERNAL_ID, "internet", OsType::Ubuntu22, HostRole::Server)
    });
    network.add_host(Host {
        criticality: 0.4,
        segment: "dmz".to_string(),
        services: vec![Service::exposed("http", 80, "nginx/1.24")],
        has_credential_cache: true,
        ..Host::new("web-01", "web", OsType::Ubuntu22, HostRole::Server)
    });
    network.add_host(Host {
        criticality: 0.9,
        segment: "internal".to_string(),
        services: vec![Service::new("smb", 445, "3.1.1")],
        has_credential_cache: true,
        ..Host::new("db-01", "db", OsType::WindowsServer2019, HostRole::Database)
    });
    network.add_edge(EXTERNAL_ID, "web-01", &["http"], false);
    network.add_edge("web-01", "db-01", &["smb"], false);
    network.add_credential(Credential::new(
        "cred-db",
        "dbadmin",
        PrivilegeLevel::Admin,
        &["db-01"],
    ));
    network
}
