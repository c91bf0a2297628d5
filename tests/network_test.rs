mod support;

#[cfg(test)]
use crate::support::*;
use adversarial_coevolution::network::{NetworkDescription, NetworkError};

#[test]
fn corporate_medium_shape() {
    let network = topology::corporate_medium();
    assert_eq!(network.host_count(), 23);
    assert!(network.host(EXTERNAL_ID).is_some());

    let segments = network.segments();
    assert_eq!(segments["dmz"].len(), 3);
    assert_eq!(segments["user"].len(), 8);
    assert_eq!(segments["it"].len(), 3);
    assert_eq!(segments["server"].len(), 5);
    assert_eq!(segments["restricted"].len(), 3);

    let controllers = network.hosts_with_role(HostRole::DomainController);
    assert_eq!(controllers.len(), 1);
    assert_eq!(controllers[0].id, "srv-dc-01");
    assert_eq!(controllers[0].criticality, 1.0);

    assert!(network.neighbors(EXTERNAL_ID, None).contains(&"dmz-web-01"));
    assert!(network.validate().is_ok());
}

#[test]
fn privilege_levels_are_totally_ordered() {
    use PrivilegeLevel::*;
    assert!(System > Admin);
    assert!(Admin > User);
    assert!(User > None);
    assert!(System >= System);
    assert!(None < User);
    assert!(User <= Admin);
    assert!(Admin != System);
    assert_eq!([System, None, Admin, User].iter().max(), Some(&System));
}

#[test]
fn compromise_never_downgrades_privilege() {
    let mut network = tiny_network();
    network.compromise_host("db-01", PrivilegeLevel::Admin);
    assert_eq!(network.host("db-01").unwrap().privilege_level, PrivilegeLevel::Admin);
    assert!(network.host("db-01").unwrap().is_compromised);

    network.compromise_host("db-01", PrivilegeLevel::User);
    assert_eq!(network.host("db-01").unwrap().privilege_level, PrivilegeLevel::Admin);

    network.compromise_host("db-01", PrivilegeLevel::System);
    assert_eq!(network.host("db-01").unwrap().privilege_level, PrivilegeLevel::System);
}

#[test]
fn neighbors_filter_by_protocol() {
    let network = tiny_network();
    assert_eq!(network.neighbors("web-01", None), vec!["db-01"]);
    assert_eq!(network.neighbors("web-01", Some("smb")), vec!["db-01"]);
    assert!(network.neighbors("web-01", Some("rdp")).is_empty());
    assert!(network.neighbors("db-01", None).is_empty());
}

#[test]
fn segment_boundaries_follow_segments() {
    let mut network = tiny_network();
    network.add_host(Host {
        segment: "internal".to_string(),
        ..Host::new("app-01", "app", OsType::Ubuntu22, HostRole::Server)
    });
    network.add_edge("db-01", "app-01", &["ssh"], false);

    // dmz -> internal crosses a boundary, internal -> internal does not
    let crossing = network
        .edges_from("web-01")
        .iter()
        .find(|e| e.to == "db-01")
        .unwrap();
    assert!(crossing.segment_boundary);

    let inside = network
        .edges_from("db-01")
        .iter()
        .find(|e| e.to == "app-01")
        .unwrap();
    assert!(!inside.segment_boundary);
}

#[test]
fn credential_queries() {
    let network = topology::corporate_medium();

    // cached credentials only exist where the host keeps a cache
    let dc_creds = network.cached_credentials("srv-dc-01");
    assert!(dc_creds.iter().any(|c| c.id == "cred-domain-admin"));
    assert!(network.cached_credentials("dmz-web-01").is_empty());

    let db_creds = network.credentials_valid_on("srv-db-01");
    assert!(db_creds.iter().any(|c| c.id == "cred-svc-app-db"));
    assert!(db_creds.iter().any(|c| c.id == "cred-local-admin-srv-db-01"));
}

#[test]
fn harvesting_requires_credential_cache() {
    let mut network = tiny_network();
    assert!(network
        .cached_credentials("db-01")
        .iter()
        .any(|c| c.id == "cred-db"));

    network.host_mut("db-01").unwrap().has_credential_cache = false;
    assert!(network.cached_credentials("db-01").is_empty());
}

#[test]
fn description_round_trip_preserves_counts() {
    let network = topology::corporate_medium();
    let description = network.to_description();

    let json = serde_json::to_string(&description).unwrap();
    let reloaded: NetworkDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(description, reloaded);

    let rebuilt = Network::from_description(&reloaded).unwrap();
    assert_eq!(rebuilt.host_count(), network.host_count());
    assert_eq!(rebuilt.edge_count(), network.edge_count());
    assert_eq!(rebuilt.credential_count(), network.credential_count());
}

#[test]
fn validation_rejects_missing_external() {
    let mut network = Network::new();
    network.add_host(Host::new("a", "a", OsType::Ubuntu22, HostRole::Server));
    assert_eq!(network.validate(), Err(NetworkError::MissingExternalHost));
}

#[test]
fn validation_rejects_dangling_edge() {
    let mut network = tiny_network();
    network.add_edge("web-01", "ghost-01", &["smb"], false);
    assert!(matches!(
        network.validate(),
        Err(NetworkError::UnknownEdgeEndpoint { .. })
    ));
}

#[test]
fn validation_rejects_dangling_credential() {
    let mut network = tiny_network();
    network.add_credential(Credential::new(
        "cred-ghost",
        "ghost",
        PrivilegeLevel::User,
        &["ghost-01"],
    ));
    assert!(matches!(
        network.validate(),
        Err(NetworkError::UnknownCredentialHost { .. })
    ));
}
