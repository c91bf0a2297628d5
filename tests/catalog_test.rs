mod support;

#[cfg(test)]
use crate::support::*;

#[test]
fn builtin_covers_every_tactic() {
    let catalog = TechniqueCatalog::builtin();
    assert_eq!(catalog.len(), 36);
    for tactic in Tactic::KILL_CHAIN {
        assert!(
            !catalog.by_tactic(tactic).is_empty(),
            "no techniques for {:?}",
            tactic
        );
    }
}

#[test]
fn tactic_partition_is_exhaustive() {
    let catalog = TechniqueCatalog::builtin();
    let total: usize = Tactic::KILL_CHAIN
        .iter()
        .map(|&tactic| catalog.by_tactic(tactic).len())
        .sum();
    assert_eq!(total, catalog.len());
}

#[test]
fn initial_access_enumeration() {
    let catalog = TechniqueCatalog::builtin();
    let initial_access = catalog.initial_access();
    assert_eq!(initial_access.len(), 5);
    assert!(initial_access
        .iter()
        .all(|t| t.tactic == Tactic::InitialAccess));
    assert!(initial_access.iter().any(|t| t.id == "T1566.001"));
}

#[test]
fn lookup_by_id() {
    let catalog = TechniqueCatalog::builtin();
    let technique = catalog.get("T1190");
    assert_eq!(technique.name, "Exploit Public-Facing Application");
    assert_eq!(technique.base_success_rate, 0.70);
    assert!(catalog.contains("T1078"));
    assert!(!catalog.contains("T9999"));
    assert!(catalog.try_get("T9999").is_none());
}

#[test]
#[should_panic(expected = "unknown technique id")]
fn lookup_of_unknown_id_panics() {
    TechniqueCatalog::builtin().get("T0000");
}

#[test]
fn rates_and_sources_are_well_formed() {
    let catalog = TechniqueCatalog::builtin();
    for technique in catalog.techniques() {
        assert!((0.0..=1.0).contains(&technique.base_success_rate), "{}", technique.id);
        assert!((0.0..=1.0).contains(&technique.stealth_base), "{}", technique.id);
        assert!(!technique.data_sources.is_empty(), "{}", technique.id);
    }
}

#[test]
fn foothold_classification() {
    let catalog = TechniqueCatalog::builtin();
    assert!(catalog.get("T1566.001").gains_foothold());
    assert!(catalog.get("T1021.002").gains_foothold());
    assert!(!catalog.get("T1059.001").gains_foothold());
    assert!(catalog.get("T1566.001").requires_external_position());
    assert!(catalog.get("T1059.001").requires_position_on_host());
}
