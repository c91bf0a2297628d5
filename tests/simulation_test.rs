mod support;

#[cfg(test)]
use crate::support::*;
use adversarial_coevolution::operators::attack::RandomAttacker;
use adversarial_coevolution::operators::defense::RandomDefender;

#[test]
fn undefended_phishing_chain_lands_some_hits() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);

    let mut successful_runs = 0;
    for seed in 0..50 {
        let attacker = attacker_from_chain(&["T1566.001", "T1059.001"]);
        let result = engine.simulate(&attacker, &empty_defender(), &network, &mut rng(seed));
        assert_eq!(result.techniques_detected, 0);
        if result.techniques_successful > 0 {
            successful_runs += 1;
        }
    }
    assert!(
        successful_runs >= 5,
        "only {}/50 runs had any success",
        successful_runs
    );
}

#[test]
fn confident_rules_detect_phishing() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    let defender = defender_with_rules(vec![
        rule("T1566.001", 0.95, ResponseAction::AlertOnly),
        rule("T1566.002", 0.95, ResponseAction::AlertOnly),
        rule("T1190", 0.95, ResponseAction::AlertOnly),
    ]);

    let mut detected_runs = 0;
    for seed in 0..100 {
        let attacker = attacker_from_chain(&["T1566.001", "T1059.001"]);
        let result = engine.simulate(&attacker, &defender, &network, &mut rng(seed));
        if result.techniques_detected > 0 {
            detected_runs += 1;
        }
    }
    assert!(
        detected_runs > 20,
        "only {}/100 runs saw a detection",
        detected_runs
    );
}

#[test]
fn isolated_hosts_are_unreachable() {
    let network = topology::corporate_medium();
    let mut state = SimulationState::new(&network);
    state.compromised_hosts.insert("it-ws-01".to_string());
    state.attacker_position = Some("it-ws-01".to_string());
    assert!(state.is_host_reachable("srv-dc-01"));

    state.isolated_hosts.insert("srv-dc-01".to_string());
    assert!(!state.is_host_reachable("srv-dc-01"));

    // isolation holds even when the host itself is compromised
    state.compromised_hosts.insert("srv-dc-01".to_string());
    assert!(!state.is_host_reachable("srv-dc-01"));
}

#[test]
fn detected_steps_apply_no_effects() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    // a certain detection on the only foothold technique in the chain
    let defender = defender_with_rules(vec![rule(
        "T1566.001",
        1.0,
        ResponseAction::IsolateHost,
    )]);

    for seed in 0..100 {
        let attacker = attacker_from_chain(&["T1566.001", "T1059.001"]);
        let result = engine.simulate(&attacker, &defender, &network, &mut rng(seed));
        assert_eq!(result.hosts_compromised, 0);
        assert_eq!(result.techniques_successful, 0);
        assert!(!result.data_exfiltrated);
    }
}

#[test]
fn detection_and_success_are_mutually_exclusive_per_step() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    let defender = defender_with_rules(vec![
        rule("T1566.001", 0.5, ResponseAction::AlertOnly),
        rule("T1059.001", 0.5, ResponseAction::AlertOnly),
    ]);

    for seed in 0..100 {
        let attacker = attacker_from_chain(&["T1566.001", "T1059.001", "T1003.001"]);
        let result = engine.simulate(&attacker, &defender, &network, &mut rng(seed));
        assert_eq!(result.events.len(), result.techniques_attempted);
        for event in &result.events {
            match event.outcome {
                EventOutcome::Success => {
                    assert!(event.detection_rule.is_none());
                }
                EventOutcome::Detected => {
                    assert!(event.detection_rule.is_some());
                }
                EventOutcome::PreconditionFailure => {
                    assert!(event.failure_reason.is_some());
                }
            }
        }
    }
}

#[test]
fn full_random_matchups_keep_result_invariants() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    let random_attacker = RandomAttacker::new(12);
    let random_defender = RandomDefender::new(15);

    for seed in 0..100 {
        let mut random_source = rng(seed);
        let attacker = random_attacker.call(&catalog, &mut random_source);
        let defender = random_defender.call(&catalog, &mut random_source);
        let result = engine.simulate(&attacker, &defender, &network, &mut random_source);

        assert_eq!(result.techniques_attempted, attacker.genes.len());
        assert!(result.techniques_successful + result.techniques_detected <= result.techniques_attempted);
        assert!(result.kill_chain_length <= result.techniques_successful);
        assert_eq!(result.events.len(), result.techniques_attempted);
        assert!(result.max_criticality_reached <= 1.0);
        if result.hosts_compromised == 0 {
            assert_eq!(result.max_criticality_reached, 0.0);
        }
    }
}

#[test]
fn matchups_are_reproducible_for_equal_streams() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    let attacker = attacker_from_chain(&["T1190", "T1059.004", "T1005", "T1048"]);
    let defender = defender_with_rules(vec![rule("T1190", 0.6, ResponseAction::AlertOnly)]);

    let first = engine.simulate(&attacker, &defender, &network, &mut rng(99));
    let second = engine.simulate(&attacker, &defender, &network, &mut rng(99));
    assert_eq!(first, second);
}

#[test]
fn matchups_never_mutate_the_base_network() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    let random_attacker = RandomAttacker::new(12);

    let before = network.to_description();
    for seed in 0..20 {
        let attacker = random_attacker.call(&catalog, &mut rng(seed));
        engine.simulate(&attacker, &empty_defender(), &network, &mut rng(seed));
    }
    assert_eq!(network.to_description(), before);
}

#[test]
fn revoked_credentials_are_unusable() {
    let network = tiny_network();
    let mut state = SimulationState::new(&network);
    state.obtained_credentials.insert("cred-db".to_string());
    assert!(state.has_usable_credential_for("db-01"));
    assert_eq!(
        state.usable_credential_privilege("db-01"),
        Some(PrivilegeLevel::Admin)
    );

    state.revoked_credentials.insert("cred-db".to_string());
    assert!(!state.has_usable_credential_for("db-01"));
}

#[test]
fn credential_revocation_response_cuts_lateral_movement() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);
    // harvesting is allowed, the smb lateral move is revoked on sight
    let defender = defender_with_rules(vec![rule(
        "T1021.002",
        1.0,
        ResponseAction::RevokeCredential,
    )]);

    for seed in 0..50 {
        let attacker = attacker_from_chain(&[
            "T1566.001",
            "T1003.001",
            "T1021.002",
            "T1021.002",
        ]);
        let result = engine.simulate(&attacker, &defender, &network, &mut rng(seed));
        // once the first smb move is detected every credential on that
        // target is revoked, so a detected move never succeeds afterwards
        let detected_steps: Vec<usize> = result
            .events
            .iter()
            .filter(|e| e.outcome == EventOutcome::Detected)
            .map(|e| e.step)
            .collect();
        for step in &detected_steps {
            assert!(result.events[*step].response_action == Some(ResponseAction::RevokeCredential));
        }
    }
}

#[test]
fn external_techniques_have_no_target_once_inside() {
    let catalog = TechniqueCatalog::builtin();
    let network = topology::corporate_medium();
    let engine = SimulationEngine::new(&catalog);

    // second phishing attempt is pointless after the first one landed
    let attacker = attacker_from_chain(&["T1190", "T1566.001"]);
    for seed in 0..50 {
        let result = engine.simulate(&attacker, &empty_defender(), &network, &mut rng(seed));
        if result.events[0].outcome == EventOutcome::Success {
            assert_eq!(result.events[1].outcome, EventOutcome::PreconditionFailure);
        }
    }
}
