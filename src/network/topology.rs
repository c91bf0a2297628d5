//! Pre-built reference topologies.
use super::host::{Credential, Host, HostRole, OsType, PrivilegeLevel, Service, Vulnerability};
use super::{Network, EXTERNAL_ID};

fn workstation(id: &str, hostname: &str, criticality: f64, segment: &str) -> Host {
    Host {
        criticality,
        segment: segment.to_string(),
        services: vec![
            Service::new("smb", 445, "3.1.1"),
            Service::new("rdp", 3389, "10.0"),
        ],
        has_credential_cache: true,
        ..Host::new(id, hostname, OsType::Windows10, HostRole::Workstation)
    }
}

fn server(id: &str, hostname: &str, criticality: f64, services: Vec<Service>) -> Host {
    Host {
        criticality,
        segment: "server".to_string(),
        services,
        has_credential_cache: true,
        ..Host::new(id, hostname, OsType::WindowsServer2019, HostRole::Server)
    }
}

/// The 23-host corporate reference network.
///
/// Segments: dmz (web, mail, vpn gateway), user (8 workstations, two of them
/// vulnerable to privilege escalation), it (3 admin workstations), server
/// (domain controller, file, app, db, backup) and restricted (2 executive
/// workstations and the hr server), plus the external pseudo-host.
pub fn corporate_medium() -> Network {
    let mut network = Network::new();

    // dmz
    network.add_host(Host {
        criticality: 0.3,
        segment: "dmz".to_string(),
        services: vec![
            Service::exposed("http", 80, "nginx/1.24"),
            Service::exposed("https", 443, "nginx/1.24"),
            Service::new("ssh", 22, "8.9"),
        ],
        vulnerabilities: vec![Vulnerability::new("CVE-2023-44487", 7.5, "T1190")],
        ..Host::new("dmz-web-01", "web-server", OsType::Ubuntu22, HostRole::Server)
    });
    network.add_host(Host {
        criticality: 0.3,
        segment: "dmz".to_string(),
        services: vec![
            Service::exposed("smtp", 25, "postfix/3.7"),
            Service::exposed("imap", 993, "dovecot/2.3"),
            Service::new("ssh", 22, "8.9"),
        ],
        ..Host::new("dmz-mail-01", "mail-server", OsType::Ubuntu22, HostRole::Server)
    });
    network.add_host(Host {
        criticality: 0.3,
        segment: "dmz".to_string(),
        services: vec![
            Service::exposed("vpn", 1194, "openvpn/2.6"),
            Service::new("ssh", 22, "8.2"),
        ],
        ..Host::new("dmz-vpn-01", "vpn-gateway", OsType::Rhel8, HostRole::Server)
    });

    // user segment
    for i in 1..=8u32 {
        let mut host = workstation(
            &format!("usr-ws-{:02}", i),
            &format!("user-ws-{}", i),
            0.15,
            "user",
        );
        if i == 3 || i == 6 {
            host.vulnerabilities = vec![Vulnerability::new(
                &format!("CVE-2023-2868{}", i),
                7.8,
                "T1068",
            )];
        }
        network.add_host(host);
    }

    // it segment
    for i in 1..=3u32 {
        network.add_host(workstation(
            &format!("it-ws-{:02}", i),
            &format!("it-admin-ws-{}", i),
            0.4,
            "it",
        ));
    }

    // server segment
    network.add_host(Host {
        criticality: 1.0,
        segment: "server".to_string(),
        services: vec![
            Service::new("ldap", 389, ""),
            Service::new("kerberos", 88, ""),
            Service::new("smb", 445, "3.1.1"),
            Service::new("dns", 53, ""),
            Service::new("rdp", 3389, "10.0"),
        ],
        has_credential_cache: true,
        high_value_data: true,
        ..Host::new(
            "srv-dc-01",
            "corp-dc-01",
            OsType::WindowsServer2019,
            HostRole::DomainController,
        )
    });
    network.add_host(server(
        "srv-file-01",
        "file-server",
        0.5,
        vec![
            Service::new("smb", 445, "3.1.1"),
            Service::new("rdp", 3389, "10.0"),
        ],
    ));
    network.add_host(Host {
        vulnerabilities: vec![Vulnerability::new("CVE-2024-1001", 8.1, "T1210")],
        ..server(
            "srv-app-01",
            "app-server",
            0.6,
            vec![
                Service::new("http", 8080, "tomcat/10.1"),
                Service::new("smb", 445, "3.1.1"),
                Service::new("rdp", 3389, "10.0"),
            ],
        )
    });
    network.add_host(Host {
        criticality: 0.9,
        segment: "server".to_string(),
        services: vec![
            Service::new("sql", 1433, "2019"),
            Service::new("smb", 445, "3.1.1"),
            Service::new("rdp", 3389, "10.0"),
        ],
        has_credential_cache: true,
        high_value_data: true,
        ..Host::new(
            "srv-db-01",
            "database-server",
            OsType::WindowsServer2019,
            HostRole::Database,
        )
    });
    network.add_host(Host {
        os: OsType::Ubuntu22,
        ..server(
            "srv-backup-01",
            "backup-server",
            0.9,
            vec![
                Service::new("ssh", 22, "8.9"),
                Service::new("smb", 445, "4.18"),
            ],
        )
    });

    // restricted segment
    for i in 1..=2u32 {
        network.add_host(workstation(
            &format!("rst-exec-{:02}", i),
            &format!("exec-ws-{}", i),
            0.6,
            "restricted",
        ));
    }
    network.add_host(Host {
        criticality: 0.95,
        segment: "restricted".to_string(),
        services: vec![
            Service::new("http", 443, "iis/10.0"),
            Service::new("smb", 445, "3.1.1"),
            Service::new("rdp", 3389, "10.0"),
        ],
        has_credential_cache: true,
        high_value_data: true,
        ..Host::new(
            "rst-hr-01",
            "hr-server",
            OsType::WindowsServer2019,
            HostRole::Server,
        )
    });

    // the internet
    network.add_host(Host {
        segment: "external".to_string(),
        ..Host::new(EXTERNAL_ID, "internet", OsType::Ubuntu22, HostRole::Server)
    });

    let user_ids: Vec<String> = (1..=8).map(|i| format!("usr-ws-{:02}", i)).collect();
    let it_ids: Vec<String> = (1..=3).map(|i| format!("it-ws-{:02}", i)).collect();
    let server_ids = [
        "srv-dc-01",
        "srv-file-01",
        "srv-app-01",
        "srv-db-01",
        "srv-backup-01",
    ];
    let restricted_ids = ["rst-exec-01", "rst-exec-02", "rst-hr-01"];
    let dmz_ids = ["dmz-web-01", "dmz-mail-01", "dmz-vpn-01"];

    // external reaches only the exposed dmz services
    for dmz_id in &dmz_ids {
        network.add_edge(EXTERNAL_ID, dmz_id, &["http", "https", "smtp", "vpn"], false);
    }

    // limited paths from the dmz inward
    network.add_edge("dmz-web-01", "usr-ws-01", &["http"], false);
    network.add_edge("dmz-vpn-01", "it-ws-01", &["rdp", "ssh"], false);

    // user workstations reach the core services and each other
    for user_id in &user_ids {
        network.add_edge(user_id, "srv-file-01", &["smb"], false);
        network.add_edge(user_id, "srv-app-01", &["http"], false);
        network.add_edge(user_id, "srv-dc-01", &["ldap", "kerberos"], false);
        for other_id in &user_ids {
            if user_id != other_id {
                network.add_edge(user_id, other_id, &["smb"], false);
            }
        }
    }

    // it admin workstations reach everything
    for it_id in &it_ids {
        for target in user_ids
            .iter()
            .map(|s| s.as_str())
            .chain(server_ids.iter().copied())
            .chain(restricted_ids.iter().copied())
            .chain(dmz_ids.iter().copied())
        {
            network.add_edge(it_id, target, &["rdp", "ssh", "smb"], false);
        }
        for other_id in &it_ids {
            if it_id != other_id {
                network.add_edge(it_id, other_id, &["rdp", "ssh", "smb"], false);
            }
        }
        network.add_edge(it_id, "srv-dc-01", &["ldap", "kerberos", "rdp", "smb"], false);
    }

    // full mesh within the server segment
    for source in &server_ids {
        for target in &server_ids {
            if source != target {
                network.add_edge(source, target, &["smb", "rdp", "ssh"], false);
            }
        }
    }

    // restricted hosts authenticate against the dc and reach each other
    for restricted_id in &restricted_ids {
        network.add_edge(restricted_id, "srv-dc-01", &["ldap", "kerberos"], false);
    }
    for source in &restricted_ids {
        for target in &restricted_ids {
            if source != target {
                network.add_edge(source, target, &["smb"], false);
            }
        }
    }

    // credentials
    let domain_admin_hosts: Vec<&str> = server_ids
        .iter()
        .copied()
        .chain(it_ids.iter().map(|s| s.as_str()))
        .chain(user_ids.iter().map(|s| s.as_str()))
        .chain(restricted_ids.iter().copied())
        .collect();
    network.add_credential(Credential::new(
        "cred-domain-admin",
        "da-admin",
        PrivilegeLevel::Admin,
        &domain_admin_hosts,
    ));

    for server_id in ["srv-file-01", "srv-app-01", "srv-db-01", "srv-backup-01"] {
        network.add_credential(Credential::new(
            &format!("cred-local-admin-{}", server_id),
            &format!("local-admin-{}", server_id),
            PrivilegeLevel::Admin,
            &[server_id],
        ));
    }

    network.add_credential(Credential::new(
        "cred-svc-app-db",
        "svc-app",
        PrivilegeLevel::User,
        &["srv-app-01", "srv-db-01"],
    ));

    for i in 1..=8u32 {
        let host_id = format!("usr-ws-{:02}", i);
        network.add_credential(Credential::new(
            &format!("cred-user-{:02}", i),
            &format!("user{:02}", i),
            PrivilegeLevel::User,
            &[host_id.as_str()],
        ));
    }

    for i in 1..=3u32 {
        let host_id = format!("it-ws-{:02}", i);
        let valid_on: Vec<&str> = std::iter::once(host_id.as_str())
            .chain(server_ids.iter().copied())
            .collect();
        network.add_credential(Credential::new(
            &format!("cred-it-admin-{:02}", i),
            &format!("itadmin{:02}", i),
            PrivilegeLevel::Admin,
            &valid_on,
        ));
    }

    network.add_credential(Credential::new(
        "cred-hr-admin",
        "hr-admin",
        PrivilegeLevel::Admin,
        &["rst-hr-01", "rst-exec-01", "rst-exec-02"],
    ));

    network
}
