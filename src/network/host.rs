use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system variants modeled on the network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OsType {
    Windows10,
    WindowsServer2019,
    Ubuntu22,
    Rhel8,
}

impl OsType {
    pub fn is_windows(&self) -> bool {
        matches!(self, OsType::Windows10 | OsType::WindowsServer2019)
    }
    pub fn is_linux(&self) -> bool {
        matches!(self, OsType::Ubuntu22 | OsType::Rhel8)
    }
}

/// Functional role of a host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostRole {
    Workstation,
    Server,
    DomainController,
    Firewall,
    Database,
}

impl HostRole {
    pub const ALL: [HostRole; 5] = [
        HostRole::Workstation,
        HostRole::Server,
        HostRole::DomainController,
        HostRole::Firewall,
        HostRole::Database,
    ];
}

/// Privilege levels on a host, totally ordered from lowest to highest.
///
/// The derived [Ord] gives `None < User < Admin < System`. Compromise
/// operations join into this lattice and never move down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrivilegeLevel {
    #[default]
    None,
    User,
    Admin,
    System,
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            PrivilegeLevel::None => "none",
            PrivilegeLevel::User => "user",
            PrivilegeLevel::Admin => "admin",
            PrivilegeLevel::System => "system",
        };
        write!(f, "{}", label)
    }
}

/// A network service running on a host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub port: u16,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub exposed: bool,
}

impl Service {
    pub fn new(name: &str, port: u16, version: &str) -> Self {
        Self {
            name: name.to_string(),
            port,
            version: version.to_string(),
            exposed: false,
        }
    }
    pub fn exposed(name: &str, port: u16, version: &str) -> Self {
        Self {
            exposed: true,
            ..Self::new(name, port, version)
        }
    }
}

/// A vulnerability present on a host, enabling one technique until exploited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub severity: f64,
    pub enables_technique: String,
    #[serde(default)]
    pub exploited: bool,
}

impl Vulnerability {
    pub fn new(id: &str, severity: f64, enables_technique: &str) -> Self {
        Self {
            id: id.to_string(),
            severity,
            enables_technique: enables_technique.to_string(),
            exploited: false,
        }
    }
}

/// An authentication credential, valid on a fixed set of hosts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub username: String,
    pub privilege: PrivilegeLevel,
    pub valid_on: Vec<String>,
    #[serde(default)]
    pub compromised: bool,
}

impl Credential {
    pub fn new(id: &str, username: &str, privilege: PrivilegeLevel, valid_on: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            privilege,
            valid_on: valid_on.iter().map(|h| h.to_string()).collect(),
            compromised: false,
        }
    }

    pub fn is_valid_on(&self, host_id: &str) -> bool {
        self.valid_on.iter().any(|h| h == host_id)
    }
}

/// A host on the modeled network.
///
/// The immutable fields describe the asset. The mutable tail
/// (`is_compromised`, `privilege_level`, `has_credential_cache`,
/// `data_staged`) is what a simulation run mutates on its own clone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub hostname: String,
    pub os: OsType,
    pub role: HostRole,
    pub criticality: f64,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub high_value_data: bool,
    #[serde(default)]
    pub is_compromised: bool,
    #[serde(default)]
    pub privilege_level: PrivilegeLevel,
    #[serde(default)]
    pub has_credential_cache: bool,
    #[serde(default)]
    pub data_staged: bool,
}

impl Host {
    pub fn new(id: &str, hostname: &str, os: OsType, role: HostRole) -> Self {
        Self {
            id: id.to_string(),
            hostname: hostname.to_string(),
            os,
            role,
            criticality: 0.0,
            services: Vec::new(),
            vulnerabilities: Vec::new(),
            segment: String::new(),
            high_value_data: false,
            is_compromised: false,
            privilege_level: PrivilegeLevel::None,
            has_credential_cache: false,
            data_staged: false,
        }
    }

    pub fn has_service(&self, service_name: &str) -> bool {
        self.services.iter().any(|s| s.name == service_name)
    }

    /// The unexploited vulnerability enabling a technique, if any.
    pub fn vulnerability_for(&self, technique_id: &str) -> Option<&Vulnerability> {
        self.vulnerabilities
            .iter()
            .find(|v| v.enables_technique == technique_id && !v.exploited)
    }

    pub fn is_windows(&self) -> bool {
        self.os.is_windows()
    }
    pub fn is_linux(&self) -> bool {
        self.os.is_linux()
    }
    pub fn is_domain_controller(&self) -> bool {
        self.role == HostRole::DomainController
    }
}
