//! The modeled corporate network: hosts, directed reachability edges,
//! credentials and segment membership.
//!
//! A [Network] is immutable shared state during a co-evolution run. Each
//! simulated matchup deep-clones it and mutates only its own copy.
pub mod host;
pub mod topology;

use self::host::{Credential, Host, HostRole, PrivilegeLevel};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the pseudo-host modeling the internet. It is the only source of
/// external-originating edges and never a valid attack target.
pub const EXTERNAL_ID: &str = "external";

/// A directed reachability edge, stored on its source host.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub to: String,
    pub protocols: Vec<String>,
    pub requires_credential: bool,
    pub segment_boundary: bool,
}

/// Error raised when a network description does not hold together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkError {
    MissingExternalHost,
    UnknownEdgeEndpoint { source: String, target: String },
    UnknownCredentialHost { credential: String, host: String },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetworkError::MissingExternalHost => {
                write!(f, "network has no '{}' pseudo-host", EXTERNAL_ID)
            }
            NetworkError::UnknownEdgeEndpoint { source, target } => {
                write!(f, "edge {} -> {} references an unknown host", source, target)
            }
            NetworkError::UnknownCredentialHost { credential, host } => {
                write!(
                    f,
                    "credential {} is valid on unknown host {}",
                    credential, host
                )
            }
        }
    }
}

impl std::error::Error for NetworkError {}

#[derive(Clone, Debug, Default)]
pub struct Network {
    hosts: FxHashMap<String, Host>,
    edges: FxHashMap<String, Vec<Edge>>,
    credentials: FxHashMap<String, Credential>,
    segments: FxHashMap<String, Vec<String>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_host(&mut self, host: Host) {
        if !host.segment.is_empty() {
            let members = self.segments.entry(host.segment.clone()).or_default();
            if !members.contains(&host.id) {
                members.push(host.id.clone());
            }
        }
        self.hosts.insert(host.id.clone(), host);
    }

    /// Add a directed reachability edge. The edge is tagged as a segment
    /// boundary iff the endpoints' segments differ.
    pub fn add_edge(&mut self, source: &str, target: &str, protocols: &[&str], requires_credential: bool) {
        let source_segment = self.hosts.get(source).map(|h| h.segment.clone());
        let target_segment = self.hosts.get(target).map(|h| h.segment.clone());
        let segment_boundary = source_segment != target_segment;
        self.edges.entry(source.to_string()).or_default().push(Edge {
            to: target.to_string(),
            protocols: protocols.iter().map(|p| p.to_string()).collect(),
            requires_credential,
            segment_boundary,
        });
    }

    pub fn add_credential(&mut self, credential: Credential) {
        self.credentials.insert(credential.id.clone(), credential);
    }

    pub fn host(&self, host_id: &str) -> Option<&Host> {
        self.hosts.get(host_id)
    }
    pub fn host_mut(&mut self, host_id: &str) -> Option<&mut Host> {
        self.hosts.get_mut(host_id)
    }
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|edges| edges.len()).sum()
    }
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }
    pub fn segments(&self) -> &FxHashMap<String, Vec<String>> {
        &self.segments
    }

    /// Outgoing edges of a host.
    pub fn edges_from(&self, host_id: &str) -> &[Edge] {
        self.edges
            .get(host_id)
            .map(|edges| edges.as_slice())
            .unwrap_or(&[])
    }

    /// Outgoing neighbors of a host, optionally filtered by protocol.
    pub fn neighbors(&self, host_id: &str, protocol: Option<&str>) -> Vec<&str> {
        self.edges
            .get(host_id)
            .map(|edges| {
                edges
                    .iter()
                    .filter(|edge| match protocol {
                        Some(protocol) => edge.protocols.iter().any(|p| p == protocol),
                        None => true,
                    })
                    .map(|edge| edge.to.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn out_degree(&self, host_id: &str) -> usize {
        self.edges.get(host_id).map(|edges| edges.len()).unwrap_or(0)
    }

    /// Mark a host compromised at a privilege level. Privilege only ever
    /// moves up the lattice, repeated compromises never downgrade.
    pub fn compromise_host(&mut self, host_id: &str, privilege: PrivilegeLevel) {
        if let Some(host) = self.hosts.get_mut(host_id) {
            host.is_compromised = true;
            host.privilege_level = host.privilege_level.max(privilege);
        }
    }

    pub fn credential(&self, credential_id: &str) -> Option<&Credential> {
        self.credentials.get(credential_id)
    }
    pub fn credential_mut(&mut self, credential_id: &str) -> Option<&mut Credential> {
        self.credentials.get_mut(credential_id)
    }
    pub fn credentials(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.values()
    }

    /// All credentials valid on a target host.
    pub fn credentials_valid_on(&self, host_id: &str) -> Vec<&Credential> {
        self.credentials
            .values()
            .filter(|c| c.is_valid_on(host_id))
            .collect()
    }

    /// Credentials harvestable on a host. Empty unless the host keeps a
    /// credential cache.
    pub fn cached_credentials(&self, host_id: &str) -> Vec<&Credential> {
        match self.hosts.get(host_id) {
            Some(host) if host.has_credential_cache => self.credentials_valid_on(host_id),
            _ => Vec::new(),
        }
    }

    pub fn hosts_with_role(&self, role: HostRole) -> Vec<&Host> {
        self.hosts.values().filter(|h| h.role == role).collect()
    }

    /// Integrity checks run at driver construction.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if !self.hosts.contains_key(EXTERNAL_ID) {
            return Err(NetworkError::MissingExternalHost);
        }
        for (source, edges) in &self.edges {
            if !self.hosts.contains_key(source) {
                return Err(NetworkError::UnknownEdgeEndpoint {
                    source: source.clone(),
                    target: String::new(),
                });
            }
            for edge in edges {
                if !self.hosts.contains_key(&edge.to) {
                    return Err(NetworkError::UnknownEdgeEndpoint {
                        source: source.clone(),
                        target: edge.to.clone(),
                    });
                }
            }
        }
        for credential in self.credentials.values() {
            for host_id in &credential.valid_on {
                if !self.hosts.contains_key(host_id) {
                    return Err(NetworkError::UnknownCredentialHost {
                        credential: credential.id.clone(),
                        host: host_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build a network from its serialized description, validating it.
    pub fn from_description(description: &NetworkDescription) -> Result<Self, NetworkError> {
        let mut network = Network::new();
        for host in &description.hosts {
            network.add_host(host.clone());
        }
        for edge in &description.edges {
            let protocols: Vec<&str> = edge.protocols.iter().map(|p| p.as_str()).collect();
            network.add_edge(&edge.source, &edge.target, &protocols, edge.requires_credential);
        }
        for credential in &description.credentials {
            network.add_credential(credential.clone());
        }
        network.validate()?;
        Ok(network)
    }

    /// Export to the serializable description form. Hosts, edges and
    /// credentials are emitted in sorted order so the output is stable.
    pub fn to_description(&self) -> NetworkDescription {
        let mut hosts: Vec<Host> = self.hosts.values().cloned().collect();
        hosts.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<EdgeDescription> = Vec::with_capacity(self.edge_count());
        for (source, outgoing) in &self.edges {
            for edge in outgoing {
                edges.push(EdgeDescription {
                    source: source.clone(),
                    target: edge.to.clone(),
                    protocols: edge.protocols.clone(),
                    requires_credential: edge.requires_credential,
                });
            }
        }
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        let mut credentials: Vec<Credential> = self.credentials.values().cloned().collect();
        credentials.sort_by(|a, b| a.id.cmp(&b.id));

        NetworkDescription {
            hosts,
            edges,
            credentials,
        }
    }
}

/// Serializable form of a directed edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDescription {
    pub source: String,
    pub target: String,
    pub protocols: Vec<String>,
    #[serde(default)]
    pub requires_credential: bool,
}

/// The consumed/produced network description, round-trippable through serde.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub hosts: Vec<Host>,
    pub edges: Vec<EdgeDescription>,
    pub credentials: Vec<Credential>,
}
