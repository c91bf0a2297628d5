//! The built-in technique catalog.
use super::{Effect, Precondition, Tactic, Technique};
use crate::network::host::PrivilegeLevel;

fn technique(
    id: &str,
    name: &str,
    tactic: Tactic,
    preconditions: Vec<Precondition>,
    effects: Vec<Effect>,
    base_success_rate: f64,
    stealth_base: f64,
    data_sources: &[&str],
) -> Technique {
    Technique {
        id: id.to_string(),
        name: name.to_string(),
        tactic,
        preconditions,
        effects,
        base_success_rate,
        stealth_base,
        data_sources: data_sources.iter().map(|s| s.to_string()).collect(),
    }
}

fn service_running(service: &str) -> Precondition {
    Precondition::ServiceRunning {
        service: service.to_string(),
    }
}

pub(super) fn techniques() -> Vec<Technique> {
    use Effect::*;
    use Precondition::*;
    use Tactic::*;

    vec![
        // initial access
        technique(
            "T1566.001",
            "Phishing: Spearphishing Attachment",
            InitialAccess,
            vec![PositionExternal],
            vec![GainFoothold {
                privilege: Some(PrivilegeLevel::User),
            }],
            0.35,
            0.6,
            &["Email Gateway", "Process Creation", "File Creation"],
        ),
        technique(
            "T1566.002",
            "Phishing: Spearphishing Link",
            InitialAccess,
            vec![PositionExternal],
            vec![GainFoothold {
                privilege: Some(PrivilegeLevel::User),
            }],
            0.30,
            0.7,
            &["Web Proxy", "DNS", "Process Creation"],
        ),
        technique(
            "T1190",
            "Exploit Public-Facing Application",
            InitialAccess,
            vec![PositionExternal, VulnerabilityExists],
            vec![GainFoothold {
                privilege: Some(PrivilegeLevel::User),
            }],
            0.70,
            0.4,
            &["Network Traffic", "Application Log", "Web Server Log"],
        ),
        technique(
            "T1133",
            "External Remote Services",
            InitialAccess,
            vec![PositionExternal, CredentialAvailable],
            vec![GainFoothold { privilege: None }],
            0.85,
            0.8,
            &["Authentication Log", "Network Connection"],
        ),
        technique(
            "T1078",
            "Valid Accounts",
            InitialAccess,
            vec![CredentialAvailable],
            vec![GainFoothold { privilege: None }],
            0.90,
            0.9,
            &["Authentication Log", "Account Usage Audit"],
        ),
        // execution
        technique(
            "T1059.001",
            "Command and Scripting: PowerShell",
            Execution,
            vec![PositionOnHost, OsWindows, PrivilegeAtLeastUser],
            vec![ExecuteCommand],
            0.85,
            0.5,
            &["Script Execution", "Process Creation", "Command Line"],
        ),
        technique(
            "T1059.004",
            "Command and Scripting: Unix Shell",
            Execution,
            vec![PositionOnHost, OsLinux, PrivilegeAtLeastUser],
            vec![ExecuteCommand],
            0.90,
            0.6,
            &["Process Creation", "Command Line Audit"],
        ),
        technique(
            "T1047",
            "Windows Management Instrumentation",
            Execution,
            vec![PositionOnHost, OsWindows, PrivilegeAtLeastAdmin],
            vec![ExecuteCommand],
            0.80,
            0.65,
            &["WMI Trace", "Process Creation"],
        ),
        // persistence
        technique(
            "T1053.005",
            "Scheduled Task/Job: Scheduled Task",
            Persistence,
            vec![PositionOnHost, PrivilegeAtLeastUser],
            vec![EstablishPersistence],
            0.80,
            0.5,
            &["Scheduled Task Creation", "Process Creation"],
        ),
        technique(
            "T1543.003",
            "Create or Modify System Process: Windows Service",
            Persistence,
            vec![PositionOnHost, OsWindows, PrivilegeAtLeastAdmin],
            vec![EstablishPersistence],
            0.75,
            0.4,
            &["Service Creation", "Windows Registry"],
        ),
        technique(
            "T1136.001",
            "Create Account: Local Account",
            Persistence,
            vec![PositionOnHost, PrivilegeAtLeastAdmin],
            vec![EstablishPersistence, HarvestCredentials],
            0.90,
            0.3,
            &["Account Creation", "Security Log"],
        ),
        // privilege escalation
        technique(
            "T1068",
            "Exploitation for Privilege Escalation",
            PrivilegeEscalation,
            vec![PositionOnHost, PrivilegeAtLeastUser, VulnerabilityExists],
            vec![ElevatePrivilege {
                privilege: PrivilegeLevel::Admin,
            }],
            0.60,
            0.4,
            &["Process Creation", "Exploit Guard"],
        ),
        technique(
            "T1548.002",
            "Abuse Elevation Control: Bypass UAC",
            PrivilegeEscalation,
            vec![PositionOnHost, OsWindows, PrivilegeAtLeastUser],
            vec![ElevatePrivilege {
                privilege: PrivilegeLevel::Admin,
            }],
            0.65,
            0.55,
            &["Process Creation", "Windows Registry"],
        ),
        technique(
            "T1134",
            "Access Token Manipulation",
            PrivilegeEscalation,
            vec![PositionOnHost, PrivilegeAtLeastAdmin],
            vec![ElevatePrivilege {
                privilege: PrivilegeLevel::System,
            }],
            0.75,
            0.6,
            &["API Monitoring", "Access Token"],
        ),
        // defense evasion
        technique(
            "T1070.001",
            "Indicator Removal: Clear Windows Event Logs",
            DefenseEvasion,
            vec![PositionOnHost, OsWindows, PrivilegeAtLeastAdmin],
            vec![ReduceDetection { amount: 0.3 }],
            0.90,
            0.2,
            &["Log Deletion Event", "Security Log"],
        ),
        technique(
            "T1027",
            "Obfuscated Files or Information",
            DefenseEvasion,
            vec![PositionOnHost, PrivilegeAtLeastUser],
            vec![IncreaseStealth { amount: 0.15 }],
            0.85,
            0.7,
            &["File Analysis", "Script Execution"],
        ),
        technique(
            "T1218.011",
            "System Binary Proxy Execution: Rundll32",
            DefenseEvasion,
            vec![PositionOnHost, OsWindows, PrivilegeAtLeastUser],
            vec![ExecuteCommand, IncreaseStealth { amount: 0.2 }],
            0.80,
            0.75,
            &["Process Creation", "Module Load"],
        ),
        // credential access
        technique(
            "T1003.001",
            "OS Credential Dumping: LSASS Memory",
            CredentialAccess,
            vec![
                PositionOnHost,
                OsWindows,
                PrivilegeAtLeastAdmin,
                HasCredentialCache,
            ],
            vec![HarvestCredentials],
            0.85,
            0.3,
            &["Process Access (LSASS)", "Sensor Health"],
        ),
        technique(
            "T1003.003",
            "OS Credential Dumping: NTDS",
            CredentialAccess,
            vec![PositionOnHost, HostIsDomainController, PrivilegeAtLeastAdmin],
            vec![HarvestCredentials],
            0.80,
            0.2,
            &["File Access", "Volume Shadow Copy", "Command Line"],
        ),
        technique(
            "T1558.003",
            "Steal or Forge Kerberos Tickets: Kerberoasting",
            CredentialAccess,
            vec![PositionInternal, PrivilegeAtLeastUser],
            vec![HarvestCredentials],
            0.75,
            0.65,
            &["Kerberos Traffic", "Authentication Log"],
        ),
        technique(
            "T1110.003",
            "Brute Force: Password Spraying",
            CredentialAccess,
            vec![],
            vec![HarvestCredentials],
            0.20,
            0.4,
            &["Authentication Log", "Account Lockout"],
        ),
        // discovery
        technique(
            "T1018",
            "Remote System Discovery",
            Discovery,
            vec![PositionInternal, PrivilegeAtLeastUser],
            vec![DiscoverHosts],
            0.95,
            0.7,
            &["Network Traffic", "Process Creation"],
        ),
        technique(
            "T1083",
            "File and Directory Discovery",
            Discovery,
            vec![PositionOnHost, PrivilegeAtLeastUser],
            vec![StageData],
            0.95,
            0.85,
            &["Process Creation", "Command Line"],
        ),
        technique(
            "T1087.002",
            "Account Discovery: Domain Account",
            Discovery,
            vec![PositionInternal, PrivilegeAtLeastUser],
            vec![DiscoverHosts],
            0.90,
            0.7,
            &["LDAP Query", "Authentication Log"],
        ),
        // lateral movement
        technique(
            "T1021.001",
            "Remote Services: Remote Desktop Protocol",
            LateralMovement,
            vec![
                service_running("rdp"),
                CredentialAvailable,
                HostNotIsolated,
            ],
            vec![MoveLaterally],
            0.85,
            0.6,
            &["Network Connection", "Authentication Log", "RDP Log"],
        ),
        technique(
            "T1021.002",
            "Remote Services: SMB/Windows Admin Shares",
            LateralMovement,
            vec![
                service_running("smb"),
                CredentialAvailable,
                HostNotIsolated,
            ],
            vec![MoveLaterally],
            0.80,
            0.5,
            &["Network Share Access", "SMB Traffic", "Authentication Log"],
        ),
        technique(
            "T1021.004",
            "Remote Services: SSH",
            LateralMovement,
            vec![
                service_running("ssh"),
                CredentialAvailable,
                HostNotIsolated,
            ],
            vec![MoveLaterally],
            0.85,
            0.65,
            &["SSH Log", "Authentication Log", "Network Connection"],
        ),
        technique(
            "T1570",
            "Lateral Tool Transfer",
            LateralMovement,
            vec![PositionOnHost, PrivilegeAtLeastUser, HostNotIsolated],
            vec![ExecuteCommand],
            0.75,
            0.5,
            &["Network Traffic", "File Creation"],
        ),
        technique(
            "T1210",
            "Exploitation of Remote Services",
            LateralMovement,
            vec![VulnerabilityExists, HostNotIsolated],
            vec![MoveLaterally],
            0.55,
            0.35,
            &["Network Traffic", "IDS/IPS", "Application Log"],
        ),
        // collection
        technique(
            "T1005",
            "Data from Local System",
            Collection,
            vec![PositionOnHost, PrivilegeAtLeastUser],
            vec![StageData],
            0.90,
            0.75,
            &["File Access", "Process Creation"],
        ),
        technique(
            "T1039",
            "Data from Network Shared Drive",
            Collection,
            vec![PositionInternal, PrivilegeAtLeastUser, service_running("smb")],
            vec![StageData],
            0.85,
            0.7,
            &["Network Share Access", "File Access"],
        ),
        // exfiltration
        technique(
            "T1048",
            "Exfiltration Over Alternative Protocol",
            Exfiltration,
            vec![PositionOnHost, DataStaged, PrivilegeAtLeastUser],
            vec![ExfiltrateData],
            0.75,
            0.5,
            &["Network Traffic", "DNS", "Firewall Log"],
        ),
        technique(
            "T1041",
            "Exfiltration Over C2 Channel",
            Exfiltration,
            vec![PositionOnHost, DataStaged, PrivilegeAtLeastUser],
            vec![ExfiltrateData],
            0.80,
            0.6,
            &["Network Traffic", "Proxy Log"],
        ),
        technique(
            "T1567.002",
            "Exfiltration Over Web Service: Cloud Storage",
            Exfiltration,
            vec![PositionOnHost, DataStaged, PrivilegeAtLeastUser],
            vec![ExfiltrateData],
            0.85,
            0.7,
            &["Cloud API Log", "Network Traffic", "Web Proxy"],
        ),
        // impact
        technique(
            "T1486",
            "Data Encrypted for Impact",
            Impact,
            vec![PositionOnHost, PrivilegeAtLeastAdmin],
            vec![EncryptHost],
            0.90,
            0.1,
            &["File Modification", "Service Stop"],
        ),
        technique(
            "T1489",
            "Service Stop",
            Impact,
            vec![PositionOnHost, PrivilegeAtLeastAdmin],
            vec![StopServices],
            0.95,
            0.2,
            &["Service Activity", "Process Termination"],
        ),
    ]
}
