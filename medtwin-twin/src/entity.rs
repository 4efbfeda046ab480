//! Entity record: one networked healthcare asset.
//!
//! The entity is a closed set of type-tagged variants sharing a common base
//! schema. The per-type payload lives in [`SpecProfile`]; everything the
//! analysis stages read (controls, metrics, connectivity) is a required,
//! typed field rather than a key/value map.

use chrono::{DateTime, Utc};
use medtwin_core::types::{Criticality, EntityId, SecurityLevel, ThreatIndicator, Vulnerability};
use std::collections::BTreeMap;

/// Ordered entity map. Ordering by id keeps every population scan (target
/// selection, feature extraction) deterministic.
pub type Population = BTreeMap<EntityId, Entity>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    MedicalDevice,
    PatientMonitor,
    HospitalServer,
    NetworkDevice,
    Database,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::MedicalDevice,
        EntityKind::PatientMonitor,
        EntityKind::HospitalServer,
        EntityKind::NetworkDevice,
        EntityKind::Database,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::MedicalDevice => "medical_device",
            EntityKind::PatientMonitor => "patient_monitor",
            EntityKind::HospitalServer => "hospital_server",
            EntityKind::NetworkDevice => "network_device",
            EntityKind::Database => "database",
        }
    }

    /// Numeric code for the anomaly feature vector.
    pub fn code(self) -> f64 {
        match self {
            EntityKind::MedicalDevice => 1.0,
            EntityKind::PatientMonitor => 2.0,
            EntityKind::HospitalServer => 3.0,
            EntityKind::NetworkDevice => 4.0,
            EntityKind::Database => 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkSegment {
    PatientCare,
    Administrative,
    Research,
    Emergency,
    Isolation,
}

impl NetworkSegment {
    pub const ALL: [NetworkSegment; 5] = [
        NetworkSegment::PatientCare,
        NetworkSegment::Administrative,
        NetworkSegment::Research,
        NetworkSegment::Emergency,
        NetworkSegment::Isolation,
    ];
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub building: String,
    pub floor: u8,
    pub room: u16,
}

// ── Specifications ──────────────────────────────────────────────────────────

/// Hardware metadata common to every asset type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HardwareBase {
    pub manufacturer: String,
    pub model: String,
    pub firmware_version: String,
    pub operating_system: String,
    pub memory_gb: u32,
    pub storage_gb: u32,
}

/// Type-specific specification payload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecProfile {
    MedicalDevice { base: HardwareBase, modality: String },
    PatientMonitor { base: HardwareBase, ward: String },
    HospitalServer { base: HardwareBase, role: String },
    NetworkDevice { base: HardwareBase, port_count: u8 },
    Database { base: HardwareBase, engine: String },
}

impl SpecProfile {
    pub fn base(&self) -> &HardwareBase {
        match self {
            SpecProfile::MedicalDevice { base, .. }
            | SpecProfile::PatientMonitor { base, .. }
            | SpecProfile::HospitalServer { base, .. }
            | SpecProfile::NetworkDevice { base, .. }
            | SpecProfile::Database { base, .. } => base,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            SpecProfile::MedicalDevice { .. } => EntityKind::MedicalDevice,
            SpecProfile::PatientMonitor { .. } => EntityKind::PatientMonitor,
            SpecProfile::HospitalServer { .. } => EntityKind::HospitalServer,
            SpecProfile::NetworkDevice { .. } => EntityKind::NetworkDevice,
            SpecProfile::Database { .. } => EntityKind::Database,
        }
    }
}

// ── Security configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessControlMode {
    RoleBased,
    AttributeBased,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchPolicy {
    Automatic,
    Manual,
    None,
}

/// The named security controls scanned by the vulnerability detector and
/// mutated by applied recommendations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityControls {
    pub encryption_enabled: bool,
    pub authentication_required: bool,
    pub firewall_enabled: bool,
    pub intrusion_detection: bool,
    pub access_control: AccessControlMode,
    pub audit_logging: bool,
    pub backup_enabled: bool,
    pub patch_policy: PatchPolicy,
    pub vulnerability_scanning: bool,
    pub network_isolation: bool,
}

impl SecurityControls {
    /// Fully locked-down configuration, used by tests and as an apply target.
    pub fn hardened() -> Self {
        Self {
            encryption_enabled: true,
            authentication_required: true,
            firewall_enabled: true,
            intrusion_detection: true,
            access_control: AccessControlMode::RoleBased,
            audit_logging: true,
            backup_enabled: true,
            patch_policy: PatchPolicy::Automatic,
            vulnerability_scanning: true,
            network_isolation: true,
        }
    }

    /// Everything off; the worst case the detector can see.
    pub fn disabled() -> Self {
        Self {
            encryption_enabled: false,
            authentication_required: false,
            firewall_enabled: false,
            intrusion_detection: false,
            access_control: AccessControlMode::None,
            audit_logging: false,
            backup_enabled: false,
            patch_policy: PatchPolicy::None,
            vulnerability_scanning: false,
            network_isolation: false,
        }
    }
}

// ── Telemetry ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PerformanceMetrics {
    /// Percent, [0, 100].
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub network_usage: f64,
    pub disk_usage: f64,
    /// Milliseconds, >= 0.
    pub response_time_ms: f64,
    /// Fraction, [0, 1].
    pub uptime: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Http,
    Https,
    Ftp,
    Ssh,
}

impl Protocol {
    pub const ALL: [Protocol; 6] = [
        Protocol::Tcp,
        Protocol::Udp,
        Protocol::Http,
        Protocol::Https,
        Protocol::Ftp,
        Protocol::Ssh,
    ];
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Connection {
    pub peer: EntityId,
    pub protocol: Protocol,
    pub port: u16,
    pub encrypted: bool,
    pub bandwidth_mbps: f64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Connectivity {
    pub connections: Vec<Connection>,
    pub total_bandwidth_mbps: f64,
    pub latency_ms: f64,
}

impl Connectivity {
    pub fn recompute_total(&mut self) {
        self.total_bandwidth_mbps = self.connections.iter().map(|c| c.bandwidth_mbps).sum();
    }

    pub fn has_unencrypted(&self) -> bool {
        self.connections.iter().any(|c| !c.encrypted)
    }
}

// ── Entity ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub network_segment: NetworkSegment,
    pub security_level: SecurityLevel,
    pub criticality: Criticality,
    pub location: Location,
    pub spec: SpecProfile,
    pub controls: SecurityControls,
    pub metrics: PerformanceMetrics,
    pub connectivity: Connectivity,
    pub vulnerabilities: Vec<Vulnerability>,
    pub threat_indicators: Vec<ThreatIndicator>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Entity {
    pub fn open_vulnerability_count(&self) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.status == medtwin_core::types::VulnStatus::Open)
            .count()
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
