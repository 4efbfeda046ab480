//! # Twin Generator — synthesizes and evolves the entity population
//!
//! Entity type selection is a weighted categorical draw over five fixed
//! weights; every field is filled from a bounded range so generation can
//! never fail. All randomness flows through one injected `StdRng` — a seeded
//! generator replays the exact same population, which is what the tests
//! lean on.

use chrono::Utc;
use medtwin_core::types::{
    Criticality, EntityId, Exploitability, SecurityLevel, Severity, ThreatIndicator, VulnStatus,
    Vulnerability,
};
use rand::prelude::*;
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::entity::{
    AccessControlMode, Connection, Connectivity, Entity, EntityKind, HardwareBase, Location,
    NetworkSegment, PatchPolicy, PerformanceMetrics, Protocol, SecurityControls, SpecProfile,
};

// ── Catalogs ────────────────────────────────────────────────────────────────

/// Weighted draw table; weights sum to 1.
const KIND_WEIGHTS: [(EntityKind, f64); 5] = [
    (EntityKind::MedicalDevice, 0.30),
    (EntityKind::PatientMonitor, 0.25),
    (EntityKind::HospitalServer, 0.20),
    (EntityKind::NetworkDevice, 0.15),
    (EntityKind::Database, 0.10),
];

fn vulnerability_pool(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::MedicalDevice => &["firmware_outdated", "default_credentials", "unencrypted_communication"],
        EntityKind::PatientMonitor => &["weak_authentication", "data_exposure", "network_isolation"],
        EntityKind::HospitalServer => &["unpatched_system", "privilege_escalation", "sql_injection"],
        EntityKind::NetworkDevice => &["misconfiguration", "weak_encryption", "backdoor_access"],
        EntityKind::Database => &["weak_passwords", "unencrypted_data", "injection_attacks"],
    }
}

fn criticality_options(kind: EntityKind) -> &'static [Criticality] {
    match kind {
        EntityKind::MedicalDevice => &[Criticality::High, Criticality::Medium, Criticality::Low],
        EntityKind::PatientMonitor => &[Criticality::High, Criticality::High, Criticality::Medium],
        EntityKind::HospitalServer => &[Criticality::High, Criticality::Medium, Criticality::Medium],
        EntityKind::NetworkDevice => &[Criticality::Medium, Criticality::Medium, Criticality::Low],
        EntityKind::Database => &[Criticality::High, Criticality::High, Criticality::Medium],
    }
}

fn name_prefixes(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::MedicalDevice => &["MRI", "CT", "XRay", "Ultrasound", "ECG"],
        EntityKind::PatientMonitor => &["Monitor", "VitalSigns", "PatientCare", "ICU", "ER"],
        EntityKind::HospitalServer => &["Server", "MainFrame", "DataCenter", "Backup", "Archive"],
        EntityKind::NetworkDevice => &["Router", "Switch", "Firewall", "Gateway", "Hub"],
        EntityKind::Database => &["PatientDB", "MedicalDB", "AdminDB", "ResearchDB", "ArchiveDB"],
    }
}

const MANUFACTURERS: [&str; 6] = ["Siemens", "GE", "Philips", "Cisco", "Dell", "HP"];
const OPERATING_SYSTEMS: [&str; 4] = ["Linux", "Windows", "Embedded", "Custom"];
const MEMORY_GB: [u32; 5] = [4, 8, 16, 32, 64];
const STORAGE_GB: [u32; 4] = [100, 500, 1000, 2000];
const BUILDINGS: [&str; 7] = ["Main", "North", "South", "East", "West", "Emergency", "Research"];
const INDICATOR_KINDS: [&str; 6] = [
    "suspicious_network_activity",
    "unusual_login_attempts",
    "data_exfiltration",
    "malware_detection",
    "privilege_escalation",
    "denial_of_service",
];

// ── Generator ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub vulnerability_injection_rate: f64,
    pub indicator_injection_rate: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { vulnerability_injection_rate: 0.01, indicator_injection_rate: 0.005 }
    }
}

pub struct TwinGenerator {
    rng: StdRng,
    cfg: GeneratorConfig,
}

impl TwinGenerator {
    pub fn new(cfg: GeneratorConfig) -> Self {
        Self { rng: StdRng::from_entropy(), cfg }
    }

    pub fn with_seed(cfg: GeneratorConfig, seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), cfg }
    }

    /// Generate `count` fresh entities with pairwise-unique ids.
    pub fn generate_entities(&mut self, count: usize) -> Vec<Entity> {
        (0..count)
            .map(|_| {
                let kind = self.select_kind();
                self.create_entity(kind)
            })
            .collect()
    }

    fn select_kind(&mut self) -> EntityKind {
        let roll: f64 = self.rng.gen_range(0.0..1.0);
        let mut cumulative = 0.0;
        for (kind, weight) in KIND_WEIGHTS {
            cumulative += weight;
            if roll < cumulative {
                return kind;
            }
        }
        // Float summation slack lands on the last bucket.
        KIND_WEIGHTS[KIND_WEIGHTS.len() - 1].0
    }

    fn create_entity(&mut self, kind: EntityKind) -> Entity {
        let now = Utc::now();
        Entity {
            id: EntityId::random(),
            kind,
            name: self.generate_name(kind),
            network_segment: *NetworkSegment::ALL.choose(&mut self.rng).unwrap(),
            security_level: *[
                SecurityLevel::Low,
                SecurityLevel::Medium,
                SecurityLevel::High,
                SecurityLevel::Critical,
            ]
            .choose(&mut self.rng)
            .unwrap(),
            criticality: *criticality_options(kind).choose(&mut self.rng).unwrap(),
            location: self.generate_location(),
            spec: self.generate_spec(kind),
            controls: self.generate_controls(),
            metrics: self.generate_metrics(),
            connectivity: self.generate_connectivity(),
            vulnerabilities: Vec::new(),
            threat_indicators: Vec::new(),
            created_at: now,
            last_updated: now,
        }
    }

    fn generate_name(&mut self, kind: EntityKind) -> String {
        let prefix = name_prefixes(kind).choose(&mut self.rng).unwrap();
        format!("{}-{}", prefix, self.rng.gen_range(1000..=9999))
    }

    fn generate_location(&mut self) -> Location {
        Location {
            building: BUILDINGS.choose(&mut self.rng).unwrap().to_string(),
            floor: self.rng.gen_range(1..=10),
            room: self.rng.gen_range(100..=999),
        }
    }

    fn generate_base(&mut self) -> HardwareBase {
        HardwareBase {
            manufacturer: MANUFACTURERS.choose(&mut self.rng).unwrap().to_string(),
            model: format!("Model-{}", self.rng.gen_range(100..=999)),
            firmware_version: format!(
                "FW-{}.{}",
                self.rng.gen_range(1..=5),
                self.rng.gen_range(0..=9)
            ),
            operating_system: OPERATING_SYSTEMS.choose(&mut self.rng).unwrap().to_string(),
            memory_gb: *MEMORY_GB.choose(&mut self.rng).unwrap(),
            storage_gb: *STORAGE_GB.choose(&mut self.rng).unwrap(),
        }
    }

    fn generate_spec(&mut self, kind: EntityKind) -> SpecProfile {
        let base = self.generate_base();
        match kind {
            EntityKind::MedicalDevice => SpecProfile::MedicalDevice {
                base,
                modality: ["imaging", "diagnostic", "therapeutic"]
                    .choose(&mut self.rng)
                    .unwrap()
                    .to_string(),
            },
            EntityKind::PatientMonitor => SpecProfile::PatientMonitor {
                base,
                ward: ["icu", "er", "general", "pediatric"]
                    .choose(&mut self.rng)
                    .unwrap()
                    .to_string(),
            },
            EntityKind::HospitalServer => SpecProfile::HospitalServer {
                base,
                role: ["ehr", "pacs", "lab", "billing"]
                    .choose(&mut self.rng)
                    .unwrap()
                    .to_string(),
            },
            EntityKind::NetworkDevice => SpecProfile::NetworkDevice {
                base,
                port_count: self.rng.gen_range(1..=8),
            },
            EntityKind::Database => SpecProfile::Database {
                base,
                engine: ["postgres", "oracle", "mssql"]
                    .choose(&mut self.rng)
                    .unwrap()
                    .to_string(),
            },
        }
    }

    fn generate_controls(&mut self) -> SecurityControls {
        SecurityControls {
            encryption_enabled: self.rng.gen_bool(0.5),
            authentication_required: self.rng.gen_bool(0.5),
            firewall_enabled: self.rng.gen_bool(0.5),
            intrusion_detection: self.rng.gen_bool(0.5),
            access_control: *[
                AccessControlMode::RoleBased,
                AccessControlMode::AttributeBased,
                AccessControlMode::None,
            ]
            .choose(&mut self.rng)
            .unwrap(),
            audit_logging: self.rng.gen_bool(0.5),
            backup_enabled: self.rng.gen_bool(0.5),
            patch_policy: *[PatchPolicy::Automatic, PatchPolicy::Manual, PatchPolicy::None]
                .choose(&mut self.rng)
                .unwrap(),
            vulnerability_scanning: self.rng.gen_bool(0.5),
            network_isolation: self.rng.gen_bool(0.5),
        }
    }

    fn generate_metrics(&mut self) -> PerformanceMetrics {
        PerformanceMetrics {
            cpu_usage: self.rng.gen_range(10.0..90.0),
            memory_usage: self.rng.gen_range(20.0..85.0),
            network_usage: self.rng.gen_range(5.0..80.0),
            disk_usage: self.rng.gen_range(15.0..95.0),
            response_time_ms: self.rng.gen_range(10.0..500.0),
            uptime: self.rng.gen_range(0.8..0.999),
            error_rate: self.rng.gen_range(0.0..0.05),
        }
    }

    fn generate_connectivity(&mut self) -> Connectivity {
        let count = self.rng.gen_range(1..=5);
        let connections: Vec<Connection> = (0..count)
            .map(|_| Connection {
                peer: EntityId::random(),
                protocol: *Protocol::ALL.choose(&mut self.rng).unwrap(),
                port: self.rng.gen_range(1..=65535),
                encrypted: self.rng.gen_bool(0.5),
                bandwidth_mbps: self.rng.gen_range(10.0..1000.0),
            })
            .collect();
        let mut connectivity = Connectivity {
            connections,
            total_bandwidth_mbps: 0.0,
            latency_ms: self.rng.gen_range(1.0..100.0),
        };
        connectivity.recompute_total();
        connectivity
    }

    // ── Updates ─────────────────────────────────────────────────────────────

    /// Evolve an entity in place: jitter telemetry, perturb connectivity,
    /// and occasionally inject a new vulnerability or threat indicator.
    /// Never fails.
    pub fn update_entity(&mut self, entity: &mut Entity) {
        self.update_metrics(&mut entity.metrics);
        self.update_connectivity(&mut entity.connectivity);

        if self.rng.gen_bool(self.cfg.vulnerability_injection_rate.clamp(0.0, 1.0)) {
            let vuln = self.generate_vulnerability(entity.kind);
            entity.vulnerabilities.push(vuln);
        }
        if self.rng.gen_bool(self.cfg.indicator_injection_rate.clamp(0.0, 1.0)) {
            let indicator = self.generate_threat_indicator();
            entity.threat_indicators.push(indicator);
        }

        entity.touch();
    }

    /// Bounded multiplicative jitter of ±10%, re-clamped by semantic
    /// category: usage to [0,100], rates and uptime to [0,1], times to >= 0.
    fn update_metrics(&mut self, metrics: &mut PerformanceMetrics) {
        metrics.cpu_usage = (metrics.cpu_usage * self.jitter()).clamp(0.0, 100.0);
        metrics.memory_usage = (metrics.memory_usage * self.jitter()).clamp(0.0, 100.0);
        metrics.network_usage = (metrics.network_usage * self.jitter()).clamp(0.0, 100.0);
        metrics.disk_usage = (metrics.disk_usage * self.jitter()).clamp(0.0, 100.0);
        metrics.response_time_ms = (metrics.response_time_ms * self.jitter()).max(0.0);
        metrics.uptime = (metrics.uptime * self.jitter()).clamp(0.0, 1.0);
        metrics.error_rate = (metrics.error_rate * self.jitter()).clamp(0.0, 1.0);
    }

    fn jitter(&mut self) -> f64 {
        1.0 + self.rng.gen_range(-0.1..0.1)
    }

    fn update_connectivity(&mut self, connectivity: &mut Connectivity) {
        connectivity.latency_ms = (connectivity.latency_ms + self.rng.gen_range(-5.0..5.0)).max(0.0);
        for connection in &mut connectivity.connections {
            connection.bandwidth_mbps =
                (connection.bandwidth_mbps + self.rng.gen_range(-10.0..10.0)).max(0.0);
        }
        connectivity.recompute_total();
    }

    fn generate_vulnerability(&mut self, kind: EntityKind) -> Vulnerability {
        let vuln_kind = vulnerability_pool(kind).choose(&mut self.rng).unwrap();
        Vulnerability {
            id: Uuid::new_v4(),
            kind: vuln_kind.to_string(),
            severity: *[Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
                .choose(&mut self.rng)
                .unwrap(),
            description: format!("Generated {} vulnerability", vuln_kind),
            cvss_score: self.rng.gen_range(1.0..10.0),
            status: VulnStatus::Open,
            exploitability: *[
                Exploitability::Easy,
                Exploitability::Medium,
                Exploitability::Hard,
                Exploitability::Theoretical,
            ]
            .choose(&mut self.rng)
            .unwrap(),
            discovered_at: Utc::now(),
        }
    }

    fn generate_threat_indicator(&mut self) -> ThreatIndicator {
        let kind = INDICATOR_KINDS.choose(&mut self.rng).unwrap();
        ThreatIndicator {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            confidence: self.rng.gen_range(0.1..1.0),
            severity: *[Severity::Low, Severity::Medium, Severity::High, Severity::Critical]
                .choose(&mut self.rng)
                .unwrap(),
            source_ip: format!(
                "{}.{}.{}.{}",
                self.rng.gen_range(1..=255),
                self.rng.gen_range(1..=255),
                self.rng.gen_range(1..=255),
                self.rng.gen_range(1..=255)
            ),
            description: format!("Detected {} activity", kind),
            detected_at: Utc::now(),
        }
    }
}
