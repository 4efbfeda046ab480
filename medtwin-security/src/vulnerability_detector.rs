//! # Vulnerability Detector — pure scan of entity security controls
//!
//! Maps every disabled or insecure control to a canonical
//! {kind, severity, description} triple. No entity mutation; the same
//! population always yields the same findings.

use medtwin_core::types::{Criticality, Severity};
use medtwin_twin::entity::{AccessControlMode, Entity, PatchPolicy, Population};

use crate::types::Finding;

pub struct VulnerabilityDetector;

impl VulnerabilityDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scan the whole population. Findings are ordered by entity id, then by
    /// the fixed control order below.
    pub fn detect_vulnerabilities(&self, entities: &Population) -> Vec<Finding> {
        entities
            .values()
            .flat_map(|entity| self.scan_entity(entity))
            .collect()
    }

    fn scan_entity(&self, entity: &Entity) -> Vec<Finding> {
        let controls = &entity.controls;
        let mut findings = Vec::new();
        let mut push = |kind: &'static str, severity: Severity, description: &'static str| {
            findings.push(Finding {
                kind,
                severity,
                description,
                entity: entity.id,
                entity_name: entity.name.clone(),
            });
        };

        if !controls.encryption_enabled {
            push("encryption_disabled", Severity::High, "Data encryption is not enabled");
        }
        if !controls.authentication_required {
            push("no_authentication", Severity::High, "Authentication is not required");
        }
        if !controls.firewall_enabled {
            push("firewall_disabled", Severity::Medium, "Firewall protection is disabled");
        }
        if !controls.intrusion_detection {
            push("no_intrusion_detection", Severity::Medium, "Intrusion detection is not active");
        }
        if controls.access_control == AccessControlMode::None {
            push("no_access_control", Severity::High, "No access control policy configured");
        }
        if !controls.audit_logging {
            push("no_audit_logging", Severity::Low, "Audit logging is disabled");
        }
        if !controls.backup_enabled {
            push("backup_disabled", Severity::Medium, "Backups are not configured");
        }
        if controls.patch_policy == PatchPolicy::None {
            push("no_patch_management", Severity::High, "No patch management policy");
        }
        if !controls.vulnerability_scanning {
            push("no_vulnerability_scanning", Severity::Medium, "Vulnerability scanning is disabled");
        }
        // Isolation is only demanded of assets that would hurt the most.
        if entity.criticality == Criticality::High && !controls.network_isolation {
            push("no_network_isolation", Severity::Medium, "Critical system is not network-isolated");
        }

        findings
    }
}

impl Default for VulnerabilityDetector {
    fn default() -> Self {
        Self::new()
    }
}
