//! # Attack Predictor — ranked attack scenarios from population state
//!
//! Two static catalogs, built once at construction and never mutated:
//! attack archetypes (base probability, severity, indicator and target
//! tags) and threat-actor profiles (motivation, capability, persistence,
//! target preferences). Each compatible (archetype, actor) pair becomes a
//! scenario whose probability is adjusted by the current threat landscape
//! and whose impact scales with actor capability and target count.

use chrono::Utc;
use medtwin_core::events::SecurityEvent;
use medtwin_core::types::{Effort, EntityId, Severity};
use medtwin_twin::entity::{EntityKind, Population};
use tracing::debug;

use crate::types::{AttackScenario, Capability, DetectionDifficulty, Persistence};

// ── Catalogs ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AttackArchetype {
    pub kind: &'static str,
    pub base_probability: f64,
    pub severity: Severity,
    pub indicators: &'static [&'static str],
    /// Data/asset domains this attack goes after; matched against actor
    /// target preferences by exact tag intersection.
    pub target_tags: &'static [&'static str],
    /// Entity kinds this attack can land on.
    pub target_kinds: &'static [EntityKind],
    pub path_phases: &'static [&'static str],
    pub estimated_duration: &'static str,
}

#[derive(Debug, Clone)]
pub struct ActorProfile {
    pub name: &'static str,
    pub motivation: &'static str,
    pub capability: Capability,
    pub persistence: Persistence,
    pub target_preferences: &'static [&'static str],
}

fn build_archetypes() -> Vec<AttackArchetype> {
    vec![
        AttackArchetype {
            kind: "ransomware",
            base_probability: 0.15,
            severity: Severity::Critical,
            indicators: &["file_encryption", "ransom_note", "network_spread"],
            target_tags: &["patient_data", "medical_devices", "hospital_systems"],
            target_kinds: &[EntityKind::HospitalServer, EntityKind::MedicalDevice, EntityKind::Database],
            path_phases: &["reconnaissance", "phishing", "malware_delivery", "execution", "target_compromise"],
            estimated_duration: "hours_to_days",
        },
        AttackArchetype {
            kind: "data_breach",
            base_probability: 0.25,
            severity: Severity::High,
            indicators: &["unauthorized_access", "data_exfiltration", "suspicious_activity"],
            target_tags: &["patient_records", "financial_data", "research_data"],
            target_kinds: &[EntityKind::Database, EntityKind::HospitalServer],
            path_phases: &["reconnaissance", "initial_access", "privilege_escalation", "data_exfiltration", "target_compromise"],
            estimated_duration: "days_to_weeks",
        },
        AttackArchetype {
            kind: "denial_of_service",
            base_probability: 0.20,
            severity: Severity::Medium,
            indicators: &["high_traffic", "service_unavailability", "resource_exhaustion"],
            target_tags: &["web_services", "network_infrastructure", "medical_devices"],
            target_kinds: &[EntityKind::NetworkDevice, EntityKind::HospitalServer, EntityKind::MedicalDevice],
            path_phases: &["reconnaissance", "traffic_generation", "resource_exhaustion", "target_compromise"],
            estimated_duration: "minutes_to_hours",
        },
        AttackArchetype {
            kind: "insider_threat",
            base_probability: 0.10,
            severity: Severity::High,
            indicators: &["privilege_abuse", "data_access_patterns", "behavioral_changes"],
            target_tags: &["sensitive_data", "system_access", "financial_systems"],
            target_kinds: &[EntityKind::Database, EntityKind::HospitalServer],
            path_phases: &["reconnaissance", "target_compromise"],
            estimated_duration: "weeks_to_months",
        },
        AttackArchetype {
            kind: "advanced_persistent_threat",
            base_probability: 0.05,
            severity: Severity::Critical,
            indicators: &["stealth_activity", "long_term_presence", "sophisticated_tools"],
            target_tags: &["intellectual_property", "research_data", "critical_infrastructure"],
            target_kinds: &[EntityKind::HospitalServer, EntityKind::Database, EntityKind::NetworkDevice],
            path_phases: &["reconnaissance", "target_compromise"],
            estimated_duration: "months_to_years",
        },
        AttackArchetype {
            kind: "medical_device_hijacking",
            base_probability: 0.12,
            severity: Severity::Critical,
            indicators: &["device_malfunction", "unauthorized_control", "data_manipulation"],
            target_tags: &["patient_monitors", "life_support_systems", "diagnostic_equipment"],
            target_kinds: &[EntityKind::MedicalDevice, EntityKind::PatientMonitor],
            path_phases: &["reconnaissance", "device_discovery", "vulnerability_exploitation", "device_control", "target_compromise"],
            estimated_duration: "hours_to_days",
        },
    ]
}

fn build_actors() -> Vec<ActorProfile> {
    vec![
        ActorProfile {
            name: "cybercriminals",
            motivation: "financial_gain",
            capability: Capability::Medium,
            persistence: Persistence::Low,
            target_preferences: &["financial_data", "patient_records"],
        },
        ActorProfile {
            name: "nation_state",
            motivation: "espionage",
            capability: Capability::High,
            persistence: Persistence::High,
            target_preferences: &["research_data", "intellectual_property", "critical_infrastructure"],
        },
        ActorProfile {
            name: "hacktivists",
            motivation: "ideological",
            capability: Capability::Medium,
            persistence: Persistence::Medium,
            target_preferences: &["public_systems", "administrative_data"],
        },
        ActorProfile {
            name: "insiders",
            motivation: "personal_gain",
            capability: Capability::High,
            persistence: Persistence::Medium,
            target_preferences: &["sensitive_data", "financial_systems"],
        },
        ActorProfile {
            name: "medical_device_hackers",
            motivation: "research_curiosity",
            capability: Capability::High,
            persistence: Persistence::Low,
            target_preferences: &["medical_devices", "patient_monitors"],
        },
    ]
}

// ── Threat landscape ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct ThreatLandscape {
    vulnerability_density: f64,
    threat_activity_level: f64,
    unencrypted_connections: usize,
    encryption_coverage: f64,
    authentication_coverage: f64,
}

// ── Predictor ───────────────────────────────────────────────────────────────

pub struct AttackPredictor {
    archetypes: Vec<AttackArchetype>,
    actors: Vec<ActorProfile>,
}

impl AttackPredictor {
    pub fn new() -> Self {
        Self { archetypes: build_archetypes(), actors: build_actors() }
    }

    /// Predict scenarios, sorted descending by risk score. Ties keep the
    /// archetype-then-actor generation order, so output is deterministic
    /// for a given population and event log.
    pub fn predict_attacks(
        &self,
        entities: &Population,
        events: &[SecurityEvent],
    ) -> Vec<AttackScenario> {
        let landscape = self.analyze_landscape(entities, events);
        debug!(
            density = landscape.vulnerability_density,
            activity = landscape.threat_activity_level,
            "threat landscape"
        );

        let mut scenarios = Vec::new();
        for archetype in &self.archetypes {
            let probability = self.adjust_probability(archetype.base_probability, &landscape);
            for actor in &self.actors {
                if !Self::compatible(archetype, actor) {
                    continue;
                }
                scenarios.push(self.create_scenario(archetype, actor, entities, probability));
            }
        }

        // Stable sort keeps generation order on equal risk.
        scenarios.sort_by(|a, b| {
            b.risk_score
                .partial_cmp(&a.risk_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scenarios
    }

    fn analyze_landscape(&self, entities: &Population, events: &[SecurityEvent]) -> ThreatLandscape {
        let now = Utc::now();
        let total = entities.len();

        let open_vulns: usize = entities.values().map(|e| e.open_vulnerability_count()).sum();
        let vulnerability_density = if total == 0 { 0.0 } else { open_vulns as f64 / total as f64 };

        // Severity-weighted vulnerability events in the trailing 7 days,
        // normalized by 10 and capped at 1.0.
        let activity: u32 = events
            .iter()
            .filter(|e| e.age_days(now) <= 7)
            .filter_map(|e| e.vulnerability_severity())
            .map(|s| s.weight())
            .sum();
        let threat_activity_level = (activity as f64 / 10.0).min(1.0);

        let unencrypted_connections = entities
            .values()
            .flat_map(|e| &e.connectivity.connections)
            .filter(|c| !c.encrypted)
            .count();

        let (encryption_coverage, authentication_coverage) = if total == 0 {
            (0.0, 0.0)
        } else {
            let enc = entities.values().filter(|e| e.controls.encryption_enabled).count();
            let auth = entities.values().filter(|e| e.controls.authentication_required).count();
            (enc as f64 / total as f64, auth as f64 / total as f64)
        };

        ThreatLandscape {
            vulnerability_density,
            threat_activity_level,
            unencrypted_connections,
            encryption_coverage,
            authentication_coverage,
        }
    }

    fn adjust_probability(&self, base: f64, landscape: &ThreatLandscape) -> f64 {
        let mut adjusted = base;
        adjusted *= 1.0 + landscape.vulnerability_density * 0.5;
        adjusted *= 1.0 + landscape.threat_activity_level * 0.3;
        if landscape.unencrypted_connections > 0 {
            adjusted *= 1.2;
        }
        if landscape.encryption_coverage < 0.5 {
            adjusted *= 1.3;
        }
        if landscape.authentication_coverage < 0.5 {
            adjusted *= 1.4;
        }
        adjusted.min(1.0)
    }

    fn compatible(archetype: &AttackArchetype, actor: &ActorProfile) -> bool {
        actor
            .target_preferences
            .iter()
            .any(|pref| archetype.target_tags.contains(pref))
    }

    fn create_scenario(
        &self,
        archetype: &AttackArchetype,
        actor: &ActorProfile,
        entities: &Population,
        probability: f64,
    ) -> AttackScenario {
        let targets = Self::select_targets(archetype, entities);
        let impact_score = Self::impact_score(archetype.severity, actor.capability, targets.len());
        let risk_score = probability * impact_score;

        AttackScenario {
            id: format!("{}_{}_{}", archetype.kind, actor.name, targets.len()),
            kind: archetype.kind,
            threat_actor: actor.name,
            probability,
            severity: archetype.severity,
            targets,
            attack_path: archetype.path_phases.to_vec(),
            indicators: archetype.indicators.to_vec(),
            impact_score,
            risk_score,
            estimated_duration: archetype.estimated_duration,
            detection_difficulty: Self::detection_difficulty(archetype, actor),
            mitigation_effort: Self::mitigation_effort(archetype),
            predicted_at: Utc::now(),
        }
    }

    /// Up to 5 targets whose kind matches the archetype affinity, in stable
    /// population order.
    fn select_targets(archetype: &AttackArchetype, entities: &Population) -> Vec<EntityId> {
        entities
            .values()
            .filter(|e| archetype.target_kinds.contains(&e.kind))
            .take(5)
            .map(|e| e.id)
            .collect()
    }

    fn impact_score(severity: Severity, capability: Capability, target_count: usize) -> f64 {
        let base = match severity {
            Severity::Low => 0.3,
            Severity::Medium => 0.6,
            Severity::High => 0.8,
            Severity::Critical => 1.0,
        };
        let scaled = base * capability.multiplier() * (target_count as f64 / 5.0).min(1.0);
        scaled.min(1.0)
    }

    fn detection_difficulty(archetype: &AttackArchetype, actor: &ActorProfile) -> DetectionDifficulty {
        if actor.capability == Capability::High
            || matches!(archetype.kind, "advanced_persistent_threat" | "insider_threat")
        {
            DetectionDifficulty::Difficult
        } else {
            DetectionDifficulty::Moderate
        }
    }

    fn mitigation_effort(archetype: &AttackArchetype) -> Effort {
        match archetype.kind {
            "advanced_persistent_threat" | "medical_device_hijacking" => Effort::High,
            "ransomware" | "data_breach" => Effort::Medium,
            _ => Effort::Low,
        }
    }
}

impl Default for AttackPredictor {
    fn default() -> Self {
        Self::new()
    }
}
