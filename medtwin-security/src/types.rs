//! Shared types for the analysis stages.

use chrono::{DateTime, Utc};
use medtwin_core::types::{Effort, EntityId, Impact, Priority, Severity};

// ── Vulnerability findings ──────────────────────────────────────────────────

/// One detector finding: a disabled or insecure control on one entity.
/// Serialize-only: kind and description reference the static catalog.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Finding {
    pub kind: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub entity: EntityId,
    pub entity_name: String,
}

// ── Attack scenarios ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Low,
    Medium,
    High,
}

impl Capability {
    pub fn multiplier(self) -> f64 {
        match self {
            Capability::Low => 0.8,
            Capability::Medium => 1.0,
            Capability::High => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionDifficulty {
    Moderate,
    Difficult,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AttackScenario {
    pub id: String,
    pub kind: &'static str,
    pub threat_actor: &'static str,
    pub probability: f64,
    pub severity: Severity,
    pub targets: Vec<EntityId>,
    pub attack_path: Vec<&'static str>,
    pub indicators: Vec<&'static str>,
    pub impact_score: f64,
    pub risk_score: f64,
    pub estimated_duration: &'static str,
    pub detection_difficulty: DetectionDifficulty,
    pub mitigation_effort: Effort,
    pub predicted_at: DateTime<Utc>,
}

// ── Recommendations ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Encryption,
    Authentication,
    Firewall,
    PatchManagement,
    VulnerabilityScanning,
    NetworkIsolation,
    AuditLogging,
    BackupSecurity,
}

impl RecommendationKind {
    pub const ALL: [RecommendationKind; 8] = [
        RecommendationKind::Encryption,
        RecommendationKind::Authentication,
        RecommendationKind::Firewall,
        RecommendationKind::PatchManagement,
        RecommendationKind::VulnerabilityScanning,
        RecommendationKind::NetworkIsolation,
        RecommendationKind::AuditLogging,
        RecommendationKind::BackupSecurity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationKind::Encryption => "encryption",
            RecommendationKind::Authentication => "authentication",
            RecommendationKind::Firewall => "firewall",
            RecommendationKind::PatchManagement => "patch_management",
            RecommendationKind::VulnerabilityScanning => "vulnerability_scanning",
            RecommendationKind::NetworkIsolation => "network_isolation",
            RecommendationKind::AuditLogging => "audit_logging",
            RecommendationKind::BackupSecurity => "backup_security",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTarget {
    Entity(EntityId),
    SystemWide,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    Applied { at: DateTime<Utc> },
    Failed { error: String },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub implementation: String,
    pub priority: Priority,
    pub effort: Effort,
    pub impact: Impact,
    /// priority × impact × effort-reward; higher applies first.
    pub priority_score: u32,
    pub target: RecommendationTarget,
    pub target_name: String,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn is_pending(&self) -> bool {
        self.status == RecommendationStatus::Pending
    }
}

// ── Improvement plan ────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize)]
pub struct Strategy {
    pub name: &'static str,
    pub description: &'static str,
    pub components: Vec<&'static str>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Immediate,
    ShortTerm,
    LongTerm,
}

impl Phase {
    pub fn estimated_duration(self) -> &'static str {
        match self {
            Phase::Immediate => "1-2 weeks",
            Phase::ShortTerm => "2-4 weeks",
            Phase::LongTerm => "1-3 months",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TimelineEntry {
    pub recommendation_id: String,
    pub phase: Phase,
    pub estimated_duration: &'static str,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CurrentState {
    pub security_score: f64,
    pub vulnerability_count: usize,
    pub entity_count: usize,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ExpectedImprovements {
    pub security_score_increase: u32,
    pub vulnerability_reduction: u32,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ImprovementPlan {
    pub current_state: CurrentState,
    pub recommendations: Vec<Recommendation>,
    pub strategies: Vec<Strategy>,
    pub timeline: Vec<TimelineEntry>,
    pub expected_improvements: ExpectedImprovements,
    pub created_at: DateTime<Utc>,
}
