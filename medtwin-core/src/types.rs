//! Shared ordinal enums and records used across the analysis stages.
//!
//! Every weighted computation in the simulator (threat activity, impact
//! scores, recommendation priorities) is driven by these totally ordered
//! enums rather than by loose strings.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Opaque entity identifier, unique for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight used for severity-weighted event counts.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Operational criticality of an asset. Distinct from [`SecurityLevel`]:
/// a low-criticality asset can still hold highly classified data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Low,
    Medium,
    High,
}

impl Criticality {
    /// Numeric code for the anomaly feature vector.
    pub fn code(self) -> f64 {
        match self {
            Criticality::Low => 1.0,
            Criticality::Medium => 2.0,
            Criticality::High => 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Low,
    Medium,
    High,
    Critical,
}

// ── Recommendation ordinals ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn score(self) -> u32 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Critical => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    /// Cheap fixes outrank costly ones of equal priority and impact.
    pub fn reward(self) -> u32 {
        match self {
            Effort::Low => 3,
            Effort::Medium => 2,
            Effort::High => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn score(self) -> u32 {
        match self {
            Impact::Low => 1,
            Impact::Medium => 2,
            Impact::High => 3,
        }
    }
}

// ── Vulnerabilities and threat indicators ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnStatus {
    Open,
    Mitigated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exploitability {
    Theoretical,
    Hard,
    Medium,
    Easy,
}

/// A vulnerability attached to one entity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Vulnerability {
    pub id: Uuid,
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub cvss_score: f64,
    pub status: VulnStatus,
    pub exploitability: Exploitability,
    pub discovered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ThreatIndicator {
    pub id: Uuid,
    pub kind: String,
    pub confidence: f64,
    pub severity: Severity,
    pub source_ip: String,
    pub description: String,
    pub detected_at: DateTime<Utc>,
}

// ── Simulation metrics ──────────────────────────────────────────────────────

/// Rolling metrics snapshot maintained by the engine and consumed by the
/// recommendation engine's improvement plan.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SimMetrics {
    pub tick: u64,
    pub security_score: f64,
    pub entity_count: usize,
    pub event_count: usize,
    pub vulnerability_count: usize,
    pub attack_count: usize,
}
