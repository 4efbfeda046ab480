//! Security event log entries shared by the predictor and evaluator.
//!
//! The engine appends an event for every vulnerability finding and every
//! high-probability attack scenario; the trailing-window computations in
//! the predictor and evaluator read this log without mutating it.

use crate::types::{EntityId, Severity};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityEvent {
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    Vulnerability {
        severity: Severity,
        control: String,
        entity: EntityId,
    },
    Attack {
        kind: String,
        probability: f64,
        severity: Severity,
    },
    Recommendation {
        kind: String,
        target: String,
    },
}

impl SecurityEvent {
    pub fn vulnerability(severity: Severity, control: impl Into<String>, entity: EntityId) -> Self {
        Self {
            timestamp: Utc::now(),
            payload: EventPayload::Vulnerability { severity, control: control.into(), entity },
        }
    }

    pub fn is_vulnerability(&self) -> bool {
        matches!(self.payload, EventPayload::Vulnerability { .. })
    }

    pub fn is_attack(&self) -> bool {
        matches!(self.payload, EventPayload::Attack { .. })
    }

    /// Severity for vulnerability events; attack and recommendation events
    /// do not participate in severity-weighted windows.
    pub fn vulnerability_severity(&self) -> Option<Severity> {
        match self.payload {
            EventPayload::Vulnerability { severity, .. } => Some(severity),
            _ => None,
        }
    }

    /// Age in whole days relative to `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_days()
    }
}
