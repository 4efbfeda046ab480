//! # Anomaly Detector — lifecycle, scoring and snapshot persistence
//!
//! Wraps the forest and scaler behind a train/detect lifecycle. The
//! first `detect_anomalies` call trains on the current population when no
//! model exists yet; `try_detect` never trains and reports
//! `ModelNotTrained` instead. Trained models can be saved to and restored
//! from a versioned JSON snapshot.

use chrono::{DateTime, Utc};
use medtwin_core::config::AnomalyModelConfig;
use medtwin_core::types::EntityId;
use medtwin_core::{TwinError, TwinResult};
use medtwin_twin::entity::{Entity, Population};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::features::{feature_vector, FEATURE_DIM};
use crate::forest::IsolationForest;
use crate::scaler::StandardScaler;

const SNAPSHOT_VERSION: u32 = 2;

// ── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnomalySeverity {
    /// Bucket an isolation measure. Callers only see measures above the
    /// calibrated threshold, so Low is the floor, not a verdict of normal.
    fn from_score(score: f64) -> Self {
        if score > 0.8 {
            AnomalySeverity::Critical
        } else if score > 0.6 {
            AnomalySeverity::High
        } else if score > 0.4 {
            AnomalySeverity::Medium
        } else {
            AnomalySeverity::Low
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Anomaly {
    pub entity: EntityId,
    pub entity_name: String,
    /// Isolation measure in (0, 1]; strictly above the model threshold.
    pub score: f64,
    pub severity: AnomalySeverity,
    pub description: String,
    pub detected_at: DateTime<Utc>,
}

/// Human-readable cause, composed from the heuristic checks that fired.
/// Falls back to a generic statistical message when nothing obvious did.
fn describe(entity: &Entity, score: f64) -> String {
    let mut causes: Vec<&str> = Vec::new();
    if entity.metrics.cpu_usage > 90.0 {
        causes.push("cpu saturation");
    }
    if entity.metrics.memory_usage > 95.0 {
        causes.push("memory saturation");
    }
    if entity.metrics.error_rate > 0.1 {
        causes.push("elevated error rate");
    }
    if !entity.controls.encryption_enabled {
        causes.push("encryption disabled");
    }
    if !entity.controls.authentication_required {
        causes.push("authentication not required");
    }
    if entity.connectivity.connections.len() > 10 {
        causes.push("unusually many connections");
    }
    if causes.is_empty() {
        format!("statistical anomaly, score={score:.3}")
    } else {
        causes.join(", ")
    }
}

// ── Persistence ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ModelSnapshot {
    version: u32,
    feature_dim: usize,
    n_estimators: usize,
    max_samples: usize,
    contamination: f64,
    trained_at: DateTime<Utc>,
    scaler: StandardScaler,
    forest: IsolationForest,
}

// ── Detector ────────────────────────────────────────────────────────────────

enum DetectorState {
    Untrained,
    Trained { forest: IsolationForest, scaler: StandardScaler, trained_at: DateTime<Utc> },
}

pub struct AnomalyDetector {
    cfg: AnomalyModelConfig,
    rng: StdRng,
    state: DetectorState,
}

impl AnomalyDetector {
    pub fn new(cfg: AnomalyModelConfig) -> Self {
        Self { cfg, rng: StdRng::from_entropy(), state: DetectorState::Untrained }
    }

    pub fn with_seed(cfg: AnomalyModelConfig, seed: u64) -> Self {
        Self { cfg, rng: StdRng::seed_from_u64(seed), state: DetectorState::Untrained }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, DetectorState::Trained { .. })
    }

    /// Fit scaler and forest on the current population. Returns the number
    /// of training samples; an empty population leaves the model untrained.
    pub fn train(&mut self, entities: &Population) -> TwinResult<usize> {
        if entities.is_empty() {
            return Err(TwinError::ModelNotTrained);
        }
        let raw: Vec<Vec<f64>> =
            entities.values().map(|e| feature_vector(e).to_vec()).collect();
        let scaler = StandardScaler::fit(&raw);
        let standardized: Vec<Vec<f64>> = raw.iter().map(|s| scaler.transform(s)).collect();

        let forest = IsolationForest::fit(
            &standardized,
            self.cfg.n_estimators,
            self.cfg.max_samples,
            self.cfg.contamination,
            &mut self.rng,
        );
        info!(
            samples = raw.len(),
            trees = forest.tree_count(),
            threshold = forest.threshold(),
            "anomaly model trained"
        );
        self.state = DetectorState::Trained { forest, scaler, trained_at: Utc::now() };
        Ok(raw.len())
    }

    /// Score the population, training first if no model exists yet.
    pub fn detect_anomalies(&mut self, entities: &Population) -> TwinResult<Vec<Anomaly>> {
        if !self.is_trained() {
            debug!("no trained model; fitting on current population");
            self.train(entities)?;
        }
        self.try_detect(entities)
    }

    /// Score the population against the existing model only. Fails with
    /// `ModelNotTrained` rather than fitting implicitly.
    pub fn try_detect(&self, entities: &Population) -> TwinResult<Vec<Anomaly>> {
        let DetectorState::Trained { forest, scaler, .. } = &self.state else {
            return Err(TwinError::ModelNotTrained);
        };

        let mut anomalies = Vec::new();
        for entity in entities.values() {
            let sample = scaler.transform(&feature_vector(entity));
            let score = forest.score(&sample);
            if score > forest.threshold() {
                anomalies.push(self.build_anomaly(entity, score));
            }
        }
        debug!(scored = entities.len(), flagged = anomalies.len(), "anomaly scan");
        Ok(anomalies)
    }

    fn build_anomaly(&self, entity: &Entity, score: f64) -> Anomaly {
        Anomaly {
            entity: entity.id,
            entity_name: entity.name.clone(),
            score,
            severity: AnomalySeverity::from_score(score),
            description: describe(entity, score),
            detected_at: Utc::now(),
        }
    }

    // ── Snapshots ───────────────────────────────────────────────────────────

    /// Persist the trained model as a versioned JSON snapshot.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> TwinResult<()> {
        let DetectorState::Trained { forest, scaler, trained_at } = &self.state else {
            return Err(TwinError::ModelNotTrained);
        };
        let snapshot = ModelSnapshot {
            version: SNAPSHOT_VERSION,
            feature_dim: FEATURE_DIM,
            n_estimators: self.cfg.n_estimators,
            max_samples: self.cfg.max_samples,
            contamination: self.cfg.contamination,
            trained_at: *trained_at,
            scaler: scaler.clone(),
            forest: forest.clone(),
        };
        let json = serde_json::to_string(&snapshot)
            .map_err(|e| TwinError::Persistence(e.to_string()))?;
        std::fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "model snapshot written");
        Ok(())
    }

    /// Restore a snapshot if one exists and is compatible with the current
    /// configuration. An unreadable, corrupt or mismatched snapshot is
    /// logged and discarded; the detector stays untrained.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no model snapshot restored");
                return false;
            }
        };
        let snapshot: ModelSnapshot = match serde_json::from_str(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt model snapshot discarded");
                return false;
            }
        };
        if snapshot.version != SNAPSHOT_VERSION
            || snapshot.feature_dim != FEATURE_DIM
            || snapshot.n_estimators != self.cfg.n_estimators
            || snapshot.max_samples != self.cfg.max_samples
            || snapshot.contamination != self.cfg.contamination
        {
            warn!(path = %path.display(), version = snapshot.version, "incompatible model snapshot discarded");
            return false;
        }

        info!(path = %path.display(), trained_at = %snapshot.trained_at, "model snapshot restored");
        self.state = DetectorState::Trained {
            forest: snapshot.forest,
            scaler: snapshot.scaler,
            trained_at: snapshot.trained_at,
        };
        true
    }
}
