//! # Config — loads and validates `medtwin.toml`
//!
//! Typed sections with defaults: every section derives `Default` and is
//! marked `#[serde(default)]`, so a partial file (or no file at all) still
//! yields a fully populated config.
//!
//! Collaborators that only know key paths (dashboards, external drivers) use
//! [`TwinConfig::lookup`] instead of the typed accessors.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{TwinError, TwinResult};

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwinConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total simulated duration in seconds.
    pub duration_secs: u64,
    /// Seconds between ticks.
    pub update_interval_secs: u64,
    /// Entity population ceiling; the engine tops up in batches below this.
    pub max_entities: usize,
    /// Entities generated per top-up batch.
    pub batch_size: usize,
    /// Per-update chance of injecting a fresh vulnerability into an entity.
    pub vulnerability_injection_rate: f64,
    /// Per-update chance of injecting a fresh threat indicator.
    pub indicator_injection_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_secs: 3600,
            update_interval_secs: 1,
            max_entities: 1000,
            batch_size: 10,
            vulnerability_injection_rate: 0.01,
            indicator_injection_rate: 0.005,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub vulnerability_scan_interval_secs: u64,
    pub threat_detection_sensitivity: f64,
    /// Scenarios above this probability are logged as threat intelligence.
    pub high_probability_threshold: f64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            vulnerability_scan_interval_secs: 300,
            threat_detection_sensitivity: 0.8,
            high_probability_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub anomaly_detection: AnomalyModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyModelConfig {
    /// Number of randomized partition trees in the ensemble.
    pub n_estimators: usize,
    /// Expected fraction of the population treated as anomalous when
    /// calibrating the decision threshold.
    pub contamination: f64,
    /// Subsample size per tree; the full population is used when smaller.
    pub max_samples: usize,
    /// Where the versioned model snapshot lives. `None` disables persistence.
    pub snapshot_path: Option<String>,
}

impl Default for AnomalyModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            contamination: 0.1,
            max_samples: 256,
            snapshot_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

impl TwinConfig {
    /// Load from a TOML file, falling back to defaults when the file is
    /// missing. A present-but-invalid file is an error, not a silent default.
    pub fn load(path: impl AsRef<Path>) -> TwinResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let cfg: TwinConfig =
            toml::from_str(&raw).map_err(|e| TwinError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    /// Flat dotted key-path lookup, e.g.
    /// `lookup("models.anomaly_detection.contamination")`.
    pub fn lookup(&self, key: &str) -> Option<serde_json::Value> {
        let root = serde_json::to_value(self).ok()?;
        let mut cur = root;
        for part in key.split('.') {
            cur = cur.get(part)?.clone();
        }
        Some(cur)
    }

    pub fn lookup_f64(&self, key: &str, default: f64) -> f64 {
        self.lookup(key).and_then(|v| v.as_f64()).unwrap_or(default)
    }

    pub fn lookup_u64(&self, key: &str, default: u64) -> u64 {
        self.lookup(key).and_then(|v| v.as_u64()).unwrap_or(default)
    }

    /// Check the handful of keys external drivers depend on.
    pub fn validate(&self) -> TwinResult<()> {
        if self.simulation.update_interval_secs == 0 {
            return Err(TwinError::Config("simulation.update_interval_secs must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.models.anomaly_detection.contamination) {
            return Err(TwinError::Config("models.anomaly_detection.contamination must be in [0,1]".into()));
        }
        if self.models.anomaly_detection.n_estimators == 0 {
            return Err(TwinError::Config("models.anomaly_detection.n_estimators must be > 0".into()));
        }
        Ok(())
    }
}
