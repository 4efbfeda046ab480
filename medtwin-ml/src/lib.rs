//! # Medtwin ML — behavioral anomaly detection over entity telemetry
//!
//! A from-scratch isolation-forest ensemble with feature standardization.
//! Entities are projected to fixed-width feature vectors, standardized,
//! and scored by mean isolation depth; the decision threshold is
//! calibrated from the training distribution at fit time.

pub mod anomaly_detector;
pub mod features;
pub mod forest;
pub mod scaler;
mod tests;

pub use anomaly_detector::{Anomaly, AnomalyDetector, AnomalySeverity};
pub use forest::IsolationForest;
pub use scaler::StandardScaler;
