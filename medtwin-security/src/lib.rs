//! # Medtwin Security — the four analysis stages over the entity population
//!
//! - vulnerability detection (pure scan of security controls)
//! - attack-scenario prediction (catalog-driven, landscape-adjusted)
//! - composite security scoring (six weighted domains)
//! - resilience recommendations (derive, prioritize, apply)

pub mod attack_predictor;
pub mod resilience_enhancer;
pub mod security_evaluator;
pub mod types;
pub mod vulnerability_detector;
mod tests;

pub use attack_predictor::AttackPredictor;
pub use resilience_enhancer::ResilienceEnhancer;
pub use security_evaluator::SecurityEvaluator;
pub use vulnerability_detector::VulnerabilityDetector;
