//! # Medtwin Engine — the simulation loop tying every stage together
//!
//! Owns the entity population, the security event log and the rolling
//! metrics. Each tick evolves entity telemetry, runs the analysis stages
//! on their configured cadence, and feeds results back into the log the
//! trailing-window computations read.

pub mod engine;
pub mod monitor;
mod tests;

pub use engine::SimulationEngine;
pub use monitor::{ResourceMonitor, ResourceSample};
