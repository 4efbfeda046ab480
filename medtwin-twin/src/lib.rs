//! # Medtwin Twin — digital-twin entity model and generator
//!
//! Synthesizes and evolves the population of networked healthcare assets
//! that every analysis stage reads.

pub mod entity;
pub mod generator;
mod tests;

pub use entity::{Entity, EntityKind, Population};
pub use generator::{GeneratorConfig, TwinGenerator};
