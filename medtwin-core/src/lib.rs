//! # Medtwin Core — shared types for the healthcare digital-twin simulator
//!
//! Ordinal enums, security events, configuration, and the error type that
//! every other medtwin crate links against.

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::TwinConfig;
pub use error::{TwinError, TwinResult};
