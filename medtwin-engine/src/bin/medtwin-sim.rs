//! Simulation driver: loads `medtwin.toml`, seeds the population and runs
//! the loop for the configured duration, logging metrics as it goes.

use medtwin_core::TwinConfig;
use medtwin_engine::SimulationEngine;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "medtwin.toml".to_string());

    let config = match TwinConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };
    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }

    let engine = SimulationEngine::new(config.clone());
    let seeded = engine.initialize(config.simulation.max_entities.min(100));
    info!(entities = seeded, "starting simulation");

    if let Err(e) = engine.run() {
        error!(error = %e, "simulation aborted");
        std::process::exit(1);
    }

    let metrics = engine.metrics();
    info!(
        tick = metrics.tick,
        security_score = metrics.security_score,
        entities = metrics.entity_count,
        events = metrics.event_count,
        "final metrics"
    );
    if let Err(e) = engine.shutdown() {
        error!(error = %e, "failed to persist model snapshot");
    }
}
