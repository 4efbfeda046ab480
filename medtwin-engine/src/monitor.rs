//! Simulated host-resource monitor.
//!
//! The simulator has no real host telemetry to read, so the monitor
//! synthesizes load from population size plus jitter. It exists for its
//! side effect: warning when the simulated host saturates.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

const SATURATION_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ResourceSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

pub struct ResourceMonitor {
    rng: Mutex<StdRng>,
}

impl ResourceMonitor {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Draw a load sample scaled by population size. Warns on saturation.
    pub fn sample(&self, entity_count: usize) -> ResourceSample {
        let mut rng = self.rng.lock();
        let load = (entity_count as f64 / 20.0).min(40.0);
        let sample = ResourceSample {
            cpu_percent: (rng.gen_range(10.0..50.0) + load).min(100.0),
            memory_percent: (rng.gen_range(20.0..45.0) + load).min(100.0),
        };
        drop(rng);

        if sample.cpu_percent >= SATURATION_PERCENT {
            warn!(cpu = sample.cpu_percent, "simulated cpu saturation");
        }
        if sample.memory_percent >= SATURATION_PERCENT {
            warn!(memory = sample.memory_percent, "simulated memory saturation");
        }
        sample
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
