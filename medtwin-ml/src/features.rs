//! Projection of an entity onto the fixed-width feature vector the
//! anomaly model trains on.
//!
//! Order matters: a snapshot trained on one layout must score vectors
//! with the same layout, so the projection is a single fixed list.

use medtwin_twin::entity::Entity;

pub const FEATURE_DIM: usize = 20;

/// Telemetry, connectivity, per-control binaries, exposure counts and
/// categorical encodings, in a fixed order.
pub fn feature_vector(entity: &Entity) -> [f64; FEATURE_DIM] {
    let m = &entity.metrics;
    let c = &entity.controls;

    [
        m.cpu_usage,
        m.memory_usage,
        m.network_usage,
        m.disk_usage,
        m.response_time_ms,
        m.error_rate,
        m.uptime,
        entity.connectivity.connections.len() as f64,
        entity.connectivity.total_bandwidth_mbps,
        entity.connectivity.latency_ms,
        bool_feature(c.encryption_enabled),
        bool_feature(c.authentication_required),
        bool_feature(c.firewall_enabled),
        bool_feature(c.intrusion_detection),
        bool_feature(c.audit_logging),
        bool_feature(c.backup_enabled),
        entity.open_vulnerability_count() as f64,
        entity.threat_indicators.len() as f64,
        entity.kind.code(),
        entity.criticality.code(),
    ]
}

fn bool_feature(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}
