#[cfg(test)]
mod tests {
    use crate::entity::*;
    use crate::generator::*;
    use std::collections::BTreeSet;

    fn seeded(seed: u64) -> TwinGenerator {
        TwinGenerator::with_seed(GeneratorConfig::default(), seed)
    }

    #[test]
    fn generates_exact_count_with_unique_ids() {
        let mut gen = seeded(7);
        for n in [0usize, 1, 25, 100] {
            let entities = gen.generate_entities(n);
            assert_eq!(entities.len(), n);
            let ids: BTreeSet<_> = entities.iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), n);
        }
    }

    #[test]
    fn all_kinds_are_valid_and_distribution_spreads() {
        let mut gen = seeded(11);
        let entities = gen.generate_entities(200);
        let kinds: BTreeSet<_> = entities.iter().map(|e| e.kind).collect();
        assert!(kinds.len() > 1, "200 draws should hit more than one kind");
        for entity in &entities {
            assert!(EntityKind::ALL.contains(&entity.kind));
            assert_eq!(entity.spec.kind(), entity.kind);
        }
    }

    #[test]
    fn generated_fields_respect_bounds() {
        let mut gen = seeded(3);
        for entity in gen.generate_entities(50) {
            let m = &entity.metrics;
            assert!((0.0..=100.0).contains(&m.cpu_usage));
            assert!((0.0..=100.0).contains(&m.memory_usage));
            assert!((0.0..=100.0).contains(&m.disk_usage));
            assert!((0.0..=1.0).contains(&m.uptime));
            assert!((0.0..=1.0).contains(&m.error_rate));
            assert!(m.response_time_ms >= 0.0);
            assert!(!entity.connectivity.connections.is_empty());
            assert!(entity.connectivity.connections.len() <= 5);
            let total: f64 = entity
                .connectivity
                .connections
                .iter()
                .map(|c| c.bandwidth_mbps)
                .sum();
            assert!((entity.connectivity.total_bandwidth_mbps - total).abs() < 1e-9);
        }
    }

    #[test]
    fn same_seed_replays_same_population() {
        let a = seeded(42).generate_entities(20);
        let b = seeded(42).generate_entities(20);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.name, y.name);
            assert_eq!(x.criticality, y.criticality);
            assert_eq!(x.metrics.cpu_usage, y.metrics.cpu_usage);
            assert_eq!(
                x.connectivity.connections.len(),
                y.connectivity.connections.len()
            );
        }
    }

    #[test]
    fn update_jitters_within_bounds() {
        let mut gen = seeded(5);
        let mut entity = gen.generate_entities(1).remove(0);
        let before = entity.metrics.clone();
        gen.update_entity(&mut entity);
        let after = &entity.metrics;

        // ±10% multiplicative jitter, then semantic clamps.
        assert!(after.cpu_usage <= (before.cpu_usage * 1.1).min(100.0) + 1e-9);
        assert!(after.cpu_usage >= before.cpu_usage * 0.9 - 1e-9);
        assert!((0.0..=1.0).contains(&after.uptime));
        assert!(after.response_time_ms >= 0.0);
        assert!(entity.last_updated >= entity.created_at);

        let total: f64 = entity
            .connectivity
            .connections
            .iter()
            .map(|c| c.bandwidth_mbps)
            .sum();
        assert!((entity.connectivity.total_bandwidth_mbps - total).abs() < 1e-9);
    }

    #[test]
    fn injection_rates_are_honored_at_extremes() {
        let always = GeneratorConfig {
            vulnerability_injection_rate: 1.0,
            indicator_injection_rate: 1.0,
        };
        let mut gen = TwinGenerator::with_seed(always, 9);
        let mut entity = gen.generate_entities(1).remove(0);
        gen.update_entity(&mut entity);
        assert_eq!(entity.vulnerabilities.len(), 1);
        assert_eq!(entity.threat_indicators.len(), 1);

        let never = GeneratorConfig {
            vulnerability_injection_rate: 0.0,
            indicator_injection_rate: 0.0,
        };
        let mut gen = TwinGenerator::with_seed(never, 9);
        let mut entity = gen.generate_entities(1).remove(0);
        for _ in 0..100 {
            gen.update_entity(&mut entity);
        }
        assert!(entity.vulnerabilities.is_empty());
        assert!(entity.threat_indicators.is_empty());
    }

    #[test]
    fn injected_vulnerability_comes_from_kind_pool() {
        let always = GeneratorConfig {
            vulnerability_injection_rate: 1.0,
            indicator_injection_rate: 0.0,
        };
        let mut gen = TwinGenerator::with_seed(always, 21);
        let mut entity = gen.generate_entities(1).remove(0);
        gen.update_entity(&mut entity);
        let vuln = &entity.vulnerabilities[0];
        assert!((1.0..=10.0).contains(&vuln.cvss_score));
        assert_eq!(vuln.status, medtwin_core::types::VulnStatus::Open);
    }
}
