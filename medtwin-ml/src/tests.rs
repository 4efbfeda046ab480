#[cfg(test)]
mod tests {
    use crate::features::{feature_vector, FEATURE_DIM};
    use crate::{AnomalyDetector, AnomalySeverity, IsolationForest, StandardScaler};
    use medtwin_core::config::AnomalyModelConfig;
    use medtwin_core::TwinError;
    use medtwin_twin::entity::{Population, SecurityControls};
    use medtwin_twin::{GeneratorConfig, TwinGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn population(count: usize, seed: u64) -> Population {
        let mut gen = TwinGenerator::with_seed(GeneratorConfig::default(), seed);
        gen.generate_entities(count).into_iter().map(|e| (e.id, e)).collect()
    }

    fn small_model() -> AnomalyModelConfig {
        AnomalyModelConfig { n_estimators: 25, max_samples: 64, ..Default::default() }
    }

    // ── Features and scaler ─────────────────────────────────────────────────

    #[test]
    fn feature_vector_has_fixed_width() {
        let entities = population(3, 1);
        for entity in entities.values() {
            assert_eq!(feature_vector(entity).len(), FEATURE_DIM);
        }
    }

    #[test]
    fn each_control_flag_owns_one_slot() {
        let mut entity = population(1, 1).into_values().next().unwrap();
        entity.controls = SecurityControls::disabled();
        let off = feature_vector(&entity);
        entity.controls.audit_logging = true;
        entity.controls.backup_enabled = true;
        let on = feature_vector(&entity);

        // Six binary control indicators at slots 10..16, one per control.
        for slot in 10..16 {
            assert_eq!(off[slot], 0.0);
        }
        assert_eq!(on[14], 1.0);
        assert_eq!(on[15], 1.0);
        for slot in (0..FEATURE_DIM).filter(|s| *s != 14 && *s != 15) {
            assert_eq!(off[slot], on[slot]);
        }
    }

    #[test]
    fn scaler_centers_and_scales() {
        let samples = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];
        let scaler = StandardScaler::fit(&samples);
        assert_eq!(scaler.dim(), 2);

        let transformed = scaler.transform(&[3.0, 10.0]);
        assert!(transformed[0].abs() < 1e-12);
        // Constant column: std falls back to 1, so centering is exact.
        assert!(transformed[1].abs() < 1e-12);

        let spread = scaler.transform(&[5.0, 10.0]);
        assert!(spread[0] > 0.0);
    }

    // ── Forest ──────────────────────────────────────────────────────────────

    #[test]
    fn identical_samples_are_never_anomalous() {
        let samples = vec![vec![0.0; 4]; 50];
        let mut rng = StdRng::seed_from_u64(3);
        let forest = IsolationForest::fit(&samples, 20, 64, 0.1, &mut rng);

        for sample in &samples {
            assert_eq!(forest.score(sample), 0.5);
            assert!(!forest.is_anomalous(sample));
        }
    }

    #[test]
    fn outlier_scores_above_the_cluster() {
        // Tight cluster around the origin plus one far point.
        let mut rng = StdRng::seed_from_u64(5);
        let mut samples: Vec<Vec<f64>> = (0..100)
            .map(|i| vec![(i % 10) as f64 * 0.01, (i % 7) as f64 * 0.01])
            .collect();
        samples.push(vec![50.0, 50.0]);

        let forest = IsolationForest::fit(&samples, 50, 128, 0.05, &mut rng);
        let outlier = forest.score(&[50.0, 50.0]);
        let inlier = forest.score(&[0.02, 0.02]);
        assert!(outlier > inlier);
        assert!(forest.is_anomalous(&[50.0, 50.0]));
    }

    #[test]
    fn same_seed_same_forest() {
        let samples: Vec<Vec<f64>> =
            (0..60).map(|i| vec![i as f64, (i * i % 13) as f64]).collect();
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let fa = IsolationForest::fit(&samples, 15, 32, 0.1, &mut a);
        let fb = IsolationForest::fit(&samples, 15, 32, 0.1, &mut b);

        assert_eq!(fa.threshold(), fb.threshold());
        for sample in &samples {
            assert_eq!(fa.score(sample), fb.score(sample));
        }
    }

    // ── Detector lifecycle ──────────────────────────────────────────────────

    #[test]
    fn try_detect_requires_training() {
        let detector = AnomalyDetector::with_seed(small_model(), 1);
        let entities = population(10, 1);
        assert!(matches!(
            detector.try_detect(&entities),
            Err(TwinError::ModelNotTrained)
        ));
    }

    #[test]
    fn detect_trains_lazily() {
        let mut detector = AnomalyDetector::with_seed(small_model(), 2);
        let entities = population(40, 2);
        assert!(!detector.is_trained());

        let anomalies = detector.detect_anomalies(&entities).unwrap();
        assert!(detector.is_trained());
        // Threshold calibration caps the flagged share near contamination.
        assert!(anomalies.len() <= entities.len() / 2);
        for a in &anomalies {
            assert!(a.score > 0.0 && a.score <= 1.0);
            assert!(entities.contains_key(&a.entity));
        }
    }

    #[test]
    fn empty_population_cannot_train() {
        let mut detector = AnomalyDetector::with_seed(small_model(), 3);
        assert!(matches!(
            detector.train(&Population::new()),
            Err(TwinError::ModelNotTrained)
        ));
    }

    #[test]
    fn severity_buckets_by_score() {
        let mut detector = AnomalyDetector::with_seed(small_model(), 4);
        let mut entities = population(60, 4);
        detector.train(&entities).unwrap();

        // Saturate one entity's telemetry far outside anything generated.
        let extreme = entities.values_mut().next().unwrap();
        extreme.metrics.cpu_usage = 100.0;
        extreme.metrics.memory_usage = 100.0;
        extreme.metrics.network_usage = 100.0;
        extreme.metrics.disk_usage = 100.0;
        extreme.metrics.response_time_ms = 10_000.0;
        extreme.metrics.uptime = 0.0;
        extreme.metrics.error_rate = 1.0;
        extreme.connectivity.latency_ms = 5_000.0;
        extreme.connectivity.total_bandwidth_mbps = 100_000.0;
        let extreme_id = extreme.id;

        let anomalies = detector.try_detect(&entities).unwrap();
        let flagged = anomalies.iter().find(|a| a.entity == extreme_id).unwrap();
        assert!(flagged.score > 0.6);
        assert!(flagged.severity >= AnomalySeverity::Medium);
        assert!(flagged.description.contains("cpu saturation"));
        assert!(flagged.description.contains("elevated error rate"));
    }

    #[test]
    fn saturated_extreme_in_uniform_population_is_critical() {
        // Twenty identical entities plus one with saturated telemetry: the
        // outlier isolates on the first split of every tree.
        let template = population(1, 10).into_values().next().unwrap();
        let mut entities = Population::new();
        for _ in 0..20 {
            let mut clone = template.clone();
            clone.id = medtwin_core::types::EntityId::random();
            entities.insert(clone.id, clone);
        }
        let mut extreme = template.clone();
        extreme.id = medtwin_core::types::EntityId::random();
        extreme.metrics.cpu_usage = 100.0;
        extreme.metrics.error_rate = 1.0;
        let extreme_id = extreme.id;
        entities.insert(extreme_id, extreme);

        let mut detector = AnomalyDetector::with_seed(small_model(), 10);
        let anomalies = detector.detect_anomalies(&entities).unwrap();

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].entity, extreme_id);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Critical);
    }

    // ── Snapshots ───────────────────────────────────────────────────────────

    #[test]
    fn snapshot_round_trip_preserves_scores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anomaly_model.json");
        let entities = population(40, 6);

        let mut trained = AnomalyDetector::with_seed(small_model(), 6);
        trained.train(&entities).unwrap();
        trained.save_snapshot(&path).unwrap();
        let before = trained.try_detect(&entities).unwrap();

        let mut restored = AnomalyDetector::with_seed(small_model(), 99);
        assert!(restored.load_snapshot(&path));
        let after = restored.try_detect(&entities).unwrap();

        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.entity, b.entity);
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn corrupt_snapshot_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anomaly_model.json");
        std::fs::write(&path, "not json").unwrap();

        let mut detector = AnomalyDetector::with_seed(small_model(), 7);
        assert!(!detector.load_snapshot(&path));
        assert!(!detector.is_trained());
    }

    #[test]
    fn mismatched_snapshot_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anomaly_model.json");
        let entities = population(30, 8);

        let mut trained = AnomalyDetector::with_seed(small_model(), 8);
        trained.train(&entities).unwrap();
        trained.save_snapshot(&path).unwrap();

        let other_cfg = AnomalyModelConfig { n_estimators: 7, ..small_model() };
        let mut detector = AnomalyDetector::with_seed(other_cfg, 8);
        assert!(!detector.load_snapshot(&path));
        assert!(!detector.is_trained());
    }

    #[test]
    fn saving_untrained_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let detector = AnomalyDetector::with_seed(small_model(), 9);
        assert!(detector.save_snapshot(dir.path().join("m.json")).is_err());
    }
}
