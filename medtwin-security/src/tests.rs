#[cfg(test)]
mod tests {
    use crate::types::{RecommendationKind, RecommendationStatus, RecommendationTarget};
    use crate::{AttackPredictor, ResilienceEnhancer, SecurityEvaluator, VulnerabilityDetector};
    use medtwin_core::events::SecurityEvent;
    use medtwin_core::types::{Criticality, EntityId, Severity, SimMetrics};
    use medtwin_twin::entity::{Population, SecurityControls};
    use medtwin_twin::{GeneratorConfig, TwinGenerator};

    fn population(count: usize, seed: u64) -> Population {
        let mut gen = TwinGenerator::with_seed(GeneratorConfig::default(), seed);
        gen.generate_entities(count).into_iter().map(|e| (e.id, e)).collect()
    }

    fn uniform_controls(count: usize, seed: u64, controls: SecurityControls) -> Population {
        let mut entities = population(count, seed);
        for entity in entities.values_mut() {
            entity.controls = controls.clone();
        }
        entities
    }

    // ── Vulnerability detector ──────────────────────────────────────────────

    #[test]
    fn disabled_controls_yield_all_findings() {
        let mut entities = uniform_controls(1, 7, SecurityControls::disabled());
        let entity = entities.values_mut().next().unwrap();
        entity.criticality = Criticality::High;

        let findings = VulnerabilityDetector::new().detect_vulnerabilities(&entities);
        assert_eq!(findings.len(), 10);

        let kinds: Vec<_> = findings.iter().map(|f| f.kind).collect();
        assert!(kinds.contains(&"encryption_disabled"));
        assert!(kinds.contains(&"no_network_isolation"));
        let high = findings.iter().filter(|f| f.severity == Severity::High).count();
        assert_eq!(high, 4);
    }

    #[test]
    fn hardened_controls_yield_no_findings() {
        let entities = uniform_controls(5, 7, SecurityControls::hardened());
        let findings = VulnerabilityDetector::new().detect_vulnerabilities(&entities);
        assert!(findings.is_empty());
    }

    #[test]
    fn isolation_only_flagged_on_high_criticality() {
        let mut entities = uniform_controls(1, 11, SecurityControls::hardened());
        let entity = entities.values_mut().next().unwrap();
        entity.criticality = Criticality::Low;
        entity.controls.network_isolation = false;

        let findings = VulnerabilityDetector::new().detect_vulnerabilities(&entities);
        assert!(findings.is_empty());
    }

    // ── Attack predictor ────────────────────────────────────────────────────

    #[test]
    fn scenario_scores_stay_bounded() {
        let entities = uniform_controls(30, 3, SecurityControls::disabled());
        let scenarios = AttackPredictor::new().predict_attacks(&entities, &[]);
        assert!(!scenarios.is_empty());
        for s in &scenarios {
            assert!(s.probability > 0.0 && s.probability <= 1.0);
            assert!(s.impact_score <= 1.0);
            assert!((s.risk_score - s.probability * s.impact_score).abs() < 1e-12);
            assert!(s.targets.len() <= 5);
        }
    }

    #[test]
    fn scenarios_sorted_by_risk_descending() {
        let entities = population(40, 9);
        let scenarios = AttackPredictor::new().predict_attacks(&entities, &[]);
        for pair in scenarios.windows(2) {
            assert!(pair[0].risk_score >= pair[1].risk_score);
        }
    }

    #[test]
    fn ideological_actors_find_no_matching_attack() {
        let entities = population(20, 5);
        let scenarios = AttackPredictor::new().predict_attacks(&entities, &[]);
        assert!(scenarios.iter().all(|s| s.threat_actor != "hacktivists"));
    }

    #[test]
    fn recent_critical_events_raise_probability() {
        let entities = uniform_controls(10, 13, SecurityControls::hardened());
        let predictor = AttackPredictor::new();

        let quiet = predictor.predict_attacks(&entities, &[]);
        let noisy_events: Vec<_> = (0..5)
            .map(|_| {
                SecurityEvent::vulnerability(Severity::Critical, "encryption", EntityId::random())
            })
            .collect();
        let noisy = predictor.predict_attacks(&entities, &noisy_events);

        let max_quiet = quiet.iter().map(|s| s.probability).fold(0.0, f64::max);
        let max_noisy = noisy.iter().map(|s| s.probability).fold(0.0, f64::max);
        assert!(max_noisy > max_quiet);
    }

    // ── Security evaluator ──────────────────────────────────────────────────

    #[test]
    fn empty_population_scores_zero() {
        let score = SecurityEvaluator::new().evaluate_security(&Population::new(), &[]);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn score_stays_in_range() {
        let evaluator = SecurityEvaluator::new();
        for seed in [1, 2, 3] {
            let entities = population(25, seed);
            let score = evaluator.evaluate_security(&entities, &[]);
            assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn hardened_population_outscores_disabled() {
        let evaluator = SecurityEvaluator::new();
        let hardened = uniform_controls(20, 17, SecurityControls::hardened());
        let disabled = uniform_controls(20, 17, SecurityControls::disabled());
        let high = evaluator.evaluate_security(&hardened, &[]);
        let low = evaluator.evaluate_security(&disabled, &[]);
        assert!(high > low);
    }

    #[test]
    fn recent_critical_events_lower_score() {
        let evaluator = SecurityEvaluator::new();
        let entities = uniform_controls(20, 19, SecurityControls::hardened());
        let baseline = evaluator.evaluate_security(&entities, &[]);

        let events: Vec<_> = (0..3)
            .map(|_| {
                SecurityEvent::vulnerability(Severity::Critical, "encryption", EntityId::random())
            })
            .collect();
        let adjusted = evaluator.evaluate_security(&entities, &events);
        // 3 critical events within 7 days subtract 15, minus the small
        // detection-capability bonus they add back.
        assert!(adjusted < baseline);
    }

    // ── Resilience enhancer ─────────────────────────────────────────────────

    #[test]
    fn disabled_entity_gets_full_recommendation_set() {
        let mut entities = uniform_controls(1, 23, SecurityControls::disabled());
        entities.values_mut().next().unwrap().criticality = Criticality::High;

        let recs = ResilienceEnhancer::new().generate_recommendations(
            &entities,
            &[],
            &SimMetrics::default(),
        );
        assert!(recs.len() >= 8);

        for pair in recs.windows(2) {
            assert!(pair[0].priority_score >= pair[1].priority_score);
        }
        let kinds: Vec<_> = recs
            .iter()
            .filter(|r| matches!(r.target, RecommendationTarget::SystemWide))
            .map(|r| r.kind)
            .collect();
        let mut deduped = kinds.clone();
        deduped.dedup();
        deduped.sort();
        deduped.dedup();
        assert_eq!(kinds.len(), deduped.len(), "system-wide kinds must be unique");
    }

    #[test]
    fn hardened_population_needs_nothing() {
        let entities = uniform_controls(10, 29, SecurityControls::hardened());
        let recs = ResilienceEnhancer::new().generate_recommendations(
            &entities,
            &[],
            &SimMetrics::default(),
        );
        assert!(recs.is_empty());
    }

    #[test]
    fn applying_encryption_enables_the_control() {
        let mut entities = uniform_controls(1, 31, SecurityControls::disabled());
        let enhancer = ResilienceEnhancer::new();
        let mut recs =
            enhancer.generate_recommendations(&entities, &[], &SimMetrics::default());
        let rec = recs
            .iter_mut()
            .find(|r| {
                r.kind == RecommendationKind::Encryption
                    && matches!(r.target, RecommendationTarget::Entity(_))
            })
            .unwrap();

        assert!(enhancer.apply_recommendation(rec, &mut entities));
        assert!(matches!(rec.status, RecommendationStatus::Applied { .. }));
        assert!(entities.values().next().unwrap().controls.encryption_enabled);
    }

    #[test]
    fn applying_to_missing_entity_fails_without_panic() {
        let mut entities = uniform_controls(1, 37, SecurityControls::disabled());
        let enhancer = ResilienceEnhancer::new();
        let mut recs =
            enhancer.generate_recommendations(&entities, &[], &SimMetrics::default());
        entities.clear();

        let rec = recs
            .iter_mut()
            .find(|r| matches!(r.target, RecommendationTarget::Entity(_)))
            .unwrap();
        assert!(!enhancer.apply_recommendation(rec, &mut entities));
        assert!(matches!(rec.status, RecommendationStatus::Failed { .. }));
    }

    #[test]
    fn system_wide_apply_reaches_every_entity() {
        let mut entities = uniform_controls(8, 41, SecurityControls::disabled());
        let enhancer = ResilienceEnhancer::new();
        let mut recs =
            enhancer.generate_recommendations(&entities, &[], &SimMetrics::default());
        let rec = recs
            .iter_mut()
            .find(|r| {
                r.kind == RecommendationKind::Firewall
                    && matches!(r.target, RecommendationTarget::SystemWide)
            })
            .unwrap();

        assert!(enhancer.apply_recommendation(rec, &mut entities));
        assert!(entities.values().all(|e| e.controls.firewall_enabled));
    }

    #[test]
    fn improvement_plan_selects_matching_strategies() {
        let entities = uniform_controls(10, 43, SecurityControls::disabled());
        let plan = ResilienceEnhancer::new().generate_improvement_plan(
            &entities,
            &[],
            &SimMetrics { security_score: 20.0, ..Default::default() },
        );

        let names: Vec<_> = plan.strategies.iter().map(|s| s.name).collect();
        assert!(names.contains(&"zero_trust"));
        assert!(names.contains(&"security_automation"));
        assert!(plan.expected_improvements.security_score_increase <= 50);
        assert!(plan.expected_improvements.vulnerability_reduction <= 20);
        assert_eq!(plan.timeline.len(), plan.recommendations.len());
        assert_eq!(plan.current_state.security_score, 20.0);
    }

    #[test]
    fn applying_recommendations_never_lowers_the_score() {
        let mut entities = uniform_controls(15, 47, SecurityControls::disabled());
        let evaluator = SecurityEvaluator::new();
        let enhancer = ResilienceEnhancer::new();

        let before = evaluator.evaluate_security(&entities, &[]);
        let mut recs =
            enhancer.generate_recommendations(&entities, &[], &SimMetrics::default());
        for rec in recs.iter_mut().take(5) {
            enhancer.apply_recommendation(rec, &mut entities);
        }
        let after = evaluator.evaluate_security(&entities, &[]);
        assert!(after >= before);
    }
}
