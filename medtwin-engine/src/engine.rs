//! # Simulation Engine — owns the population, the event log and the loop
//!
//! One engine instance drives the whole simulation: entity evolution every
//! tick, vulnerability and anomaly scans on the configured cadence, attack
//! prediction and posture scoring feeding the rolling metrics. All state
//! is behind locks so a driver thread and observers can share the engine.

use medtwin_core::config::TwinConfig;
use medtwin_core::events::{EventPayload, SecurityEvent};
use medtwin_core::types::{Priority, SimMetrics};
use medtwin_core::TwinResult;
use medtwin_ml::{Anomaly, AnomalyDetector, AnomalySeverity};
use medtwin_security::types::{AttackScenario, ImprovementPlan, Recommendation};
use medtwin_security::{
    AttackPredictor, ResilienceEnhancer, SecurityEvaluator, VulnerabilityDetector,
};
use medtwin_twin::entity::Population;
use medtwin_twin::{GeneratorConfig, TwinGenerator};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Event log ceiling; the oldest entries fall off once the trailing
/// analysis windows can no longer reach them.
const MAX_EVENTS: usize = 10_000;

pub struct SimulationEngine {
    config: TwinConfig,
    seed: Option<u64>,
    generator: Mutex<TwinGenerator>,
    /// Shared with the background training thread, which installs a
    /// freshly fitted detector under a short write lock.
    anomaly: Arc<RwLock<AnomalyDetector>>,
    training_in_flight: Arc<AtomicBool>,
    detector: VulnerabilityDetector,
    predictor: AttackPredictor,
    evaluator: SecurityEvaluator,
    enhancer: ResilienceEnhancer,
    monitor: crate::monitor::ResourceMonitor,

    entities: RwLock<Population>,
    events: RwLock<Vec<SecurityEvent>>,
    metrics: RwLock<SimMetrics>,
    ticks: AtomicU64,
}

impl SimulationEngine {
    pub fn new(config: TwinConfig) -> Self {
        let generator = TwinGenerator::new(Self::generator_config(&config));
        let anomaly = AnomalyDetector::new(config.models.anomaly_detection.clone());
        Self::build(config, None, generator, anomaly, crate::monitor::ResourceMonitor::new())
    }

    /// Fully deterministic engine for tests and reproducible runs.
    pub fn with_seed(config: TwinConfig, seed: u64) -> Self {
        let generator = TwinGenerator::with_seed(Self::generator_config(&config), seed);
        let anomaly = AnomalyDetector::with_seed(config.models.anomaly_detection.clone(), seed);
        Self::build(
            config,
            Some(seed),
            generator,
            anomaly,
            crate::monitor::ResourceMonitor::with_seed(seed),
        )
    }

    fn build(
        config: TwinConfig,
        seed: Option<u64>,
        generator: TwinGenerator,
        mut anomaly: AnomalyDetector,
        monitor: crate::monitor::ResourceMonitor,
    ) -> Self {
        if let Some(path) = &config.models.anomaly_detection.snapshot_path {
            anomaly.load_snapshot(path);
        }
        Self {
            config,
            seed,
            generator: Mutex::new(generator),
            anomaly: Arc::new(RwLock::new(anomaly)),
            training_in_flight: Arc::new(AtomicBool::new(false)),
            detector: VulnerabilityDetector::new(),
            predictor: AttackPredictor::new(),
            evaluator: SecurityEvaluator::new(),
            enhancer: ResilienceEnhancer::new(),
            monitor,
            entities: RwLock::new(Population::new()),
            events: RwLock::new(Vec::new()),
            metrics: RwLock::new(SimMetrics::default()),
            ticks: AtomicU64::new(0),
        }
    }

    fn generator_config(config: &TwinConfig) -> GeneratorConfig {
        GeneratorConfig {
            vulnerability_injection_rate: config.simulation.vulnerability_injection_rate,
            indicator_injection_rate: config.simulation.indicator_injection_rate,
        }
    }

    // ── Population lifecycle ────────────────────────────────────────────────

    /// Seed the population, clamped to the configured ceiling.
    pub fn initialize(&self, count: usize) -> usize {
        let count = count.min(self.config.simulation.max_entities);
        let batch = self.generator.lock().generate_entities(count);
        let mut entities = self.entities.write();
        for entity in batch {
            entities.insert(entity.id, entity);
        }
        info!(entities = entities.len(), "population initialized");
        entities.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    pub fn population(&self) -> Population {
        self.entities.read().clone()
    }

    pub fn metrics(&self) -> SimMetrics {
        self.metrics.read().clone()
    }

    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.read().clone()
    }

    // ── Simulation loop ─────────────────────────────────────────────────────

    /// Advance the simulation by one tick and return the refreshed metrics.
    pub fn tick(&self) -> TwinResult<SimMetrics> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;

        self.evolve_population();

        let scan_ticks = self.scan_ticks();
        let scan_due = tick == 1 || tick % scan_ticks == 0;

        let (vulnerability_count, anomalies) = if scan_due {
            let vulns = self.run_vulnerability_scan();
            let anomalies = self.run_anomaly_scan();
            (Some(vulns), anomalies)
        } else {
            (None, Vec::new())
        };
        for anomaly in &anomalies {
            if anomaly.severity >= AnomalySeverity::High {
                warn!(
                    entity = %anomaly.entity,
                    name = %anomaly.entity_name,
                    score = anomaly.score,
                    "behavioral anomaly"
                );
            }
        }

        let scenarios = self.predict_attacks();
        if scan_due {
            self.log_high_probability_attacks(&scenarios);
            self.auto_apply_high_priority();
        }

        let entities = self.entities.read();
        let events = self.events.read();
        let security_score = self.evaluator.evaluate_security(&entities, &events);
        let entity_count = entities.len();
        let event_count = events.len();
        drop(events);
        drop(entities);

        self.monitor.sample(entity_count);

        let mut metrics = self.metrics.write();
        metrics.tick = tick;
        metrics.security_score = security_score;
        metrics.entity_count = entity_count;
        metrics.event_count = event_count;
        if let Some(vulns) = vulnerability_count {
            metrics.vulnerability_count = vulns;
        }
        metrics.attack_count = scenarios.len();
        debug!(tick, security_score, entity_count, "tick complete");
        Ok(metrics.clone())
    }

    /// Drive the loop for the configured duration, sleeping between ticks.
    pub fn run(&self) -> TwinResult<()> {
        let interval = self.config.simulation.update_interval_secs.max(1);
        let total_ticks = self.config.simulation.duration_secs / interval;
        info!(total_ticks, interval_secs = interval, "simulation started");
        for _ in 0..total_ticks {
            self.tick()?;
            std::thread::sleep(Duration::from_secs(interval));
        }
        info!("simulation finished");
        Ok(())
    }

    /// Persist the anomaly model if persistence is configured.
    pub fn shutdown(&self) -> TwinResult<()> {
        if let Some(path) = &self.config.models.anomaly_detection.snapshot_path {
            let anomaly = self.anomaly.read();
            if anomaly.is_trained() {
                anomaly.save_snapshot(path)?;
            }
        }
        Ok(())
    }

    fn evolve_population(&self) {
        let mut entities = self.entities.write();
        let mut generator = self.generator.lock();
        for entity in entities.values_mut() {
            generator.update_entity(entity);
        }

        // Top up toward the ceiling one batch at a time.
        let deficit = self.config.simulation.max_entities.saturating_sub(entities.len());
        if deficit > 0 {
            let batch = self.config.simulation.batch_size.min(deficit);
            for entity in generator.generate_entities(batch) {
                entities.insert(entity.id, entity);
            }
        }
    }

    fn scan_ticks(&self) -> u64 {
        let interval = self.config.simulation.update_interval_secs.max(1);
        (self.config.security.vulnerability_scan_interval_secs / interval).max(1)
    }

    // ── Analysis stages ─────────────────────────────────────────────────────

    fn run_vulnerability_scan(&self) -> usize {
        let entities = self.entities.read();
        let findings = self.detector.detect_vulnerabilities(&entities);
        drop(entities);

        let new_events: Vec<SecurityEvent> = findings
            .iter()
            .map(|f| SecurityEvent::vulnerability(f.severity, f.kind, f.entity))
            .collect();
        debug!(findings = findings.len(), "vulnerability scan");
        self.append_events(new_events);
        findings.len()
    }

    /// Score against the trained model, or kick off background training
    /// when none exists yet. Never blocks the tick on a model fit.
    fn run_anomaly_scan(&self) -> Vec<Anomaly> {
        let entities = self.entities.read();
        if entities.is_empty() {
            return Vec::new();
        }
        let anomaly = self.anomaly.read();
        if anomaly.is_trained() {
            return anomaly.try_detect(&entities).unwrap_or_default();
        }
        drop(anomaly);

        let snapshot = entities.clone();
        drop(entities);
        self.dispatch_training(snapshot);
        Vec::new()
    }

    /// Fit a detector on a population snapshot off the tick thread and
    /// swap it into the shared slot. At most one fit runs at a time.
    fn dispatch_training(&self, population: Population) {
        if self.training_in_flight.swap(true, Ordering::SeqCst) {
            return;
        }
        let slot = Arc::clone(&self.anomaly);
        let in_flight = Arc::clone(&self.training_in_flight);
        let model_cfg = self.config.models.anomaly_detection.clone();
        let seed = self.seed;
        std::thread::spawn(move || {
            let mut detector = match seed {
                Some(seed) => AnomalyDetector::with_seed(model_cfg, seed),
                None => AnomalyDetector::new(model_cfg),
            };
            match detector.train(&population) {
                Ok(samples) => {
                    debug!(samples, "background model fit complete");
                    *slot.write() = detector;
                }
                Err(e) => warn!(error = %e, "background model fit failed"),
            }
            in_flight.store(false, Ordering::SeqCst);
        });
    }

    /// High-priority pending recommendations are acted on immediately;
    /// the rest stay advisory for callers to apply.
    fn auto_apply_high_priority(&self) {
        let mut recommendations = self.recommendations();
        let mut applied = 0usize;
        for recommendation in &mut recommendations {
            if recommendation.priority >= Priority::High
                && recommendation.is_pending()
                && self.apply_recommendation(recommendation)
            {
                applied += 1;
            }
        }
        if applied > 0 {
            info!(applied, "auto-applied high-priority recommendations");
        }
    }

    /// Attack scenarios for the current population and event log,
    /// sorted descending by risk.
    pub fn predict_attacks(&self) -> Vec<AttackScenario> {
        let entities = self.entities.read();
        let events = self.events.read();
        self.predictor.predict_attacks(&entities, &events)
    }

    fn log_high_probability_attacks(&self, scenarios: &[AttackScenario]) {
        let threshold = self.config.security.high_probability_threshold;
        let new_events: Vec<SecurityEvent> = scenarios
            .iter()
            .filter(|s| s.probability > threshold)
            .map(|s| SecurityEvent {
                timestamp: chrono::Utc::now(),
                payload: EventPayload::Attack {
                    kind: s.kind.to_string(),
                    probability: s.probability,
                    severity: s.severity,
                },
            })
            .collect();
        self.append_events(new_events);
    }

    fn append_events(&self, new_events: Vec<SecurityEvent>) {
        if new_events.is_empty() {
            return;
        }
        let mut events = self.events.write();
        events.extend(new_events);
        if events.len() > MAX_EVENTS {
            let excess = events.len() - MAX_EVENTS;
            events.drain(..excess);
        }
    }

    // ── Recommendations ─────────────────────────────────────────────────────

    pub fn recommendations(&self) -> Vec<Recommendation> {
        let entities = self.entities.read();
        let events = self.events.read();
        let metrics = self.metrics.read().clone();
        self.enhancer.generate_recommendations(&entities, &events, &metrics)
    }

    /// Apply one recommendation against the live population. Success is
    /// recorded in the event log.
    pub fn apply_recommendation(&self, recommendation: &mut Recommendation) -> bool {
        let applied = {
            let mut entities = self.entities.write();
            self.enhancer.apply_recommendation(recommendation, &mut entities)
        };
        if applied {
            self.append_events(vec![SecurityEvent {
                timestamp: chrono::Utc::now(),
                payload: EventPayload::Recommendation {
                    kind: recommendation.kind.as_str().to_string(),
                    target: recommendation.target_name.clone(),
                },
            }]);
        }
        applied
    }

    pub fn improvement_plan(&self) -> ImprovementPlan {
        let entities = self.entities.read();
        let events = self.events.read();
        let metrics = self.metrics.read().clone();
        self.enhancer.generate_improvement_plan(&entities, &events, &metrics)
    }

    // ── Anomaly model lifecycle ─────────────────────────────────────────────

    /// Synchronously (re)train the anomaly model on the current population.
    pub fn train_anomaly_model(&self) -> TwinResult<usize> {
        let entities = self.entities.read().clone();
        self.anomaly.write().train(&entities)
    }

    /// Score without implicit training; `ModelNotTrained` until a fit has
    /// completed or a snapshot was restored.
    pub fn detect_anomalies(&self) -> TwinResult<Vec<Anomaly>> {
        let entities = self.entities.read();
        self.anomaly.read().try_detect(&entities)
    }
}
