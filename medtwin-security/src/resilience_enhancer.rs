//! # Resilience Enhancer — remediation recommendations and their application
//!
//! A fixed template catalog (one per security control) drives three passes:
//! per-entity gaps, system-wide coverage gaps, and a compliance-triggered
//! bundle. Recommendations are ranked by priority × impact × effort-reward
//! so cheap, high-leverage fixes surface first. Applying a recommendation
//! mutates entity configuration; failures are captured on the record and
//! never propagate to the caller.

use chrono::Utc;
use medtwin_core::events::SecurityEvent;
use medtwin_core::types::{Criticality, Effort, Impact, Priority, Severity, SimMetrics};
use medtwin_core::TwinError;
use medtwin_twin::entity::{AccessControlMode, Entity, PatchPolicy, Population};
use tracing::{debug, info, warn};

use crate::types::{
    CurrentState, ExpectedImprovements, ImprovementPlan, Phase, Recommendation,
    RecommendationKind, RecommendationStatus, RecommendationTarget, Strategy, TimelineEntry,
};

// ── Templates ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Template {
    kind: RecommendationKind,
    title: &'static str,
    description: &'static str,
    implementation: &'static str,
    priority: Priority,
    effort: Effort,
    impact: Impact,
}

fn build_templates() -> Vec<Template> {
    vec![
        Template {
            kind: RecommendationKind::Encryption,
            title: "Enable Encryption",
            description: "Enable encryption for data at rest and in transit",
            implementation: "Enable encryption_enabled in the security configuration",
            priority: Priority::High,
            effort: Effort::Medium,
            impact: Impact::High,
        },
        Template {
            kind: RecommendationKind::Authentication,
            title: "Implement Strong Authentication",
            description: "Require strong authentication for all system access",
            implementation: "Enable authentication_required in the security configuration",
            priority: Priority::High,
            effort: Effort::Medium,
            impact: Impact::High,
        },
        Template {
            kind: RecommendationKind::Firewall,
            title: "Enable Firewall Protection",
            description: "Enable the firewall to control network traffic",
            implementation: "Enable firewall_enabled in the security configuration",
            priority: Priority::Medium,
            effort: Effort::Low,
            impact: Impact::Medium,
        },
        Template {
            kind: RecommendationKind::PatchManagement,
            title: "Implement Automated Patch Management",
            description: "Set up an automated patch management system",
            implementation: "Change patch_policy to automatic",
            priority: Priority::High,
            effort: Effort::High,
            impact: Impact::High,
        },
        Template {
            kind: RecommendationKind::VulnerabilityScanning,
            title: "Enable Vulnerability Scanning",
            description: "Enable regular vulnerability scanning",
            implementation: "Enable vulnerability_scanning in the security configuration",
            priority: Priority::Medium,
            effort: Effort::Low,
            impact: Impact::Medium,
        },
        Template {
            kind: RecommendationKind::NetworkIsolation,
            title: "Implement Network Isolation",
            description: "Isolate critical systems from the general network",
            implementation: "Enable network_isolation in the security configuration",
            priority: Priority::High,
            effort: Effort::High,
            impact: Impact::High,
        },
        Template {
            kind: RecommendationKind::AuditLogging,
            title: "Enable Audit Logging",
            description: "Enable comprehensive audit logging",
            implementation: "Enable audit_logging in the security configuration",
            priority: Priority::Medium,
            effort: Effort::Low,
            impact: Impact::Medium,
        },
        Template {
            kind: RecommendationKind::BackupSecurity,
            title: "Secure Backup Systems",
            description: "Implement secure backup and recovery procedures",
            implementation: "Enable backup_enabled in the security configuration",
            priority: Priority::Medium,
            effort: Effort::Medium,
            impact: Impact::High,
        },
    ]
}

/// Whether the control behind a template is already satisfied on an entity.
fn control_satisfied(kind: RecommendationKind, entity: &Entity) -> bool {
    let c = &entity.controls;
    match kind {
        RecommendationKind::Encryption => c.encryption_enabled,
        RecommendationKind::Authentication => c.authentication_required,
        RecommendationKind::Firewall => c.firewall_enabled,
        RecommendationKind::PatchManagement => c.patch_policy != PatchPolicy::None,
        RecommendationKind::VulnerabilityScanning => c.vulnerability_scanning,
        RecommendationKind::NetworkIsolation => c.network_isolation,
        RecommendationKind::AuditLogging => c.audit_logging,
        RecommendationKind::BackupSecurity => c.backup_enabled,
    }
}

// ── Enhancer ────────────────────────────────────────────────────────────────

pub struct ResilienceEnhancer {
    templates: Vec<Template>,
}

impl ResilienceEnhancer {
    pub fn new() -> Self {
        Self { templates: build_templates() }
    }

    fn template(&self, kind: RecommendationKind) -> &Template {
        // The catalog covers every RecommendationKind by construction.
        self.templates
            .iter()
            .find(|t| t.kind == kind)
            .unwrap_or(&self.templates[0])
    }

    /// Derive recommendations from the current population state, sorted
    /// descending by priority score (ties keep generation order).
    pub fn generate_recommendations(
        &self,
        entities: &Population,
        events: &[SecurityEvent],
        _metrics: &SimMetrics,
    ) -> Vec<Recommendation> {
        let critical_events = events
            .iter()
            .filter(|e| e.vulnerability_severity() == Some(Severity::Critical))
            .count();
        debug!(
            entities = entities.len(),
            critical_events, "deriving recommendations"
        );

        let mut recommendations = Vec::new();
        for entity in entities.values() {
            self.entity_recommendations(entity, &mut recommendations);
        }
        self.system_recommendations(entities, &mut recommendations);

        // Stable sort: equal scores keep generation order.
        recommendations.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
        recommendations
    }

    fn entity_recommendations(&self, entity: &Entity, out: &mut Vec<Recommendation>) {
        for kind in RecommendationKind::ALL {
            // Isolation is only pushed onto high-criticality entities.
            if kind == RecommendationKind::NetworkIsolation && entity.criticality != Criticality::High
            {
                continue;
            }
            if !control_satisfied(kind, entity) {
                out.push(self.entity_recommendation(kind, entity));
            }
        }
    }

    fn system_recommendations(&self, entities: &Population, out: &mut Vec<Recommendation>) {
        let total = entities.len();
        if total == 0 {
            return;
        }

        let mut kinds = Vec::new();

        // Coverage gaps: any control below half the population.
        for kind in RecommendationKind::ALL {
            let covered = entities.values().filter(|e| control_satisfied(kind, e)).count();
            if (covered as f64 / total as f64) < 0.5 {
                kinds.push(kind);
            }
        }

        // Risk factors, skipped once the compensating control is in place.
        if entities
            .values()
            .any(|e| e.criticality == Criticality::High && !e.controls.network_isolation)
        {
            kinds.push(RecommendationKind::NetworkIsolation);
        }
        if entities
            .values()
            .any(|e| e.connectivity.has_unencrypted() && !e.controls.encryption_enabled)
        {
            kinds.push(RecommendationKind::Encryption);
        }

        // Compliance bundle: encryption + authentication + audit logging
        // must jointly cover 80% of the population.
        let compliant = entities
            .values()
            .filter(|e| {
                e.controls.encryption_enabled
                    && e.controls.authentication_required
                    && e.controls.audit_logging
            })
            .count();
        if (compliant as f64 / total as f64) < 0.8 {
            kinds.extend([
                RecommendationKind::Encryption,
                RecommendationKind::Authentication,
                RecommendationKind::AuditLogging,
            ]);
        }

        // One system-wide recommendation per kind; first trigger wins.
        let mut seen = Vec::new();
        for kind in kinds {
            if !seen.contains(&kind) {
                seen.push(kind);
                out.push(self.system_recommendation(kind));
            }
        }
    }

    fn entity_recommendation(&self, kind: RecommendationKind, entity: &Entity) -> Recommendation {
        let t = self.template(kind);
        Recommendation {
            id: format!("{}_{}", kind.as_str(), entity.id),
            kind,
            title: t.title.to_string(),
            description: t.description.to_string(),
            implementation: t.implementation.to_string(),
            priority: t.priority,
            effort: t.effort,
            impact: t.impact,
            priority_score: priority_score(t.priority, t.impact, t.effort),
            target: RecommendationTarget::Entity(entity.id),
            target_name: entity.name.clone(),
            status: RecommendationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn system_recommendation(&self, kind: RecommendationKind) -> Recommendation {
        let t = self.template(kind);
        // Rolling a control out fleet-wide is never a low-effort job.
        let effort = if t.effort == Effort::High { Effort::High } else { Effort::Medium };
        Recommendation {
            id: format!("{}_system_wide", kind.as_str()),
            kind,
            title: format!("System-wide {}", t.title),
            description: format!("Apply across all systems: {}", t.description),
            implementation: format!("{} on every entity", t.implementation),
            priority: t.priority,
            effort,
            impact: t.impact,
            priority_score: priority_score(t.priority, t.impact, effort),
            target: RecommendationTarget::SystemWide,
            target_name: "all_systems".to_string(),
            status: RecommendationStatus::Pending,
            created_at: Utc::now(),
        }
    }

    // ── Application ─────────────────────────────────────────────────────────

    /// Apply a recommendation, mutating entity configuration. Returns true
    /// on success. Any internal failure is captured on the record as
    /// `Failed` with the error text; it never propagates to the caller.
    pub fn apply_recommendation(
        &self,
        recommendation: &mut Recommendation,
        entities: &mut Population,
    ) -> bool {
        let result = match recommendation.target {
            RecommendationTarget::SystemWide => {
                for entity in entities.values_mut() {
                    Self::apply_to_entity(recommendation.kind, entity);
                }
                Ok(())
            }
            RecommendationTarget::Entity(id) => match entities.get_mut(&id) {
                Some(entity) => {
                    Self::apply_to_entity(recommendation.kind, entity);
                    Ok(())
                }
                None => Err(TwinError::UnknownEntity(id.to_string())),
            },
        };

        match result {
            Ok(()) => {
                info!(id = %recommendation.id, "applied recommendation");
                recommendation.status = RecommendationStatus::Applied { at: Utc::now() };
                true
            }
            Err(e) => {
                warn!(id = %recommendation.id, error = %e, "failed to apply recommendation");
                recommendation.status = RecommendationStatus::Failed { error: e.to_string() };
                false
            }
        }
    }

    /// Fixed kind → control mutation table.
    fn apply_to_entity(kind: RecommendationKind, entity: &mut Entity) {
        let c = &mut entity.controls;
        match kind {
            RecommendationKind::Encryption => c.encryption_enabled = true,
            RecommendationKind::Authentication => c.authentication_required = true,
            RecommendationKind::Firewall => c.firewall_enabled = true,
            RecommendationKind::PatchManagement => c.patch_policy = PatchPolicy::Automatic,
            RecommendationKind::VulnerabilityScanning => c.vulnerability_scanning = true,
            RecommendationKind::NetworkIsolation => c.network_isolation = true,
            RecommendationKind::AuditLogging => c.audit_logging = true,
            RecommendationKind::BackupSecurity => c.backup_enabled = true,
        }
        if kind == RecommendationKind::Authentication
            && entity.controls.access_control == AccessControlMode::None
        {
            entity.controls.access_control = AccessControlMode::RoleBased;
        }
        entity.touch();
    }

    // ── Improvement plan ────────────────────────────────────────────────────

    pub fn generate_improvement_plan(
        &self,
        entities: &Population,
        events: &[SecurityEvent],
        metrics: &SimMetrics,
    ) -> ImprovementPlan {
        let recommendations = self.generate_recommendations(entities, events, metrics);
        let strategies = Self::select_strategies(&recommendations);
        let timeline = Self::build_timeline(&recommendations);
        let expected_improvements = Self::expected_improvements(&recommendations);

        ImprovementPlan {
            current_state: CurrentState {
                security_score: metrics.security_score,
                vulnerability_count: events.iter().filter(|e| e.is_vulnerability()).count(),
                entity_count: entities.len(),
            },
            recommendations,
            strategies,
            timeline,
            expected_improvements,
            created_at: Utc::now(),
        }
    }

    fn select_strategies(recommendations: &[Recommendation]) -> Vec<Strategy> {
        let has = |kind| recommendations.iter().any(|r| r.kind == kind);
        let mut strategies = Vec::new();

        if has(RecommendationKind::Encryption) && has(RecommendationKind::Authentication) {
            strategies.push(Strategy {
                name: "zero_trust",
                description: "Implement a zero trust security model",
                components: vec!["identity_verification", "least_privilege", "continuous_monitoring"],
                priority: Priority::High,
            });
        }
        if has(RecommendationKind::NetworkIsolation) {
            strategies.push(Strategy {
                name: "defense_in_depth",
                description: "Implement multiple layers of security controls",
                components: vec!["network_segmentation", "access_controls", "monitoring"],
                priority: Priority::High,
            });
        }
        if has(RecommendationKind::VulnerabilityScanning) {
            strategies.push(Strategy {
                name: "threat_hunting",
                description: "Proactively search for threats",
                components: vec!["anomaly_detection", "threat_intelligence", "incident_response"],
                priority: Priority::Medium,
            });
        }
        if has(RecommendationKind::PatchManagement) || has(RecommendationKind::BackupSecurity) {
            strategies.push(Strategy {
                name: "security_automation",
                description: "Automate recurring security processes",
                components: vec!["automated_response", "orchestration", "playbooks"],
                priority: Priority::Medium,
            });
        }
        strategies
    }

    fn build_timeline(recommendations: &[Recommendation]) -> Vec<TimelineEntry> {
        let phase_of = |priority: Priority| match priority {
            Priority::High | Priority::Critical => Phase::Immediate,
            Priority::Medium => Phase::ShortTerm,
            Priority::Low => Phase::LongTerm,
        };
        let mut timeline = Vec::with_capacity(recommendations.len());
        for phase in [Phase::Immediate, Phase::ShortTerm, Phase::LongTerm] {
            for rec in recommendations.iter().filter(|r| phase_of(r.priority) == phase) {
                timeline.push(TimelineEntry {
                    recommendation_id: rec.id.clone(),
                    phase,
                    estimated_duration: phase.estimated_duration(),
                });
            }
        }
        timeline
    }

    fn expected_improvements(recommendations: &[Recommendation]) -> ExpectedImprovements {
        let mut score_increase = 0;
        let mut vuln_reduction = 0;
        for rec in recommendations {
            match rec.impact {
                Impact::High => {
                    score_increase += 10;
                    vuln_reduction += 2;
                }
                Impact::Medium => {
                    score_increase += 5;
                    vuln_reduction += 1;
                }
                Impact::Low => {}
            }
        }
        ExpectedImprovements {
            security_score_increase: score_increase.min(50),
            vulnerability_reduction: vuln_reduction.min(20),
        }
    }
}

impl Default for ResilienceEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

/// Ranking key: monotone in priority and impact, monotone as effort drops.
fn priority_score(priority: Priority, impact: Impact, effort: Effort) -> u32 {
    priority.score() * impact.score() * effort.reward()
}
