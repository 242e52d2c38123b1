//! Alert lifecycle management
//!
//! Turns drift findings and health snapshots into alerts, deduplicates
//! repeated triggers, and tracks acknowledgment and resolution. One state
//! machine per alert identity:
//!
//! ```text
//!   none ──qualifying signal──▶ active ──ack──▶ acknowledged
//!                                 │                  │
//!                                 ├──resolve────────▶│
//!                                 │                  ▼
//!                                 └──auto-resolve─▶ resolved (terminal)
//!
//!   while unresolved: duplicate signals become suppressed records
//!   (at most one per cooldown window) and bump occurrence_count
//! ```
//!
//! Deduplication policy (fixed): while an unresolved alert of the same
//! identity exists, a qualifying signal increments the active alert's
//! `occurrence_count`; in addition a `suppressed` duplicate record is
//! written, but at most once per `cooldown` since the last duplicate
//! record. The active alert's `triggered_at` and content are never
//! touched. Auto-resolution closes an unresolved alert after
//! `auto_resolve_streak` consecutive healthy evaluations of its identity.
//!
//! Healthy-signal matching deliberately ignores `source_component`: a
//! healthy data component closes drift alerts whether the evaluator or
//! the scorer raised them.

use crate::config::AlertConfig;
use crate::drift::DriftFinding;
use crate::errors::{MonitorError, Result};
use crate::health::HealthSnapshot;
use crate::types::{AlertSeverity, AlertStatus, AlertType, SourceComponent};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Alert identity: the deduplication and lifecycle key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertKey {
    pub model_version_id: u64,
    pub deployment_id: u64,
    pub alert_type: AlertType,
    pub source_component: SourceComponent,
}

/// One alert record. History is append-grow: records are never deleted,
/// and only the status fields (`status`, `acknowledged_at`, `resolved_at`,
/// `occurrence_count`) ever change after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub model_version_id: u64,
    pub deployment_id: u64,
    pub source_component: SourceComponent,
    pub status: AlertStatus,
    pub triggered_at: SystemTime,
    pub acknowledged_at: Option<SystemTime>,
    pub resolved_at: Option<SystemTime>,
    pub notification_channels: BTreeSet<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub tags: Vec<String>,
    /// Qualifying signals observed for this identity while this alert
    /// was the unresolved one (including the raising signal)
    pub occurrence_count: u64,
}

impl Alert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            model_version_id: self.model_version_id,
            deployment_id: self.deployment_id,
            alert_type: self.alert_type,
            source_component: self.source_component,
        }
    }
}

/// What the manager did with one observed signal. The engine maps these
/// onto its Prometheus counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertAction {
    /// New active alert created
    Raised { alert_id: String },
    /// Suppressed duplicate record written for an existing unresolved alert
    Suppressed { alert_id: String, active_alert_id: String },
    /// Duplicate within cooldown: occurrence counted, no record written
    Counted { active_alert_id: String },
    /// Healthy streak reached the configured length; alert closed
    AutoResolved { alert_id: String },
}

/// Per-identity lifecycle state.
#[derive(Debug, Default)]
struct KeyState {
    /// Id of the unresolved (active or acknowledged) alert, if any
    unresolved: Option<String>,
    /// When the last suppressed duplicate was recorded; None right after
    /// a raise, so the first duplicate is always recorded
    last_duplicate_at: Option<SystemTime>,
    /// Consecutive healthy evaluations since the last qualifying signal
    healthy_streak: u32,
}

#[derive(Default)]
struct ManagerState {
    /// Append-grow history, creation order
    alerts: Vec<Alert>,
    /// alert_id -> index into `alerts`
    by_id: HashMap<String, usize>,
    key_states: HashMap<AlertKey, KeyState>,
}

/// Central alert manager. Interior locking makes it shareable across
/// evaluation tasks; per-identity serialization is the engine's job.
pub struct AlertManager {
    config: AlertConfig,
    state: RwLock<ManagerState>,
    seq: AtomicU64,
}

impl AlertManager {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ManagerState::default()),
            seq: AtomicU64::new(1),
        }
    }

    /// Feed a drift finding into the state machine.
    pub fn observe_drift(&self, finding: &DriftFinding, deployment_id: u64) -> Vec<AlertAction> {
        let key = AlertKey {
            model_version_id: finding.model_version_id,
            deployment_id,
            alert_type: AlertType::Drift,
            source_component: SourceComponent::DriftEvaluator,
        };

        if finding.drift_detected {
            let severity = self.drift_severity(finding.drift_score, finding.threshold);
            let title = format!(
                "{} drift detected for model version {}",
                finding.drift_type.as_str(),
                finding.model_version_id
            );
            let message = format!(
                "drift score {:.4} exceeded threshold {:.4} ({})",
                finding.drift_score,
                finding.threshold,
                finding.test_method.as_str()
            );
            let mut metadata = HashMap::new();
            metadata.insert("drift_score".to_string(), serde_json::json!(finding.drift_score));
            metadata.insert("threshold".to_string(), serde_json::json!(finding.threshold));
            metadata.insert(
                "test_method".to_string(),
                serde_json::json!(finding.test_method.as_str()),
            );
            metadata.insert(
                "drift_type".to_string(),
                serde_json::json!(finding.drift_type.as_str()),
            );

            self.signal(key, severity, title, message, metadata)
                .into_iter()
                .collect()
        } else {
            self.note_healthy(key.model_version_id, key.deployment_id, AlertType::Drift)
        }
    }

    /// Feed a health snapshot into the state machine. Each non-healthy
    /// component qualifies as a signal of its mapped alert type; each
    /// healthy component counts toward auto-resolution of that type.
    pub fn observe_health(&self, snapshot: &HealthSnapshot) -> Vec<AlertAction> {
        let components = [
            (AlertType::Error, snapshot.components.prediction, "prediction"),
            (AlertType::Performance, snapshot.components.performance, "performance"),
            (AlertType::Resource, snapshot.components.resource, "resource"),
            (AlertType::Drift, snapshot.components.data, "data"),
        ];

        let mut actions = Vec::new();
        for (alert_type, state, component_name) in components {
            if state.is_healthy() {
                actions.extend(self.note_healthy(
                    snapshot.model_version_id,
                    snapshot.deployment_id,
                    alert_type,
                ));
                continue;
            }

            let key = AlertKey {
                model_version_id: snapshot.model_version_id,
                deployment_id: snapshot.deployment_id,
                alert_type,
                source_component: SourceComponent::HealthScorer,
            };
            let severity = self.health_severity(snapshot.health_score);
            let title = format!(
                "{} health {} for model version {}",
                component_name,
                state.as_str(),
                snapshot.model_version_id
            );
            let message = format!(
                "composite health score {:.1}, {} component is {}",
                snapshot.health_score,
                component_name,
                state.as_str()
            );
            let mut metadata = HashMap::new();
            metadata.insert("health_score".to_string(), serde_json::json!(snapshot.health_score));
            metadata.insert("component".to_string(), serde_json::json!(component_name));
            metadata.insert(
                "component_state".to_string(),
                serde_json::json!(state.as_str()),
            );
            if let Some(reason) = &snapshot.reason {
                metadata.insert("reason".to_string(), serde_json::json!(reason));
            }

            actions.extend(self.signal(key, severity, title, message, metadata));
        }
        actions
    }

    /// Qualifying signal for one identity. At most one unresolved alert
    /// per identity can exist at any time.
    fn signal(
        &self,
        key: AlertKey,
        severity: AlertSeverity,
        title: String,
        message: String,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Option<AlertAction> {
        let now = SystemTime::now();
        let mut state = self.state.write();

        let key_state = state.key_states.entry(key).or_default();
        key_state.healthy_streak = 0;

        if let Some(active_id) = key_state.unresolved.clone() {
            let record_duplicate = match key_state.last_duplicate_at {
                None => true,
                Some(t) => now.duration_since(t).unwrap_or_default() >= self.config.cooldown,
            };

            if record_duplicate {
                key_state.last_duplicate_at = Some(now);
                let duplicate_id = self.next_id();
                let duplicate = Alert {
                    alert_id: duplicate_id.clone(),
                    alert_type: key.alert_type,
                    severity,
                    title,
                    message,
                    model_version_id: key.model_version_id,
                    deployment_id: key.deployment_id,
                    source_component: key.source_component,
                    status: AlertStatus::Suppressed,
                    triggered_at: now,
                    acknowledged_at: None,
                    resolved_at: None,
                    notification_channels: BTreeSet::new(),
                    metadata,
                    tags: vec!["duplicate".to_string()],
                    occurrence_count: 1,
                };
                Self::push_alert(&mut state, duplicate);
                Self::bump_occurrence(&mut state, &active_id);
                debug!(alert_id = %duplicate_id, active = %active_id, "duplicate suppressed");
                Some(AlertAction::Suppressed {
                    alert_id: duplicate_id,
                    active_alert_id: active_id,
                })
            } else {
                Self::bump_occurrence(&mut state, &active_id);
                debug!(active = %active_id, "duplicate within cooldown, counted");
                Some(AlertAction::Counted { active_alert_id: active_id })
            }
        } else {
            let alert_id = self.next_id();
            key_state.unresolved = Some(alert_id.clone());
            key_state.last_duplicate_at = None;
            let alert = Alert {
                alert_id: alert_id.clone(),
                alert_type: key.alert_type,
                severity,
                title: title.clone(),
                message,
                model_version_id: key.model_version_id,
                deployment_id: key.deployment_id,
                source_component: key.source_component,
                status: AlertStatus::Active,
                triggered_at: now,
                acknowledged_at: None,
                resolved_at: None,
                notification_channels: BTreeSet::new(),
                metadata,
                tags: Vec::new(),
                occurrence_count: 1,
            };
            Self::push_alert(&mut state, alert);
            warn!(alert_id = %alert_id, severity = severity.as_str(), %title, "alert raised");
            Some(AlertAction::Raised { alert_id })
        }
    }

    /// Healthy evaluation for `(model, deployment, alert_type)` across
    /// all source components: bump streaks, auto-resolve on threshold.
    fn note_healthy(
        &self,
        model_version_id: u64,
        deployment_id: u64,
        alert_type: AlertType,
    ) -> Vec<AlertAction> {
        let mut state = self.state.write();
        let matching: Vec<AlertKey> = state
            .key_states
            .keys()
            .filter(|k| {
                k.model_version_id == model_version_id
                    && k.deployment_id == deployment_id
                    && k.alert_type == alert_type
            })
            .copied()
            .collect();

        let mut actions = Vec::new();
        for key in matching {
            let resolved_id = match state.key_states.get_mut(&key) {
                Some(key_state) if key_state.unresolved.is_some() => {
                    key_state.healthy_streak += 1;
                    if key_state.healthy_streak >= self.config.auto_resolve_streak {
                        key_state.healthy_streak = 0;
                        key_state.last_duplicate_at = None;
                        key_state.unresolved.take()
                    } else {
                        None
                    }
                }
                _ => None,
            };

            if let Some(alert_id) = resolved_id {
                if let Some(&idx) = state.by_id.get(&alert_id) {
                    let alert = &mut state.alerts[idx];
                    alert.status = AlertStatus::Resolved;
                    alert.resolved_at = Some(SystemTime::now());
                    info!(alert_id = %alert_id, "alert auto-resolved after healthy streak");
                }
                actions.push(AlertAction::AutoResolved { alert_id });
            }
        }
        actions
    }

    /// External acknowledgment. Does not close the alert.
    pub fn acknowledge(&self, alert_id: &str) -> Result<Alert> {
        let mut state = self.state.write();
        let idx = *state.by_id.get(alert_id).ok_or_else(|| MonitorError::NotFound {
            entity: "alert",
            id: alert_id.to_string(),
        })?;

        let alert = &mut state.alerts[idx];
        match alert.status {
            AlertStatus::Active => {
                alert.status = AlertStatus::Acknowledged;
                alert.acknowledged_at = Some(SystemTime::now());
                info!(alert_id, "alert acknowledged");
                Ok(alert.clone())
            }
            status => Err(MonitorError::InvalidTransition {
                subject: format!("alert {}", alert_id),
                detail: format!("cannot acknowledge from '{}'", status.as_str()),
            }),
        }
    }

    /// External resolution.
    pub fn resolve(&self, alert_id: &str) -> Result<Alert> {
        let mut state = self.state.write();
        let idx = *state.by_id.get(alert_id).ok_or_else(|| MonitorError::NotFound {
            entity: "alert",
            id: alert_id.to_string(),
        })?;

        let status = state.alerts[idx].status;
        match status {
            AlertStatus::Active | AlertStatus::Acknowledged => {
                let key = state.alerts[idx].key();
                if let Some(key_state) = state.key_states.get_mut(&key) {
                    if key_state.unresolved.as_deref() == Some(alert_id) {
                        key_state.unresolved = None;
                        key_state.healthy_streak = 0;
                        key_state.last_duplicate_at = None;
                    }
                }
                let alert = &mut state.alerts[idx];
                alert.status = AlertStatus::Resolved;
                alert.resolved_at = Some(SystemTime::now());
                info!(alert_id, "alert resolved");
                Ok(alert.clone())
            }
            status => Err(MonitorError::InvalidTransition {
                subject: format!("alert {}", alert_id),
                detail: format!("cannot resolve from '{}'", status.as_str()),
            }),
        }
    }

    /// Alerts currently active or acknowledged, creation order.
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.state
            .read()
            .alerts
            .iter()
            .filter(|a| a.status.is_unresolved())
            .cloned()
            .collect()
    }

    /// Full history, creation order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.state.read().alerts.clone()
    }

    pub fn get(&self, alert_id: &str) -> Option<Alert> {
        let state = self.state.read();
        state.by_id.get(alert_id).map(|&idx| state.alerts[idx].clone())
    }

    pub fn active_count(&self) -> usize {
        self.state
            .read()
            .alerts
            .iter()
            .filter(|a| a.status.is_unresolved())
            .count()
    }

    fn drift_severity(&self, score: f64, threshold: f64) -> AlertSeverity {
        let ratio = if threshold > 0.0 { score / threshold } else { f64::INFINITY };
        let [medium, high, critical] = self.config.drift_ratio_breakpoints;
        if ratio >= critical {
            AlertSeverity::Critical
        } else if ratio >= high {
            AlertSeverity::High
        } else if ratio >= medium {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }

    fn health_severity(&self, health_score: f64) -> AlertSeverity {
        let [critical, high, medium] = self.config.health_score_breakpoints;
        if health_score < critical {
            AlertSeverity::Critical
        } else if health_score < high {
            AlertSeverity::High
        } else if health_score < medium {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }

    fn next_id(&self) -> String {
        format!("alert-{:06}", self.seq.fetch_add(1, Ordering::Relaxed))
    }

    fn push_alert(state: &mut ManagerState, alert: Alert) {
        state.by_id.insert(alert.alert_id.clone(), state.alerts.len());
        state.alerts.push(alert);
    }

    fn bump_occurrence(state: &mut ManagerState, alert_id: &str) {
        if let Some(&idx) = state.by_id.get(alert_id) {
            state.alerts[idx].occurrence_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriftConfig;
    use crate::drift::{DriftEvaluator, FeatureSeries};
    use crate::health::{ComponentHealth, HealthSnapshot};
    use crate::types::{DriftType, HealthState, TimeWindow};
    use std::time::Duration;

    fn manager() -> AlertManager {
        AlertManager::new(AlertConfig::default())
    }

    fn detected_finding() -> DriftFinding {
        let window = TimeWindow::new(
            SystemTime::UNIX_EPOCH,
            SystemTime::UNIX_EPOCH + Duration::from_secs(100),
        );
        let reference: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let shifted: Vec<f64> = reference.iter().map(|v| v + 100.0).collect();
        DriftEvaluator::new(DriftConfig::default())
            .evaluate(
                1,
                DriftType::Prediction,
                &[FeatureSeries::new("confidence", reference, shifted)],
                window,
                window,
            )
            .unwrap()
    }

    fn clean_finding() -> DriftFinding {
        let window = TimeWindow::new(
            SystemTime::UNIX_EPOCH,
            SystemTime::UNIX_EPOCH + Duration::from_secs(100),
        );
        let values: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        DriftEvaluator::new(DriftConfig::default())
            .evaluate(
                1,
                DriftType::Prediction,
                &[FeatureSeries::new("confidence", values.clone(), values)],
                window,
                window,
            )
            .unwrap()
    }

    fn healthy_snapshot() -> HealthSnapshot {
        HealthSnapshot {
            model_version_id: 1,
            deployment_id: 1,
            timestamp: SystemTime::now(),
            overall_health: HealthState::Healthy,
            health_score: 100.0,
            components: ComponentHealth::uniform(HealthState::Healthy),
            reason: None,
        }
    }

    #[test]
    fn test_detected_drift_raises_active_alert() {
        let manager = manager();
        let actions = manager.observe_drift(&detected_finding(), 1);
        assert!(matches!(actions.as_slice(), [AlertAction::Raised { .. }]));
        assert_eq!(manager.active_count(), 1);

        let alert = &manager.active_alerts()[0];
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.alert_type, AlertType::Drift);
        assert_eq!(alert.source_component, SourceComponent::DriftEvaluator);
        // Disjoint distributions: score far past 3x threshold
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_second_finding_suppressed_never_two_active() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        let actions = manager.observe_drift(&detected_finding(), 1);

        assert!(matches!(actions.as_slice(), [AlertAction::Suppressed { .. }]));
        assert_eq!(manager.active_count(), 1);

        let all = manager.alerts();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].status, AlertStatus::Suppressed);
        // Active alert counted both occurrences
        assert_eq!(all[0].occurrence_count, 2);
    }

    #[test]
    fn test_third_finding_within_cooldown_only_counted() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        manager.observe_drift(&detected_finding(), 1);
        let actions = manager.observe_drift(&detected_finding(), 1);

        assert!(matches!(actions.as_slice(), [AlertAction::Counted { .. }]));
        assert_eq!(manager.alerts().len(), 2);
        assert_eq!(manager.alerts()[0].occurrence_count, 3);
    }

    #[test]
    fn test_duplicate_after_cooldown_recorded_again() {
        // Zero cooldown: every duplicate lands outside it
        let manager = AlertManager::new(AlertConfig {
            cooldown: Duration::ZERO,
            ..AlertConfig::default()
        });
        manager.observe_drift(&detected_finding(), 1);
        manager.observe_drift(&detected_finding(), 1);
        let actions = manager.observe_drift(&detected_finding(), 1);

        assert!(matches!(actions.as_slice(), [AlertAction::Suppressed { .. }]));
        let all = manager.alerts();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].status, AlertStatus::Suppressed);
        assert_eq!(all[2].status, AlertStatus::Suppressed);
        assert_eq!(manager.active_count(), 1);
        assert_eq!(all[0].occurrence_count, 3);
    }

    #[test]
    fn test_acknowledge_suppressed_is_invalid_transition() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        manager.observe_drift(&detected_finding(), 1);

        let suppressed_id = manager.alerts()[1].alert_id.clone();
        let err = manager.acknowledge(&suppressed_id).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidTransition { .. }));
        // The active alert is untouched by the rejected action
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_acknowledge_then_resolve() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        let id = manager.active_alerts()[0].alert_id.clone();

        let acked = manager.acknowledge(&id).unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert!(acked.acknowledged_at.is_some());
        // Acknowledged is still unresolved
        assert_eq!(manager.active_count(), 1);

        let resolved = manager.resolve(&id).unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert!(resolved.resolved_at.is_some());
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_resolve_twice_is_invalid_transition() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        let id = manager.active_alerts()[0].alert_id.clone();

        manager.resolve(&id).unwrap();
        let err = manager.resolve(&id).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidTransition { .. }));
    }

    #[test]
    fn test_acknowledge_resolved_is_invalid_transition() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        let id = manager.active_alerts()[0].alert_id.clone();
        manager.resolve(&id).unwrap();

        let err = manager.acknowledge(&id).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidTransition { .. }));
    }

    #[test]
    fn test_unknown_alert_not_found() {
        let manager = manager();
        assert!(matches!(
            manager.resolve("alert-999999").unwrap_err(),
            MonitorError::NotFound { entity: "alert", .. }
        ));
        assert!(matches!(
            manager.acknowledge("alert-999999").unwrap_err(),
            MonitorError::NotFound { .. }
        ));
    }

    #[test]
    fn test_auto_resolution_after_healthy_streak() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        assert_eq!(manager.active_count(), 1);

        // Default streak is 5; four healthy evaluations are not enough
        for _ in 0..4 {
            let actions = manager.observe_drift(&clean_finding(), 1);
            assert!(actions.is_empty());
        }
        assert_eq!(manager.active_count(), 1);

        let actions = manager.observe_drift(&clean_finding(), 1);
        assert!(matches!(actions.as_slice(), [AlertAction::AutoResolved { .. }]));
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.alerts()[0].status, AlertStatus::Resolved);
    }

    #[test]
    fn test_qualifying_signal_resets_healthy_streak() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);

        for _ in 0..4 {
            manager.observe_drift(&clean_finding(), 1);
        }
        // Drift again: streak must restart
        manager.observe_drift(&detected_finding(), 1);
        for _ in 0..4 {
            manager.observe_drift(&clean_finding(), 1);
        }
        assert_eq!(manager.active_count(), 1);

        manager.observe_drift(&clean_finding(), 1);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_healthy_snapshot_resolves_drift_alert_across_sources() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);

        // Healthy snapshots carry a healthy data component, which counts
        // toward the drift-evaluator alert's streak
        for _ in 0..5 {
            manager.observe_health(&healthy_snapshot());
        }
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_unhealthy_components_raise_typed_alerts() {
        let manager = manager();
        let snapshot = HealthSnapshot {
            overall_health: HealthState::Unhealthy,
            health_score: 40.0,
            components: ComponentHealth {
                prediction: HealthState::Healthy,
                performance: HealthState::Unhealthy,
                resource: HealthState::Degraded,
                data: HealthState::Healthy,
            },
            ..healthy_snapshot()
        };

        let actions = manager.observe_health(&snapshot);
        assert_eq!(
            actions
                .iter()
                .filter(|a| matches!(a, AlertAction::Raised { .. }))
                .count(),
            2
        );

        let active = manager.active_alerts();
        assert_eq!(active.len(), 2);
        let types: Vec<AlertType> = active.iter().map(|a| a.alert_type).collect();
        assert!(types.contains(&AlertType::Performance));
        assert!(types.contains(&AlertType::Resource));
        // Health score 40 falls in the "high" bucket
        assert!(active.iter().all(|a| a.severity == AlertSeverity::High));
    }

    #[test]
    fn test_separate_identities_track_independently() {
        let manager = manager();
        manager.observe_drift(&detected_finding(), 1);
        manager.observe_drift(&detected_finding(), 2);

        // Different deployment ids: two independent active alerts
        assert_eq!(manager.active_count(), 2);
    }
}
