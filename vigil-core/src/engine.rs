//! Monitoring engine facade
//!
//! Owns the stores, the drift evaluator, the health scorer, and the alert
//! manager, and wires them into the evaluation cycle. Appends run fully in
//! parallel across identities; evaluation serializes per identity through
//! a lock arena so read-then-write of findings, snapshots, and alert state
//! never interleaves for one `(model_version_id, deployment_id)` pair.

use crate::alerting::{Alert, AlertAction, AlertManager};
use crate::config::MonitorConfig;
use crate::drift::{DriftEvaluator, DriftFinding, FeatureSeries};
use crate::errors::Result;
use crate::health::{HealthScorer, HealthSnapshot};
use crate::metrics::EngineMetrics;
use crate::store::{MetricSample, MetricStore, PredictionEvent, PredictionLog};
use crate::types::{AlertSeverity, AlertType, DriftType, FeedbackSource, ModelKey, TimeWindow};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tracing::{debug, error, info};

/// Per-identity evaluation state. Findings and snapshots are derived
/// records owned by the engine; the stores hold only raw input.
#[derive(Default)]
struct IdentityState {
    findings: Vec<DriftFinding>,
    latest_snapshot: Option<HealthSnapshot>,
}

/// Outcome of one evaluation cycle for one identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub key: ModelKey,
    pub timestamp: SystemTime,
    /// Drift finding, when enough data was available this cycle
    pub finding: Option<DriftFinding>,
    /// Why drift evaluation was skipped, when it was
    pub drift_skipped: Option<String>,
    pub snapshot: HealthSnapshot,
    pub alert_actions: Vec<AlertAction>,
}

/// Aggregate counts for the read boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub models_tracked: usize,
    pub metric_samples: usize,
    pub prediction_events: usize,
    pub drift_findings: usize,
    pub drift_detections: usize,
    pub active_alerts: usize,
    pub active_alerts_by_severity: BTreeMap<AlertSeverity, usize>,
    pub latest_snapshot: Option<HealthSnapshot>,
}

pub struct MonitorEngine {
    config: MonitorConfig,
    metric_store: MetricStore,
    prediction_log: PredictionLog,
    evaluator: DriftEvaluator,
    scorer: HealthScorer,
    alert_manager: AlertManager,
    metrics: EngineMetrics,
    identities: DashMap<ModelKey, Arc<Mutex<IdentityState>>>,
}

impl MonitorEngine {
    pub fn new(config: MonitorConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let metrics = EngineMetrics::new()?;

        info!(
            drift_method = config.drift.method.as_str(),
            drift_threshold = config.drift.threshold,
            "monitor engine initialized"
        );

        Ok(Self {
            evaluator: DriftEvaluator::new(config.drift.clone()),
            scorer: HealthScorer::new(config.health.clone()),
            alert_manager: AlertManager::new(config.alerts.clone()),
            config,
            metric_store: MetricStore::new(),
            prediction_log: PredictionLog::new(),
            metrics,
            identities: DashMap::new(),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    // --- ingestion boundary -------------------------------------------------

    /// Validate and append one metric sample. Rejections are never
    /// partially applied.
    pub fn record_metric_sample(&self, sample: MetricSample) -> Result<Arc<MetricSample>> {
        match self.metric_store.append(sample) {
            Ok(stored) => {
                self.metrics.ingestion().metric_samples_total.inc();
                Ok(stored)
            }
            Err(e) => {
                self.metrics
                    .ingestion()
                    .rejected_total
                    .with_label_values(&["metric_sample"])
                    .inc();
                Err(e)
            }
        }
    }

    /// Validate and append one prediction event.
    pub fn record_prediction(&self, event: PredictionEvent) -> Result<PredictionEvent> {
        match self.prediction_log.append(event) {
            Ok(stored) => {
                self.metrics.ingestion().prediction_events_total.inc();
                Ok(stored)
            }
            Err(e) => {
                self.metrics
                    .ingestion()
                    .rejected_total
                    .with_label_values(&["prediction_event"])
                    .inc();
                Err(e)
            }
        }
    }

    /// Attach ground-truth feedback to a logged prediction.
    pub fn record_feedback(
        &self,
        request_id: &str,
        outcome: serde_json::Value,
        source: FeedbackSource,
    ) -> Result<PredictionEvent> {
        let event = self.prediction_log.record_feedback(request_id, outcome, source)?;
        self.metrics.ingestion().feedback_records_total.inc();
        Ok(event)
    }

    // --- evaluation ---------------------------------------------------------

    /// Run one full evaluation cycle for an identity: prediction drift
    /// over the two windows, health scoring over the lookback, alert
    /// observation. Holds the identity lock throughout. Insufficient
    /// drift data skips the drift step and records why; the cycle still
    /// produces a snapshot.
    pub fn run_cycle(
        &self,
        key: ModelKey,
        reference_window: TimeWindow,
        current_window: TimeWindow,
    ) -> Result<CycleReport> {
        let started = Instant::now();
        let slot = self.identity_slot(key);
        let mut state = slot.lock();

        let mut alert_actions = Vec::new();
        let mut drift_skipped = None;

        let features = self.prediction_features(key, reference_window, current_window);
        let finding = match self.evaluator.evaluate(
            key.model_version_id,
            DriftType::Prediction,
            &features,
            reference_window,
            current_window,
        ) {
            Ok(finding) => {
                let outcome = if finding.drift_detected { "detected" } else { "clean" };
                self.metrics
                    .evaluation()
                    .drift_evaluations_total
                    .with_label_values(&[finding.test_method.as_str(), outcome])
                    .inc();
                alert_actions.extend(
                    self.alert_manager
                        .observe_drift(&finding, key.deployment_id),
                );
                state.findings.push(finding.clone());
                Some(finding)
            }
            Err(e) => {
                // Skipped this cycle, retried on the next; never fatal
                self.metrics.evaluation().insufficient_data_total.inc();
                debug!(model = %key, error = %e, "drift evaluation skipped");
                drift_skipped = Some(e.to_string());
                None
            }
        };

        let lookback = TimeWindow::last(self.config.health.lookback);
        let mut samples =
            self.metric_store
                .query(key.model_version_id, Some(key.deployment_id), lookback);
        let max = self.config.health.max_samples;
        if samples.len() > max {
            samples.drain(..samples.len() - max);
        }

        let snapshot = self.scorer.score(key, &samples, state.findings.last());
        self.metrics
            .evaluation()
            .health_snapshots_total
            .with_label_values(&[snapshot.overall_health.as_str()])
            .inc();
        alert_actions.extend(self.alert_manager.observe_health(&snapshot));
        state.latest_snapshot = Some(snapshot.clone());

        drop(state);
        self.record_alert_actions(&alert_actions);
        self.refresh_gauges();
        self.metrics
            .evaluation()
            .cycle_duration_seconds
            .observe(started.elapsed().as_secs_f64());

        Ok(CycleReport {
            key,
            timestamp: SystemTime::now(),
            finding,
            drift_skipped,
            snapshot,
            alert_actions,
        })
    }

    /// Run one cycle for every identity known to either store, so a model
    /// that has only logged predictions still gets its drift checked. One
    /// failed identity never blocks the rest.
    pub fn run_all_cycles(
        &self,
        reference_window: TimeWindow,
        current_window: TimeWindow,
    ) -> Vec<CycleReport> {
        let mut keys = self.metric_store.identities();
        for key in self.prediction_log.identities() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let mut reports = Vec::new();
        for key in keys {
            match self.run_cycle(key, reference_window, current_window) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(model = %key, error = %e, "evaluation cycle failed");
                }
            }
        }
        reports
    }

    /// On-demand drift evaluation over caller-supplied feature series,
    /// for example input features captured outside the prediction log.
    /// Stores the finding and drives alerting like a cycle does.
    pub fn evaluate_drift(
        &self,
        key: ModelKey,
        drift_type: DriftType,
        features: &[FeatureSeries],
        reference_window: TimeWindow,
        current_window: TimeWindow,
    ) -> Result<DriftFinding> {
        let slot = self.identity_slot(key);
        let mut state = slot.lock();

        let finding = self.evaluator.evaluate(
            key.model_version_id,
            drift_type,
            features,
            reference_window,
            current_window,
        )?;

        let outcome = if finding.drift_detected { "detected" } else { "clean" };
        self.metrics
            .evaluation()
            .drift_evaluations_total
            .with_label_values(&[finding.test_method.as_str(), outcome])
            .inc();

        let actions = self.alert_manager.observe_drift(&finding, key.deployment_id);
        state.findings.push(finding.clone());
        drop(state);

        self.record_alert_actions(&actions);
        self.refresh_gauges();
        Ok(finding)
    }

    // --- read boundary ------------------------------------------------------

    /// Findings newest-first, optionally filtered by model version.
    pub fn list_drift_findings(
        &self,
        model_version_id: Option<u64>,
        limit: usize,
    ) -> Vec<DriftFinding> {
        let mut out: Vec<DriftFinding> = Vec::new();
        for entry in self.identities.iter() {
            if let Some(mvid) = model_version_id {
                if entry.key().model_version_id != mvid {
                    continue;
                }
            }
            out.extend(entry.value().lock().findings.iter().cloned());
        }
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out.truncate(limit);
        out
    }

    pub fn list_active_alerts(&self) -> Vec<Alert> {
        self.alert_manager.active_alerts()
    }

    pub fn alert_history(&self) -> Vec<Alert> {
        self.alert_manager.alerts()
    }

    pub fn get_health_snapshot(&self, key: ModelKey) -> Option<HealthSnapshot> {
        self.identities
            .get(&key)
            .and_then(|slot| slot.value().lock().latest_snapshot.clone())
    }

    pub fn dashboard_overview(&self) -> DashboardOverview {
        let mut drift_findings = 0;
        let mut drift_detections = 0;
        let mut latest_snapshot: Option<HealthSnapshot> = None;
        for entry in self.identities.iter() {
            let state = entry.value().lock();
            drift_findings += state.findings.len();
            drift_detections += state.findings.iter().filter(|f| f.drift_detected).count();
            if let Some(snapshot) = &state.latest_snapshot {
                let newer = latest_snapshot
                    .as_ref()
                    .map_or(true, |cur| snapshot.timestamp > cur.timestamp);
                if newer {
                    latest_snapshot = Some(snapshot.clone());
                }
            }
        }

        let active = self.alert_manager.active_alerts();
        let mut by_severity: BTreeMap<AlertSeverity, usize> = BTreeMap::new();
        for alert in &active {
            *by_severity.entry(alert.severity).or_insert(0) += 1;
        }

        DashboardOverview {
            models_tracked: self.metric_store.identities().len(),
            metric_samples: self.metric_store.len(),
            prediction_events: self.prediction_log.len(),
            drift_findings,
            drift_detections,
            active_alerts: active.len(),
            active_alerts_by_severity: by_severity,
            latest_snapshot,
        }
    }

    // --- action boundary ----------------------------------------------------

    pub fn acknowledge_alert(&self, alert_id: &str) -> Result<Alert> {
        let alert = self.alert_manager.acknowledge(alert_id)?;
        self.refresh_gauges();
        Ok(alert)
    }

    pub fn resolve_alert(&self, alert_id: &str) -> Result<Alert> {
        let alert = self.alert_manager.resolve(alert_id)?;
        self.refresh_gauges();
        Ok(alert)
    }

    // --- internals ----------------------------------------------------------

    fn identity_slot(&self, key: ModelKey) -> Arc<Mutex<IdentityState>> {
        let slot = self
            .identities
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(IdentityState::default())))
            .clone();
        self.metrics
            .evaluation()
            .tracked_identities
            .set(self.identities.len() as i64);
        slot
    }

    /// Prediction-drift inputs for a cycle: confidence plus one series
    /// per probability label, over the two windows.
    fn prediction_features(
        &self,
        key: ModelKey,
        reference_window: TimeWindow,
        current_window: TimeWindow,
    ) -> Vec<FeatureSeries> {
        let mut features = vec![FeatureSeries::new(
            "confidence",
            self.prediction_log.confidence_series(key, reference_window),
            self.prediction_log.confidence_series(key, current_window),
        )];
        for label in self.prediction_log.probability_labels(key) {
            features.push(FeatureSeries::new(
                format!("probability:{}", label),
                self.prediction_log
                    .probability_series(key, &label, reference_window),
                self.prediction_log
                    .probability_series(key, &label, current_window),
            ));
        }
        features
    }

    fn record_alert_actions(&self, actions: &[AlertAction]) {
        for action in actions {
            match action {
                AlertAction::Raised { alert_id } => {
                    if let Some(alert) = self.alert_manager.get(alert_id) {
                        self.metrics
                            .alerting()
                            .alerts_raised_total
                            .with_label_values(&[
                                alert.alert_type.as_str(),
                                alert.severity.as_str(),
                            ])
                            .inc();
                    }
                }
                AlertAction::Suppressed { .. } => {
                    self.metrics.alerting().alerts_suppressed_total.inc();
                }
                AlertAction::Counted { .. } => {
                    self.metrics.alerting().alerts_counted_total.inc();
                }
                AlertAction::AutoResolved { .. } => {
                    self.metrics.alerting().alerts_auto_resolved_total.inc();
                }
            }
        }
    }

    fn refresh_gauges(&self) {
        let mut counts: BTreeMap<AlertType, i64> = BTreeMap::new();
        for alert in self.alert_manager.active_alerts() {
            *counts.entry(alert.alert_type).or_insert(0) += 1;
        }
        for alert_type in [
            AlertType::Performance,
            AlertType::Drift,
            AlertType::Error,
            AlertType::Resource,
        ] {
            self.metrics
                .alerting()
                .active_alerts
                .with_label_values(&[alert_type.as_str()])
                .set(counts.get(&alert_type).copied().unwrap_or(0));
        }
    }
}
