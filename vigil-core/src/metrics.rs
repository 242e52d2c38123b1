//! Prometheus metrics for the monitoring engine
//!
//! Covers:
//! - Ingestion (metric samples, prediction events, feedback)
//! - Evaluation (drift checks, health scores, cycle timing)
//! - Alerting (raised, suppressed, auto-resolved, active gauge)

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use tracing::info;

/// Central registry for all engine metrics
#[derive(Clone)]
pub struct EngineMetrics {
    registry: Arc<Registry>,
    ingestion: Arc<IngestionMetrics>,
    evaluation: Arc<EvaluationMetrics>,
    alerting: Arc<AlertingMetrics>,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let ingestion = Arc::new(IngestionMetrics::new(&registry)?);
        let evaluation = Arc::new(EvaluationMetrics::new(&registry)?);
        let alerting = Arc::new(AlertingMetrics::new(&registry)?);

        info!("engine metrics registry initialized");

        Ok(Self {
            registry,
            ingestion,
            evaluation,
            alerting,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ingestion(&self) -> &IngestionMetrics {
        &self.ingestion
    }

    pub fn evaluation(&self) -> &EvaluationMetrics {
        &self.evaluation
    }

    pub fn alerting(&self) -> &AlertingMetrics {
        &self.alerting
    }
}

/// Ingestion path counters
pub struct IngestionMetrics {
    /// Metric samples accepted into the store
    pub metric_samples_total: IntCounter,
    /// Prediction events accepted into the log
    pub prediction_events_total: IntCounter,
    /// Feedback records attached to logged predictions
    pub feedback_records_total: IntCounter,
    /// Records rejected at validation, by reason
    pub rejected_total: IntCounterVec,
}

impl IngestionMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metric_samples_total = IntCounter::with_opts(
            Opts::new("ingest_metric_samples_total", "Metric samples accepted")
                .namespace("vigil"),
        )?;
        registry.register(Box::new(metric_samples_total.clone()))?;

        let prediction_events_total = IntCounter::with_opts(
            Opts::new("ingest_prediction_events_total", "Prediction events accepted")
                .namespace("vigil"),
        )?;
        registry.register(Box::new(prediction_events_total.clone()))?;

        let feedback_records_total = IntCounter::with_opts(
            Opts::new("ingest_feedback_records_total", "Feedback records attached")
                .namespace("vigil"),
        )?;
        registry.register(Box::new(feedback_records_total.clone()))?;

        let rejected_total = IntCounterVec::new(
            Opts::new("ingest_rejected_total", "Records rejected at validation")
                .namespace("vigil"),
            &["reason"],
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        Ok(Self {
            metric_samples_total,
            prediction_events_total,
            feedback_records_total,
            rejected_total,
        })
    }
}

/// Evaluation path metrics
pub struct EvaluationMetrics {
    /// Drift evaluations run, by method and outcome
    pub drift_evaluations_total: IntCounterVec,
    /// Health snapshots produced, by overall state
    pub health_snapshots_total: IntCounterVec,
    /// Identities skipped in a cycle for lack of data
    pub insufficient_data_total: IntCounter,
    /// Wall time of a full evaluation cycle (seconds)
    pub cycle_duration_seconds: Histogram,
    /// Model identities known to the engine
    pub tracked_identities: IntGauge,
}

impl EvaluationMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let drift_evaluations_total = IntCounterVec::new(
            Opts::new("drift_evaluations_total", "Drift evaluations run")
                .namespace("vigil"),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(drift_evaluations_total.clone()))?;

        let health_snapshots_total = IntCounterVec::new(
            Opts::new("health_snapshots_total", "Health snapshots produced")
                .namespace("vigil"),
            &["state"],
        )?;
        registry.register(Box::new(health_snapshots_total.clone()))?;

        let insufficient_data_total = IntCounter::with_opts(
            Opts::new(
                "insufficient_data_skips_total",
                "Identities skipped in a cycle for lack of data",
            )
            .namespace("vigil"),
        )?;
        registry.register(Box::new(insufficient_data_total.clone()))?;

        let cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("cycle_duration_seconds", "Evaluation cycle wall time")
                .namespace("vigil")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        let tracked_identities = IntGauge::with_opts(
            Opts::new("tracked_identities", "Model identities known to the engine")
                .namespace("vigil"),
        )?;
        registry.register(Box::new(tracked_identities.clone()))?;

        Ok(Self {
            drift_evaluations_total,
            health_snapshots_total,
            insufficient_data_total,
            cycle_duration_seconds,
            tracked_identities,
        })
    }
}

/// Alert lifecycle metrics
pub struct AlertingMetrics {
    /// Alerts raised, by type and severity
    pub alerts_raised_total: IntCounterVec,
    /// Suppressed duplicate records written
    pub alerts_suppressed_total: IntCounter,
    /// Duplicates absorbed inside the cooldown window
    pub alerts_counted_total: IntCounter,
    /// Alerts closed by the healthy-streak rule
    pub alerts_auto_resolved_total: IntCounter,
    /// Unresolved alerts, by type
    pub active_alerts: IntGaugeVec,
}

impl AlertingMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let alerts_raised_total = IntCounterVec::new(
            Opts::new("alerts_raised_total", "Alerts raised").namespace("vigil"),
            &["type", "severity"],
        )?;
        registry.register(Box::new(alerts_raised_total.clone()))?;

        let alerts_suppressed_total = IntCounter::with_opts(
            Opts::new("alerts_suppressed_total", "Suppressed duplicate records written")
                .namespace("vigil"),
        )?;
        registry.register(Box::new(alerts_suppressed_total.clone()))?;

        let alerts_counted_total = IntCounter::with_opts(
            Opts::new(
                "alerts_counted_total",
                "Duplicates absorbed inside the cooldown window",
            )
            .namespace("vigil"),
        )?;
        registry.register(Box::new(alerts_counted_total.clone()))?;

        let alerts_auto_resolved_total = IntCounter::with_opts(
            Opts::new(
                "alerts_auto_resolved_total",
                "Alerts closed by the healthy-streak rule",
            )
            .namespace("vigil"),
        )?;
        registry.register(Box::new(alerts_auto_resolved_total.clone()))?;

        let active_alerts = IntGaugeVec::new(
            Opts::new("active_alerts", "Unresolved alerts").namespace("vigil"),
            &["type"],
        )?;
        registry.register(Box::new(active_alerts.clone()))?;

        Ok(Self {
            alerts_raised_total,
            alerts_suppressed_total,
            alerts_counted_total,
            alerts_auto_resolved_total,
            active_alerts,
        })
    }
}
