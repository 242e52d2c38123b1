//! Metric sample store
//!
//! Append-only, time-ordered log of per-deployment performance and
//! resource samples. Appends for different identities never contend; a
//! per-identity index keeps window queries cheap.

use crate::errors::{MonitorError, Result};
use crate::types::{ModelKey, TimeWindow};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// One operational sample for a deployed model version.
///
/// Immutable once appended. Performance rates live in [0, 1], resource
/// utilization in [0, 100], latencies in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub model_version_id: u64,
    pub deployment_id: u64,
    pub timestamp: SystemTime,

    // Performance metrics (absent when no ground truth is available yet)
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1_score: Option<f64>,
    pub auc_score: Option<f64>,

    // Operational counters for the sample interval
    pub prediction_count: u64,
    pub error_count: u64,

    // Latency percentiles in milliseconds
    pub avg_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<f64>,
    pub p99_latency_ms: Option<f64>,

    // Resource utilization in percent
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
    pub gpu_usage: Option<f64>,

    pub custom_metrics: HashMap<String, f64>,
}

impl MetricSample {
    pub fn new(model_version_id: u64, deployment_id: u64, timestamp: SystemTime) -> Self {
        Self {
            model_version_id,
            deployment_id,
            timestamp,
            accuracy: None,
            precision: None,
            recall: None,
            f1_score: None,
            auc_score: None,
            prediction_count: 0,
            error_count: 0,
            avg_latency_ms: None,
            p95_latency_ms: None,
            p99_latency_ms: None,
            cpu_usage: None,
            memory_usage: None,
            gpu_usage: None,
            custom_metrics: HashMap::new(),
        }
    }

    pub fn key(&self) -> ModelKey {
        ModelKey::new(self.model_version_id, self.deployment_id)
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_recall(mut self, recall: f64) -> Self {
        self.recall = Some(recall);
        self
    }

    pub fn with_f1(mut self, f1: f64) -> Self {
        self.f1_score = Some(f1);
        self
    }

    pub fn with_auc(mut self, auc: f64) -> Self {
        self.auc_score = Some(auc);
        self
    }

    pub fn with_counts(mut self, predictions: u64, errors: u64) -> Self {
        self.prediction_count = predictions;
        self.error_count = errors;
        self
    }

    pub fn with_latency(mut self, avg_ms: f64, p95_ms: f64, p99_ms: f64) -> Self {
        self.avg_latency_ms = Some(avg_ms);
        self.p95_latency_ms = Some(p95_ms);
        self.p99_latency_ms = Some(p99_ms);
        self
    }

    pub fn with_resources(mut self, cpu: f64, memory: f64, gpu: f64) -> Self {
        self.cpu_usage = Some(cpu);
        self.memory_usage = Some(memory);
        self.gpu_usage = Some(gpu);
        self
    }

    pub fn with_custom_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.custom_metrics.insert(name.into(), value);
        self
    }

    fn validate(&self) -> Result<()> {
        check_unit_range("accuracy", self.accuracy)?;
        check_unit_range("precision", self.precision)?;
        check_unit_range("recall", self.recall)?;
        check_unit_range("f1_score", self.f1_score)?;
        check_unit_range("auc_score", self.auc_score)?;

        check_non_negative("avg_latency_ms", self.avg_latency_ms)?;
        check_non_negative("p95_latency_ms", self.p95_latency_ms)?;
        check_non_negative("p99_latency_ms", self.p99_latency_ms)?;

        check_percent_range("cpu_usage", self.cpu_usage)?;
        check_percent_range("memory_usage", self.memory_usage)?;
        check_percent_range("gpu_usage", self.gpu_usage)?;

        for (name, value) in &self.custom_metrics {
            if !value.is_finite() {
                return Err(MonitorError::validation(
                    "custom_metrics",
                    format!("metric '{}' is not finite", name),
                ));
            }
        }

        Ok(())
    }
}

fn check_unit_range(field: &'static str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(MonitorError::validation(
                field,
                format!("{} is outside [0, 1]", v),
            ));
        }
    }
    Ok(())
}

fn check_percent_range(field: &'static str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            return Err(MonitorError::validation(
                field,
                format!("{} is outside [0, 100]", v),
            ));
        }
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            return Err(MonitorError::validation(
                field,
                format!("{} must be finite and non-negative", v),
            ));
        }
    }
    Ok(())
}

/// Append-only store of metric samples, indexed per identity.
pub struct MetricStore {
    by_key: DashMap<ModelKey, Vec<Arc<MetricSample>>>,
    total: AtomicU64,
}

impl MetricStore {
    pub fn new() -> Self {
        Self {
            by_key: DashMap::new(),
            total: AtomicU64::new(0),
        }
    }

    /// Validate and append a sample. Nothing is stored on failure.
    pub fn append(&self, sample: MetricSample) -> Result<Arc<MetricSample>> {
        sample.validate()?;

        let key = sample.key();
        let sample = Arc::new(sample);
        let mut entries = self.by_key.entry(key).or_default();

        // Samples usually arrive in order; insert-sorted keeps queries a
        // plain slice walk when they do not.
        let idx = entries.partition_point(|e| e.timestamp <= sample.timestamp);
        entries.insert(idx, Arc::clone(&sample));
        self.total.fetch_add(1, Ordering::Relaxed);

        debug!(model = %key, "metric sample appended");
        Ok(sample)
    }

    /// Time-ascending samples matching the window. A `None` deployment
    /// matches every deployment of the model version. Returns an owned
    /// snapshot: no store lock is held once the call returns, so callers
    /// can iterate while appends continue.
    pub fn query(
        &self,
        model_version_id: u64,
        deployment_id: Option<u64>,
        window: TimeWindow,
    ) -> Vec<Arc<MetricSample>> {
        let mut out: Vec<Arc<MetricSample>> = Vec::new();
        match deployment_id {
            Some(dep) => {
                if let Some(entries) = self.by_key.get(&ModelKey::new(model_version_id, dep)) {
                    out.extend(
                        entries
                            .iter()
                            .filter(|s| window.contains(s.timestamp))
                            .cloned(),
                    );
                }
            }
            None => {
                for entry in self.by_key.iter() {
                    if entry.key().model_version_id == model_version_id {
                        out.extend(
                            entry
                                .value()
                                .iter()
                                .filter(|s| window.contains(s.timestamp))
                                .cloned(),
                        );
                    }
                }
                out.sort_by_key(|s| s.timestamp);
            }
        }
        out
    }

    /// Most recent `n` samples for an identity, time-ascending.
    pub fn last_n(&self, key: ModelKey, n: usize) -> Vec<Arc<MetricSample>> {
        match self.by_key.get(&key) {
            Some(entries) => {
                let start = entries.len().saturating_sub(n);
                entries[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Total samples ever appended.
    pub fn len(&self) -> usize {
        self.total.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identities with at least one sample.
    pub fn identities(&self) -> Vec<ModelKey> {
        self.by_key.iter().map(|e| *e.key()).collect()
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ts(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_append_and_query_window() {
        let store = MetricStore::new();
        for i in 0..10 {
            store
                .append(MetricSample::new(1, 1, ts(100 + i)).with_accuracy(0.9))
                .unwrap();
        }

        let window = TimeWindow::new(ts(103), ts(107));
        let samples = store.query(1, Some(1), window);
        assert_eq!(samples.len(), 4);
        assert!(samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_out_of_order_append_stays_sorted() {
        let store = MetricStore::new();
        store.append(MetricSample::new(1, 1, ts(300))).unwrap();
        store.append(MetricSample::new(1, 1, ts(100))).unwrap();
        store.append(MetricSample::new(1, 1, ts(200))).unwrap();

        let samples = store.last_n(ModelKey::new(1, 1), 10);
        let stamps: Vec<_> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![ts(100), ts(200), ts(300)]);
    }

    #[test]
    fn test_query_across_deployments_merges_sorted() {
        let store = MetricStore::new();
        store.append(MetricSample::new(1, 1, ts(100))).unwrap();
        store.append(MetricSample::new(1, 2, ts(50))).unwrap();
        store.append(MetricSample::new(2, 1, ts(75))).unwrap();

        let window = TimeWindow::new(ts(0), ts(1000));
        let samples = store.query(1, None, window);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, ts(50));
        assert_eq!(samples[1].timestamp, ts(100));
    }

    #[test]
    fn test_rejects_out_of_range_accuracy() {
        let store = MetricStore::new();
        let err = store
            .append(MetricSample::new(1, 1, ts(100)).with_accuracy(1.5))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation { field: "accuracy", .. }));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_rejects_negative_latency_and_nan_custom_metric() {
        let store = MetricStore::new();
        let err = store
            .append(MetricSample::new(1, 1, ts(100)).with_latency(-1.0, 2.0, 3.0))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation { .. }));

        let err = store
            .append(MetricSample::new(1, 1, ts(100)).with_custom_metric("rps", f64::NAN))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation { field: "custom_metrics", .. }));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_rejects_resource_over_100pct() {
        let store = MetricStore::new();
        let err = store
            .append(MetricSample::new(1, 1, ts(100)).with_resources(50.0, 120.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation { field: "memory_usage", .. }));
    }

    #[test]
    fn test_last_n_returns_most_recent() {
        let store = MetricStore::new();
        for i in 0..20 {
            store.append(MetricSample::new(1, 1, ts(i))).unwrap();
        }
        let samples = store.last_n(ModelKey::new(1, 1), 5);
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].timestamp, ts(15));
        assert_eq!(samples[4].timestamp, ts(19));
    }
}
