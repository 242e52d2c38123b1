//! Prediction event log
//!
//! Append-only log of individual prediction events. An event is immutable
//! after creation except for one allowed feedback update, which sets the
//! actual outcome exactly once.

use crate::errors::{MonitorError, Result};
use crate::types::{FeedbackSource, ModelKey, TimeWindow};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::debug;

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// One logged prediction. Inputs are stored hashed; only feature names
/// (not values) travel with the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEvent {
    pub request_id: String,
    pub model_version_id: u64,
    pub deployment_id: u64,
    pub timestamp: SystemTime,

    pub input_hash: String,
    pub input_feature_names: BTreeSet<String>,

    pub prediction: serde_json::Value,
    pub probabilities: HashMap<String, f64>,
    pub confidence_score: f64,
    pub latency_ms: f64,

    // Feedback, set at most once via `PredictionLog::record_feedback`
    pub actual_outcome: Option<serde_json::Value>,
    pub feedback_timestamp: Option<SystemTime>,
    pub feedback_source: Option<FeedbackSource>,
}

impl PredictionEvent {
    pub fn new(
        request_id: impl Into<String>,
        model_version_id: u64,
        deployment_id: u64,
        timestamp: SystemTime,
        prediction: serde_json::Value,
        confidence_score: f64,
        latency_ms: f64,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            model_version_id,
            deployment_id,
            timestamp,
            input_hash: String::new(),
            input_feature_names: BTreeSet::new(),
            prediction,
            probabilities: HashMap::new(),
            confidence_score,
            latency_ms,
            actual_outcome: None,
            feedback_timestamp: None,
            feedback_source: None,
        }
    }

    pub fn key(&self) -> ModelKey {
        ModelKey::new(self.model_version_id, self.deployment_id)
    }

    pub fn with_input(
        mut self,
        hash: impl Into<String>,
        feature_names: impl IntoIterator<Item = String>,
    ) -> Self {
        self.input_hash = hash.into();
        self.input_feature_names = feature_names.into_iter().collect();
        self
    }

    pub fn with_probability(mut self, label: impl Into<String>, p: f64) -> Self {
        self.probabilities.insert(label.into(), p);
        self
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback_timestamp.is_some()
    }

    fn validate(&self) -> Result<()> {
        if self.request_id.is_empty() {
            return Err(MonitorError::validation("request_id", "must not be empty"));
        }
        if !self.confidence_score.is_finite() || !(0.0..=1.0).contains(&self.confidence_score) {
            return Err(MonitorError::validation(
                "confidence_score",
                format!("{} is outside [0, 1]", self.confidence_score),
            ));
        }
        if !self.latency_ms.is_finite() || self.latency_ms < 0.0 {
            return Err(MonitorError::validation(
                "latency_ms",
                format!("{} must be finite and non-negative", self.latency_ms),
            ));
        }
        if !self.probabilities.is_empty() {
            let mut sum = 0.0;
            for (label, p) in &self.probabilities {
                if !p.is_finite() || !(0.0..=1.0).contains(p) {
                    return Err(MonitorError::validation(
                        "probabilities",
                        format!("label '{}' has probability {} outside [0, 1]", label, p),
                    ));
                }
                sum += p;
            }
            if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                return Err(MonitorError::validation(
                    "probabilities",
                    format!("probabilities sum to {}, expected 1", sum),
                ));
            }
        }
        Ok(())
    }
}

/// Append-only prediction log with a request-id index for feedback.
pub struct PredictionLog {
    by_key: DashMap<ModelKey, RwLock<Vec<PredictionEvent>>>,
    request_index: DashMap<String, ModelKey>,
    total: AtomicU64,
}

impl PredictionLog {
    pub fn new() -> Self {
        Self {
            by_key: DashMap::new(),
            request_index: DashMap::new(),
            total: AtomicU64::new(0),
        }
    }

    /// Validate and append an event. Duplicate request ids are rejected;
    /// nothing is stored on failure.
    pub fn append(&self, event: PredictionEvent) -> Result<PredictionEvent> {
        event.validate()?;

        let key = event.key();
        match self.request_index.entry(event.request_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(MonitorError::validation(
                    "request_id",
                    format!("duplicate request id '{}'", event.request_id),
                ));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(key);
            }
        }

        let entry = self.by_key.entry(key).or_insert_with(|| RwLock::new(Vec::new()));
        let mut events = entry.write();
        let idx = events.partition_point(|e| e.timestamp <= event.timestamp);
        events.insert(idx, event.clone());
        drop(events);
        self.total.fetch_add(1, Ordering::Relaxed);

        debug!(model = %key, request_id = %event.request_id, "prediction logged");
        Ok(event)
    }

    /// Apply the one allowed feedback update to an event.
    ///
    /// Fails with `NotFound` for an unknown request id and with
    /// `InvalidTransition` when feedback was already recorded.
    pub fn record_feedback(
        &self,
        request_id: &str,
        outcome: serde_json::Value,
        source: FeedbackSource,
    ) -> Result<PredictionEvent> {
        let key = *self
            .request_index
            .get(request_id)
            .ok_or_else(|| MonitorError::NotFound {
                entity: "prediction",
                id: request_id.to_string(),
            })?;

        let entry = self.by_key.get(&key).ok_or_else(|| MonitorError::NotFound {
            entity: "prediction",
            id: request_id.to_string(),
        })?;
        let mut events = entry.write();
        let event = events
            .iter_mut()
            .find(|e| e.request_id == request_id)
            .ok_or_else(|| MonitorError::NotFound {
                entity: "prediction",
                id: request_id.to_string(),
            })?;

        if event.has_feedback() {
            return Err(MonitorError::InvalidTransition {
                subject: format!("prediction {}", request_id),
                detail: "feedback already recorded".to_string(),
            });
        }

        event.actual_outcome = Some(outcome);
        event.feedback_timestamp = Some(SystemTime::now());
        event.feedback_source = Some(source);

        debug!(request_id, source = source.as_str(), "feedback recorded");
        Ok(event.clone())
    }

    /// Time-ascending events matching the window. A `None` deployment
    /// matches every deployment of the model version. Returns an owned
    /// snapshot: no store lock is held once the call returns, so callers
    /// can iterate while appends continue.
    pub fn query(
        &self,
        model_version_id: u64,
        deployment_id: Option<u64>,
        window: TimeWindow,
    ) -> Vec<PredictionEvent> {
        let mut out: Vec<PredictionEvent> = Vec::new();
        match deployment_id {
            Some(dep) => {
                if let Some(entry) = self.by_key.get(&ModelKey::new(model_version_id, dep)) {
                    let events = entry.read();
                    out.extend(events.iter().filter(|e| window.contains(e.timestamp)).cloned());
                }
            }
            None => {
                for entry in self.by_key.iter() {
                    if entry.key().model_version_id == model_version_id {
                        let events = entry.value().read();
                        out.extend(events.iter().filter(|e| window.contains(e.timestamp)).cloned());
                    }
                }
                out.sort_by_key(|e| e.timestamp);
            }
        }
        out
    }

    /// Most recent `n` events for an identity, time-ascending.
    pub fn last_n(&self, key: ModelKey, n: usize) -> Vec<PredictionEvent> {
        match self.by_key.get(&key) {
            Some(entry) => {
                let events = entry.read();
                let start = events.len().saturating_sub(n);
                events[start..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Confidence scores within a window, time-ascending.
    pub fn confidence_series(&self, key: ModelKey, window: TimeWindow) -> Vec<f64> {
        self.series(key, window, |e| Some(e.confidence_score))
    }

    /// Latencies (ms) within a window, time-ascending.
    pub fn latency_series(&self, key: ModelKey, window: TimeWindow) -> Vec<f64> {
        self.series(key, window, |e| Some(e.latency_ms))
    }

    /// Per-label probability stream within a window; events without the
    /// label are skipped.
    pub fn probability_series(&self, key: ModelKey, label: &str, window: TimeWindow) -> Vec<f64> {
        self.series(key, window, |e| e.probabilities.get(label).copied())
    }

    /// Labels seen in any probability map for this identity.
    pub fn probability_labels(&self, key: ModelKey) -> BTreeSet<String> {
        match self.by_key.get(&key) {
            Some(entry) => entry
                .read()
                .iter()
                .flat_map(|e| e.probabilities.keys().cloned())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    fn series<F>(&self, key: ModelKey, window: TimeWindow, extract: F) -> Vec<f64>
    where
        F: Fn(&PredictionEvent) -> Option<f64>,
    {
        match self.by_key.get(&key) {
            Some(entry) => entry
                .read()
                .iter()
                .filter(|e| window.contains(e.timestamp))
                .filter_map(extract)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.total.load(Ordering::Relaxed) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identities with at least one logged prediction.
    pub fn identities(&self) -> Vec<ModelKey> {
        self.by_key.iter().map(|e| *e.key()).collect()
    }
}

impl Default for PredictionLog {
    fn default() -> Self {
        Self::new()
    }
}
