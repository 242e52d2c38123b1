//! Health scoring
//!
//! Reduces recent metric samples and the latest drift finding into one
//! composite snapshot per identity. Four component verdicts are computed
//! independently; the overall state is the worst of the four and the
//! score is 100 minus a weighted penalty sum, so it stays in [0, 100]
//! as long as the configured weights sum to 1.

use crate::config::HealthConfig;
use crate::drift::DriftFinding;
use crate::store::MetricSample;
use crate::types::{HealthState, ModelKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Per-component verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub prediction: HealthState,
    pub performance: HealthState,
    pub resource: HealthState,
    pub data: HealthState,
}

impl ComponentHealth {
    pub fn uniform(state: HealthState) -> Self {
        Self {
            prediction: state,
            performance: state,
            resource: state,
            data: state,
        }
    }

    /// Worst of the four component states.
    pub fn worst(&self) -> HealthState {
        self.prediction
            .max(self.performance)
            .max(self.resource)
            .max(self.data)
    }
}

/// Composite health status for one identity at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub model_version_id: u64,
    pub deployment_id: u64,
    pub timestamp: SystemTime,
    pub overall_health: HealthState,
    /// 0-100 composite; 100 means every component is healthy
    pub health_score: f64,
    pub components: ComponentHealth,
    /// Set when the verdict comes from a rule rather than measurement
    /// (e.g. no samples in the lookback window)
    pub reason: Option<String>,
}

fn penalty(state: HealthState) -> f64 {
    match state {
        HealthState::Healthy => 0.0,
        HealthState::Degraded => 50.0,
        HealthState::Unhealthy => 100.0,
    }
}

/// Stateless scorer configured once at construction.
pub struct HealthScorer {
    config: HealthConfig,
}

impl HealthScorer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Score one identity from its recent samples and latest finding.
    ///
    /// An empty lookback window is an unhealthy verdict in its own right:
    /// a stale model must not appear silently healthy.
    pub fn score(
        &self,
        key: ModelKey,
        samples: &[Arc<MetricSample>],
        latest_finding: Option<&DriftFinding>,
    ) -> HealthSnapshot {
        if samples.is_empty() {
            warn!(model = %key, "no metric samples in lookback window");
            return HealthSnapshot {
                model_version_id: key.model_version_id,
                deployment_id: key.deployment_id,
                timestamp: SystemTime::now(),
                overall_health: HealthState::Unhealthy,
                health_score: 0.0,
                components: ComponentHealth::uniform(HealthState::Unhealthy),
                reason: Some("no metric samples in lookback window".to_string()),
            };
        }

        let components = ComponentHealth {
            prediction: self.assess_prediction(samples),
            performance: self.assess_performance(samples),
            resource: self.assess_resource(samples),
            data: self.assess_data(latest_finding),
        };

        let weights = &self.config.weights;
        let weighted_penalty = weights.prediction * penalty(components.prediction)
            + weights.performance * penalty(components.performance)
            + weights.resource * penalty(components.resource)
            + weights.data * penalty(components.data);
        let health_score = (100.0 - weighted_penalty).clamp(0.0, 100.0);
        let overall_health = components.worst();

        debug!(
            model = %key,
            overall = overall_health.as_str(),
            score = health_score,
            "health scored"
        );

        HealthSnapshot {
            model_version_id: key.model_version_id,
            deployment_id: key.deployment_id,
            timestamp: SystemTime::now(),
            overall_health,
            health_score,
            components,
            reason: None,
        }
    }

    /// Performance vs the configured floor, using the first performance
    /// metric with data (accuracy, then precision, recall, f1). No
    /// performance metrics at all is healthy: ground truth is sparse in
    /// production and its absence is not a regression.
    fn assess_performance(&self, samples: &[Arc<MetricSample>]) -> HealthState {
        let extractors: [fn(&MetricSample) -> Option<f64>; 4] = [
            |s| s.accuracy,
            |s| s.precision,
            |s| s.recall,
            |s| s.f1_score,
        ];
        let metric = extractors.iter().find_map(|extract| {
            let values: Vec<f64> = samples.iter().filter_map(|s| extract(s)).collect();
            if values.is_empty() {
                None
            } else {
                Some(vigil_stats::mean(&values))
            }
        });

        match metric {
            None => HealthState::Healthy,
            Some(value) => {
                let floor = self.config.performance_floor;
                if value >= floor {
                    HealthState::Healthy
                } else if value >= floor - self.config.performance_soft_margin {
                    HealthState::Degraded
                } else {
                    HealthState::Unhealthy
                }
            }
        }
    }

    /// Peak mean utilization across cpu/memory/gpu against the configured
    /// limits. No utilization data is healthy.
    fn assess_resource(&self, samples: &[Arc<MetricSample>]) -> HealthState {
        let mut peak: Option<f64> = None;
        let extractors: [fn(&MetricSample) -> Option<f64>; 3] =
            [|s| s.cpu_usage, |s| s.memory_usage, |s| s.gpu_usage];
        for extract in extractors {
            let values: Vec<f64> = samples.iter().filter_map(|s| extract(s)).collect();
            if !values.is_empty() {
                let m = vigil_stats::mean(&values);
                peak = Some(peak.map_or(m, |p: f64| p.max(m)));
            }
        }

        match peak {
            None => HealthState::Healthy,
            Some(usage) if usage > self.config.resource_unhealthy_pct => HealthState::Unhealthy,
            Some(usage) if usage > self.config.resource_degraded_pct => HealthState::Degraded,
            Some(_) => HealthState::Healthy,
        }
    }

    /// Error ratio and p99 latency against the configured SLOs.
    fn assess_prediction(&self, samples: &[Arc<MetricSample>]) -> HealthState {
        let predictions: u64 = samples.iter().map(|s| s.prediction_count).sum();
        let errors: u64 = samples.iter().map(|s| s.error_count).sum();
        let error_ratio = if predictions > 0 {
            errors as f64 / predictions as f64
        } else {
            0.0
        };

        let p99_values: Vec<f64> = samples.iter().filter_map(|s| s.p99_latency_ms).collect();
        let p99 = if p99_values.is_empty() {
            0.0
        } else {
            vigil_stats::mean(&p99_values)
        };

        let slo = self.config.latency_slo_ms;
        if error_ratio > self.config.error_rate_hard || p99 > 2.0 * slo {
            HealthState::Unhealthy
        } else if error_ratio > self.config.error_rate_soft || p99 > slo {
            HealthState::Degraded
        } else {
            HealthState::Healthy
        }
    }

    /// Latest drift verdict: detected drift degrades data health, drift
    /// far past the threshold is unhealthy.
    fn assess_data(&self, latest_finding: Option<&DriftFinding>) -> HealthState {
        match latest_finding {
            None => HealthState::Healthy,
            Some(finding) if !finding.drift_detected => HealthState::Healthy,
            Some(finding) => {
                let severe = self.config.severe_drift_multiplier * finding.threshold;
                if finding.drift_score > severe {
                    HealthState::Unhealthy
                } else {
                    HealthState::Degraded
                }
            }
        }
    }
}
