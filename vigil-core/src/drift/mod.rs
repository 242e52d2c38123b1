//! Drift evaluation
//!
//! Compares a reference window against a current window of the same
//! feature/metric streams and produces a `DriftFinding`. Per-feature
//! scores are aggregated with a fixed policy: `drift_score` is the
//! **maximum** per-feature score. A single badly-drifted feature should
//! flag the model; averaging would dilute it across stable features.
//!
//! Evaluation is deterministic and side-effect free: identical reference
//! and current windows always yield `drift_score == 0` and no detection.

use crate::config::DriftConfig;
use crate::errors::{MonitorError, Result};
use crate::types::{DriftMethod, DriftType, TimeWindow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;
use tracing::{debug, info};

/// One feature (or metric stream) to compare across the two windows.
#[derive(Debug, Clone)]
pub struct FeatureSeries {
    pub name: String,
    pub reference: Vec<f64>,
    pub current: Vec<f64>,
}

impl FeatureSeries {
    pub fn new(name: impl Into<String>, reference: Vec<f64>, current: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            reference,
            current,
        }
    }
}

/// Immutable record of one drift evaluation.
///
/// Invariant, enforced at construction: `drift_detected` is exactly
/// `drift_score > threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftFinding {
    pub model_version_id: u64,
    pub timestamp: SystemTime,
    pub drift_type: DriftType,
    pub drift_detected: bool,
    pub drift_score: f64,
    pub threshold: f64,
    pub per_feature_scores: BTreeMap<String, f64>,
    pub test_statistic: f64,
    pub p_value: Option<f64>,
    pub test_method: DriftMethod,
    pub reference_window: TimeWindow,
    pub current_window: TimeWindow,
    pub reference_sample_size: usize,
    pub current_sample_size: usize,
}

/// Stateless evaluator configured once at construction.
pub struct DriftEvaluator {
    config: DriftConfig,
}

impl DriftEvaluator {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Evaluate drift for one model version over a set of feature series.
    ///
    /// Fails with `InsufficientData` when any series (or the feature set
    /// itself) is below `min_sample_size` on either side; a misleading
    /// non-finding is never emitted.
    pub fn evaluate(
        &self,
        model_version_id: u64,
        drift_type: DriftType,
        features: &[FeatureSeries],
        reference_window: TimeWindow,
        current_window: TimeWindow,
    ) -> Result<DriftFinding> {
        if features.is_empty() {
            return Err(MonitorError::InsufficientData {
                feature: "(no features)".to_string(),
                required: self.config.min_sample_size,
                actual: 0,
            });
        }

        let min = self.config.min_sample_size;
        for feature in features {
            let shortest = feature.reference.len().min(feature.current.len());
            if shortest < min {
                return Err(MonitorError::InsufficientData {
                    feature: feature.name.clone(),
                    required: min,
                    actual: shortest,
                });
            }
        }

        let mut per_feature_scores = BTreeMap::new();
        let mut max_score = 0.0f64;
        let mut max_feature: Option<&FeatureSeries> = None;

        for feature in features {
            let score = match self.config.method {
                DriftMethod::PopulationStability => vigil_stats::population_stability_index(
                    &feature.reference,
                    &feature.current,
                    self.config.psi_bins,
                    self.config.epsilon,
                ),
                DriftMethod::KolmogorovSmirnov => {
                    vigil_stats::ks_statistic(&feature.reference, &feature.current)
                }
            };
            debug!(feature = %feature.name, score, method = self.config.method.as_str(), "feature scored");
            per_feature_scores.insert(feature.name.clone(), score);
            if max_feature.is_none() || score > max_score {
                max_score = score;
                max_feature = Some(feature);
            }
        }

        // The p-value belongs to the feature that decided the verdict;
        // PSI is an index, not a hypothesis test, so it carries none.
        let p_value = match (self.config.method, max_feature) {
            (DriftMethod::KolmogorovSmirnov, Some(feature)) => Some(vigil_stats::ks_p_value(
                max_score,
                feature.reference.len(),
                feature.current.len(),
            )),
            _ => None,
        };

        // Sizes reported conservatively: the shortest series per side.
        let reference_sample_size = features.iter().map(|f| f.reference.len()).min().unwrap_or(0);
        let current_sample_size = features.iter().map(|f| f.current.len()).min().unwrap_or(0);

        let drift_detected = max_score > self.config.threshold;
        if drift_detected {
            info!(
                model_version_id,
                drift_type = drift_type.as_str(),
                score = max_score,
                threshold = self.config.threshold,
                "drift detected"
            );
        }

        Ok(DriftFinding {
            model_version_id,
            timestamp: SystemTime::now(),
            drift_type,
            drift_detected,
            drift_score: max_score,
            threshold: self.config.threshold,
            per_feature_scores,
            test_statistic: max_score,
            p_value,
            test_method: self.config.method,
            reference_window,
            current_window,
            reference_sample_size,
            current_sample_size,
        })
    }
}
