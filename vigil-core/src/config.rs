//! Engine configuration
//!
//! Explicit configuration objects passed into each component constructor.
//! There is no process-wide mutable registry: the embedding layer builds a
//! `MonitorConfig` (from its own settings store), validates it, and hands
//! it to `MonitorEngine::new`.

use crate::types::DriftMethod;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the monitoring engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl MonitorConfig {
    /// Validate all sections. Called by `MonitorEngine::new`.
    pub fn validate(&self) -> Result<()> {
        self.drift.validate()?;
        self.health.validate()?;
        self.alerts.validate()?;
        Ok(())
    }
}

/// Drift evaluator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Statistical method for two-sample comparison
    pub method: DriftMethod,

    /// Drift verdict threshold: detected when score > threshold
    pub threshold: f64,

    /// Minimum samples required on each side of the comparison
    pub min_sample_size: usize,

    /// Number of bins for PSI
    pub psi_bins: usize,

    /// Floor for bin proportions (prevents log-of-zero)
    pub epsilon: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            method: DriftMethod::PopulationStability,
            threshold: 0.1,
            min_sample_size: 10,
            psi_bins: 10,
            epsilon: 1e-4,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            anyhow::bail!("drift threshold must be positive, got {}", self.threshold);
        }
        if self.min_sample_size < 2 {
            anyhow::bail!(
                "min_sample_size must be at least 2, got {}",
                self.min_sample_size
            );
        }
        if self.psi_bins == 0 {
            anyhow::bail!("psi_bins must be non-zero");
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            anyhow::bail!("epsilon must be positive, got {}", self.epsilon);
        }
        Ok(())
    }
}

/// Weights for the four component healths in the composite score.
/// Must sum to 1 so the score stays in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthWeights {
    pub prediction: f64,
    pub performance: f64,
    pub resource: f64,
    pub data: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            prediction: 0.25,
            performance: 0.25,
            resource: 0.25,
            data: 0.25,
        }
    }
}

impl HealthWeights {
    pub fn sum(&self) -> f64 {
        self.prediction + self.performance + self.resource + self.data
    }
}

/// Health scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// How far back to look for metric samples
    pub lookback: Duration,

    /// Cap on samples considered per evaluation (most recent first)
    pub max_samples: usize,

    /// Performance metric floor: at or above is healthy
    pub performance_floor: f64,

    /// Soft margin below the floor: within it is degraded, past it unhealthy
    pub performance_soft_margin: f64,

    /// Resource utilization (%) above which a component is degraded
    pub resource_degraded_pct: f64,

    /// Resource utilization (%) above which a component is unhealthy
    pub resource_unhealthy_pct: f64,

    /// Error ratio above which prediction health is degraded
    pub error_rate_soft: f64,

    /// Error ratio above which prediction health is unhealthy
    pub error_rate_hard: f64,

    /// p99 latency SLO in milliseconds (degraded past 1x, unhealthy past 2x)
    pub latency_slo_ms: f64,

    /// Drift score beyond `multiplier * threshold` marks data health unhealthy
    pub severe_drift_multiplier: f64,

    /// Component weights for the composite score
    pub weights: HealthWeights,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            lookback: Duration::from_secs(3600),
            max_samples: 100,
            performance_floor: 0.85,
            performance_soft_margin: 0.05,
            resource_degraded_pct: 85.0,
            resource_unhealthy_pct: 95.0,
            error_rate_soft: 0.05,
            error_rate_hard: 0.10,
            latency_slo_ms: 1000.0,
            severe_drift_multiplier: 2.0,
            weights: HealthWeights::default(),
        }
    }
}

impl HealthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lookback.is_zero() {
            anyhow::bail!("health lookback must be non-zero");
        }
        if self.max_samples == 0 {
            anyhow::bail!("max_samples must be non-zero");
        }
        if !(0.0..=1.0).contains(&self.performance_floor) {
            anyhow::bail!(
                "performance_floor must be in [0, 1], got {}",
                self.performance_floor
            );
        }
        if self.performance_soft_margin < 0.0 || self.performance_soft_margin > 1.0 {
            anyhow::bail!(
                "performance_soft_margin must be in [0, 1], got {}",
                self.performance_soft_margin
            );
        }
        if self.resource_degraded_pct >= self.resource_unhealthy_pct {
            anyhow::bail!(
                "resource_degraded_pct ({}) must be below resource_unhealthy_pct ({})",
                self.resource_degraded_pct,
                self.resource_unhealthy_pct
            );
        }
        if self.error_rate_soft >= self.error_rate_hard {
            anyhow::bail!(
                "error_rate_soft ({}) must be below error_rate_hard ({})",
                self.error_rate_soft,
                self.error_rate_hard
            );
        }
        if self.latency_slo_ms <= 0.0 {
            anyhow::bail!("latency_slo_ms must be positive, got {}", self.latency_slo_ms);
        }
        if self.severe_drift_multiplier <= 1.0 {
            anyhow::bail!(
                "severe_drift_multiplier must exceed 1, got {}",
                self.severe_drift_multiplier
            );
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            anyhow::bail!("component health weights must sum to 1, got {}", sum);
        }
        Ok(())
    }
}

/// Alert manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Minimum time between recording duplicate alerts for one identity
    pub cooldown: Duration,

    /// Consecutive healthy evaluations required to auto-resolve an alert
    pub auto_resolve_streak: u32,

    /// Drift score / threshold ratio breakpoints for severity
    /// (medium, high, critical); below medium is low.
    pub drift_ratio_breakpoints: [f64; 3],

    /// Health score breakpoints for severity (critical below, high below,
    /// medium below); at or above the last is low.
    pub health_score_breakpoints: [f64; 3],
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(300),
            auto_resolve_streak: 5,
            drift_ratio_breakpoints: [1.5, 2.0, 3.0],
            health_score_breakpoints: [25.0, 50.0, 75.0],
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<()> {
        if self.auto_resolve_streak == 0 {
            anyhow::bail!("auto_resolve_streak must be non-zero");
        }
        let [m, h, c] = self.drift_ratio_breakpoints;
        if !(m < h && h < c) {
            anyhow::bail!(
                "drift_ratio_breakpoints must be strictly increasing, got [{}, {}, {}]",
                m,
                h,
                c
            );
        }
        let [c, h, m] = self.health_score_breakpoints;
        if !(c < h && h < m) {
            anyhow::bail!(
                "health_score_breakpoints must be strictly increasing, got [{}, {}, {}]",
                c,
                h,
                m
            );
        }
        Ok(())
    }
}
