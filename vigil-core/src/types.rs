//! Core identity and classification types
//!
//! Every "type-ish" string in the original data model is a closed enum
//! here so the health scorer and alert manager can match exhaustively.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Evaluation identity: one deployed model version.
///
/// All per-identity state (health snapshots, alert lifecycle, evaluation
/// serialization) is keyed by this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    pub model_version_id: u64,
    pub deployment_id: u64,
}

impl ModelKey {
    pub fn new(model_version_id: u64, deployment_id: u64) -> Self {
        Self {
            model_version_id,
            deployment_id,
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {} / deployment {}", self.model_version_id, self.deployment_id)
    }
}

/// Half-open time range `[start, end)` over which samples are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: SystemTime,
    pub end: SystemTime,
}

impl TimeWindow {
    pub fn new(start: SystemTime, end: SystemTime) -> Self {
        Self { start, end }
    }

    /// Window ending now and spanning `duration` backwards.
    pub fn last(duration: Duration) -> Self {
        let end = SystemTime::now();
        let start = end.checked_sub(duration).unwrap_or(SystemTime::UNIX_EPOCH);
        Self { start, end }
    }

    pub fn contains(&self, t: SystemTime) -> bool {
        t >= self.start && t < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start).unwrap_or_default()
    }
}

/// Tri-state health verdict. Ordering is by badness: Unhealthy > Degraded
/// > Healthy, so `max` picks the worst of two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Healthy = 0,
    Degraded = 1,
    Unhealthy = 2,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// What kind of distribution shift a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriftType {
    /// Input feature distribution changed
    Data,
    /// Relationship between inputs and outcomes changed
    Concept,
    /// Output/prediction distribution changed
    Prediction,
}

impl DriftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Concept => "concept",
            Self::Prediction => "prediction",
        }
    }
}

/// Statistical method used for a drift comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriftMethod {
    /// Population Stability Index over fixed-width bins
    PopulationStability,
    /// Two-sample Kolmogorov-Smirnov distance
    KolmogorovSmirnov,
}

impl DriftMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PopulationStability => "psi",
            Self::KolmogorovSmirnov => "ks_test",
        }
    }
}

/// Alert classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertType {
    Performance,
    Drift,
    Error,
    Resource,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Drift => "drift",
            Self::Error => "error",
            Self::Resource => "resource",
        }
    }
}

/// Alert severity levels. Ordered so `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Alert lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Suppressed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
            Self::Suppressed => "suppressed",
        }
    }

    /// Unresolved means the underlying condition is still considered open.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Active | Self::Acknowledged)
    }
}

/// Which part of the engine produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceComponent {
    DriftEvaluator,
    HealthScorer,
}

impl SourceComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriftEvaluator => "drift_evaluator",
            Self::HealthScorer => "health_scorer",
        }
    }
}

/// Where a prediction feedback record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackSource {
    User,
    System,
    BatchUpdate,
}

impl FeedbackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
            Self::BatchUpdate => "batch_update",
        }
    }
}
