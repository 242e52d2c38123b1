//! Vigil Core - Model Monitoring and Drift Evaluation Engine
//!
//! Vigil watches deployed ML model versions: it ingests operational
//! metric samples and prediction events, computes statistical drift
//! between a reference window and a current window, derives a composite
//! health score, and drives an alert lifecycle (raise, deduplicate,
//! acknowledge, resolve, suppress).
//!
//! ## Architecture
//! - **Append-only stores** for raw input; derived records owned by the engine
//! - **Per-identity serialization** via a lock arena; appends run in parallel
//! - **Pure statistics** live in the `vigil-stats` crate (KS test, PSI)
//! - **Isolated failures**: one identity's bad cycle never blocks another
//!
//! ## Core Modules
//! - `types`: shared identifiers, windows, and state enums
//! - `store`: metric sample store and prediction log
//! - `drift`: drift evaluator producing `DriftFinding` records
//! - `health`: component health assessment and composite scoring
//! - `alerting`: alert state machine with dedup and auto-resolution
//! - `engine`: the facade wiring ingestion, evaluation, and actions

pub mod alerting;
pub mod config;
pub mod drift;
pub mod engine;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod store;
pub mod types;

pub use alerting::{Alert, AlertAction, AlertKey, AlertManager};
pub use config::{AlertConfig, DriftConfig, HealthConfig, HealthWeights, MonitorConfig};
pub use drift::{DriftEvaluator, DriftFinding, FeatureSeries};
pub use engine::{CycleReport, DashboardOverview, MonitorEngine};
pub use errors::{MonitorError, Result};
pub use health::{ComponentHealth, HealthScorer, HealthSnapshot};
pub use metrics::EngineMetrics;
pub use store::{MetricSample, MetricStore, PredictionEvent, PredictionLog};
pub use types::{
    AlertSeverity, AlertStatus, AlertType, DriftMethod, DriftType, FeedbackSource, HealthState,
    ModelKey, SourceComponent, TimeWindow,
};
