//! Domain error taxonomy for the monitoring engine
//!
//! Four failure kinds cover every error the core can produce. Store
//! validation failures are never partially applied; evaluator failures are
//! isolated per identity by the engine and do not stop other identities.

use thiserror::Error;

/// Errors produced by the monitoring core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// Malformed or out-of-range input to an append operation. The record
    /// is rejected and nothing is stored.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A drift window is too small for a statistically meaningful
    /// comparison. The evaluation is skipped for this cycle, not faked.
    #[error("insufficient data for '{feature}': need {required} samples, got {actual}")]
    InsufficientData {
        feature: String,
        required: usize,
        actual: usize,
    },

    /// An action referenced an unknown entity.
    #[error("unknown {entity}: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A state-machine rule was violated (e.g. resolving an alert that is
    /// already resolved, or recording feedback twice).
    #[error("invalid transition for {subject}: {detail}")]
    InvalidTransition { subject: String, detail: String },
}

impl MonitorError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, MonitorError>;
