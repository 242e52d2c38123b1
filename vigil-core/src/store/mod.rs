//! Append-only stores for operational signal
//!
//! Two stores feed the evaluators: per-deployment metric samples and
//! individual prediction events. Both validate on append, never mutate
//! past entries (the single prediction feedback update excepted), and
//! serve time-ascending window and last-N queries.

pub mod metrics;
pub mod predictions;

pub use metrics::{MetricSample, MetricStore};
pub use predictions::{PredictionEvent, PredictionLog};
