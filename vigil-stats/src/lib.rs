//! Statistical primitives for drift evaluation
//!
//! Pure two-sample comparison and summary statistics used by the drift
//! evaluator:
//! - Two-sample Kolmogorov-Smirnov distance with asymptotic p-value
//! - Population Stability Index (PSI) over fixed-width bins
//! - Summary statistics (mean, standard deviation, percentiles)
//!
//! No engine types, no I/O. Every function is deterministic: the same
//! input slices always produce the same score.

pub mod psi;
pub mod summary;
pub mod two_sample;

pub use psi::population_stability_index;
pub use summary::{mean, percentile, std_dev};
pub use two_sample::{ks_p_value, ks_statistic};
