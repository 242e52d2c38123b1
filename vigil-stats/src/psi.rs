//! Population Stability Index
//!
//! PSI compares two samples of the same quantity by binning both over the
//! combined value range and summing `(p_i - q_i) * ln(p_i / q_i)` over the
//! bin proportions. Conventional reading: < 0.1 stable, 0.1-0.25 moderate
//! shift, > 0.25 significant shift.

/// Compute PSI between a reference sample and a current sample.
///
/// Bins are fixed-width over the combined min/max range. Bin proportions
/// are floored at `epsilon` so empty bins cannot produce infinities.
/// Identical samples yield exactly 0.0, as does a degenerate range where
/// every value is (numerically) the same.
pub fn population_stability_index(
    reference: &[f64],
    current: &[f64],
    bins: usize,
    epsilon: f64,
) -> f64 {
    if reference.is_empty() || current.is_empty() || bins == 0 {
        return 0.0;
    }

    let mut min_val = f64::INFINITY;
    let mut max_val = f64::NEG_INFINITY;
    for &v in reference.iter().chain(current.iter()) {
        min_val = min_val.min(v);
        max_val = max_val.max(v);
    }

    // All values numerically equal: the distributions cannot differ.
    if (max_val - min_val).abs() < epsilon {
        return 0.0;
    }

    let bin_width = (max_val - min_val) / bins as f64;
    let mut ref_counts = vec![0usize; bins];
    let mut cur_counts = vec![0usize; bins];

    for &v in reference {
        let bin = (((v - min_val) / bin_width).floor() as usize).min(bins - 1);
        ref_counts[bin] += 1;
    }
    for &v in current {
        let bin = (((v - min_val) / bin_width).floor() as usize).min(bins - 1);
        cur_counts[bin] += 1;
    }

    let ref_total = reference.len() as f64;
    let cur_total = current.len() as f64;

    let mut psi = 0.0;
    for bin in 0..bins {
        let p = ref_counts[bin] as f64 / ref_total;
        let q = cur_counts[bin] as f64 / cur_total;
        if (p - q).abs() < f64::EPSILON {
            continue;
        }
        let p = p.max(epsilon);
        let q = q.max(epsilon);
        psi += (p - q) * (p / q).ln();
    }

    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BINS: usize = 10;
    const EPS: f64 = 1e-4;

    #[test]
    fn test_identical_samples_zero_psi() {
        let sample: Vec<f64> = (0..100).map(|i| (i % 17) as f64).collect();
        assert_eq!(population_stability_index(&sample, &sample, BINS, EPS), 0.0);
    }

    #[test]
    fn test_constant_samples_zero_psi() {
        let a = vec![3.0; 50];
        let b = vec![3.0; 50];
        assert_eq!(population_stability_index(&a, &b, BINS, EPS), 0.0);
    }

    #[test]
    fn test_shifted_distribution_large_psi() {
        let reference: Vec<f64> = (0..200).map(|i| (i % 50) as f64 / 50.0).collect();
        let current: Vec<f64> = (0..200).map(|i| (i % 50) as f64 / 50.0 + 3.0).collect();
        let psi = population_stability_index(&reference, &current, BINS, EPS);
        assert!(psi > 0.25, "disjoint ranges should be a significant shift, got {}", psi);
    }

    #[test]
    fn test_minor_shift_small_psi() {
        let reference: Vec<f64> = (0..1000).map(|i| (i % 100) as f64).collect();
        // Same distribution, a couple of values nudged
        let mut current = reference.clone();
        current[0] += 1.0;
        current[1] += 1.0;
        let psi = population_stability_index(&reference, &current, BINS, EPS);
        assert!(psi < 0.1, "near-identical samples should be stable, got {}", psi);
    }

    #[test]
    fn test_empty_inputs_zero() {
        assert_eq!(population_stability_index(&[], &[1.0], BINS, EPS), 0.0);
        assert_eq!(population_stability_index(&[1.0], &[], BINS, EPS), 0.0);
        assert_eq!(population_stability_index(&[1.0], &[1.0], 0, EPS), 0.0);
    }

    proptest! {
        #[test]
        fn prop_identical_is_zero(a in proptest::collection::vec(-1e3f64..1e3, 1..200)) {
            prop_assert_eq!(population_stability_index(&a, &a, BINS, EPS), 0.0);
        }

        #[test]
        fn prop_non_negative_for_disjoint_masses(
            a in proptest::collection::vec(0.0f64..1.0, 10..100),
            b in proptest::collection::vec(2.0f64..3.0, 10..100),
        ) {
            let psi = population_stability_index(&a, &b, BINS, EPS);
            prop_assert!(psi > 0.0);
        }

        #[test]
        fn prop_finite(
            a in proptest::collection::vec(-1e6f64..1e6, 1..100),
            b in proptest::collection::vec(-1e6f64..1e6, 1..100),
        ) {
            let psi = population_stability_index(&a, &b, BINS, EPS);
            prop_assert!(psi.is_finite());
        }
    }
}
