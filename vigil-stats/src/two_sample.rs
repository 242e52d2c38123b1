//! Two-sample Kolmogorov-Smirnov test
//!
//! The KS statistic is the supremum distance between the empirical CDFs
//! of two samples. It lives in [0, 1]: 0 for identical samples, 1 for
//! fully disjoint supports. The p-value uses the standard asymptotic
//! approximation `p = 2 * exp(-2 * lambda^2)` with
//! `lambda = d * sqrt(n*m / (n+m))`.

/// Two-sample KS statistic: sup |F_a(x) - F_b(x)|.
///
/// Returns 0.0 if either sample is empty (no evidence of difference).
pub fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut sa = a.to_vec();
    let mut sb = b.to_vec();
    sa.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    sb.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

    let n = sa.len();
    let m = sb.len();
    let mut i = 0usize;
    let mut j = 0usize;
    let mut max_dist = 0.0f64;

    // Merge-walk both sorted samples, tracking each empirical CDF.
    while i < n && j < m {
        let step = if sa[i] <= sb[j] { sa[i] } else { sb[j] };
        while i < n && sa[i] <= step {
            i += 1;
        }
        while j < m && sb[j] <= step {
            j += 1;
        }
        let dist = (i as f64 / n as f64 - j as f64 / m as f64).abs();
        if dist > max_dist {
            max_dist = dist;
        }
    }

    max_dist
}

/// Asymptotic two-sided p-value for a KS statistic `d` over sample sizes
/// `n` and `m`. Clamped to [0, 1].
pub fn ks_p_value(d: f64, n: usize, m: usize) -> f64 {
    if n == 0 || m == 0 {
        return 1.0;
    }
    let en = (n * m) as f64 / (n + m) as f64;
    let lambda = d * en.sqrt();
    (2.0 * (-2.0 * lambda * lambda).exp()).clamp(0.0, 1.0)
}
