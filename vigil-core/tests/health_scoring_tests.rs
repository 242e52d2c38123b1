//! Tests for composite health scoring
//!
//! These tests verify:
//! 1. Strong accuracy over a window scores healthy with a high score
//! 2. An empty lookback window is unhealthy with an explicit reason
//! 3. Degraded components drag the composite score and the verdict down
//! 4. The score reflects the configured component weights

use std::sync::Arc;
use std::time::SystemTime;
use vigil_core::{
    HealthConfig, HealthScorer, HealthState, MetricSample, ModelKey,
};

fn samples_with_accuracy(n: usize, accuracy: f64) -> Vec<Arc<MetricSample>> {
    (0..n)
        .map(|_| Arc::new(MetricSample::new(1, 1, SystemTime::now()).with_accuracy(accuracy)))
        .collect()
}

/// Test: 30 samples at accuracy 0.95 score healthy, >= 90
#[test]
fn test_strong_accuracy_scores_healthy() {
    let scorer = HealthScorer::new(HealthConfig::default());
    let samples = samples_with_accuracy(30, 0.95);

    let snapshot = scorer.score(ModelKey::new(1, 1), &samples, None);
    assert_eq!(snapshot.overall_health, HealthState::Healthy);
    assert!(
        snapshot.health_score >= 90.0,
        "expected score >= 90, got {}",
        snapshot.health_score
    );
    assert!(snapshot.reason.is_none());
}

/// Test: no samples in the lookback window is unhealthy by rule
#[test]
fn test_empty_lookback_unhealthy_with_reason() {
    let scorer = HealthScorer::new(HealthConfig::default());

    let snapshot = scorer.score(ModelKey::new(1, 1), &[], None);
    assert_eq!(snapshot.overall_health, HealthState::Unhealthy);
    assert_eq!(snapshot.health_score, 0.0);
    assert_eq!(
        snapshot.reason.as_deref(),
        Some("no metric samples in lookback window"),
        "the rule-based verdict must carry its reason"
    );
}

/// Test: accuracy inside the soft margin degrades, below it is unhealthy
#[test]
fn test_accuracy_bands() {
    let scorer = HealthScorer::new(HealthConfig::default());

    // Default floor 0.85, soft margin 0.05
    let healthy = scorer.score(ModelKey::new(1, 1), &samples_with_accuracy(10, 0.90), None);
    assert_eq!(healthy.components.performance, HealthState::Healthy);

    let degraded = scorer.score(ModelKey::new(1, 1), &samples_with_accuracy(10, 0.82), None);
    assert_eq!(degraded.components.performance, HealthState::Degraded);
    assert_eq!(degraded.overall_health, HealthState::Degraded);

    let unhealthy = scorer.score(ModelKey::new(1, 1), &samples_with_accuracy(10, 0.70), None);
    assert_eq!(unhealthy.components.performance, HealthState::Unhealthy);
    assert_eq!(unhealthy.overall_health, HealthState::Unhealthy);
}

/// Test: error ratio past the hard limit is unhealthy regardless of accuracy
#[test]
fn test_error_rate_dominates_verdict() {
    let scorer = HealthScorer::new(HealthConfig::default());
    let samples: Vec<Arc<MetricSample>> = (0..10)
        .map(|_| {
            Arc::new(
                MetricSample::new(1, 1, SystemTime::now())
                    .with_accuracy(0.99)
                    .with_counts(100, 15),
            )
        })
        .collect();

    let snapshot = scorer.score(ModelKey::new(1, 1), &samples, None);
    // 15% errors past the 10% hard limit
    assert_eq!(snapshot.components.prediction, HealthState::Unhealthy);
    assert_eq!(snapshot.overall_health, HealthState::Unhealthy);
    assert!(
        snapshot.health_score <= 75.0,
        "one unhealthy component at default weights caps the score at 75, got {}",
        snapshot.health_score
    );
}

/// Test: resource utilization bands at the configured percentages
#[test]
fn test_resource_bands() {
    let scorer = HealthScorer::new(HealthConfig::default());
    let at = |cpu: f64| {
        let samples = vec![Arc::new(
            MetricSample::new(1, 1, SystemTime::now())
                .with_accuracy(0.95)
                .with_resources(cpu, 40.0, 0.0),
        )];
        scorer.score(ModelKey::new(1, 1), &samples, None)
    };

    assert_eq!(at(60.0).components.resource, HealthState::Healthy);
    assert_eq!(at(90.0).components.resource, HealthState::Degraded);
    assert_eq!(at(97.0).components.resource, HealthState::Unhealthy);
}

/// Test: the composite score is 100 minus the weighted penalty sum
#[test]
fn test_weighted_score_arithmetic() {
    let scorer = HealthScorer::new(HealthConfig::default());
    // Performance degraded (penalty 50, weight 0.25), everything else healthy
    let snapshot = scorer.score(ModelKey::new(1, 1), &samples_with_accuracy(10, 0.82), None);
    assert!(
        (snapshot.health_score - 87.5).abs() < 1e-9,
        "expected 100 - 0.25 * 50 = 87.5, got {}",
        snapshot.health_score
    );
}
