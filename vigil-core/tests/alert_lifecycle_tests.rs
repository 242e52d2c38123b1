//! Tests for the alert lifecycle state machine
//!
//! These tests verify:
//! 1. At most one active alert exists per identity at any time
//! 2. Duplicates within the cooldown are suppressed, not re-raised
//! 3. resolve/acknowledge enforce the legal transitions
//! 4. Severity follows the drift ratio and health score breakpoints

use std::time::{Duration, SystemTime};
use vigil_core::{
    AlertConfig, AlertManager, AlertSeverity, AlertStatus, DriftConfig, DriftEvaluator,
    DriftType, FeatureSeries, MonitorError, TimeWindow,
};

fn finding_with_score(scale: f64) -> vigil_core::DriftFinding {
    let now = SystemTime::now();
    let window = TimeWindow::new(now - Duration::from_secs(3600), now);
    let reference: Vec<f64> = (0..60).map(|i| (i % 12) as f64).collect();
    // Larger shift, larger score; scale 0 keeps the windows identical
    let current: Vec<f64> = reference.iter().map(|v| v + scale).collect();
    DriftEvaluator::new(DriftConfig::default())
        .evaluate(
            1,
            DriftType::Data,
            &[FeatureSeries::new("amount", reference, current)],
            window,
            window,
        )
        .unwrap()
}

/// Test: repeated qualifying findings never yield two active alerts
#[test]
fn test_never_two_active_alerts_per_identity() {
    let manager = AlertManager::new(AlertConfig::default());
    let finding = finding_with_score(100.0);

    for _ in 0..5 {
        manager.observe_drift(&finding, 1);
    }

    let active = manager.active_alerts();
    assert_eq!(active.len(), 1, "one identity must hold one active alert");
    assert_eq!(active[0].status, AlertStatus::Active);
    assert_eq!(
        active[0].occurrence_count, 5,
        "every qualifying signal must be counted on the active alert"
    );
}

/// Test: the first duplicate after a raise is recorded as suppressed
#[test]
fn test_duplicate_within_cooldown_suppressed() {
    let manager = AlertManager::new(AlertConfig::default());
    let finding = finding_with_score(100.0);

    manager.observe_drift(&finding, 1);
    manager.observe_drift(&finding, 1);

    let all = manager.alerts();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].status, AlertStatus::Active);
    assert_eq!(
        all[1].status,
        AlertStatus::Suppressed,
        "the duplicate must be recorded as suppressed, not raised"
    );

    // Third signal lands inside the cooldown of the recorded duplicate:
    // counted on the active alert, no third record
    manager.observe_drift(&finding, 1);
    assert_eq!(manager.alerts().len(), 2);
}

/// Test: active -> acknowledged -> resolved, with timestamps
#[test]
fn test_acknowledge_and_resolve_transitions() {
    let manager = AlertManager::new(AlertConfig::default());
    manager.observe_drift(&finding_with_score(100.0), 1);
    let id = manager.active_alerts()[0].alert_id.clone();

    let acked = manager.acknowledge(&id).unwrap();
    assert_eq!(acked.status, AlertStatus::Acknowledged);
    assert!(acked.acknowledged_at.is_some());

    let resolved = manager.resolve(&id).unwrap();
    assert_eq!(resolved.status, AlertStatus::Resolved);
    assert!(resolved.resolved_at.is_some());
}

/// Test: resolving a resolved alert is an invalid transition, not not-found
#[test]
fn test_double_resolve_rejected() {
    let manager = AlertManager::new(AlertConfig::default());
    manager.observe_drift(&finding_with_score(100.0), 1);
    let id = manager.active_alerts()[0].alert_id.clone();
    manager.resolve(&id).unwrap();

    match manager.resolve(&id) {
        Err(MonitorError::InvalidTransition { .. }) => {}
        other => panic!("expected InvalidTransition, got {:?}", other),
    }
}

/// Test: unknown ids report not-found so callers can tell the cases apart
#[test]
fn test_unknown_id_not_found() {
    let manager = AlertManager::new(AlertConfig::default());
    match manager.acknowledge("alert-424242") {
        Err(MonitorError::NotFound { entity: "alert", .. }) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

/// Test: resolution reopens the identity for a fresh raise
#[test]
fn test_new_alert_after_resolution() {
    let manager = AlertManager::new(AlertConfig::default());
    let finding = finding_with_score(100.0);

    manager.observe_drift(&finding, 1);
    let first = manager.active_alerts()[0].alert_id.clone();
    manager.resolve(&first).unwrap();

    manager.observe_drift(&finding, 1);
    let active = manager.active_alerts();
    assert_eq!(active.len(), 1);
    assert_ne!(active[0].alert_id, first, "a fresh alert must be raised after resolution");
    assert_eq!(active[0].status, AlertStatus::Active);
}

/// Test: drift severity scales with the score-to-threshold ratio
#[test]
fn test_drift_severity_breakpoints() {
    let manager = AlertManager::new(AlertConfig::default());

    // A full-range shift scores far past 3x the 0.1 threshold
    manager.observe_drift(&finding_with_score(100.0), 1);
    assert_eq!(manager.active_alerts()[0].severity, AlertSeverity::Critical);
}
