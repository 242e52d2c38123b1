//! Monitoring Engine with Simulated Workload
//!
//! Feeds the engine a two-phase synthetic model:
//! - Phase 1: steady accuracy and confident predictions
//! - Phase 2: degraded accuracy and collapsed confidence
//!
//! Phase 2 should trip drift detection and raise alerts; the run ends by
//! printing the dashboard overview so the whole pipeline is visible.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use vigil_bins::common::{init_logging, print_overview, CommonArgs};
use vigil_core::{
    MetricSample, ModelKey, MonitorConfig, MonitorEngine, PredictionEvent, TimeWindow,
};

const PREDICTIONS_PER_CYCLE: usize = 40;
const SAMPLES_PER_CYCLE: usize = 3;

fn main() -> Result<()> {
    let args = CommonArgs::parse();
    init_logging(&args.log_level)?;

    tracing::info!("=== Vigil: Simulated Monitoring Workload ===");
    tracing::info!(
        "Model version {} / deployment {}",
        args.model_version_id,
        args.deployment_id
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupt received, finishing up");
        r.store(false, Ordering::SeqCst);
    })?;

    let engine = MonitorEngine::new(MonitorConfig::default())?;
    let key = ModelKey::new(args.model_version_id, args.deployment_id);
    let mut rng = StdRng::seed_from_u64(1);

    // Phase boundaries laid out in the recent past so both windows are
    // fully populated before evaluation
    let now = SystemTime::now();
    let phase_secs = 60 * args.cycles as u64;
    let reference_window = TimeWindow::new(
        now - Duration::from_secs(2 * phase_secs),
        now - Duration::from_secs(phase_secs),
    );
    let current_window = TimeWindow::new(now - Duration::from_secs(phase_secs), now);

    tracing::info!("--- Phase 1: steady model ---");
    run_phase(&engine, key, &mut rng, reference_window, 0.92, 0.95, &running)?;
    for report in engine.run_all_cycles(reference_window, reference_window) {
        tracing::info!(
            "cycle: health {} (score {:.1})",
            report.snapshot.overall_health.as_str(),
            report.snapshot.health_score
        );
    }

    if running.load(Ordering::SeqCst) {
        tracing::info!("--- Phase 2: drifted model ---");
        run_phase(&engine, key, &mut rng, current_window, 0.35, 0.78, &running)?;
        for report in engine.run_all_cycles(reference_window, current_window) {
            match &report.finding {
                Some(finding) => tracing::info!(
                    "cycle: drift score {:.4} (detected: {}), health {}",
                    finding.drift_score,
                    finding.drift_detected,
                    report.snapshot.overall_health.as_str()
                ),
                None => tracing::info!(
                    "cycle: drift skipped ({}), health {}",
                    report.drift_skipped.as_deref().unwrap_or("unknown"),
                    report.snapshot.overall_health.as_str()
                ),
            }
        }
    }

    for alert in engine.list_active_alerts() {
        tracing::warn!(
            "active alert {}: [{}] {}",
            alert.alert_id,
            alert.severity.as_str(),
            alert.title
        );
    }

    print_overview(&engine.dashboard_overview());
    Ok(())
}

/// Feed one phase of synthetic predictions and metric samples into the
/// engine, spread across the window.
fn run_phase(
    engine: &MonitorEngine,
    key: ModelKey,
    rng: &mut StdRng,
    window: TimeWindow,
    confidence_center: f64,
    accuracy: f64,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    let span = window.duration().as_secs().max(1);

    for i in 0..PREDICTIONS_PER_CYCLE {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let ts = window.start + Duration::from_secs(i as u64 * span / PREDICTIONS_PER_CYCLE as u64);
        let confidence = (confidence_center + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0);
        let latency_ms = rng.gen_range(8.0..25.0);
        let event = PredictionEvent::new(
            format!("req-{}-{}", ts.duration_since(SystemTime::UNIX_EPOCH)?.as_nanos(), i),
            key.model_version_id,
            key.deployment_id,
            ts,
            serde_json::json!("approve"),
            confidence,
            latency_ms,
        )
        .with_probability("approve", confidence)
        .with_probability("deny", 1.0 - confidence);
        engine.record_prediction(event)?;
    }

    for i in 0..SAMPLES_PER_CYCLE {
        let ts = window.start + Duration::from_secs(i as u64 * span / SAMPLES_PER_CYCLE as u64);
        let sample = MetricSample::new(key.model_version_id, key.deployment_id, ts)
            .with_accuracy((accuracy + rng.gen_range(-0.02..0.02)).clamp(0.0, 1.0))
            .with_counts(PREDICTIONS_PER_CYCLE as u64, rng.gen_range(0..2))
            .with_latency(15.0, 22.0, 24.0)
            .with_resources(rng.gen_range(30.0..60.0), 45.0, 0.0);
        engine.record_metric_sample(sample)?;
    }

    Ok(())
}
