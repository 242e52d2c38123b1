//! Common utilities for all binaries
//!
//! Shared initialization, CLI parsing, and reporting code.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vigil_core::engine::DashboardOverview;

/// Common CLI arguments for all binaries
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CommonArgs {
    /// Model version to monitor
    #[arg(short, long, default_value = "1")]
    pub model_version_id: u64,

    /// Deployment to monitor
    #[arg(short, long, default_value = "1")]
    pub deployment_id: u64,

    /// Evaluation cycles to run per phase
    #[arg(long, default_value = "5")]
    pub cycles: u32,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Initialize tracing/logging
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}

/// Print the final dashboard overview
pub fn print_overview(overview: &DashboardOverview) {
    tracing::info!("=== Dashboard Overview ===");
    tracing::info!("Models tracked: {}", overview.models_tracked);
    tracing::info!("Metric samples: {}", overview.metric_samples);
    tracing::info!("Prediction events: {}", overview.prediction_events);
    tracing::info!(
        "Drift findings: {} ({} detections)",
        overview.drift_findings,
        overview.drift_detections
    );
    tracing::info!("Active alerts: {}", overview.active_alerts);
    for (severity, count) in &overview.active_alerts_by_severity {
        tracing::info!("  {}: {}", severity.as_str(), count);
    }
    if let Some(snapshot) = &overview.latest_snapshot {
        tracing::info!(
            "Latest health: {} (score {:.1})",
            snapshot.overall_health.as_str(),
            snapshot.health_score
        );
    }
}
