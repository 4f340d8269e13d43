use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder when enabled. Without it every counter
/// in the ingest path is a no-op.
pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    if PROM_HANDLE.set(handle).is_ok() {
        describe_ingest_counters();
    }
    Ok(())
}

fn describe_ingest_counters() {
    metrics::describe_counter!("attempts_ingested_total", "Attempts stored from events");
    metrics::describe_counter!("attempts_deduped_total", "Attempts marked as duplicates");
    metrics::describe_counter!("attempts_scored_total", "Score computations, including recomputes");
    metrics::describe_counter!(
        "attempts_rejected_total",
        "Events rejected before any write, labelled by reason"
    );
}

/// Prometheus text for the end-of-run log line.
pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}
