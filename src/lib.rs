//! Identity resolution, near-duplicate detection and negative-marking scoring
//! for ingested test attempts.

pub(crate) mod core;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use anyhow::Context;

use crate::core::{config::Settings, telemetry};
use crate::repositories::Ledger;
use crate::schemas::attempt::RunSummary;
use crate::services::dedup::DedupPolicy;
use crate::services::{ingestion, queries};

pub use crate::errors::IngestError;
pub use crate::services::dedup::find_duplicate;
pub use crate::services::identity::resolve;
pub use crate::services::scoring::score;

/// Replays the configured event file and writes the summary.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    tracing::info!(
        environment = %settings.runtime().environment.as_str(),
        events = %settings.ingest().events_path.display(),
        window_minutes = settings.dedup().window_minutes,
        similarity_threshold = settings.dedup().similarity_threshold,
        "Replaying attempt events"
    );

    let summary = replay(&settings).await?;
    let rendered = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;

    match &settings.ingest().report_path {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Summary written");
        }
        None => println!("{rendered}"),
    }

    if let Some(snapshot) = core::metrics::render() {
        tracing::info!(target: "metrics", "{snapshot}");
    }

    Ok(())
}

pub(crate) async fn replay(settings: &Settings) -> anyhow::Result<RunSummary> {
    let path = &settings.ingest().events_path;
    let payload = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let events: Vec<serde_json::Value> = serde_json::from_str(&payload)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let policy = DedupPolicy::from_settings(settings);
    let mut ledger = Ledger::new();
    let report = ingestion::ingest_batch(&mut ledger, &policy, &events);

    Ok(queries::summarize(&ledger, report))
}
