use std::sync::Arc;

use crate::driver::BrowserLauncher;
use crate::harvest::ListingHarvester;
use crate::sink::BatchSink;
use crate::sources::SourceConfig;

/// Harvest each source in turn, one browser session per source, storing
/// every batch as it completes. A failed source does not stop the others
/// but fails the overall run.
pub async fn run<L: BrowserLauncher>(
    launcher: &L,
    sink: &dyn BatchSink,
    sources: &[Arc<SourceConfig>],
) -> anyhow::Result<()> {
    let mut failed = Vec::new();

    for source in sources {
        tracing::info!("Harvesting '{}' from {}", source.name, source.url);
        if let Err(e) = process_source(launcher, sink, source).await {
            tracing::error!("Harvest of '{}' failed: {e:#}", source.name);
            failed.push(source.name.as_str());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} sources failed: {}",
            failed.len(),
            sources.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

async fn process_source<L: BrowserLauncher>(
    launcher: &L,
    sink: &dyn BatchSink,
    source: &Arc<SourceConfig>,
) -> anyhow::Result<()> {
    let batch = ListingHarvester::new(Arc::clone(source)).run(launcher).await?;
    tracing::info!(
        "Run {} completed: {} found, {} records, {} skipped",
        batch.run_id,
        batch.links_discovered,
        batch.records.len(),
        batch.skipped()
    );

    let key = sink.store(&batch).await?;
    tracing::info!("Batch for '{}' stored as {key}", source.name);
    Ok(())
}
