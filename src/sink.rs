use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::error::HarvestError;
use crate::models::HarvestBatch;

const KEY_OFFSET_SECS: i32 = 9 * 3600;
const KEY_TIME_FORMAT: &str = "%Y-%m-%d_%H%M%S";

/// Destination for finished batches. Returns the key the batch was stored
/// under.
#[async_trait]
pub trait BatchSink: Send + Sync {
    async fn store(&self, batch: &HarvestBatch) -> Result<String, HarvestError>;
}

/// `{source}/{run start in KST}.json`
pub fn batch_key(source: &str, started_at: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(KEY_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    let local = started_at.with_timezone(&offset);
    format!("{source}/{}.json", local.format(KEY_TIME_FORMAT))
}

/// Writes each batch as pretty-printed JSON below `root`.
pub struct JsonFileSink {
    root: PathBuf,
}

impl JsonFileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BatchSink for JsonFileSink {
    async fn store(&self, batch: &HarvestBatch) -> Result<String, HarvestError> {
        let key = batch_key(&batch.source, batch.started_at);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(batch)?;
        tokio::fs::write(&path, body).await?;
        tracing::info!(
            "Stored {} records for '{}' at {}",
            batch.records.len(),
            batch.source,
            path.display()
        );
        Ok(key)
    }
}
