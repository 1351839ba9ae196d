use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::listing::JobListing;

/// Records from one harvest run, in link discovery order. Listings that
/// failed fatally contribute nothing, so `records` may be shorter than
/// `links_discovered`.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestBatch {
    pub source: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub links_discovered: usize,
    pub records: Vec<JobListing>,
}

impl HarvestBatch {
    pub fn skipped(&self) -> usize {
        self.links_discovered.saturating_sub(self.records.len())
    }
}
