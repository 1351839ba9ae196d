// Listing harvester - drives one browser session through a source site.
//
// Init -> (Filtering) -> Paginating -> Visiting(i) -> Extracting(i) -> ...
//      -> Closing -> Done
//
// Field, step and listing failures are absorbed and logged. Only session
// launch, landing-page navigation and pagination failures end the run, and
// the session is closed on every path before the run returns.

pub mod extractor;
pub mod filter;
pub mod paginator;
pub mod runner;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dates::DeadlineValue;
use crate::driver::{BrowserDriver, BrowserLauncher, release};
use crate::error::{DriverError, HarvestError};
use crate::models::{Field, HarvestBatch, JobListing};
use crate::sources::{PacingConfig, SourceConfig};

use extractor::FieldExtractor;
use filter::FilterSequencer;
use paginator::ScrollPaginator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestPhase {
    Init,
    Filtering,
    Paginating,
    Visiting(usize),
    Extracting(usize),
    Closing,
    Done,
}

/// Harvests one configured source. Cheap to construct; each `run` opens and
/// exclusively owns its own browser session.
pub struct ListingHarvester {
    source: Arc<SourceConfig>,
}

impl ListingHarvester {
    pub fn new(source: Arc<SourceConfig>) -> Self {
        Self { source }
    }

    #[tracing::instrument(skip_all, fields(source = %self.source.name))]
    pub async fn run<L: BrowserLauncher>(&self, launcher: &L) -> Result<HarvestBatch, HarvestError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let driver = launcher.launch().await.map_err(HarvestError::Session)?;
        let mut run = HarvestRun {
            source: &self.source,
            driver: &driver,
            phase: HarvestPhase::Init,
        };

        let outcome = run.drive().await;

        run.enter(HarvestPhase::Closing);
        release(&driver).await;

        let (links_discovered, records) = outcome?;
        run.enter(HarvestPhase::Done);

        Ok(HarvestBatch {
            source: self.source.name.clone(),
            run_id,
            started_at,
            finished_at: Utc::now(),
            links_discovered,
            records,
        })
    }
}

/// Mutable state of a single run; never shared.
struct HarvestRun<'a, D: BrowserDriver> {
    source: &'a SourceConfig,
    driver: &'a D,
    phase: HarvestPhase,
}

impl<D: BrowserDriver> HarvestRun<'_, D> {
    fn enter(&mut self, next: HarvestPhase) {
        tracing::debug!("{:?} -> {next:?}", self.phase);
        self.phase = next;
    }

    async fn drive(&mut self) -> Result<(usize, Vec<JobListing>), HarvestError> {
        let source = self.source;
        self.driver.navigate(&source.url).await?;

        if !source.filters.is_empty() {
            self.enter(HarvestPhase::Filtering);
            let failures = FilterSequencer::apply(self.driver, &source.filters).await;
            if !failures.is_empty() {
                tracing::warn!(
                    "{} of {} filter steps failed; results may be unfiltered",
                    failures.len(),
                    source.filters.len()
                );
            }
        }

        self.enter(HarvestPhase::Paginating);
        let links = ScrollPaginator::new(source.scroll_settle())
            .collect(self.driver, &source.locators.links)
            .await
            .map_err(HarvestError::Pagination)?;
        tracing::info!("Discovered {} listings", links.len());

        let mut records = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            let Some(link) = link else {
                tracing::warn!("Skipping listing {i}: link element has no href");
                continue;
            };
            if i > 0 {
                pace(&source.pacing).await;
            }
            self.enter(HarvestPhase::Visiting(i));
            match self.visit(i, link).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping listing {link}: {e}"),
            }
        }

        Ok((links.len(), records))
    }

    async fn visit(&mut self, index: usize, link: &str) -> Result<JobListing, DriverError> {
        self.driver.navigate(link).await?;
        self.enter(HarvestPhase::Extracting(index));

        let source = self.source;
        let locators = &source.locators;
        let extractor = FieldExtractor::new(self.driver, link);

        if let Some(details) = &locators.details_button {
            extractor.expand_details(details, source.details_timeout()).await;
        }

        let mut record = JobListing::new(link);
        record.title = extractor.text(Field::Title, &locators.title).await.into_option();
        record.company = extractor.text(Field::Company, &locators.company).await.into_option();
        record.location = extractor.text(Field::Location, &locators.location).await.into_option();
        record.deadline = extractor
            .text(Field::Deadline, &locators.deadline)
            .await
            .into_option()
            .map(|raw| match &source.deadline {
                Some(pattern) => pattern.convert(&raw),
                None => DeadlineValue::Text(raw),
            });
        record.experience = extractor
            .text(Field::Experience, &locators.experience)
            .await
            .into_option();
        record.skills = extractor
            .list(Field::Skills, &locators.skills, source.skills_delimiter.as_deref())
            .await
            .into_option()
            .unwrap_or_default();

        Ok(record)
    }
}

/// Randomized pause bounding the request rate against the site.
async fn pace(pacing: &PacingConfig) {
    let pause = pacing.sample(&mut rand::rng());
    tracing::debug!("Pacing for {}ms", pause.as_millis());
    tokio::time::sleep(pause).await;
}
