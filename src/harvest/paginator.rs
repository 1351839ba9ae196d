use std::time::Duration;

use serde_json::Value;

use crate::driver::BrowserDriver;
use crate::error::DriverError;
use crate::locator::LocatorDescriptor;

const EXTENT_SCRIPT: &str = "return document.body.scrollHeight";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Scrolls an infinite-scroll listing page until its height stops growing,
/// then collects every listing link.
///
/// A single unchanged measurement ends the loop, so a page that loads slower
/// than `settle` can be cut short.
pub struct ScrollPaginator {
    settle: Duration,
}

impl ScrollPaginator {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// One entry per matching element, in DOM order. Elements without an
    /// `href` are kept as `None` so the count matches the page.
    pub async fn collect<D: BrowserDriver + ?Sized>(
        &self,
        driver: &D,
        links: &LocatorDescriptor,
    ) -> Result<Vec<Option<String>>, DriverError> {
        let rounds = self.scroll_to_end(driver).await?;
        tracing::info!("Page stopped growing after {rounds} scroll(s)");

        let elements = driver.find_all(links).await?;
        let mut urls = Vec::with_capacity(elements.len());
        for element in &elements {
            let href = driver
                .property(element, "href")
                .await?
                .filter(|href| !href.is_empty());
            if href.is_none() {
                tracing::warn!("Listing element without href ({links})");
            }
            urls.push(href);
        }
        Ok(urls)
    }

    /// Returns the number of scroll commands issued.
    async fn scroll_to_end<D: BrowserDriver + ?Sized>(&self, driver: &D) -> Result<u32, DriverError> {
        let mut last = extent(driver).await?;
        let mut rounds = 0;
        loop {
            driver.execute_script(SCROLL_SCRIPT).await?;
            rounds += 1;
            tokio::time::sleep(self.settle).await;

            let current = extent(driver).await?;
            tracing::debug!("Scroll round {rounds}: extent {last} -> {current}");
            if current == last {
                return Ok(rounds);
            }
            last = current;
        }
    }
}

async fn extent<D: BrowserDriver + ?Sized>(driver: &D) -> Result<i64, DriverError> {
    match driver.execute_script(EXTENT_SCRIPT).await? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| DriverError::Protocol(format!("unusable scroll extent {n}"))),
        other => Err(DriverError::Protocol(format!("expected scroll extent, got {other}"))),
    }
}
