// Browser driver capability consumed by the harvester.
// Any backend that can navigate, locate elements, run scripts and switch
// frames can drive a harvest; `webdriver` is the production one.

pub mod webdriver;

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::locator::LocatorDescriptor;

/// Interval between polls while waiting for a condition.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Opaque handle to an element in the current browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

/// What `wait_until` waits for.
#[derive(Debug, Clone, Copy)]
pub enum WaitCondition<'a> {
    /// Element exists in the DOM.
    Present(&'a LocatorDescriptor),
    /// Element exists, is displayed and enabled.
    Clickable(&'a LocatorDescriptor),
}

impl WaitCondition<'_> {
    pub fn locator(&self) -> &LocatorDescriptor {
        match self {
            WaitCondition::Present(locator) | WaitCondition::Clickable(locator) => locator,
        }
    }
}

/// A live browser session. Calls are issued strictly one at a time.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// `Ok(None)` when nothing matches.
    async fn find(&self, locator: &LocatorDescriptor) -> Result<Option<ElementRef>, DriverError>;

    async fn find_all(&self, locator: &LocatorDescriptor) -> Result<Vec<ElementRef>, DriverError>;

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError>;

    /// DOM property (e.g. the resolved `href` of a link).
    async fn property(&self, element: &ElementRef, name: &str) -> Result<Option<String>, DriverError>;

    async fn is_interactable(&self, element: &ElementRef) -> Result<bool, DriverError>;

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError>;

    /// Choose the `<option>` with the given value inside a `<select>`.
    async fn select_by_value(&self, element: &ElementRef, value: &str) -> Result<(), DriverError>;

    async fn execute_script(&self, script: &str) -> Result<serde_json::Value, DriverError>;

    async fn switch_to_frame(&self, frame: &ElementRef) -> Result<(), DriverError>;

    async fn switch_to_default(&self) -> Result<(), DriverError>;

    async fn quit(&self) -> Result<(), DriverError>;

    /// Poll until `condition` holds or `timeout` elapses.
    /// `Ok(None)` means the wait expired.
    async fn wait_until(
        &self,
        condition: WaitCondition<'_>,
        timeout: Duration,
    ) -> Result<Option<ElementRef>, DriverError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(element) = self.find(condition.locator()).await? {
                let ready = match condition {
                    WaitCondition::Present(_) => true,
                    // stale elements count as not ready yet
                    WaitCondition::Clickable(_) => {
                        self.is_interactable(&element).await.unwrap_or(false)
                    }
                };
                if ready {
                    return Ok(Some(element));
                }
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

/// Acquires a fresh, exclusively owned browser session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Driver: BrowserDriver;

    async fn launch(&self) -> Result<Self::Driver, DriverError>;
}

/// Close a session, logging rather than returning a failure to close.
pub async fn release<D: BrowserDriver + ?Sized>(driver: &D) {
    if let Err(e) = driver.quit().await {
        tracing::warn!("Failed to close browser session: {e}");
    }
}
