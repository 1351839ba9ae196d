// WebDriver backend - adapts a thirtyfour session to `BrowserDriver`.
//
// thirtyfour elements are kept in a per-session handle table so the
// harvester only ever sees opaque `ElementRef`s.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use thirtyfour::{ChromeCapabilities, ChromiumLikeCapabilities};

use crate::driver::{BrowserDriver, BrowserLauncher, ElementRef, release};
use crate::error::DriverError;
use crate::locator::{LocatorDescriptor, Strategy};

const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--window-size=1920,1080",
];

/// Opens Chrome sessions on a WebDriver endpoint (chromedriver, Selenium Grid).
pub struct WebDriverLauncher {
    endpoint: String,
    capabilities: ChromeCapabilities,
    implicit_wait: Duration,
}

impl WebDriverLauncher {
    pub fn new(endpoint: &str, headless: bool) -> Result<Self, DriverError> {
        let mut capabilities = DesiredCapabilities::chrome();
        for arg in CHROME_ARGS {
            capabilities.add_arg(arg)?;
        }
        if headless {
            capabilities.set_headless()?;
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            capabilities,
            implicit_wait: Duration::from_secs(3),
        })
    }

    /// How long element lookups wait for late-rendering content.
    pub fn with_implicit_wait(mut self, implicit_wait: Duration) -> Self {
        self.implicit_wait = implicit_wait;
        self
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    type Driver = WebDriverSession;

    async fn launch(&self) -> Result<WebDriverSession, DriverError> {
        let driver = WebDriver::new(self.endpoint.as_str(), self.capabilities.clone()).await?;
        let session = WebDriverSession {
            driver,
            elements: Handles::default(),
        };

        if let Err(e) = session.driver.set_implicit_wait_timeout(self.implicit_wait).await {
            release(&session).await;
            return Err(e.into());
        }

        tracing::info!("Opened WebDriver session on {}", self.endpoint);
        Ok(session)
    }
}

/// One remote browser session.
pub struct WebDriverSession {
    driver: WebDriver,
    elements: Handles<WebElement>,
}

#[async_trait]
impl BrowserDriver for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    // find-elements returns an empty list instead of a "no such element"
    // error, so absence never has to be told apart from a real failure
    async fn find(&self, locator: &LocatorDescriptor) -> Result<Option<ElementRef>, DriverError> {
        let found = self.driver.find_all(by(locator)).await?;
        Ok(self.elements.first(found))
    }

    async fn find_all(&self, locator: &LocatorDescriptor) -> Result<Vec<ElementRef>, DriverError> {
        let found = self.driver.find_all(by(locator)).await?;
        Ok(self.elements.register_all(found))
    }

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError> {
        Ok(self.elements.get(element)?.text().await?)
    }

    async fn property(&self, element: &ElementRef, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.elements.get(element)?.prop(name).await?)
    }

    async fn is_interactable(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let element = self.elements.get(element)?;
        Ok(element.is_displayed().await? && element.is_enabled().await?)
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        self.elements.get(element)?.click().await?;
        Ok(())
    }

    async fn select_by_value(&self, element: &ElementRef, value: &str) -> Result<(), DriverError> {
        let element = self.elements.get(element)?;
        SelectElement::new(&element).await?.select_by_value(value).await?;
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        let ret = self.driver.execute(script, Vec::new()).await?;
        Ok(ret.json().clone())
    }

    async fn switch_to_frame(&self, frame: &ElementRef) -> Result<(), DriverError> {
        self.elements.get(frame)?.enter_frame().await?;
        Ok(())
    }

    async fn switch_to_default(&self) -> Result<(), DriverError> {
        self.driver.enter_default_frame().await?;
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        self.driver.clone().quit().await?;
        tracing::info!("Closed WebDriver session");
        Ok(())
    }
}

fn by(locator: &LocatorDescriptor) -> By {
    let selector = locator.selector.clone();
    match locator.strategy {
        Strategy::Css => By::Css(selector),
        Strategy::Xpath => By::XPath(selector),
        Strategy::Id => By::Id(selector),
    }
}

/// Element table for one session. Handles are indices and stay valid until
/// the session ends; the browser decides whether the element is still live.
struct Handles<E> {
    items: Mutex<Vec<E>>,
}

impl<E> Default for Handles<E> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Clone> Handles<E> {
    fn register_all(&self, found: Vec<E>) -> Vec<ElementRef> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        found
            .into_iter()
            .map(|element| {
                items.push(element);
                ElementRef((items.len() - 1).to_string())
            })
            .collect()
    }

    /// First match as a handle, `None` when nothing matched.
    fn first(&self, found: Vec<E>) -> Option<ElementRef> {
        let element = found.into_iter().next()?;
        self.register_all(vec![element]).pop()
    }

    fn get(&self, handle: &ElementRef) -> Result<E, DriverError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        handle
            .0
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i).cloned())
            .ok_or_else(|| DriverError::stale(&handle.0))
    }
}
