// MockDriver - scripted in-memory browser for tests.
//
// Pages are keyed by URL and elements by selector string (the strategy is
// ignored). Every command is appended to a log so tests can assert on the
// exact interaction sequence.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{BrowserDriver, BrowserLauncher, ElementRef};
use crate::error::DriverError;
use crate::locator::LocatorDescriptor;

#[derive(Debug, Clone)]
struct MockElement {
    text: String,
    href: Option<String>,
    interactable: bool,
    in_frame: bool,
    options: Vec<String>,
}

impl MockElement {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            href: None,
            interactable: true,
            in_frame: false,
            options: Vec::new(),
        }
    }
}

/// Builder for the elements rendered at one URL.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    elements: HashMap<String, Vec<MockElement>>,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, selector: &str, element: MockElement) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    pub fn text(self, selector: &str, text: &str) -> Self {
        self.push(selector, MockElement::new(text))
    }

    pub fn link(self, selector: &str, href: &str) -> Self {
        let mut element = MockElement::new(href);
        element.href = Some(href.to_string());
        self.push(selector, element)
    }

    pub fn button(self, selector: &str) -> Self {
        self.push(selector, MockElement::new(""))
    }

    /// Present but never displayed.
    pub fn hidden(self, selector: &str) -> Self {
        let mut element = MockElement::new("");
        element.interactable = false;
        self.push(selector, element)
    }

    /// Only visible after switching into a frame.
    pub fn frame_button(self, selector: &str) -> Self {
        let mut element = MockElement::new("");
        element.in_frame = true;
        self.push(selector, element)
    }

    pub fn select(self, selector: &str, options: &[&str]) -> Self {
        let mut element = MockElement::new("");
        element.options = options.iter().map(|o| o.to_string()).collect();
        self.push(selector, element)
    }
}

#[derive(Default)]
struct MockState {
    pages: HashMap<String, MockPage>,
    current: Option<String>,
    in_frame: bool,
    handles: Vec<(String, String, usize)>,
    extents: VecDeque<i64>,
    failing_urls: HashSet<String>,
    stale_selectors: HashSet<String>,
    fail_scripts: bool,
    fail_quit: bool,
    log: Vec<String>,
    quit_calls: usize,
}

impl MockState {
    fn element(&self, handle: &ElementRef) -> Result<(String, MockElement), DriverError> {
        let lookup = handle
            .0
            .parse::<usize>()
            .ok()
            .and_then(|i| self.handles.get(i))
            .and_then(|(url, selector, idx)| {
                let element = self.pages.get(url)?.elements.get(selector)?.get(*idx)?;
                Some((selector.clone(), element.clone()))
            });
        lookup.ok_or_else(|| command_error("stale element reference", "element is gone"))
    }

    fn matching(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        if self.stale_selectors.contains(selector) {
            return Err(command_error("stale element reference", selector));
        }
        let Some(url) = self.current.clone() else {
            return Ok(Vec::new());
        };
        let in_frame = self.in_frame;
        let indices: Vec<usize> = self
            .pages
            .get(&url)
            .and_then(|page| page.elements.get(selector))
            .map(|elements| {
                elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.in_frame == in_frame)
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default();

        Ok(indices
            .into_iter()
            .map(|idx| {
                self.handles.push((url.clone(), selector.to_string(), idx));
                ElementRef((self.handles.len() - 1).to_string())
            })
            .collect())
    }
}

fn command_error(error: &str, message: &str) -> DriverError {
    DriverError::Command {
        error: error.to_string(),
        message: message.to_string(),
    }
}

#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_page(self, url: &str, page: MockPage) -> Self {
        self.state().pages.insert(url.to_string(), page);
        self
    }

    /// Successive `scrollHeight` readings; the last one repeats.
    pub fn with_extents(self, extents: &[i64]) -> Self {
        self.state().extents = extents.iter().copied().collect();
        self
    }

    pub fn with_failing_url(self, url: &str) -> Self {
        self.state().failing_urls.insert(url.to_string());
        self
    }

    pub fn with_stale_selector(self, selector: &str) -> Self {
        self.state().stale_selectors.insert(selector.to_string());
        self
    }

    pub fn with_failing_scripts(self) -> Self {
        self.state().fail_scripts = true;
        self
    }

    /// `quit` is recorded but reports an error.
    pub fn with_failing_quit(self) -> Self {
        self.state().fail_quit = true;
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.state()
            .log
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }

    pub fn quit_calls(&self) -> usize {
        self.state().quit_calls
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        state.log.push(format!("navigate {url}"));
        if state.failing_urls.contains(url) {
            return Err(command_error("unknown error", "net::ERR_CONNECTION_RESET"));
        }
        state.current = Some(url.to_string());
        state.in_frame = false;
        Ok(())
    }

    async fn find(&self, locator: &LocatorDescriptor) -> Result<Option<ElementRef>, DriverError> {
        Ok(self.state().matching(&locator.selector)?.into_iter().next())
    }

    async fn find_all(&self, locator: &LocatorDescriptor) -> Result<Vec<ElementRef>, DriverError> {
        self.state().matching(&locator.selector)
    }

    async fn text(&self, element: &ElementRef) -> Result<String, DriverError> {
        Ok(self.state().element(element)?.1.text)
    }

    async fn property(&self, element: &ElementRef, name: &str) -> Result<Option<String>, DriverError> {
        let (_, element) = self.state().element(element)?;
        Ok(match name {
            "href" => element.href,
            _ => None,
        })
    }

    async fn is_interactable(&self, element: &ElementRef) -> Result<bool, DriverError> {
        Ok(self.state().element(element)?.1.interactable)
    }

    async fn click(&self, element: &ElementRef) -> Result<(), DriverError> {
        let mut state = self.state();
        let (selector, _) = state.element(element)?;
        state.log.push(format!("click {selector}"));
        Ok(())
    }

    async fn select_by_value(&self, element: &ElementRef, value: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        let (selector, element) = state.element(element)?;
        if !element.options.iter().any(|o| o == value) {
            return Err(command_error("no such element", value));
        }
        state.log.push(format!("select {selector}={value}"));
        Ok(())
    }

    async fn execute_script(&self, script: &str) -> Result<Value, DriverError> {
        let mut state = self.state();
        if state.fail_scripts {
            return Err(command_error("javascript error", "session crashed"));
        }
        if script.contains("scrollTo") {
            state.log.push("scroll".to_string());
            return Ok(Value::Null);
        }
        state.log.push("extent".to_string());
        let extent = if state.extents.len() > 1 {
            state.extents.pop_front()
        } else {
            state.extents.front().copied()
        };
        Ok(json!(extent.unwrap_or(0)))
    }

    async fn switch_to_frame(&self, frame: &ElementRef) -> Result<(), DriverError> {
        let mut state = self.state();
        let (selector, _) = state.element(frame)?;
        state.log.push(format!("frame {selector}"));
        state.in_frame = true;
        Ok(())
    }

    async fn switch_to_default(&self) -> Result<(), DriverError> {
        let mut state = self.state();
        state.log.push("default".to_string());
        state.in_frame = false;
        Ok(())
    }

    async fn quit(&self) -> Result<(), DriverError> {
        let mut state = self.state();
        state.log.push("quit".to_string());
        state.quit_calls += 1;
        if state.fail_quit {
            return Err(command_error("invalid session id", "session already gone"));
        }
        Ok(())
    }
}

/// Hands out clones of one `MockDriver` so tests can inspect it afterwards.
#[derive(Clone, Default)]
pub struct MockLauncher {
    driver: MockDriver,
    fail: bool,
}

impl MockLauncher {
    pub fn new(driver: MockDriver) -> Self {
        Self {
            driver,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            driver: MockDriver::new(),
            fail: true,
        }
    }

    pub fn driver(&self) -> &MockDriver {
        &self.driver
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self) -> Result<MockDriver, DriverError> {
        if self.fail {
            return Err(command_error("session not created", "chrome not reachable"));
        }
        Ok(self.driver.clone())
    }
}
