use std::time::Duration;

use crate::driver::{BrowserDriver, WaitCondition};
use crate::locator::LocatorDescriptor;
use crate::models::Field;

/// Result of reading one field. Absence degrades the record, never the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome<T> {
    Present(T),
    Absent,
}

impl<T> FieldOutcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            FieldOutcome::Present(value) => Some(value),
            FieldOutcome::Absent => None,
        }
    }
}

/// Reads fields from the listing page currently loaded in `driver`.
/// Every call is isolated: failures are logged with the listing URL and
/// field name and come back as `Absent`.
pub struct FieldExtractor<'a, D: BrowserDriver + ?Sized> {
    driver: &'a D,
    listing: &'a str,
}

impl<'a, D: BrowserDriver + ?Sized> FieldExtractor<'a, D> {
    pub fn new(driver: &'a D, listing: &'a str) -> Self {
        Self { driver, listing }
    }

    /// Click the optional "more info" control once. Missing or broken
    /// controls are ignored.
    pub async fn expand_details(&self, locator: &LocatorDescriptor, timeout: Duration) -> bool {
        let button = match self
            .driver
            .wait_until(WaitCondition::Clickable(locator), timeout)
            .await
        {
            Ok(Some(button)) => button,
            Ok(None) => {
                tracing::debug!("No details control on {} ({locator})", self.listing);
                return false;
            }
            Err(e) => {
                tracing::warn!("Details control lookup failed on {}: {e}", self.listing);
                return false;
            }
        };

        match self.driver.click(&button).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not expand details on {}: {e}", self.listing);
                false
            }
        }
    }

    /// Text of the first element matching `locator`.
    pub async fn text(&self, field: Field, locator: &LocatorDescriptor) -> FieldOutcome<String> {
        let element = match self.driver.find(locator).await {
            Ok(Some(element)) => element,
            Ok(None) => return self.absent(field, "element not found"),
            Err(e) => return self.absent(field, &e.to_string()),
        };

        match self.driver.text(&element).await {
            Ok(text) => FieldOutcome::Present(text),
            Err(e) => self.absent(field, &e.to_string()),
        }
    }

    /// Trimmed texts of every element matching `locator`, optionally split on
    /// `delimiter`. Blank entries are dropped; no matches is an empty list.
    pub async fn list(
        &self,
        field: Field,
        locator: &LocatorDescriptor,
        delimiter: Option<&str>,
    ) -> FieldOutcome<Vec<String>> {
        let elements = match self.driver.find_all(locator).await {
            Ok(elements) => elements,
            Err(e) => return self.absent(field, &e.to_string()),
        };

        let mut values = Vec::with_capacity(elements.len());
        for element in &elements {
            let text = match self.driver.text(element).await {
                Ok(text) => text,
                Err(e) => return self.absent(field, &e.to_string()),
            };
            match delimiter {
                Some(delimiter) => values.extend(split_trimmed(&text, delimiter)),
                None => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        values.push(trimmed.to_string());
                    }
                }
            }
        }
        FieldOutcome::Present(values)
    }

    fn absent<T>(&self, field: Field, reason: &str) -> FieldOutcome<T> {
        tracing::warn!("Failed to extract '{field}' from {}: {reason}", self.listing);
        FieldOutcome::Absent
    }
}

fn split_trimmed(text: &str, delimiter: &str) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
