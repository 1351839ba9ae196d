use std::time::Duration;

use serde::Deserialize;

use crate::driver::{BrowserDriver, ElementRef, WaitCondition};
use crate::error::StepFailure;
use crate::locator::LocatorDescriptor;

fn default_step_timeout() -> u64 {
    10
}

/// One UI interaction run before pagination (dismiss a modal, open a menu,
/// pick a category, sort, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct FilterStep {
    pub name: String,
    pub locator: LocatorDescriptor,
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(default = "default_step_timeout")]
    pub timeout_secs: u64,
    /// Pause after the step, whether or not it succeeded.
    #[serde(default)]
    pub settle_secs: u64,
}

impl FilterStep {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Wait until clickable, then click.
    Click,
    /// Wait until present, then choose the option with this value.
    SelectByValue { value: String },
    /// Switch into `frame`, click, and switch back out.
    ClickInFrame { frame: LocatorDescriptor },
}

/// Runs filter steps strictly in order. A failed step is logged and the
/// sequence moves on; the failures are returned for reporting.
pub struct FilterSequencer;

impl FilterSequencer {
    pub async fn apply<D: BrowserDriver + ?Sized>(
        driver: &D,
        steps: &[FilterStep],
    ) -> Vec<StepFailure> {
        let mut failures = Vec::new();
        for step in steps {
            match apply_step(driver, step).await {
                Ok(()) => tracing::info!("Filter step '{}' applied", step.name),
                Err(failure) => {
                    tracing::warn!("{failure}; continuing with next step");
                    failures.push(failure);
                }
            }
            if step.settle_secs > 0 {
                tokio::time::sleep(Duration::from_secs(step.settle_secs)).await;
            }
        }
        failures
    }
}

async fn apply_step<D: BrowserDriver + ?Sized>(driver: &D, step: &FilterStep) -> Result<(), StepFailure> {
    match &step.action {
        StepAction::Click => {
            let target = wait_for(driver, step, WaitCondition::Clickable(&step.locator)).await?;
            driver.click(&target).await.map_err(|e| driver_failure(step, e))
        }
        StepAction::SelectByValue { value } => {
            let target = wait_for(driver, step, WaitCondition::Present(&step.locator)).await?;
            driver
                .select_by_value(&target, value)
                .await
                .map_err(|e| driver_failure(step, e))
        }
        StepAction::ClickInFrame { frame } => {
            let frame = wait_for(driver, step, WaitCondition::Present(frame)).await?;
            driver
                .switch_to_frame(&frame)
                .await
                .map_err(|e| driver_failure(step, e))?;

            let clicked = match wait_for(driver, step, WaitCondition::Clickable(&step.locator)).await {
                Ok(target) => driver.click(&target).await.map_err(|e| driver_failure(step, e)),
                Err(failure) => Err(failure),
            };

            if let Err(e) = driver.switch_to_default().await {
                tracing::warn!("Could not leave frame after step '{}': {e}", step.name);
            }
            clicked
        }
    }
}

async fn wait_for<D: BrowserDriver + ?Sized>(
    driver: &D,
    step: &FilterStep,
    condition: WaitCondition<'_>,
) -> Result<ElementRef, StepFailure> {
    match driver.wait_until(condition, step.timeout()).await {
        Ok(Some(element)) => Ok(element),
        Ok(None) => Err(StepFailure::Timeout {
            step: step.name.clone(),
            after: step.timeout(),
        }),
        Err(e) => Err(driver_failure(step, e)),
    }
}

fn driver_failure(step: &FilterStep, source: crate::error::DriverError) -> StepFailure {
    StepFailure::Driver {
        step: step.name.clone(),
        source,
    }
}
