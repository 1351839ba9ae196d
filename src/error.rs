use std::time::Duration;

/// Failures reported by a browser driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Browser command failed ({error}): {message}")]
    Command { error: String, message: String },

    #[error("Unexpected browser response: {0}")]
    Protocol(String),
}

impl DriverError {
    pub(crate) fn stale(handle: &str) -> Self {
        DriverError::Command {
            error: "stale element reference".to_string(),
            message: format!("unknown element handle {handle}"),
        }
    }
}

/// A filter/sort step that did not complete. Never fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum StepFailure {
    #[error("Step '{step}' timed out after {}s", .after.as_secs_f32())]
    Timeout { step: String, after: Duration },

    #[error("Step '{step}' failed: {source}")]
    Driver {
        step: String,
        #[source]
        source: DriverError,
    },
}

/// Run-level failures. Everything finer grained is logged and absorbed.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("Browser session could not be started: {0}")]
    Session(#[source] DriverError),

    #[error("Pagination failed: {0}")]
    Pagination(#[source] DriverError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
