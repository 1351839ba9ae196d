use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

use crate::dates::DeadlinePattern;
use crate::harvest::filter::FilterStep;
use crate::locator::LocatorDescriptor;

/// TOML file listing every harvestable site.
#[derive(Debug, Clone, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<SourceConfig>,
}

/// Everything the harvester needs to know about one site. Loaded once and
/// shared read-only for the run.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub locators: LocatorBundle,
    #[serde(default)]
    pub deadline: Option<DeadlinePattern>,
    /// Split each skills element's text on this delimiter.
    #[serde(default)]
    pub skills_delimiter: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterStep>,
    #[serde(default = "default_scroll_settle")]
    pub scroll_settle_secs: u64,
    #[serde(default = "default_details_timeout")]
    pub details_timeout_secs: u64,
    #[serde(default)]
    pub pacing: PacingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatorBundle {
    pub links: LocatorDescriptor,
    pub title: LocatorDescriptor,
    pub company: LocatorDescriptor,
    pub location: LocatorDescriptor,
    pub deadline: LocatorDescriptor,
    pub experience: LocatorDescriptor,
    pub skills: LocatorDescriptor,
    /// Optional "more info" control expanded before extraction.
    #[serde(default)]
    pub details_button: Option<LocatorDescriptor>,
}

/// Randomized pause between listing visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: 2,
            max_secs: 3,
        }
    }
}

/// Upper bound for either pacing limit.
const MAX_PACING_SECS: u64 = 3600;

impl PacingConfig {
    /// Uniform pause in `[min_secs, max_secs]` at millisecond resolution.
    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let min = self.min_secs.saturating_mul(1000);
        let max = self.max_secs.saturating_mul(1000).max(min);
        Duration::from_millis(rng.random_range(min..=max))
    }
}

fn default_scroll_settle() -> u64 {
    2
}

fn default_details_timeout() -> u64 {
    10
}

impl SourceConfig {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_secs(self.scroll_settle_secs)
    }

    pub fn details_timeout(&self) -> Duration {
        Duration::from_secs(self.details_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("source name must not be empty");
        }
        if self.url.trim().is_empty() {
            anyhow::bail!("source '{}' has no url", self.name);
        }
        if self.pacing.max_secs > MAX_PACING_SECS {
            anyhow::bail!(
                "source '{}' pacing max_secs ({}) exceeds {MAX_PACING_SECS}",
                self.name,
                self.pacing.max_secs
            );
        }
        if self.pacing.min_secs > self.pacing.max_secs {
            anyhow::bail!(
                "source '{}' pacing min_secs ({}) exceeds max_secs ({})",
                self.name,
                self.pacing.min_secs,
                self.pacing.max_secs
            );
        }
        Ok(())
    }
}

/// Load and validate a sources file.
pub fn load_sources(path: &Path) -> Result<Vec<Arc<SourceConfig>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sources file: {}", path.display()))?;
    parse_sources(&content)
        .with_context(|| format!("Invalid sources file: {}", path.display()))
}

pub fn parse_sources(content: &str) -> Result<Vec<Arc<SourceConfig>>> {
    let file: SourcesFile = toml::from_str(content).context("Failed to parse sources as TOML")?;

    let mut seen = HashSet::new();
    for source in &file.sources {
        source.validate()?;
        if !seen.insert(source.name.as_str()) {
            anyhow::bail!("duplicate source name '{}'", source.name);
        }
    }

    Ok(file.sources.into_iter().map(Arc::new).collect())
}

/// Pick sources by name, preserving the requested order. Empty `names`
/// selects every source.
pub fn select_sources(
    sources: &[Arc<SourceConfig>],
    names: &[String],
) -> Result<Vec<Arc<SourceConfig>>> {
    if names.is_empty() {
        return Ok(sources.to_vec());
    }
    names
        .iter()
        .map(|name| {
            sources
                .iter()
                .find(|s| &s.name == name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown source: {name}"))
        })
        .collect()
}
