mod config;
mod dates;
mod driver;
mod error;
mod harvest;
mod locator;
mod models;
mod sink;
mod sources;

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config, LogFormat};
use crate::driver::webdriver::WebDriverLauncher;
use crate::sink::JsonFileSink;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobharvest=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_tracing(config.log_format);

    match config.resolved_command() {
        Command::Harvest { sources } => run_harvest(&config, &sources).await,
        Command::Sources => list_sources(&config.sources_file),
        Command::NormalizeDates { input, fields } => normalize_dates(&input, &fields).await,
    }
}

async fn run_harvest(config: &Config, names: &[String]) -> anyhow::Result<()> {
    let all = sources::load_sources(&config.sources_file)?;
    let selected = sources::select_sources(&all, names)?;
    if selected.is_empty() {
        tracing::warn!("No sources configured in {}", config.sources_file.display());
        return Ok(());
    }

    let launcher = WebDriverLauncher::new(&config.webdriver_url, config.headless)?
        .with_implicit_wait(Duration::from_secs(config.implicit_wait_secs));
    let sink = JsonFileSink::new(&config.output_dir);

    tracing::info!(
        "Harvesting {} source(s) via {} into {}",
        selected.len(),
        config.webdriver_url,
        sink.root().display()
    );
    harvest::runner::run(&launcher, &sink, &selected).await
}

fn list_sources(path: &Path) -> anyhow::Result<()> {
    for source in sources::load_sources(path)? {
        let deadline = source
            .deadline
            .as_ref()
            .map(|d| format!("{} as {}", d.pattern(), d.format()))
            .unwrap_or_else(|| "text".to_string());
        println!(
            "{}\t{}\t{} filter step(s)\tdeadline: {deadline}",
            source.name,
            source.url,
            source.filters.len()
        );
    }
    Ok(())
}

async fn normalize_dates(input: &Path, fields: &[String]) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", input.display()))?;

    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    let visited = dates::normalize_records(&mut value, &fields);
    tracing::info!("Normalized {} field(s) across {visited} record(s)", fields.len());

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
