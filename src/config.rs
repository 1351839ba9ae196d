use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "jobharvest", about = "Browser-driven job listing harvester")]
pub struct Config {
    /// TOML file describing the harvestable sources
    #[arg(long, env = "SOURCES_FILE", default_value = "config/sources.toml")]
    pub sources_file: PathBuf,

    /// WebDriver endpoint (chromedriver, selenium, ...)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long, env = "HEADLESS", default_value = "true", action = ArgAction::Set)]
    pub headless: bool,

    /// Implicit element wait applied to every session, in seconds
    #[arg(long, env = "IMPLICIT_WAIT_SECS", default_value = "3")]
    pub implicit_wait_secs: u64,

    /// Directory batches are written below
    #[arg(long, env = "OUTPUT_DIR", default_value = "data")]
    pub output_dir: PathBuf,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Harvest listings (default when no subcommand given)
    Harvest {
        /// Source name; repeat for several. All sources when omitted.
        #[arg(long = "source")]
        sources: Vec<String>,
    },
    /// List configured sources
    Sources,
    /// Normalize date fields of JSON records and print the result
    NormalizeDates {
        /// JSON file holding one record or an array of records
        #[arg(long)]
        input: PathBuf,

        /// Field to normalize; repeat for several
        #[arg(long = "field", required = true)]
        fields: Vec<String>,
    },
}

impl Config {
    /// Resolve the command, defaulting to harvesting every source.
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Harvest {
            sources: Vec::new(),
        })
    }
}
