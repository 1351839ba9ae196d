use chrono::{FixedOffset, NaiveDate, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Offset of the timezone deadlines are expressed in (KST, UTC+9).
pub const TARGET_OFFSET_SECS: i32 = 9 * 3600;

/// Source-specific deadline shape: a regex locating the date and the
/// strftime format it is written in.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawDeadlinePattern")]
pub struct DeadlinePattern {
    regex: Regex,
    format: String,
}

#[derive(Deserialize)]
struct RawDeadlinePattern {
    pattern: String,
    format: String,
}

impl TryFrom<RawDeadlinePattern> for DeadlinePattern {
    type Error = regex::Error;

    fn try_from(raw: RawDeadlinePattern) -> Result<Self, Self::Error> {
        Self::new(&raw.pattern, raw.format)
    }
}

impl DeadlinePattern {
    pub fn new(pattern: &str, format: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            format: format.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn convert(&self, raw: &str) -> DeadlineValue {
        convert_deadline(raw, self)
    }
}

/// A converted deadline: an epoch timestamp, or the original text when the
/// deadline is not date shaped ("채용시까지", "상시채용", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeadlineValue {
    Timestamp(i64),
    Text(String),
}

/// Convert deadline text to the Unix timestamp of 23:59:00 on that day in
/// the target timezone. A regex miss or a parse miss returns `raw` as text.
pub fn convert_deadline(raw: &str, pattern: &DeadlinePattern) -> DeadlineValue {
    let passthrough = || DeadlineValue::Text(raw.to_string());

    let Some(found) = pattern.regex.find(raw.trim()) else {
        return passthrough();
    };

    match NaiveDate::parse_from_str(found.as_str(), &pattern.format) {
        Ok(date) => end_of_day_timestamp(date)
            .map(DeadlineValue::Timestamp)
            .unwrap_or_else(passthrough),
        Err(e) => {
            tracing::debug!("Deadline '{raw}' matched but did not parse as '{}': {e}", pattern.format);
            passthrough()
        }
    }
}

fn end_of_day_timestamp(date: NaiveDate) -> Option<i64> {
    let offset = FixedOffset::east_opt(TARGET_OFFSET_SECS)?;
    let local = date.and_hms_opt(23, 59, 0)?;
    offset
        .from_local_datetime(&local)
        .single()
        .map(|instant| instant.timestamp())
}
