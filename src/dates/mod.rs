//! Date normalization shared by the browser harvester and the API connectors.
//!
//! Every function here is total: a value that cannot be understood is handed
//! back untouched, never turned into an error.

pub mod deadline;

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

pub use deadline::{DeadlinePattern, DeadlineValue};

/// Output shape used across all sources (`YYYY-MM-DD`).
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Compact numeric shape (`YYYYMMDD`) that skips the general cascade.
pub const COMPACT_FORMAT: &str = "%Y%m%d";

/// Candidate formats tried, in order, when no fast path applies.
pub const DEFAULT_INPUT_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d", "%Y.%m.%d"];

static CANONICAL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("static regex"));

static COMPACT_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}").expect("static regex"));

/// Normalize `raw` into `output_format`.
///
/// 1. Already canonical: returned unchanged.
/// 2. Compact `YYYYMMDD`: parsed directly.
/// 3. Otherwise the first of `candidate_formats` that parses wins.
/// 4. Nothing parses: `raw` is returned unchanged.
pub fn normalize(raw: &str, candidate_formats: &[&str], output_format: &str) -> String {
    if CANONICAL_SHAPE.is_match(raw) {
        return raw.to_string();
    }

    if COMPACT_SHAPE.is_match(raw)
        && let Some(rendered) = parse_and_render(raw, COMPACT_FORMAT, output_format)
    {
        return rendered;
    }

    candidate_formats
        .iter()
        .find_map(|fmt| parse_and_render(raw, fmt, output_format))
        .unwrap_or_else(|| raw.to_string())
}

/// [`normalize`] with the default candidates and canonical output.
pub fn normalize_default(raw: &str) -> String {
    normalize(raw, DEFAULT_INPUT_FORMATS, CANONICAL_FORMAT)
}

/// Normalize the named date fields of a JSON record in place.
/// Missing, empty and non-string fields are left alone.
pub fn normalize_fields(record: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        if let Some(Value::String(raw)) = record.get_mut(*field)
            && !raw.is_empty()
        {
            *raw = normalize_default(raw);
        }
    }
}

/// [`normalize_fields`] over a single record or an array of records.
/// Returns how many records were visited.
pub fn normalize_records(value: &mut Value, fields: &[&str]) -> usize {
    match value {
        Value::Object(record) => {
            normalize_fields(record, fields);
            1
        }
        Value::Array(items) => {
            let mut visited = 0;
            for record in items.iter_mut().filter_map(Value::as_object_mut) {
                normalize_fields(record, fields);
                visited += 1;
            }
            visited
        }
        _ => 0,
    }
}

fn parse_and_render(raw: &str, input_format: &str, output_format: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(raw, input_format).ok()?;
    let mut rendered = String::new();
    // chrono reports bad format strings through fmt::Error
    write!(rendered, "{}", date.format(output_format)).ok()?;
    Some(rendered)
}
