//! Parsing helpers shared by the activity record and the HTTP client.

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Layout of `BeginTimestamp.value`, e.g. `2015-10-22T15:19:00.000000Z`.
pub const BEGIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

// chrono treats the fractional part as optional and variable-width, so the
// exact shape is checked up front.
static BEGIN_TIMESTAMP_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}Z$").expect("timestamp pattern")
});

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}:\d{2}").expect("clock time pattern"));

/// Replace every whitespace character with a single space.
///
/// This is a per-character substitution: the output has the same number of
/// characters as the input, nothing is trimmed and runs are not collapsed.
pub fn whitespace_to_spaces(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Parse a UTC timestamp in the exact `YYYY-MM-DDTHH:MM:SS.ffffffZ` layout.
pub fn parse_begin_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if !BEGIN_TIMESTAMP_SHAPE.is_match(s) {
        return None;
    }
    NaiveDateTime::parse_from_str(s, BEGIN_TIMESTAMP_FORMAT)
        .ok()
        .map(|ndt| ndt.and_utc())
}

/// First `HH:MM` substring of a display string such as `Thu, 2015 Oct 22 17:19`.
pub fn extract_clock_time(display: &str) -> Option<&str> {
    CLOCK_TIME.find(display).map(|m| m.as_str())
}

/// Read a float from a JSON number or a numeric string.
pub fn value_as_f64(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Read an integer from a JSON number or a numeric string.
pub fn value_as_i64(v: &serde_json::Value) -> Option<i64> {
    match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
