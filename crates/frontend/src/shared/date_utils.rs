//! Utilities for date, time and money formatting

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ISO_DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("iso datetime regex")
});

/// Format message timestamp as local HH:MM
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// Format ISO date string to DD.MM.YYYY format
/// Example: "2024-03-15" or "2024-03-15T14:02:26Z" -> "15.03.2024"
pub fn format_date(date_str: &str) -> String {
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    if let Some((year, rest)) = date_part.split_once('-') {
        if let Some((month, day)) = rest.split_once('-') {
            return format!("{}.{}.{}", day, month, year);
        }
    }
    date_str.to_string()
}

/// Format amount as US dollars: 1234.5 -> "$1,234.50"
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Make every ISO date-time string in a JSON tree readable as a timestamp.
///
/// RFC 3339 strings are kept as is. Strings without an offset are read as
/// UTC and rewritten in RFC 3339. Values that only look like a date but fail
/// to parse stay untouched.
pub fn parse_json_with_dates(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_datetime(&s).unwrap_or(s)),
        Value::Array(items) => Value::Array(items.into_iter().map(parse_json_with_dates).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, parse_json_with_dates(v)))
                .collect(),
        ),
        other => other,
    }
}

fn normalize_datetime(s: &str) -> Option<String> {
    if !ISO_DATETIME_RE.is_match(s) {
        return None;
    }
    if DateTime::parse_from_rfc3339(s).is_ok() {
        return None;
    }
    let parsed = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(parsed.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
