//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use dp_core::EventId;
use regex::Regex;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(today|tomorrow|yesterday)|(\d+)\s+days?\s+ago|in\s+(\d+)\s+days?)$").unwrap()
});

/// Conservative bound for relative offsets (~1000 years in days).
const MAX_RELATIVE_DAYS: u64 = 1000 * 365;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Parse a date as `YYYY-MM-DD` or relative to `today`.
///
/// Supports:
/// - ISO 8601: "2024-03-01"
/// - Relative: "today", "tomorrow", "yesterday", "3 days ago", "in 2 days"
pub fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let lowered = s.to_ascii_lowercase();
    let Some(caps) = RELATIVE_DATE_RE.captures(&lowered) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2024-03-01) or relative (e.g., 'tomorrow', '3 days ago', 'in 2 days')"
        );
    };

    if let Some(word) = caps.get(1) {
        let date = match word.as_str() {
            "tomorrow" => today.checked_add_days(Days::new(1)),
            "yesterday" => today.checked_sub_days(Days::new(1)),
            _ => Some(today),
        };
        return date.with_context(|| format!("date out of range: {s}"));
    }

    let (count, forward) = match (caps.get(2), caps.get(3)) {
        (Some(n), _) => (n.as_str(), false),
        (None, Some(n)) => (n.as_str(), true),
        (None, None) => anyhow::bail!("Invalid date: {s}"),
    };
    let n: u64 = count
        .parse()
        .context("failed to parse number in relative date")?;
    if n > MAX_RELATIVE_DAYS {
        anyhow::bail!("Relative date too far away: {s}");
    }

    let date = if forward {
        today.checked_add_days(Days::new(n))
    } else {
        today.checked_sub_days(Days::new(n))
    };
    date.with_context(|| format!("date out of range: {s}"))
}

/// Parse a date-time.
///
/// Supports `YYYY-MM-DDTHH:MM[:SS]`, any date accepted by [`parse_date`]
/// followed by a space and `HH:MM[:SS]` ("2024-03-01 09:00", "tomorrow 14:30"),
/// and a bare date, which means midnight.
pub fn parse_datetime(s: &str, today: NaiveDate) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Some((date_part, time_part)) = s.rsplit_once(char::is_whitespace) {
        if let Some(time) = parse_time(time_part) {
            let date = parse_date(date_part, today)?;
            return Ok(date.and_time(time));
        }
    }

    let date = parse_date(s, today).with_context(|| {
        format!("Invalid date-time: {s}. Use YYYY-MM-DDTHH:MM, 'YYYY-MM-DD HH:MM' or a date")
    })?;
    Ok(date.and_time(NaiveTime::MIN))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
}

/// Parse an event ID argument.
pub fn parse_event_id(s: &str) -> Result<EventId> {
    EventId::new(s.trim()).context("invalid event ID")
}

/// Shorten an ID for tables.
pub fn short_id(id: &EventId) -> String {
    id.as_str().chars().take(8).collect()
}

/// Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max.saturating_sub(3)).collect::<String>())
    } else {
        s.to_string()
    }
}
