//! List command for showing stored events.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use dp_core::CalendarEvent;
use dp_db::Database;

use super::format::{format_date, format_span};
use super::util::{parse_date, short_id, truncate};

/// Resolves `--from`/`--to` into an inclusive date range.
///
/// A single bound means that one day.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let from = from.map(|s| parse_date(s, today)).transpose().context("invalid --from")?;
    let to = to.map(|s| parse_date(s, today)).transpose().context("invalid --to")?;
    let range = match (from, to) {
        (None, None) => return Ok(None),
        (Some(from), None) => (from, from),
        (None, Some(to)) => (to, to),
        (Some(from), Some(to)) => (from, to),
    };
    if range.1 < range.0 {
        anyhow::bail!("--to ({}) is before --from ({})", range.1, range.0);
    }
    Ok(Some(range))
}

/// Format events as a table.
pub fn format_events(events: &[CalendarEvent]) -> String {
    let mut output = String::new();

    if events.is_empty() {
        output.push_str("No events.\n");
        return output;
    }

    let _ = writeln!(
        output,
        "{:<8}  {:<10}  {:<19}  Title",
        "ID", "Date", "Time"
    );
    let _ = writeln!(
        output,
        "────────  ──────────  ───────────────────  ──────────────────────────────"
    );
    for event in events {
        let _ = writeln!(
            output,
            "{:<8}  {:<10}  {:<19}  {}",
            short_id(&event.id),
            format_date(event),
            format_span(event),
            truncate(&event.title, 40)
        );
    }
    output
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    let events = match resolve_range(from, to, today)? {
        None => db.list_events(),
        Some((from, to)) => {
            let end = to.and_hms_opt(23, 59, 59).unwrap_or_else(|| to.and_time(NaiveTime::MIN));
            db.list_events_in_range(from.and_time(NaiveTime::MIN), end)
        }
    }
    .context("failed to list events")?;
    tracing::debug!(count = events.len(), "listed events");

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
    } else {
        write!(writer, "{}", format_events(&events))?;
    }
    Ok(())
}
