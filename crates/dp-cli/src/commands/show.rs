//! Show command for displaying one event.

use std::io::Write;

use anyhow::{Context, Result};
use dp_core::CalendarEvent;
use dp_db::Database;
use serde::Serialize;

use super::conflicts::{ConflictEntry, conflict_entries, write_conflicts};
use super::format::{format_date, format_span};
use super::util::parse_event_id;

#[derive(Debug, Serialize)]
struct ShowResponse {
    event: CalendarEvent,
    conflicts: Vec<ConflictEntry>,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, id: &str, json: bool) -> Result<()> {
    let id = parse_event_id(id)?;
    let event = db
        .get_event(&id)
        .context("failed to load event")?
        .with_context(|| format!("event not found: {id}"))?;
    let conflicts = db
        .find_conflicts(&event, None)
        .context("failed to check conflicts")?;
    let conflicts = conflict_entries(&event, conflicts);

    if json {
        let response = ShowResponse { event, conflicts };
        writeln!(writer, "{}", serde_json::to_string_pretty(&response)?)?;
        return Ok(());
    }

    writeln!(writer, "{}", event.title)?;
    writeln!(writer, "  ID:          {}", event.id)?;
    writeln!(writer, "  Date:        {}", format_date(&event))?;
    writeln!(writer, "  Time:        {}", format_span(&event))?;
    if !event.is_all_day && event.end_time.is_none() {
        writeln!(writer, "               (no end time, assumed one hour)")?;
    }
    writeln!(writer, "  Color:       {}", event.color)?;
    if let Some(description) = &event.description {
        writeln!(writer, "  Description: {description}")?;
    }
    writeln!(
        writer,
        "  Updated:     {}",
        event.updated_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(writer)?;
    write_conflicts(writer, &conflicts)?;
    Ok(())
}
