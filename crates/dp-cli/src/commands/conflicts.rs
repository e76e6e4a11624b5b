//! Conflicts command for listing the events that overlap one event.

use std::io::Write;

use anyhow::{Context, Result};
use dp_core::{CalendarEvent, OverlapSeverity, severity};
use dp_db::Database;
use serde::Serialize;

use super::format::{conflict_message, format_date, format_span};
use super::util::parse_event_id;

/// A conflicting event with the severity of its overlap.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub overlap_severity: OverlapSeverity,
}

/// Pairs each conflict with its severity relative to `target`.
pub fn conflict_entries(target: &CalendarEvent, conflicts: Vec<CalendarEvent>) -> Vec<ConflictEntry> {
    conflicts
        .into_iter()
        .map(|event| ConflictEntry {
            overlap_severity: severity(target, &event),
            event,
        })
        .collect()
}

/// Writes the conflict sentence and one line per conflict.
pub fn write_conflicts<W: Write>(writer: &mut W, entries: &[ConflictEntry]) -> Result<()> {
    let events: Vec<&CalendarEvent> = entries.iter().map(|entry| &entry.event).collect();
    let Some(message) = conflict_message(&events) else {
        writeln!(writer, "No conflicts.")?;
        return Ok(());
    };

    writeln!(writer, "{message}")?;
    for entry in entries {
        writeln!(
            writer,
            "  [{:<8}] {}  {}  {} ({})",
            entry.overlap_severity,
            format_date(&entry.event),
            format_span(&entry.event),
            entry.event.title,
            entry.event.id,
        )?;
    }
    Ok(())
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
    let entries = conflict_entries(&event, conflicts);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        write_conflicts(writer, &entries)?;
    }
    Ok(())
}
