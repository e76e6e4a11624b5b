//! Add command for creating events.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dp_core::{CalendarEvent, Color, EventDraft};
use dp_db::Database;
use serde::Serialize;

use super::conflicts::{ConflictEntry, conflict_entries, write_conflicts};
use super::format::conflict_warning;
use super::util::parse_datetime;
use crate::{AddArgs, Config};

/// JSON response for commands that write an event.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub data: CalendarEvent,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ConflictEntry>,
}

/// Builds a draft from command-line arguments.
pub fn draft_from_args(args: &AddArgs, default_color: &Color, today: NaiveDate) -> Result<EventDraft> {
    let start_time = args
        .start
        .as_deref()
        .map(|s| parse_datetime(s, today))
        .transpose()
        .context("invalid --start")?;
    let end_time = args
        .end
        .as_deref()
        .map(|s| parse_datetime(s, today))
        .transpose()
        .context("invalid --end")?;
    let color = match &args.color {
        Some(color) => Color::new(color.as_str()).context("invalid --color")?,
        None => default_color.clone(),
    };

    Ok(EventDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        start_time,
        end_time,
        is_all_day: args.all_day,
        color,
    })
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    config: &Config,
    args: &AddArgs,
    today: NaiveDate,
) -> Result<()> {
    let draft = draft_from_args(args, &config.default_color, today)?;
    let event = db.create_event(&draft).context("failed to create event")?;
    tracing::info!(event_id = %event.id, "event created");

    let conflicts = db
        .find_conflicts(&event, None)
        .context("failed to check conflicts")?;
    if !conflicts.is_empty() {
        tracing::warn!(event_id = %event.id, count = conflicts.len(), "scheduling conflicts");
    }
    let entries = conflict_entries(&event, conflicts);
    let message = format!(
        "Event created successfully{}",
        conflict_warning(entries.len())
    );

    if args.json {
        let response = MutationResponse {
            data: event,
            message,
            conflicts: entries,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&response)?)?;
        return Ok(());
    }

    writeln!(writer, "{message}")?;
    writeln!(writer, "ID: {}", event.id)?;
    if !entries.is_empty() {
        write_conflicts(writer, &entries)?;
    }
    Ok(())
}
