//! Edit command for changing existing events.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dp_core::{Color, EventPatch};
use dp_db::Database;

use super::add::MutationResponse;
use super::conflicts::{conflict_entries, write_conflicts};
use super::format::conflict_warning;
use super::util::{parse_datetime, parse_event_id};
use crate::EditArgs;

/// Builds a patch from command-line arguments.
pub fn patch_from_args(args: &EditArgs, today: NaiveDate) -> Result<EventPatch> {
    let start_time = args
        .start
        .as_deref()
        .map(|s| parse_datetime(s, today).map(Some))
        .transpose()
        .context("invalid --start")?;
    let end_time = if args.clear_end {
        Some(None)
    } else {
        args.end
            .as_deref()
            .map(|s| parse_datetime(s, today).map(Some))
            .transpose()
            .context("invalid --end")?
    };
    let description = if args.clear_description {
        Some(None)
    } else {
        args.description.clone().map(Some)
    };
    let is_all_day = match (args.all_day, args.timed) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    let color = args
        .color
        .as_deref()
        .map(Color::new)
        .transpose()
        .context("invalid --color")?;

    Ok(EventPatch {
        title: args.title.clone(),
        description,
        start_time,
        end_time,
        is_all_day,
        color,
    })
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &EditArgs, today: NaiveDate) -> Result<()> {
    let id = parse_event_id(&args.id)?;
    let patch = patch_from_args(args, today)?;
    if patch.is_empty() {
        anyhow::bail!("nothing to change: pass at least one field to update");
    }

    let event = db
        .update_event(&id, &patch)
        .context("failed to update event")?
        .with_context(|| format!("event not found: {id}"))?;
    tracing::info!(event_id = %event.id, "event updated");

    // The stored row already carries the new values; skip it explicitly.
    let conflicts = db
        .find_conflicts(&event, Some(&id))
        .context("failed to check conflicts")?;
    let entries = conflict_entries(&event, conflicts);
    let message = format!(
        "Event updated successfully{}",
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
    if !entries.is_empty() {
        write_conflicts(writer, &entries)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDateTime;
    use dp_core::{CalendarEvent, EventDraft};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        today().and_hms_opt(h, m, 0).unwrap()
    }

    fn args(id: &str) -> EditArgs {
        EditArgs {
            id: id.to_string(),
            title: None,
            start: None,
            end: None,
            clear_end: false,
            all_day: false,
            timed: false,
            color: None,
            description: None,
            clear_description: false,
            json: false,
        }
    }

    fn add(db: &mut Database, title: &str, start: NaiveDateTime, end: NaiveDateTime) -> CalendarEvent {
        db.create_event(&EventDraft {
            title: title.to_string(),
            start_time: Some(start),
            end_time: Some(end),
            ..EventDraft::default()
        })
        .unwrap()
    }

    fn render(db: &mut Database, args: &EditArgs) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, db, args, today())?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn patch_maps_flags() {
        let mut a = args("x");
        a.clear_end = true;
        a.clear_description = true;
        a.timed = true;
        a.start = Some("10:00".to_string());
        assert!(patch_from_args(&a, today()).is_err());

        a.start = Some("today 10:00".to_string());
        let patch = patch_from_args(&a, today()).unwrap();
        assert_eq!(patch.start_time, Some(Some(at(10, 0))));
        assert_eq!(patch.end_time, Some(None));
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.is_all_day, Some(false));
        assert_eq!(patch.title, None);
    }

    #[test]
    fn edit_requires_a_change() {
        let mut db = Database::open_in_memory().unwrap();
        let event = add(&mut db, "Planning", at(9, 0), at(10, 0));
        let err = render(&mut db, &args(event.id.as_str())).unwrap_err();
        assert!(err.to_string().contains("nothing to change"));
    }

    #[test]
    fn edit_missing_event_errors() {
        let mut db = Database::open_in_memory().unwrap();
        let mut a = args("missing");
        a.title = Some("New".to_string());
        let err = render(&mut db, &a).unwrap_err();
        assert!(err.to_string().contains("event not found: missing"));
    }

    #[test]
    fn edit_never_reports_itself_as_conflict() {
        let mut db = Database::open_in_memory().unwrap();
        let event = add(&mut db, "Planning", at(9, 0), at(10, 0));

        let mut a = args(event.id.as_str());
        a.title = Some("Sprint planning".to_string());
        let output = render(&mut db, &a).unwrap();
        assert_eq!(output, "Event updated successfully\n");

        let stored = db.get_event(&event.id).unwrap().unwrap();
        assert_eq!(stored.title, "Sprint planning");
    }

    #[test]
    fn edit_reports_new_conflicts() {
        let mut db = Database::open_in_memory().unwrap();
        let event = add(&mut db, "Planning", at(9, 0), at(10, 0));
        add(&mut db, "Lunch", at(12, 0), at(13, 0));

        let mut a = args(event.id.as_str());
        a.start = Some("2024-03-01 12:00".to_string());
        a.end = Some("2024-03-01 12:30".to_string());
        let output = render(&mut db, &a).unwrap();
        let first = output.lines().next().unwrap();
        assert_eq!(
            first,
            "Event updated successfully (Warning: 1 scheduling conflict(s) detected)"
        );
        assert!(output.contains("[complete]"));
    }
}
