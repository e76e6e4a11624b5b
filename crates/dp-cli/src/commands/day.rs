//! Day command for the daily agenda.
//!
//! This module implements `dp day`, which shows the all-day row, every timed
//! event with its column geometry and overlap badges, and the clusters of
//! mutually overlapping events.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dp_core::{
    CalendarEvent, EventId, EventPosition, LayoutConfig, OverlapAnnotation, Schedulable, annotate,
    layout, overlap_groups,
};
use dp_db::Database;
use serde::Serialize;

use super::format::format_span;
use super::util::{parse_date, truncate};

/// Everything needed to render one day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    pub date: NaiveDate,
    pub all_day: Vec<CalendarEvent>,
    pub timed: Vec<TimedEntry>,
    /// Clusters of overlapping events, by ID.
    pub groups: Vec<Vec<EventId>>,
    pub column_count: usize,
    pub total_height: f64,
    #[serde(skip)]
    window: (u32, u32),
}

/// A timed event with its geometry and conflicts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedEntry {
    #[serde(flatten)]
    pub event: CalendarEvent,
    /// `None` when the event is outside the visible hours or starts on an
    /// earlier day.
    pub position: Option<EventPosition>,
    pub overlaps: Vec<OverlapAnnotation>,
}

/// Splits a day's events and runs layout and overlap detection over them.
pub fn build_day_view(events: Vec<CalendarEvent>, date: NaiveDate, config: &LayoutConfig) -> DayView {
    let groups: Vec<Vec<EventId>> = overlap_groups(&events)
        .into_iter()
        .map(|group| group.into_iter().map(|e| e.id.clone()).collect())
        .collect();
    let annotations: Vec<Vec<OverlapAnnotation>> = events
        .iter()
        .map(|event| annotate(event, &events, None))
        .collect();

    // Events carried over from an earlier day would be placed at their
    // original clock time; only lay out events that start on this date.
    let starting_today: Vec<&CalendarEvent> = events
        .iter()
        .filter(|e| !e.is_all_day && e.date() == Some(date))
        .collect();
    let day_layout = layout(&starting_today, config);

    let mut all_day = Vec::new();
    let mut timed = Vec::new();
    for (event, overlaps) in events.into_iter().zip(annotations) {
        if event.is_all_day || event.start_time.is_none() {
            all_day.push(event);
        } else {
            let position = day_layout.get(&event.id).cloned();
            timed.push(TimedEntry {
                event,
                position,
                overlaps,
            });
        }
    }

    DayView {
        date,
        all_day,
        timed,
        groups,
        column_count: day_layout.column_count(),
        total_height: config.total_height(),
        window: (config.visible_start_hour, config.visible_end_hour + 1),
    }
}

/// Format a day view for human-readable output.
pub fn format_day(view: &DayView) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{}", view.date.format("%A, %B %-d, %Y"));

    if !view.all_day.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "All day");
        for event in &view.all_day {
            let _ = writeln!(output, "  {}", event.title);
        }
    }

    let _ = writeln!(output);
    if view.timed.is_empty() {
        let _ = writeln!(output, "No timed events.");
    } else {
        let columns = if view.column_count == 1 { "column" } else { "columns" };
        let _ = writeln!(
            output,
            "Schedule ({:02}:00-{:02}:00, {} {columns})",
            view.window.0, view.window.1, view.column_count
        );
        for entry in &view.timed {
            let _ = writeln!(
                output,
                "  {:<19}  {:<24}  {}",
                format_span(&entry.event),
                truncate(&entry.event.title, 24),
                placement(entry, view.date)
            );
        }
    }

    if !view.groups.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Overlap groups");
        for (i, group) in view.groups.iter().enumerate() {
            let titles: Vec<String> = group
                .iter()
                .filter_map(|id| title_of(view, id))
                .map(|title| format!("\"{title}\""))
                .collect();
            let _ = writeln!(output, "  {}. {}", i + 1, titles.join(", "));
        }
    }

    output
}

fn placement(entry: &TimedEntry, date: NaiveDate) -> String {
    let mut detail = match (&entry.position, entry.event.date()) {
        (Some(position), _) => format!("col {}/{}", position.column + 1, position.total_columns),
        (None, Some(start)) if start != date => format!("(continues from {start})"),
        (None, _) => "(outside visible hours)".to_string(),
    };
    if !entry.overlaps.is_empty() {
        let badges: Vec<String> = entry
            .overlaps
            .iter()
            .map(|o| format!("{} ({})", o.other_title, o.severity))
            .collect();
        let _ = write!(detail, "  [overlaps: {}]", badges.join(", "));
    }
    detail
}

fn title_of<'a>(view: &'a DayView, id: &EventId) -> Option<&'a str> {
    view.all_day
        .iter()
        .chain(view.timed.iter().map(|entry| &entry.event))
        .find(|event| &event.id == id)
        .map(|event| event.title.as_str())
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &LayoutConfig,
    date: Option<&str>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    config.validate().context("invalid layout configuration")?;
    let date = date
        .map(|s| parse_date(s, today))
        .transpose()
        .context("invalid --date")?
        .unwrap_or(today);

    let events = db
        .events_for_date(date)
        .with_context(|| format!("failed to load events for {date}"))?;
    tracing::debug!(%date, count = events.len(), "loaded day");
    let view = build_day_view(events, date, config);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
    } else {
        write!(writer, "{}", format_day(&view))?;
    }
    Ok(())
}
