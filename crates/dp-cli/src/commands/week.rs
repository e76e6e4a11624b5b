//! Week command for the seven-day agenda.
//!
//! Weeks run Sunday through Saturday. Each day goes through the same
//! layout and overlap pass as `dp day`.

use std::fmt::Write as _;
use std::io::Write;
use std::iter;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate};
use dp_core::LayoutConfig;
use dp_db::Database;
use serde::Serialize;

use super::day::{DayView, build_day_view};
use super::format::format_span;
use super::util::{parse_date, truncate};

/// The seven day views of one week.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayView>,
}

/// Returns the Sunday and Saturday of the week containing `date`.
///
/// Returns `None` when the week would leave chrono's date range.
pub fn week_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let back = u64::from(date.weekday().num_days_from_sunday());
    let start = date.checked_sub_days(Days::new(back))?;
    let end = start.checked_add_days(Days::new(6))?;
    Some((start, end))
}

/// Format a week view for human-readable output.
pub fn format_week(view: &WeekView) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Week of {} - {}",
        view.start.format("%B %-d"),
        view.end.format("%B %-d, %Y")
    );

    for day in &view.days {
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", day.date.format("%a %b %-d"));
        if day.all_day.is_empty() && day.timed.is_empty() {
            let _ = writeln!(output, "  No events.");
            continue;
        }
        for event in &day.all_day {
            let _ = writeln!(output, "  {:<19}  {}", format_span(event), truncate(&event.title, 24));
        }
        for entry in &day.timed {
            let mut line = format!(
                "  {:<19}  {}",
                format_span(&entry.event),
                truncate(&entry.event.title, 24)
            );
            if !entry.overlaps.is_empty() {
                let badges: Vec<String> = entry
                    .overlaps
                    .iter()
                    .map(|o| format!("{} ({})", o.other_title, o.severity))
                    .collect();
                let _ = write!(line, "  [overlaps: {}]", badges.join(", "));
            }
            let _ = writeln!(output, "{line}");
        }
    }

    output
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
    let (start, end) =
        week_bounds(date).with_context(|| format!("no full week around {date}"))?;

    let mut days = Vec::new();
    for day in iter::successors(Some(start), |d| d.succ_opt()).take_while(|d| *d <= end) {
        let events = db
            .events_for_date(day)
            .with_context(|| format!("failed to load events for {day}"))?;
        days.push(build_day_view(events, day, config));
    }
    tracing::debug!(%start, %end, "loaded week");
    let view = WeekView { start, end, days };

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
    } else {
        write!(writer, "{}", format_week(&view))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDateTime;
    use dp_core::EventDraft;
    use insta::assert_snapshot;

    fn feb(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn mar(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn timed(title: &str, start: NaiveDateTime, end: Option<NaiveDateTime>) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            start_time: Some(start),
            end_time: end,
            ..EventDraft::default()
        }
    }

    fn seeded() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        for draft in [
            timed("Planning", at(feb(26), 9, 0), Some(at(feb(26), 10, 0))),
            timed("Standup", at(mar(1), 9, 0), Some(at(mar(1), 10, 0))),
            timed("Review", at(mar(1), 9, 30), Some(at(mar(1), 10, 30))),
            EventDraft {
                title: "Holiday".to_string(),
                start_time: Some(at(mar(2), 0, 0)),
                is_all_day: true,
                ..EventDraft::default()
            },
            timed("Brunch", at(mar(3), 11, 0), None),
        ] {
            db.create_event(&draft).unwrap();
        }
        db
    }

    #[test]
    fn week_runs_sunday_to_saturday() {
        for d in 25..=29 {
            assert_eq!(week_bounds(feb(d)), Some((feb(25), mar(2))));
        }
        assert_eq!(week_bounds(mar(2)), Some((feb(25), mar(2))));
        assert_eq!(week_bounds(mar(3)), Some((mar(3), mar(9))));
    }

    #[test]
    fn week_command_renders_agenda() {
        let db = seeded();
        let mut output = Vec::new();
        run(&mut output, &db, &LayoutConfig::default(), Some("2024-03-01"), false, mar(1)).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_snapshot!(output, @r"
        Week of February 25 - March 2, 2024

        Sun Feb 25
          No events.

        Mon Feb 26
          9:00 AM - 10:00 AM   Planning

        Tue Feb 27
          No events.

        Wed Feb 28
          No events.

        Thu Feb 29
          No events.

        Fri Mar 1
          9:00 AM - 10:00 AM   Standup  [overlaps: Review (major)]
          9:30 AM - 10:30 AM   Review  [overlaps: Standup (major)]

        Sat Mar 2
          All day              Holiday
        ");
    }

    #[test]
    fn week_command_json() {
        let db = seeded();
        let mut output = Vec::new();
        run(&mut output, &db, &LayoutConfig::default(), None, true, feb(27)).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(parsed["start"], "2024-02-25");
        assert_eq!(parsed["end"], "2024-03-02");
        let days = parsed["days"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(days[1]["timed"][0]["title"], "Planning");
        assert_eq!(days[5]["date"], "2024-03-01");
        assert_eq!(days[5]["columnCount"], 2);
        assert_eq!(days[5]["timed"][1]["position"]["column"], 1);
        assert_eq!(days[6]["allDay"][0]["title"], "Holiday");
        assert!(days[6]["timed"].as_array().unwrap().is_empty());
    }

    #[test]
    fn week_command_rejects_bad_date() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let err = run(&mut output, &db, &LayoutConfig::default(), Some("someday"), false, mar(1))
            .unwrap_err();
        assert!(err.to_string().contains("--date"));
    }
}
