//! Status command for showing where events are stored and how many exist.

use std::io::Write;

use anyhow::{Context, Result};
use dp_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let summary = db.summary().context("failed to summarize events")?;

    writeln!(writer, "Day planner status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if summary.total_events == 0 {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Events: {} ({} all-day)",
        summary.total_events, summary.all_day_events
    )?;
    if let (Some(first), Some(last)) = (summary.first_start, summary.last_start) {
        writeln!(
            writer,
            "Scheduled: {} to {}",
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use dp_core::{Color, EventDraft, LayoutConfig};
    use insta::assert_snapshot;

    fn config(path: std::path::PathBuf) -> Config {
        Config {
            database_path: path,
            default_color: Color::default(),
            layout: LayoutConfig::default(),
        }
    }

    #[test]
    fn status_command_outputs_counts() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("dp.db");
        let mut db = Database::open(&db_path).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        db.create_event(&EventDraft {
            title: "Kickoff".to_string(),
            start_time: day.and_hms_opt(9, 0, 0),
            ..EventDraft::default()
        })
        .unwrap();
        db.create_event(&EventDraft {
            title: "Offsite".to_string(),
            start_time: day.succ_opt().and_then(|d| d.and_hms_opt(0, 0, 0)),
            is_all_day: true,
            ..EventDraft::default()
        })
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &config(db_path.clone())).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&db_path.display().to_string(), "[TEMP]/dp.db");
        assert_snapshot!(output, @r"
        Day planner status
        Database: [TEMP]/dp.db
        Events: 2 (1 all-day)
        Scheduled: 2025-01-01 09:00 to 2025-01-02 00:00
        ");
    }

    #[test]
    fn status_command_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, &config("mem.db".into())).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Day planner status\nDatabase: mem.db\nNo events recorded.\n"
        );
    }
}
