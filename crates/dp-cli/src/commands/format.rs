//! Human-readable rendering shared by commands.

use chrono::NaiveDateTime;
use dp_core::Schedulable;

/// Formats a wall-clock time as "9:05 AM".
pub fn format_time(time: NaiveDateTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Formats when an event happens, e.g. "9:00 AM - 10:00 AM" or "All day".
///
/// Open-ended timed events show their implicit one-hour end.
pub fn format_span<E: Schedulable + ?Sized>(event: &E) -> String {
    if event.is_all_day() {
        return "All day".to_string();
    }
    match (event.start_time(), event.effective_end()) {
        (Some(start), Some(end)) => format!("{} - {}", format_time(start), format_time(end)),
        _ => "Unscheduled".to_string(),
    }
}

/// Formats the date part for tables, or "(undated)".
pub fn format_date<E: Schedulable + ?Sized>(event: &E) -> String {
    event
        .date()
        .map_or_else(|| "(undated)".to_string(), |date| date.to_string())
}

/// Describes a set of conflicts in one sentence, or `None` if there are none.
pub fn conflict_message<E: Schedulable>(conflicts: &[E]) -> Option<String> {
    match conflicts {
        [] => None,
        [only] => Some(format!(
            "This event conflicts with \"{}\" ({})",
            only.title(),
            format_span(only)
        )),
        many => {
            let titles: Vec<String> = many.iter().map(|e| format!("\"{}\"", e.title())).collect();
            Some(format!(
                "This event conflicts with {} other events: {}",
                many.len(),
                titles.join(", ")
            ))
        }
    }
}

/// Suffix appended to create/update confirmations when conflicts exist.
pub fn conflict_warning(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        format!(" (Warning: {count} scheduling conflict(s) detected)")
    }
}
