//! Calendar events and the inputs used to create and edit them.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Color, EventId, ValidationError};

/// Duration assumed for a timed event that has no end time.
///
/// Applies identically to overlap math and layout geometry.
pub const DEFAULT_EVENT_DURATION: Duration = Duration::minutes(60);

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 255;

/// Maximum description length, in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Years an event instant may fall in. Four-digit years keep stored
/// timestamps sortable as text.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// An event that can take part in overlap detection and layout.
///
/// This trait allows the algorithms to work with different event representations
/// (e.g., [`CalendarEvent`] loaded from the store, or test fixtures).
pub trait Schedulable {
    /// Returns the event's unique identifier.
    fn id(&self) -> &EventId;

    /// Returns the display title.
    fn title(&self) -> &str;

    /// Returns the start instant, if the event is scheduled.
    fn start_time(&self) -> Option<NaiveDateTime>;

    /// Returns the end instant, if recorded.
    fn end_time(&self) -> Option<NaiveDateTime>;

    /// Returns true for events that occupy a whole calendar date.
    fn is_all_day(&self) -> bool;

    /// Returns the display color.
    fn color(&self) -> &Color;

    /// End instant used for overlap and layout math.
    ///
    /// Falls back to `start + DEFAULT_EVENT_DURATION` when no end is recorded,
    /// saturating at `NaiveDateTime::MAX`.
    fn effective_end(&self) -> Option<NaiveDateTime> {
        let start = self.start_time()?;
        Some(self.end_time().unwrap_or_else(|| {
            start
                .checked_add_signed(DEFAULT_EVENT_DURATION)
                .unwrap_or(NaiveDateTime::MAX)
        }))
    }

    /// Calendar date of the start instant.
    fn date(&self) -> Option<NaiveDate> {
        self.start_time().map(|start| start.date())
    }
}

impl<E: Schedulable + ?Sized> Schedulable for &E {
    fn id(&self) -> &EventId {
        (**self).id()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn start_time(&self) -> Option<NaiveDateTime> {
        (**self).start_time()
    }

    fn end_time(&self) -> Option<NaiveDateTime> {
        (**self).end_time()
    }

    fn is_all_day(&self) -> bool {
        (**self).is_all_day()
    }

    fn color(&self) -> &Color {
        (**self).color()
    }
}

/// A calendar event as held by the event store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Wall-clock start. `None` only for all-day events without a recorded date.
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub is_all_day: bool,
    pub color: Color,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedulable for CalendarEvent {
    fn id(&self) -> &EventId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn start_time(&self) -> Option<NaiveDateTime> {
        self.start_time
    }

    fn end_time(&self) -> Option<NaiveDateTime> {
        self.end_time
    }

    fn is_all_day(&self) -> bool {
        self.is_all_day
    }

    fn color(&self) -> &Color {
        &self.color
    }
}

impl CalendarEvent {
    /// Duration in whole minutes, using the default duration for open-ended events.
    pub fn duration_minutes(&self) -> Option<i64> {
        let start = self.start_time?;
        let end = self.effective_end()?;
        Some((end - start).num_minutes())
    }
}

/// Input for creating an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub color: Color,
}

impl EventDraft {
    /// Checks the draft against the event field rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.title,
            self.description.as_deref(),
            self.start_time,
            self.end_time,
            self.is_all_day,
        )
    }
}

/// A partial update to an existing event.
///
/// Nullable columns use `Option<Option<_>>`: the outer `None` leaves the field
/// unchanged, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_time: Option<Option<NaiveDateTime>>,
    pub end_time: Option<Option<NaiveDateTime>>,
    pub is_all_day: Option<bool>,
    pub color: Option<Color>,
}

impl EventPatch {
    /// Returns true if the patch changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.is_all_day.is_none()
            && self.color.is_none()
    }

    /// Produces the patched event, validating the merged result.
    ///
    /// `updated_at` is left untouched; the store stamps it on write.
    pub fn apply_to(&self, event: &CalendarEvent) -> Result<CalendarEvent, ValidationError> {
        let mut patched = event.clone();
        if let Some(title) = &self.title {
            patched.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            patched.description.clone_from(description);
        }
        if let Some(start_time) = self.start_time {
            patched.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            patched.end_time = end_time;
        }
        if let Some(is_all_day) = self.is_all_day {
            patched.is_all_day = is_all_day;
        }
        if let Some(color) = &self.color {
            patched.color = color.clone();
        }
        validate_fields(
            &patched.title,
            patched.description.as_deref(),
            patched.start_time,
            patched.end_time,
            patched.is_all_day,
        )?;
        Ok(patched)
    }
}

fn validate_fields(
    title: &str,
    description: Option<&str>,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    is_all_day: bool,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::Empty { field: "title" });
    }
    let title_len = title.chars().count();
    if title_len > TITLE_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "title",
            max: TITLE_MAX_CHARS,
            actual: title_len,
        });
    }
    if let Some(description) = description {
        let description_len = description.chars().count();
        if description_len > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::TooLong {
                field: "description",
                max: DESCRIPTION_MAX_CHARS,
                actual: description_len,
            });
        }
    }
    if !is_all_day && start_time.is_none() {
        return Err(ValidationError::MissingStart);
    }
    for value in [start_time, end_time].into_iter().flatten() {
        if !SUPPORTED_YEARS.contains(&value.year()) {
            return Err(ValidationError::OutOfRange { value });
        }
    }
    if let (Some(start), Some(end)) = (start_time, end_time) {
        // All-day events may start and end on the same instant (date-only input).
        let invalid = if is_all_day { end < start } else { end <= start };
        if invalid {
            return Err(ValidationError::EndBeforeStart { start, end });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid test timestamp")
    }

    fn draft(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> EventDraft {
        EventDraft {
            title: "Standup".to_string(),
            start_time: start,
            end_time: end,
            ..EventDraft::default()
        }
    }

    fn stored_event() -> CalendarEvent {
        let now = Utc::now();
        CalendarEvent {
            id: EventId::new("evt-1").unwrap(),
            title: "Planning".to_string(),
            description: Some("Quarterly".to_string()),
            start_time: Some(at(9, 0)),
            end_time: Some(at(10, 0)),
            is_all_day: false,
            color: Color::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn effective_end_defaults_to_one_hour() {
        let mut event = stored_event();
        event.end_time = None;
        assert_eq!(event.effective_end(), Some(at(10, 0)));
        assert_eq!(event.duration_minutes(), Some(60));
    }

    #[test]
    fn effective_end_requires_start() {
        let mut event = stored_event();
        event.start_time = None;
        event.is_all_day = true;
        assert_eq!(event.effective_end(), None);
        assert_eq!(event.date(), None);
    }

    #[test]
    fn effective_end_saturates_near_max() {
        let late = NaiveDate::MAX.and_hms_opt(23, 30, 0).unwrap();
        let mut event = stored_event();
        event.start_time = Some(late);
        event.end_time = None;
        assert_eq!(event.effective_end(), Some(NaiveDateTime::MAX));
    }

    #[test]
    fn draft_rejects_years_outside_supported_range() {
        let late = NaiveDate::MAX.and_hms_opt(23, 30, 0).unwrap();
        assert_eq!(
            draft(Some(late), None).validate(),
            Err(ValidationError::OutOfRange { value: late })
        );

        let ancient = NaiveDate::from_ymd_opt(0, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        assert!(matches!(
            draft(Some(ancient), None).validate(),
            Err(ValidationError::OutOfRange { .. })
        ));

        let last_hour = NaiveDate::from_ymd_opt(9999, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 30, 0))
            .unwrap();
        assert!(draft(Some(last_hour), None).validate().is_ok());
    }

    #[test]
    fn draft_accepts_valid_timed_event() {
        assert!(draft(Some(at(9, 0)), Some(at(10, 0))).validate().is_ok());
        assert!(draft(Some(at(9, 0)), None).validate().is_ok());
    }

    #[test]
    fn draft_rejects_blank_title() {
        let mut d = draft(Some(at(9, 0)), None);
        d.title = "   ".to_string();
        assert_eq!(
            d.validate(),
            Err(ValidationError::Empty { field: "title" })
        );
    }

    #[test]
    fn draft_rejects_long_title_and_description() {
        let mut d = draft(Some(at(9, 0)), None);
        d.title = "x".repeat(256);
        assert!(matches!(
            d.validate(),
            Err(ValidationError::TooLong { field: "title", .. })
        ));

        let mut d = draft(Some(at(9, 0)), None);
        d.description = Some("y".repeat(501));
        assert!(matches!(
            d.validate(),
            Err(ValidationError::TooLong {
                field: "description",
                ..
            })
        ));
    }

    #[test]
    fn draft_rejects_end_not_after_start() {
        let err = draft(Some(at(10, 0)), Some(at(10, 0))).validate();
        assert_eq!(
            err,
            Err(ValidationError::EndBeforeStart {
                start: at(10, 0),
                end: at(10, 0)
            })
        );
        assert!(draft(Some(at(10, 0)), Some(at(9, 0))).validate().is_err());
    }

    #[test]
    fn draft_timed_event_requires_start() {
        assert_eq!(
            draft(None, None).validate(),
            Err(ValidationError::MissingStart)
        );
    }

    #[test]
    fn draft_all_day_rules() {
        let mut d = draft(None, None);
        d.is_all_day = true;
        assert!(d.validate().is_ok());

        d.start_time = Some(at(0, 0));
        d.end_time = Some(at(0, 0));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn patch_applies_and_clears_fields() {
        let event = stored_event();
        let patch = EventPatch {
            title: Some("Retro".to_string()),
            description: Some(None),
            end_time: Some(None),
            ..EventPatch::default()
        };
        let patched = patch.apply_to(&event).unwrap();
        assert_eq!(patched.title, "Retro");
        assert_eq!(patched.description, None);
        assert_eq!(patched.end_time, None);
        assert_eq!(patched.start_time, event.start_time);
        assert_eq!(patched.id, event.id);
    }

    #[test]
    fn patch_revalidates_merged_event() {
        let event = stored_event();
        let patch = EventPatch {
            start_time: Some(Some(at(11, 0))),
            ..EventPatch::default()
        };
        assert!(matches!(
            patch.apply_to(&event),
            Err(ValidationError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn empty_patch_detection() {
        assert!(EventPatch::default().is_empty());
        let patch = EventPatch {
            is_all_day: Some(true),
            ..EventPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn event_serializes_camel_case() {
        let event = stored_event();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["startTime"], "2024-03-01T09:00:00");
        assert_eq!(json["isAllDay"], false);
        assert_eq!(json["color"], "#1976d2");

        let parsed: CalendarEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}
