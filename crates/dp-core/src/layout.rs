//! Column layout for timed events in day and week views.
//!
//! Assigns each event a vertical pixel span and a horizontal column so that
//! events sharing time render side by side.
//!
//! # Algorithm Summary
//!
//! 1. Drop all-day and unscheduled events (all-day events render in their own row)
//! 2. Stable-sort by start time
//! 3. Drop events entirely outside the visible window
//! 4. First-fit: place each event in the leftmost column whose occupant has
//!    ended, or open a new column
//! 5. Derive pixel and percentage geometry from the column and column count
//!
//! First-fit is not an optimal coloring in general, but it is deterministic, so
//! the same events always render the same way.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::Schedulable;
use crate::types::{Color, EventId};

/// Base stacking order for laid-out events; each column sits one level higher.
const BASE_Z_INDEX: usize = 10;

const MINUTES_PER_HOUR: i64 = 60;

/// Layout configuration errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// The visible window ends before it starts.
    #[error("visible start hour {start} is after end hour {end}")]
    InvalidWindow { start: u32, end: u32 },

    /// An hour outside 0..=23.
    #[error("visible hour must be between 0 and 23, got {hour}")]
    HourOutOfRange { hour: u32 },

    /// The vertical scale must be positive and finite.
    #[error("pixels per minute must be positive, got {value}")]
    InvalidScale { value: f64 },

    /// A size that must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// How the column count (and so the column width) is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidthMode {
    /// Every event uses the peak column count of the whole day.
    #[default]
    Day,
    /// Every event uses the peak column count of its own overlap cluster, so an
    /// isolated event keeps the full width even on a busy day.
    Cluster,
}

/// Configuration for the layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// First visible hour. Default: 6.
    pub visible_start_hour: u32,

    /// Last visible hour, inclusive. Default: 23 (window ends at midnight).
    pub visible_end_hour: u32,

    /// Vertical scale. Default: 1.0 (a 60px hour row).
    pub pixels_per_minute: f64,

    /// Minimum rendered height so zero-length events stay visible. Default: 8.0.
    pub min_height: f64,

    /// Left margin added to each column, in percent. Default: 1.0.
    pub margin_percent: f64,

    /// Gap subtracted from each column width, in percent. Default: 2.0.
    pub gap_percent: f64,

    pub width_mode: ColumnWidthMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            visible_start_hour: 6,
            visible_end_hour: 23,
            pixels_per_minute: 1.0,
            min_height: 8.0,
            margin_percent: 1.0,
            gap_percent: 2.0,
            width_mode: ColumnWidthMode::Day,
        }
    }
}

impl LayoutConfig {
    /// Checks that the configuration describes a usable grid.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for hour in [self.visible_start_hour, self.visible_end_hour] {
            if hour > 23 {
                return Err(LayoutError::HourOutOfRange { hour });
            }
        }
        if self.visible_start_hour > self.visible_end_hour {
            return Err(LayoutError::InvalidWindow {
                start: self.visible_start_hour,
                end: self.visible_end_hour,
            });
        }
        if !self.pixels_per_minute.is_finite() || self.pixels_per_minute <= 0.0 {
            return Err(LayoutError::InvalidScale {
                value: self.pixels_per_minute,
            });
        }
        for (field, value) in [
            ("min_height", self.min_height),
            ("margin_percent", self.margin_percent),
            ("gap_percent", self.gap_percent),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(LayoutError::Negative { field, value });
            }
        }
        Ok(())
    }

    /// Visible window as minutes since midnight, half-open.
    fn window_minutes(&self) -> (i64, i64) {
        (
            i64::from(self.visible_start_hour) * MINUTES_PER_HOUR,
            (i64::from(self.visible_end_hour) + 1) * MINUTES_PER_HOUR,
        )
    }

    /// Total pixel height of the visible window.
    #[expect(
        clippy::cast_precision_loss,
        reason = "minute counts within one day are far below f64's exact range"
    )]
    pub fn total_height(&self) -> f64 {
        let (start, end) = self.window_minutes();
        (end - start) as f64 * self.pixels_per_minute
    }
}

/// Geometry for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPosition {
    /// Pixels from the top of the visible window.
    pub top: f64,
    /// Pixel height, never below the configured minimum.
    pub height: f64,
    /// 0-based column index.
    pub column: usize,
    pub total_columns: usize,
    /// Horizontal offset, in percent of the day column.
    pub left: f64,
    /// Width, in percent of the day column.
    pub width: f64,
    pub z_index: usize,
    pub is_overlapping: bool,
    pub color: Color,
}

/// Result of a layout pass: one position per visible timed event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayLayout {
    positions: HashMap<EventId, EventPosition>,
    column_count: usize,
}

impl DayLayout {
    /// Position of a single event, if it was laid out.
    pub fn get(&self, id: &EventId) -> Option<&EventPosition> {
        self.positions.get(id)
    }

    /// Number of laid-out events.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Peak number of columns used anywhere in the day.
    pub const fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EventId, &EventPosition)> {
        self.positions.iter()
    }

    pub fn into_map(self) -> HashMap<EventId, EventPosition> {
        self.positions
    }
}

/// An event that survived filtering, with its column.
struct Slot<'a, E> {
    event: &'a E,
    start: NaiveDateTime,
    end: NaiveDateTime,
    start_minutes: i64,
    end_minutes: i64,
    column: usize,
}

/// Lays out one day's events.
///
/// Events are expected to belong to the same day; minutes are measured from the
/// midnight preceding each event's start, so an event running past midnight
/// simply extends beyond the window and is clamped.
pub fn layout<E: Schedulable>(events: &[E], config: &LayoutConfig) -> DayLayout {
    let (window_start, window_end) = config.window_minutes();

    let mut timed: Vec<(&E, NaiveDateTime, NaiveDateTime)> = events
        .iter()
        .filter(|event| !event.is_all_day())
        .filter_map(|event| Some((event, event.start_time()?, event.effective_end()?)))
        .collect();
    // sort_by_key is stable: ties keep input order, which column assignment depends on.
    timed.sort_by_key(|(_, start, _)| *start);

    // End time of the event currently holding each column. Columns are never
    // removed: a column whose occupant has ended is simply free for reuse, so
    // indices of still-running events never shift.
    let mut columns: Vec<NaiveDateTime> = Vec::new();
    let mut slots: Vec<Slot<'_, E>> = Vec::with_capacity(timed.len());

    for (event, start, end) in timed {
        let midnight = midnight_of(start.date());
        let start_minutes = (start - midnight).num_minutes();
        let end_minutes = (end - midnight).num_minutes();
        if end_minutes <= window_start || start_minutes >= window_end {
            continue;
        }

        let vacated = columns
            .iter()
            .position(|occupied_until| *occupied_until <= start);
        let column = if let Some(free) = vacated {
            columns[free] = end;
            free
        } else {
            columns.push(end);
            columns.len() - 1
        };

        slots.push(Slot {
            event,
            start,
            end,
            start_minutes,
            end_minutes,
            column,
        });
    }

    let totals = match config.width_mode {
        ColumnWidthMode::Day => vec![columns.len(); slots.len()],
        ColumnWidthMode::Cluster => cluster_column_counts(&slots),
    };

    let positions = slots
        .iter()
        .zip(totals)
        .map(|(slot, total_columns)| {
            let position = position_for(slot, total_columns, window_start, window_end, config);
            (slot.event.id().clone(), position)
        })
        .collect();

    DayLayout {
        positions,
        column_count: columns.len(),
    }
}

/// Peak column count of each slot's overlap cluster.
///
/// Slots are in start order. A cluster closes once an event starts at or after
/// the latest end seen so far; at that point every column is free, so first-fit
/// numbering inside the next cluster starts again from column 0.
fn cluster_column_counts<E>(slots: &[Slot<'_, E>]) -> Vec<usize> {
    let mut totals = vec![0; slots.len()];
    let mut cluster_start = 0;
    let mut cluster_end: Option<NaiveDateTime> = None;
    let mut cluster_columns = 0;

    for (index, slot) in slots.iter().enumerate() {
        if cluster_end.is_some_and(|end| slot.start >= end) {
            totals[cluster_start..index].fill(cluster_columns);
            cluster_start = index;
            cluster_columns = 0;
            cluster_end = None;
        }
        cluster_columns = cluster_columns.max(slot.column + 1);
        cluster_end = Some(cluster_end.map_or(slot.end, |end| end.max(slot.end)));
    }
    totals[cluster_start..].fill(cluster_columns);

    totals
}

#[expect(
    clippy::cast_precision_loss,
    reason = "minute offsets and column counts are small"
)]
fn position_for<E: Schedulable>(
    slot: &Slot<'_, E>,
    total_columns: usize,
    window_start: i64,
    window_end: i64,
    config: &LayoutConfig,
) -> EventPosition {
    let clamped_start = slot.start_minutes.max(window_start);
    let clamped_end = slot.end_minutes.min(window_end);

    let top = (clamped_start - window_start) as f64 * config.pixels_per_minute;
    let height =
        ((clamped_end - clamped_start) as f64 * config.pixels_per_minute).max(config.min_height);

    let total_columns = total_columns.max(1);
    let column_width = 100.0 / total_columns as f64;

    EventPosition {
        top,
        height,
        column: slot.column,
        total_columns,
        left: (slot.column as f64).mul_add(column_width, config.margin_percent),
        width: column_width - config.gap_percent,
        z_index: BASE_Z_INDEX + slot.column,
        is_overlapping: total_columns > 1,
        color: slot.event.color().clone(),
    }
}

fn midnight_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
