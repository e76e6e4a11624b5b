//! Core domain logic for the day planner.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: the calendar event model and its validation rules
//! - Overlap: detecting conflicts between events and classifying their severity
//! - Layout: packing overlapping events into side-by-side columns for rendering

pub mod event;
pub mod layout;
pub mod overlap;
pub mod types;

pub use event::{CalendarEvent, DEFAULT_EVENT_DURATION, EventDraft, EventPatch, Schedulable};
pub use layout::{ColumnWidthMode, DayLayout, EventPosition, LayoutConfig, LayoutError, layout};
pub use overlap::{
    ConflictCheck, OverlapAnnotation, OverlapSeverity, annotate, check_conflicts, classify,
    detect_overlaps, overlap_groups, overlaps, severity,
};
pub use types::{Color, EventId, ValidationError};
