//! Overlap detection and conflict severity.
//!
//! # Rules
//!
//! Two events overlap when:
//! 1. both are all-day and start on the same calendar date;
//! 2. exactly one is all-day and the timed event starts on the all-day event's date;
//! 3. neither is all-day and their half-open ranges `[start, end)` intersect.
//!
//! Timed events without an end time are treated as lasting
//! [`DEFAULT_EVENT_DURATION`](crate::event::DEFAULT_EVENT_DURATION). Events
//! without a start time never overlap anything.
//!
//! Everything here is pure: no clock, no I/O, no shared state.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::Schedulable;
use crate::types::EventId;

/// Overlap ratio at or above which two timed events conflict completely.
pub const COMPLETE_THRESHOLD: f64 = 0.8;

/// Overlap ratio at or above which two timed events conflict majorly.
pub const MAJOR_THRESHOLD: f64 = 0.5;

/// How much two events' time ranges intersect.
///
/// Variants are ordered by intensity, so `max()` picks the worst conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapSeverity {
    None,
    Minor,
    Major,
    Complete,
}

impl OverlapSeverity {
    /// String representation used in output and storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for OverlapSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OverlapSeverity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "minor" => Ok(Self::Minor),
            "major" => Ok(Self::Major),
            "complete" => Ok(Self::Complete),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// Error type for unknown severity strings.
#[derive(Debug, Clone)]
pub struct UnknownSeverity(String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown overlap severity: {}", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

/// A conflict between an event and one other event.
///
/// Derived on demand for display; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapAnnotation {
    /// The event being checked.
    pub event_id: EventId,
    /// The event it conflicts with.
    pub other_id: EventId,
    /// Title of the conflicting event, for badges and messages.
    pub other_title: String,
    pub severity: OverlapSeverity,
}

/// Result of checking one event against a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCheck<'a, E> {
    pub has_conflicts: bool,
    /// Conflicting candidates in input order.
    pub conflicts: Vec<&'a E>,
}

/// Returns true if `a` and `b` share time.
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: Schedulable + ?Sized,
    B: Schedulable + ?Sized,
{
    match (a.is_all_day(), b.is_all_day()) {
        // Rules 1 and 2: date-level comparison of start dates.
        (true, _) | (_, true) => match (a.date(), b.date()) {
            (Some(date_a), Some(date_b)) => date_a == date_b,
            _ => false,
        },
        (false, false) => {
            let (Some(start_a), Some(end_a), Some(start_b), Some(end_b)) = (
                a.start_time(),
                a.effective_end(),
                b.start_time(),
                b.effective_end(),
            ) else {
                return false;
            };
            start_a < end_b && start_b < end_a
        }
    }
}

/// Returns every candidate that overlaps `target`, in input order.
///
/// Candidates sharing the target's id, or matching `exclude` (the pre-edit copy
/// of an event being edited), are skipped. Ids must be unique within
/// `candidates`.
pub fn detect_overlaps<'a, T, E>(
    target: &T,
    candidates: &'a [E],
    exclude: Option<&EventId>,
) -> Vec<&'a E>
where
    T: Schedulable + ?Sized,
    E: Schedulable,
{
    if !target.is_all_day() && target.start_time().is_none() {
        return Vec::new();
    }
    candidates
        .iter()
        .filter(|candidate| candidate.id() != target.id())
        .filter(|candidate| exclude.is_none_or(|excluded| candidate.id() != excluded))
        .filter(|candidate| overlaps(target, *candidate))
        .collect()
}

/// Classifies how badly two overlapping events conflict.
///
/// Assumes the events overlap; use [`classify`] when that is not known.
///
/// - all-day vs timed: always [`OverlapSeverity::Minor`]
/// - all-day vs all-day: [`OverlapSeverity::Major`]
/// - timed vs timed: overlap duration over the shorter event's duration,
///   `>= 0.8` complete, `>= 0.5` major, otherwise minor
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond durations of calendar events fit in f64's mantissa"
)]
pub fn severity<A, B>(a: &A, b: &B) -> OverlapSeverity
where
    A: Schedulable + ?Sized,
    B: Schedulable + ?Sized,
{
    if a.is_all_day() != b.is_all_day() {
        return OverlapSeverity::Minor;
    }
    if a.is_all_day() {
        return OverlapSeverity::Major;
    }

    let (Some(start_a), Some(end_a), Some(start_b), Some(end_b)) = (
        a.start_time(),
        a.effective_end(),
        b.start_time(),
        b.effective_end(),
    ) else {
        return OverlapSeverity::Minor;
    };

    let overlap = end_a.min(end_b) - start_a.max(start_b);
    let shorter = (end_a - start_a).min(end_b - start_b);
    let shorter_ms = shorter.num_milliseconds();
    // A zero-length event has no meaningful ratio.
    if shorter_ms <= 0 {
        return OverlapSeverity::Minor;
    }

    let ratio = overlap.num_milliseconds() as f64 / shorter_ms as f64;
    if ratio >= COMPLETE_THRESHOLD {
        OverlapSeverity::Complete
    } else if ratio >= MAJOR_THRESHOLD {
        OverlapSeverity::Major
    } else {
        OverlapSeverity::Minor
    }
}

/// Like [`severity`], but returns [`OverlapSeverity::None`] for events that do
/// not overlap.
pub fn classify<A, B>(a: &A, b: &B) -> OverlapSeverity
where
    A: Schedulable + ?Sized,
    B: Schedulable + ?Sized,
{
    if overlaps(a, b) {
        severity(a, b)
    } else {
        OverlapSeverity::None
    }
}

/// Detects conflicts for `target` and attaches a severity to each.
pub fn annotate<T, E>(target: &T, candidates: &[E], exclude: Option<&EventId>) -> Vec<OverlapAnnotation>
where
    T: Schedulable + ?Sized,
    E: Schedulable,
{
    detect_overlaps(target, candidates, exclude)
        .into_iter()
        .map(|other| OverlapAnnotation {
            event_id: target.id().clone(),
            other_id: other.id().clone(),
            other_title: other.title().to_string(),
            severity: severity(target, other),
        })
        .collect()
}

/// Checks `target` against existing events before saving it.
pub fn check_conflicts<'a, T, E>(
    target: &T,
    candidates: &'a [E],
    exclude: Option<&EventId>,
) -> ConflictCheck<'a, E>
where
    T: Schedulable + ?Sized,
    E: Schedulable,
{
    let conflicts = detect_overlaps(target, candidates, exclude);
    ConflictCheck {
        has_conflicts: !conflicts.is_empty(),
        conflicts,
    }
}

/// Groups events that overlap one another.
///
/// Each group starts with the first not-yet-grouped event that has overlaps,
/// followed by everything overlapping it. An event appears in at most one group.
/// Events without overlaps are left out.
pub fn overlap_groups<E: Schedulable>(events: &[E]) -> Vec<Vec<&E>> {
    let mut groups = Vec::new();
    let mut grouped: HashSet<&EventId> = HashSet::new();

    for event in events {
        if grouped.contains(event.id()) {
            continue;
        }
        let others = detect_overlaps(event, events, None);
        if others.is_empty() {
            continue;
        }
        let mut group = Vec::with_capacity(others.len() + 1);
        group.push(event);
        group.extend(others);
        for &member in &group {
            grouped.insert(member.id());
        }
        groups.push(group);
    }

    groups
}
