//! Scheduling conflict detection.
//!
//! Advisory only: a detected conflict is appended to the confirmation text,
//! never a hard block on the write.

use crate::task::{Task, TaskStatus};
use chrono::NaiveDateTime;

/// Two instants conflict when they fall on the same calendar day and differ
/// by less than this many minutes.
pub const CONFLICT_WINDOW_MINUTES: i64 = 120;

/// Whether two tasks conflict. Symmetric; a task never conflicts with itself.
pub fn conflicts(a: &Task, b: &Task) -> bool {
    a.id != b.id && instants_conflict(a.scheduled_date, b.scheduled_date)
}

/// Same calendar day (reference timezone) and less than 2 hours apart.
pub fn instants_conflict(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date() && (a - b).num_minutes().abs() < CONFLICT_WINDOW_MINUTES
}

/// Find the pending task nearest to `when` that conflicts with it.
///
/// `exclude_id` skips the task being edited itself. When several conflict,
/// the nearest wins; ties go to the first found.
pub fn find_conflict<'a>(
    when: NaiveDateTime,
    tasks: &'a [Task],
    exclude_id: Option<&str>,
) -> Option<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending)
        .filter(|t| exclude_id != Some(t.id.as_str()))
        .filter(|t| instants_conflict(when, t.scheduled_date))
        .min_by_key(|t| (when - t.scheduled_date).num_minutes().abs())
}
