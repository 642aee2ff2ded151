use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A scheduled appointment, as stored by the task store.
///
/// `scheduled_date` and `created_at` are instants in the fixed reference
/// timezone (see [`crate::timefmt`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    /// Owning user (phone identity).
    pub owner_id: String,
    pub title: String,
    pub scheduled_date: NaiveDateTime,
    pub location: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Fields for creating a new task.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub owner_id: String,
    pub title: String,
    pub scheduled_date: NaiveDateTime,
    pub location: Option<String>,
    pub participants: Vec<String>,
}

/// Partial update of an existing task. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub scheduled_date: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub participants: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.scheduled_date.is_none()
            && self.location.is_none()
            && self.participants.is_none()
    }
}

impl Task {
    /// Upcoming = still pending and not in the past.
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.status == TaskStatus::Pending && self.scheduled_date >= now
    }
}

/// The user's upcoming tasks, nearest first.
pub fn upcoming(tasks: &[Task], now: NaiveDateTime) -> Vec<&Task> {
    let mut up: Vec<&Task> = tasks.iter().filter(|t| t.is_upcoming(now)).collect();
    up.sort_by_key(|t| t.scheduled_date);
    up
}
