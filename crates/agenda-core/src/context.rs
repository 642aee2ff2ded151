//! Durable per-user conversation state.

use crate::slots::SlotModel;
use crate::task::Task;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A context untouched for longer than this is treated as absent.
pub const STALE_AFTER_MINUTES: i64 = 30;

/// Dialogue state of one user.
///
/// `Initial` is both the starting and the terminal state: every successful
/// or abandoned flow returns here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    #[default]
    Initial,
    CollectingInfo,
    Confirming,
    ConfirmingConflict,
    SelectingTask,
    UpdatingTask,
    DeletingTask,
    /// Transient: listing resolves within the turn and is never persisted.
    ListingTasks,
    WaitingForClarification,
}

/// Which task-store operation a presented selection list is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOp {
    Create,
    Read,
    Update,
    Delete,
}

/// One user's dialogue state across turns, keyed by phone identity.
///
/// Owned by the context store; the orchestrator borrows it for one turn and
/// persists or discards it before returning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationContext {
    pub state: DialogState,
    pub slots: SlotModel,
    pub last_update: NaiveDateTime,
    /// Task under update/delete.
    pub selected_task_id: Option<String>,
    /// Disambiguation mode when a numbered list was presented.
    pub operation: Option<PendingOp>,
    /// The numbered list shown to the user for selection.
    #[serde(default)]
    pub candidate_tasks: Vec<Task>,
}

impl ConversationContext {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            state: DialogState::Initial,
            slots: SlotModel::default(),
            last_update: now,
            selected_task_id: None,
            operation: None,
            candidate_tasks: Vec::new(),
        }
    }

    /// Stale contexts are replaced by a fresh one before processing.
    pub fn is_stale(&self, now: NaiveDateTime) -> bool {
        (now - self.last_update).num_minutes() > STALE_AFTER_MINUTES
    }

    pub fn touch(&mut self, now: NaiveDateTime) {
        self.last_update = now;
    }
}
