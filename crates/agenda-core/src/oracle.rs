//! Boundary types for the NLU oracle.
//!
//! The oracle is a black box that turns raw text into an intent plus slot
//! values with a confidence score. Its wire format is owned by the client
//! crate; everything here is already validated and typed — no untyped maps
//! reach the state machine.

use crate::task::Task;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Confidence at or below which the assistant asks instead of guessing.
pub const CONFIDENCE_FLOOR: f32 = 0.6;

/// What the user wants to do, as classified by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Create,
    Update,
    Delete,
    List,
    Query,
    Clarify,
}

/// An existing task the oracle believes the message refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencedTask {
    pub id: String,
    /// Why the oracle matched it (title mention, date mention, ...).
    pub match_reason: String,
}

/// Partially extracted slot values. Absent fields mean "not stated in this
/// message", never "cleared".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialSlots {
    pub title: Option<String>,
    /// Appointment instant in the reference timezone.
    pub when: Option<NaiveDateTime>,
    /// Whether the user actually stated a time of day. A date with
    /// `has_time == false` carries a placeholder time and needs confirmation.
    #[serde(default)]
    pub has_time: bool,
    pub place: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl PartialSlots {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.when.is_none()
            && self.place.is_none()
            && self.participants.is_empty()
    }
}

/// One classification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleReply {
    pub intent: Intent,
    /// 0.0 to 1.0.
    pub confidence: f32,
    pub referenced_task: Option<ReferencedTask>,
    /// Slot changes for an update flow.
    pub changes: Option<PartialSlots>,
    /// Slots for a new task.
    pub new_task_info: Option<PartialSlots>,
    /// Optional response phrasing suggested by the oracle.
    pub suggested_response: Option<String>,
}

impl OracleReply {
    /// The degraded reply used when the oracle transport or parse fails:
    /// ask a clarifying question rather than guessing.
    pub fn clarify_fallback() -> Self {
        Self {
            intent: Intent::Clarify,
            confidence: 0.5,
            referenced_task: None,
            changes: None,
            new_task_info: None,
            suggested_response: None,
        }
    }

    /// Slot extraction for this turn, regardless of which field the oracle
    /// filled. `changes` wins when both are present.
    pub fn extracted_slots(&self) -> Option<&PartialSlots> {
        self.changes.as_ref().or(self.new_task_info.as_ref())
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence <= CONFIDENCE_FLOOR
    }
}

/// One classification request.
pub struct OracleRequest<'a> {
    /// Raw message text of the current turn.
    pub message: &'a str,
    /// Last turns of the conversation, oldest first (at most 10).
    pub history: &'a [String],
    /// The user's full task list, for reference resolution.
    pub tasks: &'a [Task],
    /// Current instant in the reference timezone.
    pub now: NaiveDateTime,
    /// For multi-turn flows: every user turn of the slot model joined into
    /// one string, so extraction can self-correct across turns.
    pub accumulated: Option<String>,
}
