//! The dialogue state machine.
//!
//! `step` is a pure function from one turn's inputs to a decision: no I/O,
//! no clock reads, no store handles. The gateway executes the decision's
//! store operation and persists (or clears) the returned context, which
//! keeps turn processing testable and error containment trivial — a failed
//! side effect simply discards the decision and leaves the stored context
//! untouched.

mod create;
mod intent;
mod modify;
mod resolve;

use crate::texts;
use agenda_core::context::{ConversationContext, DialogState};
use agenda_core::oracle::OracleReply;
use agenda_core::slots::SlotModel;
use agenda_core::task::{Task, TaskDraft, TaskPatch};
use agenda_core::textnorm;
use chrono::NaiveDateTime;

/// Everything one turn needs, already loaded.
pub struct TurnInput<'a> {
    pub sender_id: &'a str,
    /// Raw message text.
    pub text: &'a str,
    /// The user's context, freshly initialized when absent or stale.
    pub context: ConversationContext,
    pub reply: &'a OracleReply,
    /// The user's full task list.
    pub tasks: &'a [Task],
    /// The turn instant in the reference timezone.
    pub now: NaiveDateTime,
}

/// Task-store side effect requested by a turn.
#[derive(Debug)]
pub enum StoreOp {
    None,
    Create(TaskDraft),
    Update { id: String, patch: TaskPatch },
    Delete { id: String },
}

/// What one turn decided.
#[derive(Debug)]
pub struct TurnDecision {
    /// `Some` persists the context for the next turn; `None` clears it,
    /// returning the user to the initial state.
    pub context: Option<ConversationContext>,
    pub op: StoreOp,
    pub reply: String,
    pub buttons: Vec<String>,
}

impl TurnDecision {
    fn reply(context: Option<ConversationContext>, reply: String) -> Self {
        Self {
            context,
            op: StoreOp::None,
            reply,
            buttons: Vec::new(),
        }
    }
}

/// Advance the dialogue by one turn.
///
/// The current state decides how the message is interpreted; a divergent
/// fresh intent from the oracle never hijacks an ongoing flow. Escaping a
/// flow is what the control keywords are for, and those are handled before
/// this function is reached.
pub fn step(input: &TurnInput<'_>) -> TurnDecision {
    match input.context.state {
        DialogState::CollectingInfo => create::collecting(input),
        DialogState::Confirming | DialogState::ConfirmingConflict => create::confirming(input),
        DialogState::SelectingTask => modify::selecting(input),
        DialogState::UpdatingTask => modify::updating(input),
        DialogState::DeletingTask => modify::deleting(input),
        DialogState::Initial
        | DialogState::ListingTasks
        | DialogState::WaitingForClarification => intent::dispatch(input),
    }
}

// Folded forms only; matching goes through textnorm::fold.
const AFFIRMATIVE: &[&str] = &[
    "sim", "s", "ok", "claro", "confirmo", "confirma", "confirmar", "pode ser", "isso", "certo",
    "beleza", "perfeito", "combinado", "fechado",
];
const NEGATIVE: &[&str] = &["nao", "n", "negativo", "errado", "muda", "mudar", "trocar"];
const SAVE: &[&str] = &["salvar", "salva", "pode salvar", "pronto", "so isso", "mais nada"];

pub(crate) fn is_affirmative(text: &str) -> bool {
    textnorm::matches_any(text, AFFIRMATIVE)
}

pub(crate) fn is_negative(text: &str) -> bool {
    let folded = textnorm::fold(text);
    NEGATIVE.contains(&folded.as_str()) || folded.starts_with("nao ")
}

pub(crate) fn wants_save(text: &str) -> bool {
    textnorm::matches_any(text, SAVE)
}

pub(crate) fn sim_nao() -> Vec<String> {
    vec!["Sim".to_string(), "Não".to_string()]
}

/// Seed a slot model from an existing task, for the update flow.
pub(crate) fn slots_from_task(task: &Task) -> SlotModel {
    SlotModel {
        title: Some(task.title.clone()),
        when: Some(task.scheduled_date),
        needs_time_confirmation: false,
        place: task.location.clone(),
        participants: task.participants.clone(),
        raw_turns: Vec::new(),
    }
}

/// Fallback for a context that lost the data its state needs (e.g. a
/// selection list with no candidates). Clears it and asks again.
pub(crate) fn reset_with_clarify() -> TurnDecision {
    TurnDecision::reply(None, texts::clarify().to_string())
}

#[cfg(test)]
mod tests;
