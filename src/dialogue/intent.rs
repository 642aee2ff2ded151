//! Intent dispatch for turns that start (or restart) a flow.

use super::{create, modify, TurnDecision, TurnInput};
use crate::texts;
use agenda_core::context::{ConversationContext, DialogState, PendingOp};
use agenda_core::oracle::Intent;
use agenda_core::task::{upcoming, Task};

/// Route a fresh turn by oracle intent.
///
/// Reached from INITIAL and WAITING_FOR_CLARIFICATION. Low confidence always
/// degrades to a clarifying question, never to a guessed write.
pub(super) fn dispatch(input: &TurnInput<'_>) -> TurnDecision {
    let reply = input.reply;

    if reply.is_low_confidence() || reply.intent == Intent::Clarify {
        return clarify(input);
    }

    match reply.intent {
        Intent::Create => begin_create(input),
        Intent::List => {
            let up = upcoming(input.tasks, input.now);
            TurnDecision::reply(None, texts::task_list(&up, input.now))
        }
        Intent::Query => {
            // Answer from the task list; the oracle may phrase it better.
            let text = reply.suggested_response.clone().unwrap_or_else(|| {
                texts::task_list(&upcoming(input.tasks, input.now), input.now)
            });
            TurnDecision::reply(None, text)
        }
        Intent::Update => begin_modify(input, PendingOp::Update),
        Intent::Delete => begin_modify(input, PendingOp::Delete),
        Intent::Clarify => clarify(input),
    }
}

fn clarify(input: &TurnInput<'_>) -> TurnDecision {
    let mut ctx = ConversationContext::new(input.now);
    ctx.state = DialogState::WaitingForClarification;
    ctx.slots.push_turn(input.text);
    let text = input
        .reply
        .suggested_response
        .clone()
        .unwrap_or_else(|| texts::clarify().to_string());
    TurnDecision::reply(Some(ctx), text)
}

fn begin_create(input: &TurnInput<'_>) -> TurnDecision {
    let mut ctx = ConversationContext::new(input.now);
    ctx.slots.push_turn(input.text);
    let before = ctx.slots.clone();
    if let Some(extracted) = input.reply.extracted_slots() {
        ctx.slots.merge(extracted);
    }
    create::advance(ctx, &before, input, false)
}

fn begin_modify(input: &TurnInput<'_>, op: PendingOp) -> TurnDecision {
    let up: Vec<Task> = upcoming(input.tasks, input.now)
        .into_iter()
        .cloned()
        .collect();
    if up.is_empty() {
        return TurnDecision::reply(None, texts::no_upcoming().to_string());
    }

    match modify::resolve_target(input, &up) {
        Some(task) => match op {
            PendingOp::Delete => modify::enter_delete(task, input),
            _ => modify::enter_update(task, input),
        },
        None => {
            let mut ctx = ConversationContext::new(input.now);
            ctx.state = DialogState::SelectingTask;
            ctx.operation = Some(op);
            ctx.candidate_tasks = up.clone();
            ctx.slots.push_turn(input.text);
            TurnDecision::reply(Some(ctx), texts::select_prompt(&up, input.now))
        }
    }
}
