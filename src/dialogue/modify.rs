//! The update and delete flows, including numbered-list disambiguation.

use super::{
    is_affirmative, reset_with_clarify, sim_nao, slots_from_task, wants_save, StoreOp,
    TurnDecision, TurnInput,
};
use crate::texts;
use agenda_core::conflict::find_conflict;
use agenda_core::context::{ConversationContext, DialogState, PendingOp};
use agenda_core::diff::diff;
use agenda_core::slots::SlotModel;
use agenda_core::task::{Task, TaskPatch};
use agenda_core::textnorm;

/// SELECTING_TASK: the user was shown a numbered list and answers with a
/// number. Anything else, or a number out of range, re-prompts.
pub(super) fn selecting(input: &TurnInput<'_>) -> TurnDecision {
    let ctx = &input.context;
    if ctx.candidate_tasks.is_empty() {
        return reset_with_clarify();
    }

    let len = ctx.candidate_tasks.len();
    let choice = textnorm::fold(input.text).parse::<usize>().ok();
    let Some(n) = choice.filter(|n| (1..=len).contains(n)) else {
        return TurnDecision::reply(
            Some(ctx.clone()),
            texts::select_out_of_range(len),
        );
    };

    let task = ctx.candidate_tasks[n - 1].clone();
    match ctx.operation {
        Some(PendingOp::Delete) => enter_delete(task, input),
        // Selection lists are only presented for update and delete; treat
        // anything else as update.
        _ => enter_update(task, input),
    }
}

/// UPDATING_TASK: accumulate edits against the selected task until the user
/// says to save.
pub(super) fn updating(input: &TurnInput<'_>) -> TurnDecision {
    let mut ctx = input.context.clone();
    let Some(task_id) = ctx.selected_task_id.clone() else {
        return reset_with_clarify();
    };
    let original = find_task(&ctx, input, &task_id);

    if wants_save(input.text) || is_affirmative(input.text) {
        let patch = build_patch(&ctx.slots, original.as_ref());
        if patch.is_empty() {
            return TurnDecision::reply(Some(ctx), texts::nothing_understood().to_string());
        }
        let title = ctx
            .slots
            .title
            .clone()
            .unwrap_or_else(|| "Compromisso".to_string());
        return TurnDecision {
            context: None,
            op: StoreOp::Update { id: task_id, patch },
            reply: texts::updated(&title),
            buttons: Vec::new(),
        };
    }

    ctx.slots.push_turn(input.text);
    let before = ctx.slots.clone();
    if let Some(extracted) = input.reply.extracted_slots() {
        ctx.slots.merge(extracted);
    }
    let changes = diff(&before, &ctx.slots, input.now);
    if changes.is_empty() {
        return TurnDecision::reply(Some(ctx), texts::nothing_understood().to_string());
    }

    // The edited task itself never conflicts with its own new time.
    let conflict = ctx
        .slots
        .when
        .and_then(|when| find_conflict(when, input.tasks, Some(&task_id)));

    let reply = texts::update_preview(&changes, conflict, input.now);
    TurnDecision::reply(Some(ctx), reply)
}

/// DELETING_TASK: an explicit yes deletes; anything else keeps the task.
pub(super) fn deleting(input: &TurnInput<'_>) -> TurnDecision {
    let ctx = &input.context;
    let Some(task_id) = ctx.selected_task_id.clone() else {
        return reset_with_clarify();
    };

    if is_affirmative(input.text) {
        let title = find_task(ctx, input, &task_id)
            .map(|t| t.title)
            .unwrap_or_else(|| "Compromisso".to_string());
        return TurnDecision {
            context: None,
            op: StoreOp::Delete { id: task_id },
            reply: texts::deleted(&title),
            buttons: Vec::new(),
        };
    }

    TurnDecision::reply(None, texts::delete_kept().to_string())
}

/// Enter the update flow for a resolved task, applying any slot changes the
/// oracle already extracted from the triggering message.
pub(super) fn enter_update(task: Task, input: &TurnInput<'_>) -> TurnDecision {
    let mut ctx = ConversationContext::new(input.now);
    ctx.state = DialogState::UpdatingTask;
    ctx.selected_task_id = Some(task.id.clone());
    ctx.operation = Some(PendingOp::Update);
    ctx.slots = slots_from_task(&task);
    ctx.candidate_tasks = vec![task.clone()];
    ctx.slots.push_turn(input.text);

    if let Some(extracted) = input.reply.extracted_slots() {
        let before = ctx.slots.clone();
        ctx.slots.merge(extracted);
        let changes = diff(&before, &ctx.slots, input.now);
        if !changes.is_empty() {
            let conflict = ctx
                .slots
                .when
                .and_then(|when| find_conflict(when, input.tasks, Some(&task.id)));
            let reply = texts::update_preview(&changes, conflict, input.now);
            return TurnDecision::reply(Some(ctx), reply);
        }
    }

    let reply = texts::what_to_change(&task, input.now);
    TurnDecision::reply(Some(ctx), reply)
}

/// Enter the delete flow for a resolved task: always confirm first.
pub(super) fn enter_delete(task: Task, input: &TurnInput<'_>) -> TurnDecision {
    let mut ctx = ConversationContext::new(input.now);
    ctx.state = DialogState::DeletingTask;
    ctx.selected_task_id = Some(task.id.clone());
    ctx.operation = Some(PendingOp::Delete);
    ctx.candidate_tasks = vec![task.clone()];

    TurnDecision {
        context: Some(ctx),
        op: StoreOp::None,
        reply: texts::confirm_delete(&task, input.now),
        buttons: sim_nao(),
    }
}

/// Look the selected task up in the context's candidates first, then in the
/// freshly loaded task list.
fn find_task(ctx: &ConversationContext, input: &TurnInput<'_>, id: &str) -> Option<Task> {
    ctx.candidate_tasks
        .iter()
        .find(|t| t.id == id)
        .or_else(|| input.tasks.iter().find(|t| t.id == id))
        .cloned()
}

/// Patch of every slot that differs from the original task. Without an
/// original (it vanished mid-flow), all filled slots are sent.
fn build_patch(slots: &SlotModel, original: Option<&Task>) -> TaskPatch {
    let mut patch = TaskPatch::default();
    match original {
        Some(task) => {
            if slots.title.as_deref().is_some_and(|t| t != task.title) {
                patch.title = slots.title.clone();
            }
            if slots.when.is_some_and(|w| w != task.scheduled_date) {
                patch.scheduled_date = slots.when;
            }
            if slots.place.is_some() && slots.place != task.location {
                patch.location = slots.place.clone();
            }
            if !slots.participants.is_empty() && slots.participants != task.participants {
                patch.participants = Some(slots.participants.clone());
            }
        }
        None => {
            patch.title = slots.title.clone();
            patch.scheduled_date = slots.when;
            patch.location = slots.place.clone();
            if !slots.participants.is_empty() {
                patch.participants = Some(slots.participants.clone());
            }
        }
    }
    patch
}

/// Resolve which existing task an update/delete refers to: the oracle's
/// explicit reference first, then textual matching against upcoming tasks.
pub(super) fn resolve_target(input: &TurnInput<'_>, upcoming: &[Task]) -> Option<Task> {
    if let Some(referenced) = &input.reply.referenced_task {
        if let Some(task) = upcoming.iter().find(|t| t.id == referenced.id) {
            return Some(task.clone());
        }
    }
    super::resolve::by_text(input.text, upcoming, input.now)
}
