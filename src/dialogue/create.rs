//! The create flow: collecting slots, then confirming before the write.

use super::{is_affirmative, is_negative, sim_nao, StoreOp, TurnDecision, TurnInput};
use crate::texts;
use agenda_core::conflict::find_conflict;
use agenda_core::context::{ConversationContext, DialogState};
use agenda_core::diff::diff;
use agenda_core::slots::SlotModel;
use agenda_core::task::TaskDraft;

/// COLLECTING_INFO: merge whatever this turn extracted, then either move to
/// confirmation or keep asking for what is missing.
pub(super) fn collecting(input: &TurnInput<'_>) -> TurnDecision {
    let mut ctx = input.context.clone();
    ctx.slots.push_turn(input.text);
    let before = ctx.slots.clone();
    if let Some(extracted) = input.reply.extracted_slots() {
        ctx.slots.merge(extracted);
    }
    advance(ctx, &before, input, false)
}

/// CONFIRMING / CONFIRMING_CONFLICT.
///
/// An affirmative answer commits the pending appointment; a negative one
/// drops back to collection; anything else is treated as more slot data —
/// "na verdade é meio-dia" corrects the model and re-prompts with the diff.
pub(super) fn confirming(input: &TurnInput<'_>) -> TurnDecision {
    let ctx = input.context.clone();

    if !ctx.slots.is_complete() {
        // A confirming context without a complete model cannot commit.
        let before = ctx.slots.clone();
        return advance(ctx, &before, input, false);
    }

    if is_affirmative(input.text) {
        let slots = &ctx.slots;
        let when = slots.when.unwrap_or(input.now);
        // Recomputed at commit so the success text still names the nearby
        // appointment the user chose to ignore.
        let conflict = find_conflict(when, input.tasks, None);
        let draft = TaskDraft {
            owner_id: input.sender_id.to_string(),
            title: slots
                .title
                .clone()
                .unwrap_or_else(|| "Compromisso".to_string()),
            scheduled_date: when,
            location: slots.place.clone(),
            participants: slots.participants.clone(),
        };
        return TurnDecision {
            context: None,
            op: StoreOp::Create(draft),
            reply: texts::created(slots, conflict, input.now),
            buttons: Vec::new(),
        };
    }

    if is_negative(input.text) {
        let mut ctx = ctx;
        ctx.state = DialogState::CollectingInfo;
        ctx.slots.push_turn(input.text);
        return TurnDecision::reply(Some(ctx), texts::what_to_adjust().to_string());
    }

    // Correction or addition mid-confirmation.
    let mut ctx = ctx;
    ctx.slots.push_turn(input.text);
    let before = ctx.slots.clone();
    if let Some(extracted) = input.reply.extracted_slots() {
        ctx.slots.merge(extracted);
    }
    advance(ctx, &before, input, true)
}

/// Shared transition: decide between confirmation and further collection
/// after a merge, optionally showing what just changed.
pub(super) fn advance(
    mut ctx: ConversationContext,
    before: &SlotModel,
    input: &TurnInput<'_>,
    show_changes: bool,
) -> TurnDecision {
    if ctx.slots.is_complete() {
        let when = ctx.slots.when.unwrap_or(input.now);
        let conflict = find_conflict(when, input.tasks, None);
        ctx.state = if conflict.is_some() {
            DialogState::ConfirmingConflict
        } else {
            DialogState::Confirming
        };

        let mut reply = String::new();
        if show_changes {
            let changes = diff(before, &ctx.slots, input.now);
            if !changes.is_empty() {
                reply.push_str(&texts::changes_block(&changes));
                reply.push_str("\n\n");
            }
        }
        reply.push_str(&texts::confirm_create(&ctx.slots, conflict, input.now));

        return TurnDecision {
            context: Some(ctx),
            op: StoreOp::None,
            reply,
            buttons: sim_nao(),
        };
    }

    ctx.state = DialogState::CollectingInfo;
    let reply = match ctx.slots.when {
        // Only the time of day is pending.
        Some(when) if ctx.slots.needs_time_confirmation && ctx.slots.title.is_some() => {
            texts::ask_time(when, input.now)
        }
        _ => texts::ask_missing(&ctx.slots.missing_fields()),
    };
    TurnDecision::reply(Some(ctx), reply)
}
