use super::*;
use agenda_core::context::{ConversationContext, DialogState, PendingOp};
use agenda_core::oracle::{Intent, OracleReply, PartialSlots, ReferencedTask};
use agenda_core::task::{Task, TaskStatus};
use chrono::NaiveDate;

const USER: &str = "5511999990000";

fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 8, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

/// Friday 2026-08-21, 10:00 reference time.
fn now() -> NaiveDateTime {
    dt(21, 10, 0)
}

fn task(id: &str, title: &str, when: NaiveDateTime) -> Task {
    Task {
        id: id.to_string(),
        owner_id: USER.to_string(),
        title: title.to_string(),
        scheduled_date: when,
        location: None,
        participants: vec![],
        status: TaskStatus::Pending,
        created_at: dt(1, 9, 0),
    }
}

fn reply(intent: Intent, confidence: f32) -> OracleReply {
    OracleReply {
        intent,
        confidence,
        referenced_task: None,
        changes: None,
        new_task_info: None,
        suggested_response: None,
    }
}

fn slots(title: Option<&str>, when: Option<NaiveDateTime>, has_time: bool) -> PartialSlots {
    PartialSlots {
        title: title.map(str::to_string),
        when,
        has_time,
        place: None,
        participants: vec![],
    }
}

fn step_with(
    text: &str,
    context: ConversationContext,
    reply: &OracleReply,
    tasks: &[Task],
) -> TurnDecision {
    step(&TurnInput {
        sender_id: USER,
        text,
        context,
        reply,
        tasks,
        now: now(),
    })
}

fn confirming_ctx(title: &str, when: NaiveDateTime) -> ConversationContext {
    let mut ctx = ConversationContext::new(now());
    ctx.state = DialogState::Confirming;
    ctx.slots.title = Some(title.to_string());
    ctx.slots.when = Some(when);
    ctx
}

#[test]
fn test_create_complete_in_one_turn_confirms() {
    let mut oracle = reply(Intent::Create, 0.9);
    oracle.new_task_info = Some(slots(Some("Reunião"), Some(dt(22, 15, 0)), true));

    let decision = step_with(
        "Reunião amanhã às 15h",
        ConversationContext::new(now()),
        &oracle,
        &[],
    );

    let ctx = decision.context.expect("context persists for confirmation");
    assert_eq!(ctx.state, DialogState::Confirming);
    assert!(matches!(decision.op, StoreOp::None));
    assert_eq!(decision.buttons, vec!["Sim", "Não"]);
    assert!(decision.reply.contains("amanhã às 15h"));
    assert!(decision.reply.contains("Confirma?"));
}

#[test]
fn test_affirmative_commits_the_create() {
    let decision = step_with(
        "sim",
        confirming_ctx("Reunião", dt(22, 15, 0)),
        &reply(Intent::Create, 0.9),
        &[],
    );

    assert!(decision.context.is_none(), "flow ends, context cleared");
    match decision.op {
        StoreOp::Create(draft) => {
            assert_eq!(draft.title, "Reunião");
            assert_eq!(draft.scheduled_date, dt(22, 15, 0));
            assert_eq!(draft.owner_id, USER);
        }
        other => panic!("expected create, got {other:?}"),
    }
    assert!(decision.reply.starts_with("✓ Agendado"));
}

#[test]
fn test_correction_mid_confirmation_shows_diff() {
    let mut oracle = reply(Intent::Update, 0.9);
    oracle.changes = Some(slots(None, Some(dt(22, 12, 0)), true));

    let decision = step_with(
        "na verdade é meio-dia",
        confirming_ctx("Almoço", dt(22, 13, 0)),
        &oracle,
        &[],
    );

    let ctx = decision.context.expect("still confirming");
    assert_eq!(ctx.state, DialogState::Confirming);
    assert_eq!(ctx.slots.when, Some(dt(22, 12, 0)));
    assert!(matches!(decision.op, StoreOp::None));
    assert!(decision
        .reply
        .contains("horário: amanhã às 13h → amanhã às meio-dia"));
    assert!(decision.reply.contains("Confirma?"));
}

#[test]
fn test_date_without_time_keeps_collecting() {
    let mut oracle = reply(Intent::Create, 0.9);
    // Date extracted with a placeholder time; the user said no time of day.
    oracle.new_task_info = Some(slots(Some("Dentista"), Some(dt(25, 9, 0)), false));

    let decision = step_with(
        "dentista na terça",
        ConversationContext::new(now()),
        &oracle,
        &[],
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::CollectingInfo);
    assert!(ctx.slots.needs_time_confirmation);
    assert!(decision.reply.contains("Para que horas"));
}

#[test]
fn test_missing_title_is_asked_for() {
    let mut oracle = reply(Intent::Create, 0.9);
    oracle.new_task_info = Some(slots(None, Some(dt(22, 15, 0)), true));

    let decision = step_with(
        "marca algo amanhã às 15h",
        ConversationContext::new(now()),
        &oracle,
        &[],
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::CollectingInfo);
    assert!(decision.reply.contains("o título"));
}

#[test]
fn test_nearby_task_triggers_conflict_confirmation() {
    let existing = task("t1", "Consulta", dt(22, 16, 0));
    let mut oracle = reply(Intent::Create, 0.9);
    oracle.new_task_info = Some(slots(Some("Reunião"), Some(dt(22, 15, 0)), true));

    let decision = step_with(
        "reunião amanhã às 15h",
        ConversationContext::new(now()),
        &oracle,
        &[existing],
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::ConfirmingConflict);
    assert!(matches!(decision.op, StoreOp::None), "advisory, not a block");
    assert!(decision.reply.contains("⚠️"));
    assert!(decision.reply.contains("Consulta"));
}

#[test]
fn test_confirming_despite_conflict_names_it_in_the_success() {
    let existing = task("t1", "Consulta", dt(22, 16, 0));
    let mut ctx = confirming_ctx("Reunião", dt(22, 15, 0));
    ctx.state = DialogState::ConfirmingConflict;

    let decision = step_with("sim", ctx, &reply(Intent::Clarify, 0.5), &[existing]);

    assert!(matches!(decision.op, StoreOp::Create(_)));
    assert!(decision.reply.starts_with("✓ Agendado"));
    assert!(decision.reply.contains("Consulta"));
    assert!(decision.reply.contains("⚠️"));
}

#[test]
fn test_negative_returns_to_collecting() {
    let decision = step_with(
        "não",
        confirming_ctx("Reunião", dt(22, 15, 0)),
        &reply(Intent::Clarify, 0.5),
        &[],
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::CollectingInfo);
    assert!(matches!(decision.op, StoreOp::None));
}

#[test]
fn test_low_confidence_never_writes() {
    let mut oracle = reply(Intent::Create, 0.4);
    oracle.new_task_info = Some(slots(Some("Reunião"), Some(dt(22, 15, 0)), true));

    let decision = step_with(
        "talvez reunião amanhã?",
        ConversationContext::new(now()),
        &oracle,
        &[],
    );

    assert!(matches!(decision.op, StoreOp::None));
    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::WaitingForClarification);
}

#[test]
fn test_confidence_at_floor_still_clarifies() {
    let oracle = reply(Intent::Create, 0.6);
    let decision = step_with("hmm", ConversationContext::new(now()), &oracle, &[]);
    assert_eq!(
        decision.context.unwrap().state,
        DialogState::WaitingForClarification
    );
}

#[test]
fn test_list_intent_answers_without_persisting_context() {
    let tasks = vec![
        task("a", "Dentista", dt(22, 9, 0)),
        task("b", "Reunião", dt(24, 15, 0)),
    ];
    let decision = step_with(
        "o que tenho marcado?",
        ConversationContext::new(now()),
        &reply(Intent::List, 0.9),
        &tasks,
    );

    assert!(decision.context.is_none());
    assert!(decision.reply.contains("1. *Dentista*"));
    assert!(decision.reply.contains("2. *Reunião*"));
}

#[test]
fn test_update_with_oracle_reference_previews_diff() {
    let existing = task("t1", "Reunião", dt(22, 15, 0));
    let mut oracle = reply(Intent::Update, 0.9);
    oracle.referenced_task = Some(ReferencedTask {
        id: "t1".to_string(),
        match_reason: "título mencionado".to_string(),
    });
    oracle.changes = Some(slots(None, Some(dt(22, 16, 0)), true));

    let decision = step_with(
        "muda a reunião para 16h",
        ConversationContext::new(now()),
        &oracle,
        &[existing],
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::UpdatingTask);
    assert_eq!(ctx.selected_task_id.as_deref(), Some("t1"));
    assert!(decision.reply.contains("horário:"));
    assert!(decision.reply.contains("*salvar*"));
}

#[test]
fn test_save_applies_only_the_changed_fields() {
    let existing = task("t1", "Reunião", dt(22, 15, 0));
    let mut ctx = ConversationContext::new(now());
    ctx.state = DialogState::UpdatingTask;
    ctx.selected_task_id = Some("t1".to_string());
    ctx.candidate_tasks = vec![existing.clone()];
    ctx.slots = slots_from_task(&existing);
    ctx.slots.when = Some(dt(22, 16, 0)); // pending edit

    let decision = step_with("salvar", ctx, &reply(Intent::Clarify, 0.5), &[existing]);

    assert!(decision.context.is_none());
    match decision.op {
        StoreOp::Update { id, patch } => {
            assert_eq!(id, "t1");
            assert_eq!(patch.scheduled_date, Some(dt(22, 16, 0)));
            assert!(patch.title.is_none(), "unchanged fields stay out");
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn test_ambiguous_update_lists_then_selects() {
    // Two appointments a week out; neither the title nor a date phrase in
    // the message singles one out.
    let tasks = vec![
        task("t1", "Dentista", dt(28, 9, 0)),
        task("t2", "Reunião", dt(28, 15, 0)),
    ];
    let decision = step_with(
        "muda meu compromisso de sexta",
        ConversationContext::new(now()),
        &reply(Intent::Update, 0.9),
        &tasks,
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::SelectingTask);
    assert_eq!(ctx.operation, Some(PendingOp::Update));
    assert_eq!(ctx.candidate_tasks.len(), 2);
    assert!(decision.reply.contains("1. *Dentista*"));
    assert!(decision.reply.contains("2. *Reunião*"));

    // "2" selects the second candidate.
    let decision = step_with("2", ctx, &reply(Intent::Clarify, 0.5), &tasks);
    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::UpdatingTask);
    assert_eq!(ctx.selected_task_id.as_deref(), Some("t2"));
    assert!(decision.reply.contains("Reunião"));
}

#[test]
fn test_shared_date_reference_resolves_to_the_soonest() {
    // Both tomorrow; no title in the message. The nearest task wins and
    // the edit starts right away instead of a selection list.
    let tasks = vec![
        task("t1", "Dentista", dt(22, 9, 0)),
        task("t2", "Reunião", dt(22, 15, 0)),
    ];
    let mut oracle = reply(Intent::Update, 0.9);
    oracle.changes = Some(slots(None, Some(dt(22, 16, 0)), true));

    let decision = step_with(
        "muda o compromisso de amanhã",
        ConversationContext::new(now()),
        &oracle,
        &tasks,
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::UpdatingTask);
    assert_eq!(ctx.selected_task_id.as_deref(), Some("t1"));
}

#[test]
fn test_selection_out_of_range_reprompts() {
    let tasks = vec![
        task("t1", "Dentista", dt(28, 9, 0)),
        task("t2", "Reunião", dt(28, 15, 0)),
    ];
    let mut ctx = ConversationContext::new(now());
    ctx.state = DialogState::SelectingTask;
    ctx.operation = Some(PendingOp::Update);
    ctx.candidate_tasks = tasks.clone();

    let decision = step_with("5", ctx, &reply(Intent::Clarify, 0.5), &tasks);

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::SelectingTask, "list stays pending");
    assert!(decision.reply.contains("1 a 2"));
}

#[test]
fn test_delete_confirms_before_deleting() {
    let existing = task("t1", "Dentista", dt(22, 9, 0));
    let mut oracle = reply(Intent::Delete, 0.9);
    oracle.referenced_task = Some(ReferencedTask {
        id: "t1".to_string(),
        match_reason: "título".to_string(),
    });

    let decision = step_with(
        "cancela o dentista",
        ConversationContext::new(now()),
        &oracle,
        std::slice::from_ref(&existing),
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::DeletingTask);
    assert!(matches!(decision.op, StoreOp::None), "nothing deleted yet");
    assert_eq!(decision.buttons, vec!["Sim", "Não"]);

    let decision = step_with("sim", ctx, &reply(Intent::Clarify, 0.5), &[existing]);
    assert!(decision.context.is_none());
    match decision.op {
        StoreOp::Delete { id } => assert_eq!(id, "t1"),
        other => panic!("expected delete, got {other:?}"),
    }
    assert!(decision.reply.contains("Dentista"));
}

#[test]
fn test_delete_negative_keeps_the_task() {
    let existing = task("t1", "Dentista", dt(22, 9, 0));
    let mut ctx = ConversationContext::new(now());
    ctx.state = DialogState::DeletingTask;
    ctx.selected_task_id = Some("t1".to_string());
    ctx.candidate_tasks = vec![existing.clone()];

    let decision = step_with("não", ctx, &reply(Intent::Clarify, 0.5), &[existing]);

    assert!(matches!(decision.op, StoreOp::None));
    assert!(decision.context.is_none());
    assert!(decision.reply.contains("mantive"));
}

#[test]
fn test_ongoing_flow_outranks_fresh_intent() {
    // Mid-confirmation, the oracle classifies "confirma" as a brand-new
    // create with different slots. The pending flow wins.
    let mut oracle = reply(Intent::Create, 0.95);
    oracle.new_task_info = Some(slots(Some("Jantar"), Some(dt(23, 20, 0)), true));

    let decision = step_with(
        "confirma",
        confirming_ctx("Almoço", dt(22, 13, 0)),
        &oracle,
        &[],
    );

    match decision.op {
        StoreOp::Create(draft) => assert_eq!(draft.title, "Almoço"),
        other => panic!("expected create of the pending appointment, got {other:?}"),
    }
}

#[test]
fn test_modify_with_empty_agenda_says_so() {
    let decision = step_with(
        "cancela minha reunião",
        ConversationContext::new(now()),
        &reply(Intent::Delete, 0.9),
        &[],
    );
    assert!(decision.context.is_none());
    assert!(matches!(decision.op, StoreOp::None));
    assert!(decision.reply.contains("não tem compromissos"));
}

#[test]
fn test_unresolved_reference_always_gets_a_list() {
    // Even with a single upcoming task, an unmatched reference goes through
    // explicit selection rather than a guess.
    let existing = task("t1", "Dentista", dt(22, 9, 0));
    let decision = step_with(
        "desmarca aquilo",
        ConversationContext::new(now()),
        &reply(Intent::Delete, 0.9),
        std::slice::from_ref(&existing),
    );

    let ctx = decision.context.unwrap();
    assert_eq!(ctx.state, DialogState::SelectingTask);
    assert_eq!(ctx.operation, Some(PendingOp::Delete));
    assert_eq!(ctx.candidate_tasks.len(), 1);
    assert!(decision.reply.contains("1. *Dentista*"));
}
