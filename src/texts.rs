//! User-facing response phrasing (Brazilian Portuguese).
//!
//! Every string the assistant sends is built here, so the dialogue logic
//! stays free of presentation concerns and wording can change in one place.

use agenda_core::diff::SlotChange;
use agenda_core::slots::SlotModel;
use agenda_core::task::Task;
use agenda_core::timefmt;
use chrono::NaiveDateTime;

pub fn help() -> &'static str {
    "Eu sou sua assistente de agenda. Você pode:\n\
     • marcar um compromisso (\"reunião amanhã às 15h\")\n\
     • mudar um compromisso (\"muda a reunião para 16h\")\n\
     • cancelar um compromisso (\"cancela o dentista\")\n\
     • ver sua agenda (\"lista\")\n\n\
     A qualquer momento, *cancelar* interrompe o que estivermos fazendo."
}

pub fn apology() -> &'static str {
    "Desculpe, tive um problema técnico agora. Pode tentar de novo em instantes?"
}

pub fn clarify() -> &'static str {
    "Não entendi bem. Você quer marcar, mudar ou cancelar um compromisso?"
}

pub fn cancelled() -> &'static str {
    "Ok, deixei isso de lado. Quando precisar, é só chamar."
}

pub fn restarted() -> &'static str {
    "Vamos começar de novo. O que você quer agendar?"
}

pub fn not_found() -> &'static str {
    "Hmm, não encontrei mais esse compromisso — ele pode ter sido removido. Pode conferir com *lista*?"
}

pub fn buffered() -> &'static str {
    "Só um instante, já te respondo."
}

pub fn what_to_adjust() -> &'static str {
    "Sem problema. O que você quer ajustar?"
}

pub fn delete_kept() -> &'static str {
    "Ok, mantive o compromisso como estava."
}

pub fn nothing_understood() -> &'static str {
    "Não consegui identificar uma mudança aí. Pode repetir de outro jeito?"
}

/// One-line summary of a slot model, e.g.
/// `*Reunião* amanhã às 15h em Centro com Ana, Bia`.
pub fn summary(slots: &SlotModel, now: NaiveDateTime) -> String {
    let mut out = format!(
        "*{}*",
        slots.title.as_deref().unwrap_or("Compromisso")
    );
    if let Some(when) = slots.when {
        out.push(' ');
        out.push_str(&timefmt::human_datetime(when, now));
    }
    if let Some(place) = &slots.place {
        out.push_str(&format!(" em {place}"));
    }
    if !slots.participants.is_empty() {
        out.push_str(&format!(" com {}", slots.participants.join(", ")));
    }
    out
}

fn conflict_warning(task: &Task, now: NaiveDateTime) -> String {
    format!(
        "\n\n⚠️ Atenção: fica a menos de 2 horas de *{}* ({}).",
        task.title,
        timefmt::human_datetime(task.scheduled_date, now)
    )
}

/// Confirmation prompt before creating, with an advisory conflict warning.
pub fn confirm_create(slots: &SlotModel, conflict: Option<&Task>, now: NaiveDateTime) -> String {
    let mut out = format!("Vou agendar: {}.", summary(slots, now));
    if let Some(task) = conflict {
        out.push_str(&conflict_warning(task, now));
    }
    out.push_str("\n\nConfirma?");
    out
}

/// Success text after a create. The conflict warning stays attached when
/// the user confirmed despite one.
pub fn created(slots: &SlotModel, conflict: Option<&Task>, now: NaiveDateTime) -> String {
    let mut out = format!("✓ Agendado: {}.", summary(slots, now));
    if let Some(task) = conflict {
        out.push_str(&conflict_warning(task, now));
    }
    out
}

pub fn changes_block(changes: &[SlotChange]) -> String {
    changes
        .iter()
        .map(|c| c.description.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Preview of pending edits to an existing task.
pub fn update_preview(
    changes: &[SlotChange],
    conflict: Option<&Task>,
    now: NaiveDateTime,
) -> String {
    let mut out = format!("Fica assim:\n{}", changes_block(changes));
    if let Some(task) = conflict {
        out.push_str(&conflict_warning(task, now));
    }
    out.push_str("\n\nAlgo mais? Responda *salvar* para confirmar.");
    out
}

pub fn updated(title: &str) -> String {
    format!("✓ Atualizado: *{title}*.")
}

pub fn what_to_change(task: &Task, now: NaiveDateTime) -> String {
    format!(
        "Encontrei *{}* ({}). O que você quer mudar?",
        task.title,
        timefmt::human_datetime(task.scheduled_date, now)
    )
}

pub fn confirm_delete(task: &Task, now: NaiveDateTime) -> String {
    format!(
        "Quer mesmo cancelar *{}* ({})?",
        task.title,
        timefmt::human_datetime(task.scheduled_date, now)
    )
}

pub fn deleted(title: &str) -> String {
    format!("✓ Cancelado: *{title}*.")
}

pub fn ask_missing(missing: &[&str]) -> String {
    format!("Para agendar, me diga {}.", missing.join(" e "))
}

/// Only the time of day is missing: ask for it by date.
pub fn ask_time(when: NaiveDateTime, now: NaiveDateTime) -> String {
    format!(
        "Para que horas fica, {}?",
        timefmt::human_date(when.date(), now.date())
    )
}

fn numbered_list(tasks: &[&Task], now: NaiveDateTime) -> String {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut line = format!(
                "{}. *{}* — {}",
                i + 1,
                t.title,
                timefmt::human_datetime(t.scheduled_date, now)
            );
            if let Some(place) = &t.location {
                line.push_str(&format!(" em {place}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn task_list(tasks: &[&Task], now: NaiveDateTime) -> String {
    if tasks.is_empty() {
        "Você não tem compromissos marcados.".to_string()
    } else {
        format!(
            "Seus próximos compromissos:\n{}",
            numbered_list(tasks, now)
        )
    }
}

pub fn select_prompt(tasks: &[Task], now: NaiveDateTime) -> String {
    let refs: Vec<&Task> = tasks.iter().collect();
    format!(
        "De qual compromisso você está falando?\n{}\n\nResponda com o número.",
        numbered_list(&refs, now)
    )
}

pub fn select_out_of_range(len: usize) -> String {
    format!("Não entendi. Responda com um número de 1 a {len}.")
}

pub fn no_upcoming() -> &'static str {
    "Você não tem compromissos futuros na agenda."
}
