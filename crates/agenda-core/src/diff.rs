//! Human-readable diffs between two slot models.

use crate::slots::SlotModel;
use crate::timefmt;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which slot a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotField {
    Title,
    When,
    Place,
    Participants,
}

impl SlotField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "título",
            Self::When => "horário",
            Self::Place => "local",
            Self::Participants => "participantes",
        }
    }
}

/// One rendered change, e.g. `horário: amanhã às 13h → amanhã às meio-dia`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotChange {
    pub field: SlotField,
    pub description: String,
}

/// Fields whose equality check fails between `prev` and `next`, rendered
/// with a fixed per-field formatter. `diff(p, p)` is empty; comparing in
/// either direction flags the same fields.
pub fn diff(prev: &SlotModel, next: &SlotModel, now: NaiveDateTime) -> Vec<SlotChange> {
    let mut changes = Vec::new();

    if prev.title != next.title {
        changes.push(change(SlotField::Title, &fmt_opt(&prev.title), &fmt_opt(&next.title)));
    }
    if prev.when != next.when {
        changes.push(change(
            SlotField::When,
            &fmt_when(prev.when, now),
            &fmt_when(next.when, now),
        ));
    }
    if prev.place != next.place {
        changes.push(change(SlotField::Place, &fmt_opt(&prev.place), &fmt_opt(&next.place)));
    }
    // Order-sensitive sequence equality.
    if prev.participants != next.participants {
        changes.push(change(
            SlotField::Participants,
            &fmt_names(&prev.participants),
            &fmt_names(&next.participants),
        ));
    }

    changes
}

fn change(field: SlotField, old: &str, new: &str) -> SlotChange {
    SlotChange {
        field,
        description: format!("{}: {old} → {new}", field.label()),
    }
}

fn fmt_opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(vazio)".to_string())
}

fn fmt_when(value: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    match value {
        Some(dt) => timefmt::human_datetime(dt, now),
        None => "(vazio)".to_string(),
    }
}

fn fmt_names(names: &[String]) -> String {
    if names.is_empty() {
        "(vazio)".to_string()
    } else {
        names.join(", ")
    }
}
