//! The slot model: an appointment under construction or edit.

use crate::oracle::PartialSlots;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Structured, partially-filled representation of an appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlotModel {
    pub title: Option<String>,
    /// Appointment instant in the reference timezone.
    pub when: Option<NaiveDateTime>,
    /// Set when a date was extracted but no time of day was stated.
    #[serde(default)]
    pub needs_time_confirmation: bool,
    pub place: Option<String>,
    /// Insertion order preserved for display, duplicates collapsed.
    #[serde(default)]
    pub participants: Vec<String>,
    /// Verbatim text of every user turn that contributed to this model,
    /// append-only. Re-submitted to the oracle so extraction can self-correct.
    #[serde(default)]
    pub raw_turns: Vec<String>,
}

impl SlotModel {
    /// A model is complete once it can be scheduled: title and instant set.
    /// Completeness gates the transition into confirmation.
    pub fn is_complete(&self) -> bool {
        self.title.is_some() && self.when.is_some() && !self.needs_time_confirmation
    }

    /// Record the verbatim user turn.
    pub fn push_turn(&mut self, text: &str) {
        self.raw_turns.push(text.to_string());
    }

    /// All user turns joined into one string for oracle re-extraction.
    pub fn accumulated_text(&self) -> Option<String> {
        if self.raw_turns.is_empty() {
            None
        } else {
            Some(self.raw_turns.join("\n"))
        }
    }

    /// Merge newly extracted fields into this model.
    ///
    /// Field-wise override: any non-empty field in `new` replaces the current
    /// value; absent fields are left untouched. `participants` is replaced
    /// wholesale when non-empty — an update states the new truth, not an
    /// addition.
    pub fn merge(&mut self, new: &PartialSlots) {
        if let Some(title) = &new.title {
            if !title.trim().is_empty() {
                self.title = Some(title.trim().to_string());
            }
        }
        if let Some(when) = new.when {
            self.when = Some(when);
            self.needs_time_confirmation = !new.has_time;
        }
        if let Some(place) = &new.place {
            if !place.trim().is_empty() {
                self.place = Some(place.trim().to_string());
            }
        }
        if !new.participants.is_empty() {
            self.participants = dedup_preserving_order(&new.participants);
        }
    }

    /// Names of the fields still missing for completeness, in display form.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("o título");
        }
        if self.when.is_none() {
            missing.push("a data e o horário");
        } else if self.needs_time_confirmation {
            missing.push("o horário");
        }
        missing
    }
}

fn dedup_preserving_order(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if !out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_merge_empty_is_identity() {
        let mut slots = SlotModel {
            title: Some("Almoço".to_string()),
            when: Some(dt(22, 13)),
            needs_time_confirmation: false,
            place: Some("Centro".to_string()),
            participants: vec!["Ana".to_string()],
            raw_turns: vec!["almoço amanhã".to_string()],
        };
        let before = slots.clone();
        slots.merge(&PartialSlots::default());
        assert_eq!(slots, before);
    }

    #[test]
    fn test_merge_overrides_only_present_fields() {
        let mut slots = SlotModel {
            title: Some("Almoço".to_string()),
            when: Some(dt(22, 13)),
            ..Default::default()
        };
        slots.merge(&PartialSlots {
            when: Some(dt(22, 12)),
            has_time: true,
            ..Default::default()
        });
        assert_eq!(slots.title.as_deref(), Some("Almoço"));
        assert_eq!(slots.when, Some(dt(22, 12)));
    }

    #[test]
    fn test_merge_participants_replaced_wholesale() {
        let mut slots = SlotModel {
            participants: vec!["Ana".to_string(), "Bia".to_string()],
            ..Default::default()
        };
        slots.merge(&PartialSlots {
            participants: vec!["Carlos".to_string(), "carlos".to_string()],
            ..Default::default()
        });
        assert_eq!(slots.participants, vec!["Carlos".to_string()]);
    }

    #[test]
    fn test_date_without_time_blocks_completeness() {
        let mut slots = SlotModel {
            title: Some("Dentista".to_string()),
            ..Default::default()
        };
        slots.merge(&PartialSlots {
            when: Some(dt(25, 9)),
            has_time: false,
            ..Default::default()
        });
        assert!(!slots.is_complete());
        assert_eq!(slots.missing_fields(), vec!["o horário"]);

        slots.merge(&PartialSlots {
            when: Some(dt(25, 14)),
            has_time: true,
            ..Default::default()
        });
        assert!(slots.is_complete());
        assert!(slots.missing_fields().is_empty());
    }

    #[test]
    fn test_blank_strings_do_not_clear_fields() {
        let mut slots = SlotModel {
            title: Some("Reunião".to_string()),
            place: Some("Escritório".to_string()),
            ..Default::default()
        };
        slots.merge(&PartialSlots {
            title: Some("  ".to_string()),
            place: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(slots.title.as_deref(), Some("Reunião"));
        assert_eq!(slots.place.as_deref(), Some("Escritório"));
    }
}
