//! Wire format of the oracle's JSON answer, validated at the boundary.
//!
//! Everything here is a closed struct with explicit optional fields; no
//! untyped map crosses into the state machine.

use agenda_core::oracle::{Intent, OracleReply, PartialSlots, ReferencedTask};
use chrono::NaiveDateTime;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct WireReply {
    pub intent: WireIntent,
    pub confidence: f32,
    #[serde(default)]
    pub referenced_task: Option<WireReferencedTask>,
    #[serde(default)]
    pub changes: Option<WireSlots>,
    #[serde(default)]
    pub new_task_info: Option<WireSlots>,
    #[serde(default)]
    pub suggested_response: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WireIntent {
    Create,
    Update,
    Delete,
    List,
    Query,
    Clarify,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireReferencedTask {
    pub id: String,
    #[serde(default)]
    pub match_reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireSlots {
    #[serde(default)]
    pub title: Option<String>,
    /// ISO-8601 without offset, reference timezone, e.g. "2026-08-22T15:00:00".
    #[serde(default)]
    pub when: Option<String>,
    #[serde(default)]
    pub has_time: bool,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
}

/// Strip Markdown code fences the model may wrap its JSON in.
pub(crate) fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

/// Parse the model's answer into a typed reply. `Err` means the answer was
/// not usable; the caller degrades to the clarify fallback.
pub(crate) fn parse_reply(content: &str) -> Result<OracleReply, String> {
    let wire: WireReply =
        serde_json::from_str(strip_fences(content)).map_err(|e| format!("bad reply json: {e}"))?;

    let confidence = wire.confidence.clamp(0.0, 1.0);

    Ok(OracleReply {
        intent: match wire.intent {
            WireIntent::Create => Intent::Create,
            WireIntent::Update => Intent::Update,
            WireIntent::Delete => Intent::Delete,
            WireIntent::List => Intent::List,
            WireIntent::Query => Intent::Query,
            WireIntent::Clarify => Intent::Clarify,
        },
        confidence,
        referenced_task: wire.referenced_task.map(|t| ReferencedTask {
            id: t.id,
            match_reason: t.match_reason,
        }),
        changes: wire.changes.map(convert_slots).transpose()?,
        new_task_info: wire.new_task_info.map(convert_slots).transpose()?,
        suggested_response: wire.suggested_response,
    })
}

fn convert_slots(wire: WireSlots) -> Result<PartialSlots, String> {
    let when = wire
        .when
        .as_deref()
        .map(parse_when)
        .transpose()?;
    Ok(PartialSlots {
        title: wire.title,
        when,
        has_time: wire.has_time,
        place: wire.place,
        participants: wire.participants,
    })
}

fn parse_when(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|e| format!("bad 'when' value '{s}': {e}"))
}
