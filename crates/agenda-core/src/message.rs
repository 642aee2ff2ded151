use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
///
/// Interactive button replies are normalized by the channel into the literal
/// text a user would have typed, so the core sees plain text only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "whatsapp").
    pub channel: String,
    /// User phone identity.
    pub sender_id: String,
    /// Human-readable sender name, when the platform provides one.
    pub sender_name: Option<String>,
    pub text: String,
    /// Message timestamp in the reference timezone.
    pub timestamp: NaiveDateTime,
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Recipient phone identity.
    pub to: String,
    pub text: String,
    /// When non-empty, send as an interactive message with these reply
    /// buttons; the channel falls back to plain text if that fails.
    #[serde(default)]
    pub buttons: Vec<String>,
}

impl OutgoingMessage {
    pub fn text(to: &str, text: impl Into<String>) -> Self {
        Self {
            to: to.to_string(),
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons(to: &str, text: impl Into<String>, buttons: &[&str]) -> Self {
        Self {
            to: to.to_string(),
            text: text.into(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
        }
    }
}
