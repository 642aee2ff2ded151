//! WhatsApp Cloud API webhook payload types (the subset we consume).

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookEvent {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangeValue {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Contact {
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Profile {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub from: String,
    /// Unix seconds, as a string on the wire.
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub interactive: Option<Interactive>,
    #[serde(default)]
    pub button: Option<TemplateButton>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Interactive {
    #[serde(default)]
    pub button_reply: Option<Reply>,
    #[serde(default)]
    pub list_reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Reply {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateButton {
    pub text: String,
}

impl Message {
    /// Normalize to plain text: button and list replies become the literal
    /// text a user would have typed. `None` for media and other unsupported
    /// kinds.
    pub(crate) fn normalized_text(&self) -> Option<String> {
        match self.kind.as_str() {
            "text" => self.text.as_ref().map(|t| t.body.clone()),
            "interactive" => self
                .interactive
                .as_ref()
                .and_then(|i| i.button_reply.as_ref().or(i.list_reply.as_ref()))
                .map(|r| r.title.clone()),
            "button" => self.button.as_ref().map(|b| b.text.clone()),
            _ => None,
        }
    }

    pub(crate) fn unix_timestamp(&self) -> Option<i64> {
        self.timestamp.parse().ok()
    }
}
