//! Outbound sending via the Graph API, with retry and interactive fallback.

use agenda_core::{config::WhatsAppConfig, error::AgendaError};
use serde_json::{json, Value};
use tracing::{error, warn};

/// Retry delays for exponential backoff: 500ms, 1s, 2s.
pub(super) const RETRY_DELAYS_MS: [u64; 3] = [500, 1000, 2000];

/// WhatsApp caps reply buttons at 3, titles at 20 characters.
const MAX_BUTTONS: usize = 3;
const MAX_BUTTON_TITLE: usize = 20;

pub(super) fn messages_url(config: &WhatsAppConfig) -> String {
    format!(
        "{}/{}/messages",
        config.api_base.trim_end_matches('/'),
        config.phone_number_id
    )
}

fn text_body(to: &str, text: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "text",
        "text": {"body": text},
    })
}

fn interactive_body(to: &str, text: &str, buttons: &[String]) -> Value {
    let buttons: Vec<Value> = buttons
        .iter()
        .take(MAX_BUTTONS)
        .enumerate()
        .map(|(i, title)| {
            let title: String = title.chars().take(MAX_BUTTON_TITLE).collect();
            json!({"type": "reply", "reply": {"id": format!("btn_{i}"), "title": title}})
        })
        .collect();

    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "interactive",
        "interactive": {
            "type": "button",
            "body": {"text": text},
            "action": {"buttons": buttons},
        },
    })
}

async fn post_once(
    client: &reqwest::Client,
    config: &WhatsAppConfig,
    body: &Value,
) -> Result<(), AgendaError> {
    let resp = client
        .post(messages_url(config))
        .header("Authorization", format!("Bearer {}", config.access_token))
        .json(body)
        .send()
        .await
        .map_err(|e| AgendaError::Channel(format!("whatsapp request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(AgendaError::Channel(format!(
            "whatsapp returned {status}: {text}"
        )));
    }
    Ok(())
}

/// POST with retry and exponential backoff.
///
/// Attempts up to 3 times with delays of 500ms, 1s, 2s between retries.
async fn retry_post(
    client: &reqwest::Client,
    config: &WhatsAppConfig,
    body: &Value,
) -> Result<(), AgendaError> {
    let mut last_err = None;

    for (attempt, delay_ms) in RETRY_DELAYS_MS.iter().enumerate() {
        match post_once(client, config, body).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                let attempt_num = attempt + 1;
                if attempt_num < RETRY_DELAYS_MS.len() {
                    warn!(
                        "whatsapp send attempt {attempt_num}/{} failed: {e}, retrying in {delay_ms}ms",
                        RETRY_DELAYS_MS.len()
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                } else {
                    error!(
                        "whatsapp send attempt {attempt_num}/{} failed: {e}, giving up",
                        RETRY_DELAYS_MS.len()
                    );
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| AgendaError::Channel("send failed".to_string())))
}

/// Send plain text.
pub(super) async fn send_text(
    client: &reqwest::Client,
    config: &WhatsAppConfig,
    to: &str,
    text: &str,
) -> Result<(), AgendaError> {
    retry_post(client, config, &text_body(to, text)).await
}

/// Send an interactive button message, falling back to plain text when the
/// interactive send fails (the user still gets the content either way).
pub(super) async fn send_buttons(
    client: &reqwest::Client,
    config: &WhatsAppConfig,
    to: &str,
    text: &str,
    buttons: &[String],
) -> Result<(), AgendaError> {
    match retry_post(client, config, &interactive_body(to, text, buttons)).await {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!("interactive send failed ({e}), falling back to plain text");
            send_text(client, config, to, text).await
        }
    }
}
