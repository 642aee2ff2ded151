//! Inbound webhook server: verification handshake plus event delivery.
//!
//! The Cloud API may redeliver the same event more than once; redelivery is
//! tolerated downstream (idempotent turn processing), not filtered here.

use super::types::WebhookEvent;
use agenda_core::{message::IncomingMessage, timefmt};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shared state for webhook handlers.
#[derive(Clone)]
pub(crate) struct WebhookState {
    pub verify_token: String,
    pub tx: mpsc::Sender<IncomingMessage>,
}

/// `GET /webhook` — Meta's subscription verification handshake: echo
/// `hub.challenge` when the verify token matches.
async fn verify(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<WebhookState>,
) -> Result<String, StatusCode> {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge");

    match (mode, token, challenge) {
        (Some("subscribe"), Some(token), Some(challenge))
            if token == state.verify_token =>
        {
            info!("webhook verification handshake accepted");
            Ok(challenge.clone())
        }
        _ => {
            warn!("webhook verification rejected (bad mode or token)");
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// `POST /webhook` — inbound events. Always answers 200 so Meta does not
/// retry storms on our own processing problems.
async fn receive(
    State(state): State<WebhookState>,
    Json(body): Json<Value>,
) -> StatusCode {
    let event: WebhookEvent = match serde_json::from_value(body) {
        Ok(event) => event,
        Err(e) => {
            warn!("unparseable webhook payload: {e}");
            return StatusCode::OK;
        }
    };

    for message in flatten(&event) {
        if state.tx.send(message).await.is_err() {
            error!("gateway receiver dropped, discarding webhook message");
        }
    }

    StatusCode::OK
}

/// Flatten a webhook event into normalized incoming messages.
fn flatten(event: &WebhookEvent) -> Vec<IncomingMessage> {
    let mut out = Vec::new();
    for entry in &event.entry {
        for change in &entry.changes {
            let sender_name = change
                .value
                .contacts
                .first()
                .and_then(|c| c.profile.as_ref())
                .and_then(|p| p.name.clone());

            for message in &change.value.messages {
                let Some(text) = message.normalized_text() else {
                    continue; // media and other unsupported kinds
                };
                let timestamp = message
                    .unix_timestamp()
                    .map(timefmt::from_unix)
                    .unwrap_or_else(timefmt::now);

                out.push(IncomingMessage {
                    id: Uuid::new_v4(),
                    channel: "whatsapp".to_string(),
                    sender_id: message.from.clone(),
                    sender_name: sender_name.clone(),
                    text,
                    timestamp,
                });
            }
        }
    }
    out
}

/// Build the webhook router.
pub(crate) fn build_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify))
        .route("/webhook", post(receive))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// Run the webhook server until the gateway shuts down.
pub(crate) async fn serve(host: String, port: u16, state: WebhookState) {
    let app = build_router(state);
    let addr = format!("{host}:{port}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("webhook server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("webhook server listening on {addr}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("webhook server error: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_text_and_skips_media() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "entry": [{
                    "changes": [{
                        "value": {
                            "contacts": [{"profile": {"name": "Maria"}, "wa_id": "5511"}],
                            "messages": [
                                {"from": "5511", "timestamp": "1787335200", "type": "text",
                                 "text": {"body": "oi"}},
                                {"from": "5511", "timestamp": "1787335201", "type": "audio"}
                            ]
                        }
                    }]
                }]
            }"#,
        )
        .unwrap();

        let messages = flatten(&event);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "oi");
        assert_eq!(messages[0].sender_id, "5511");
        assert_eq!(messages[0].sender_name.as_deref(), Some("Maria"));
    }
}
