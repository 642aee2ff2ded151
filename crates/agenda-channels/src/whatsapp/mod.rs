//! WhatsApp Cloud API channel.
//!
//! Inbound: an axum webhook server (verification handshake + event POSTs),
//! with button replies normalized to plain text. Outbound: Graph API sends
//! with retry and plain-text fallback for interactive messages.

mod send;
mod types;
mod webhook;

use agenda_core::{
    config::WhatsAppConfig,
    error::AgendaError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The WhatsApp channel.
pub struct WhatsAppChannel {
    config: WhatsAppConfig,
    client: reqwest::Client,
    server: Mutex<Option<JoinHandle<()>>>,
}

impl WhatsAppChannel {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            server: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, AgendaError> {
        let (tx, rx) = mpsc::channel::<IncomingMessage>(256);

        let state = webhook::WebhookState {
            verify_token: self.config.verify_token.clone(),
            tx,
        };
        let host = self.config.host.clone();
        let port = self.config.port;

        let handle = tokio::spawn(async move {
            webhook::serve(host, port, state).await;
        });

        if let Ok(mut server) = self.server.lock() {
            *server = Some(handle);
        }

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), AgendaError> {
        if message.buttons.is_empty() {
            send::send_text(&self.client, &self.config, &message.to, &message.text).await
        } else {
            send::send_buttons(
                &self.client,
                &self.config,
                &message.to,
                &message.text,
                &message.buttons,
            )
            .await
        }
    }

    async fn stop(&self) -> Result<(), AgendaError> {
        if let Ok(mut server) = self.server.lock() {
            if let Some(handle) = server.take() {
                handle.abort();
            }
        }
        Ok(())
    }
}
