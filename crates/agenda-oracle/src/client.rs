//! OpenAI-compatible oracle client.
//!
//! Works with OpenAI's API and any compatible endpoint.

use crate::{prompt, wire};
use agenda_core::{
    config::OracleConfig,
    error::AgendaError,
    oracle::{OracleReply, OracleRequest},
    traits::Oracle,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Oracle backed by a chat-completions endpoint.
pub struct OracleClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    history_turns: usize,
}

impl OracleClient {
    pub fn from_config(config: &OracleConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            history_turns: config.history_turns,
        }
    }

    /// Whether the endpoint answers at all. Used by `agenda status`.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url.trim_end_matches('/'));
        match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn complete(&self, request: &OracleRequest<'_>) -> Result<String, AgendaError> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: prompt::system_prompt(request),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt::user_content(request, self.history_turns),
            },
        ];
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("oracle: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AgendaError::Oracle(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AgendaError::Oracle(format!("endpoint returned {status}: {text}")));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| AgendaError::Oracle(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.clone())
            .ok_or_else(|| AgendaError::Oracle("empty completion".to_string()))
    }
}

#[async_trait]
impl Oracle for OracleClient {
    async fn classify(&self, request: &OracleRequest<'_>) -> OracleReply {
        let content = match self.complete(request).await {
            Ok(content) => content,
            Err(e) => {
                warn!("oracle transport failed, degrading to clarify: {e}");
                return OracleReply::clarify_fallback();
            }
        };

        match wire::parse_reply(&content) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("oracle reply unusable, degrading to clarify: {e}");
                OracleReply::clarify_fallback()
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}
