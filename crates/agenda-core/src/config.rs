//! TOML configuration with per-section defaults.

use crate::error::AgendaError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Agenda configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agenda: AgendaConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    #[serde(default = "defaults::name")]
    pub name: String,
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
    #[serde(default = "defaults::log_level")]
    pub log_level: String,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            name: defaults::name(),
            data_dir: defaults::data_dir(),
            log_level: defaults::log_level(),
        }
    }
}

/// WhatsApp Cloud API channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    /// Token echoed back during the webhook verification handshake.
    #[serde(default)]
    pub verify_token: String,
    /// Bearer token for the Graph API.
    #[serde(default)]
    pub access_token: String,
    /// Business phone number id used in the send endpoint path.
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default = "defaults::api_base")]
    pub api_base: String,
    /// Webhook bind address.
    #[serde(default = "defaults::webhook_host")]
    pub host: String,
    #[serde(default = "defaults::webhook_port")]
    pub port: u16,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verify_token: String::new(),
            access_token: String::new(),
            phone_number_id: String::new(),
            api_base: defaults::api_base(),
            host: defaults::webhook_host(),
            port: defaults::webhook_port(),
        }
    }
}

/// NLU oracle settings (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "defaults::oracle_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "defaults::oracle_model")]
    pub model: String,
    /// Turns of conversation history sent with each classification.
    #[serde(default = "defaults::history_turns")]
    pub history_turns: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::oracle_base_url(),
            api_key: String::new(),
            model: defaults::oracle_model(),
            history_turns: defaults::history_turns(),
        }
    }
}

/// Memory config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "defaults::db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::db_path(),
        }
    }
}

mod defaults {
    pub fn name() -> String {
        "agenda".to_string()
    }
    pub fn data_dir() -> String {
        "~/.agenda".to_string()
    }
    pub fn log_level() -> String {
        "info".to_string()
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn api_base() -> String {
        "https://graph.facebook.com/v21.0".to_string()
    }
    pub fn webhook_host() -> String {
        "0.0.0.0".to_string()
    }
    pub fn webhook_port() -> u16 {
        8080
    }
    pub fn oracle_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }
    pub fn oracle_model() -> String {
        "gpt-4o-mini".to_string()
    }
    pub fn history_turns() -> usize {
        10
    }
    pub fn db_path() -> String {
        "~/.agenda/data/agenda.db".to_string()
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, AgendaError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| AgendaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| AgendaError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
