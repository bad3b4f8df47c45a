// src/config.rs
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_GREETING: &str = "Hello, how may I help you today?";

#[derive(Clone, Debug)]
pub struct Config {
    /// Workflow webhook receiving chat turns. Sends fail fast when unset.
    pub webhook_url: Option<Url>,
    pub bind_addr: String,
    pub assistant_name: String,
    /// Assistant messages appended when a chat view mounts.
    pub initial_messages: Vec<String>,
    pub session_ttl: Duration,
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            assistant_name: "ModNet Assistant".to_string(),
            initial_messages: vec![DEFAULT_GREETING.to_string()],
            session_ttl: Duration::from_secs(3600),
            static_dir: "public".to_string(),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    /// Call `dotenvy::dotenv()` first to pick up a local `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let webhook_url = non_empty("CHAT_WEBHOOK_URL")
            .or_else(|| non_empty("N8N_WEBHOOK_URL"))
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::InvalidWebhookUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let session_ttl = match non_empty("SESSION_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    key: "SESSION_TTL_SECS",
                    value: raw,
                })?,
            None => defaults.session_ttl,
        };

        // An explicitly empty greeting disables the initial message.
        let initial_messages = match lookup("CHAT_GREETING") {
            Some(raw) if raw.trim().is_empty() => Vec::new(),
            Some(raw) => vec![raw.trim().to_string()],
            None => defaults.initial_messages,
        };

        Ok(Self {
            webhook_url,
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            assistant_name: non_empty("ASSISTANT_NAME").unwrap_or(defaults.assistant_name),
            initial_messages,
            session_ttl,
            static_dir: non_empty("STATIC_DIR").unwrap_or(defaults.static_dir),
        })
    }
}
