// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::session_manager::SessionManager;
use crate::services::webhook_client::WebhookClient;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sessions: SessionManager,
    pub webhook: WebhookClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: SessionManager::new(config.session_ttl),
            webhook: WebhookClient::new(config.webhook_url.clone()),
            config,
        }
    }
}
