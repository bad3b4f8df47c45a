// src/message.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::chat_orchestrator::{Banner, CycleOutcome, SendState};

/// Reserved sender id for every message produced on behalf of the webhook.
pub const ASSISTANT_ID: &str = "assistant";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderDisplay {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub sender_id: String,
    pub sender_display: SenderDisplay,
    pub reply_to_id: Option<String>,
    pub pending: bool,
    #[serde(default)]
    pub failed: bool,
}

impl ChatMessage {
    pub fn new(
        sender_id: impl Into<String>,
        sender_display: SenderDisplay,
        content: impl Into<String>,
        reply_to_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            content: content.into(),
            sender_id: sender_id.into(),
            sender_display,
            reply_to_id,
            pending: false,
            failed: false,
        }
    }

    /// Placeholder shown while the webhook call is in flight.
    pub fn pending(sender_display: SenderDisplay, reply_to_id: impl Into<String>) -> Self {
        Self {
            pending: true,
            ..Self::new(ASSISTANT_ID, sender_display, String::new(), Some(reply_to_id.into()))
        }
    }

    /// Finalized copy of a placeholder. Keeps id, position and threading.
    pub fn finalized(&self, content: impl Into<String>, failed: bool) -> Self {
        Self {
            content: content.into(),
            pending: false,
            failed,
            ..self.clone()
        }
    }
}

/// Identity handed over by the authentication backend when a chat view mounts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn sender_display(&self) -> SenderDisplay {
        let name = self
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.id.clone());

        SenderDisplay {
            name,
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub text: String,
    pub reply_to_id: Option<String>,
}

#[derive(Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTargetRequest {
    pub message_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountResponse {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
    pub outcome: CycleOutcome,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub status: SendState,
    pub messages: Vec<ChatMessage>,
    pub banner: Option<Banner>,
    pub draft: String,
    pub reply_target: Option<String>,
}
