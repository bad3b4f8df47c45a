// src/services/chat_orchestrator.rs
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{StoreError, SubmitError};
use crate::message::{ASSISTANT_ID, ChatMessage, SenderDisplay, SessionView, UserProfile};
use crate::services::message_store::{MessageStore, StoreEvent};
use crate::services::reply_extractor::extract;
use crate::services::webhook_client::WebhookClient;

/// Shown when the workflow answered but no reply text could be found.
pub const NO_RESPONSE: &str = "No response.";

/// Replaces the placeholder when a send cycle fails.
pub const APOLOGY: &str = "Sorry, I couldn't get a response right now. Please try again.";

/// Banner text when a cycle was abandoned before the webhook answered.
pub const CANCELLED: &str = "The message was cancelled before a reply arrived.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SendState {
    Idle,
    Sending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CycleOutcome {
    Resolved,
    Failed,
}

/// Dismissible, session-level error notice. Failure detail lives here rather
/// than in the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct CompletedCycle {
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
    pub outcome: CycleOutcome,
}

#[derive(Debug, Default)]
struct Composer {
    draft: String,
    reply_target: Option<String>,
}

/// Drives the send cycles of one mounted chat view.
///
/// Owns the transcript and the session id. Only one cycle runs at a time; a
/// submit arriving while a cycle is in flight is turned away with
/// [`SubmitError::Busy`].
#[derive(Debug)]
pub struct ChatOrchestrator {
    session_id: String,
    user: UserProfile,
    user_display: SenderDisplay,
    assistant_display: SenderDisplay,
    client: WebhookClient,
    store: RwLock<MessageStore>,
    composer: Mutex<Composer>,
    banner: Mutex<Option<Banner>>,
    busy: AtomicBool,
}

impl ChatOrchestrator {
    pub fn new(config: &Config, client: WebhookClient, user: UserProfile) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let assistant_display = SenderDisplay {
            name: config.assistant_name.clone(),
            avatar_url: None,
        };

        let mut store = MessageStore::new();
        for greeting in &config.initial_messages {
            let message = ChatMessage::new(ASSISTANT_ID, assistant_display.clone(), greeting, None);
            // Greetings never reference another message.
            let _ = store.append(message);
        }

        Self {
            user_display: user.sender_display(),
            session_id,
            user,
            assistant_display,
            client,
            store: RwLock::new(store),
            composer: Mutex::new(Composer::default()),
            banner: Mutex::new(None),
            busy: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn status(&self) -> SendState {
        if self.busy.load(Ordering::Acquire) {
            SendState::Sending
        } else {
            SendState::Idle
        }
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.store.read().await.messages().to_vec()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.read().await.subscribe()
    }

    pub async fn banner(&self) -> Option<Banner> {
        self.banner.lock().await.clone()
    }

    pub async fn dismiss_banner(&self) -> Option<Banner> {
        self.banner.lock().await.take()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.composer.lock().await.draft = text.into();
    }

    /// Thread the next user message under `id`. Refused while a cycle is in
    /// flight so a selection cannot outlive a rejected submit.
    pub async fn select_reply_target(&self, id: &str) -> Result<(), SubmitError> {
        if self.status() == SendState::Sending {
            return Err(SubmitError::Busy);
        }
        let store = self.store.read().await;
        if !store.contains(id) {
            return Err(StoreError::UnknownReplyTarget(id.to_string()).into());
        }
        self.composer.lock().await.reply_target = Some(id.to_string());
        Ok(())
    }

    pub async fn clear_reply_target(&self) {
        self.composer.lock().await.reply_target = None;
    }

    pub async fn snapshot(&self) -> SessionView {
        let messages = self.messages().await;
        let composer = self.composer.lock().await;
        SessionView {
            session_id: self.session_id.clone(),
            status: self.status(),
            messages,
            banner: self.banner().await,
            draft: composer.draft.clone(),
            reply_target: composer.reply_target.clone(),
        }
    }

    /// Run one send cycle for `text`.
    ///
    /// `reply_to` threads the user message under an existing message and
    /// takes precedence over the composer's selection.
    /// Appends the user message and a pending assistant placeholder, calls
    /// the webhook, then replaces the placeholder in place with the reply or
    /// with [`APOLOGY`]. Webhook failures end the cycle as
    /// [`CycleOutcome::Failed`] and set the banner; they are never returned
    /// as errors.
    pub async fn submit(
        &self,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<CompletedCycle, SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(session_id = %self.session_id, "submit ignored while sending");
            return Err(SubmitError::Busy);
        }
        let mut guard = CycleGuard::new(self);

        let (user_message, placeholder) = {
            let mut store = self.store.write().await;
            let mut composer = self.composer.lock().await;

            let reply_to_id = match reply_to {
                Some(id) => Some(id.to_string()),
                None => composer.reply_target.clone(),
            };
            let user_message = ChatMessage::new(
                self.user.id.as_str(),
                self.user_display.clone(),
                text,
                reply_to_id,
            );
            store.append(user_message.clone())?;
            composer.draft.clear();
            composer.reply_target = None;

            let placeholder = ChatMessage::pending(self.assistant_display.clone(), &user_message.id);
            store.append(placeholder.clone())?;
            (user_message, placeholder)
        };
        guard.pending_id = Some(placeholder.id.clone());

        info!(session_id = %self.session_id, message_id = %user_message.id, "sending chat turn");

        let (reply, outcome) = match self.client.send(text, &self.session_id).await {
            Ok(body) => {
                let content = extract(&body).unwrap_or_else(|| {
                    warn!(session_id = %self.session_id, "no reply text found in webhook response");
                    NO_RESPONSE.to_string()
                });
                (placeholder.finalized(content, false), CycleOutcome::Resolved)
            }
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "chat turn failed");
                *self.banner.lock().await = Some(Banner {
                    message: err.to_string(),
                });
                (placeholder.finalized(APOLOGY, true), CycleOutcome::Failed)
            }
        };

        self.store.write().await.replace(&placeholder.id, reply.clone())?;
        guard.finish();

        info!(session_id = %self.session_id, ?outcome, "chat turn finished");
        Ok(CompletedCycle {
            user_message,
            reply,
            outcome,
        })
    }
}

/// Releases the busy flag when a cycle ends, and fails the placeholder if the
/// cycle was dropped before it could be finalized.
struct CycleGuard<'a> {
    orchestrator: &'a ChatOrchestrator,
    pending_id: Option<String>,
}

impl<'a> CycleGuard<'a> {
    fn new(orchestrator: &'a ChatOrchestrator) -> Self {
        Self {
            orchestrator,
            pending_id: None,
        }
    }

    fn finish(&mut self) {
        self.pending_id = None;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.pending_id.take() {
            if let Ok(mut store) = self.orchestrator.store.try_write() {
                if let Some(failed) = store.get(&id).map(|m| m.finalized(APOLOGY, true)) {
                    let _ = store.replace(&id, failed);
                }
            }
            if let Ok(mut banner) = self.orchestrator.banner.try_lock() {
                *banner = Some(Banner {
                    message: CANCELLED.to_string(),
                });
            }
        }
        self.orchestrator.busy.store(false, Ordering::Release);
    }
}
