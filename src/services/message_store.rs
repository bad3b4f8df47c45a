// src/services/message_store.rs
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::message::ChatMessage;

/// Change notifications for whoever renders the transcript.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum StoreEvent {
    Appended { index: usize, message: ChatMessage },
    Replaced { index: usize, message: ChatMessage },
}

/// Ordered transcript of one chat view.
#[derive(Debug)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
    tx: broadcast::Sender<StoreEvent>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self {
            messages: Vec::new(),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Append at the end and return the new position.
    /// A `reply_to_id` must name a message that is already stored.
    pub fn append(&mut self, message: ChatMessage) -> Result<usize, StoreError> {
        if let Some(target) = &message.reply_to_id {
            if !self.contains(target) {
                return Err(StoreError::UnknownReplyTarget(target.clone()));
            }
        }
        self.messages.push(message.clone());
        let index = self.messages.len() - 1;
        self.publish(StoreEvent::Appended { index, message });
        Ok(index)
    }

    /// Swap the message with `id` for `message`, keeping its position.
    pub fn replace(&mut self, id: &str, message: ChatMessage) -> Result<usize, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::UnknownMessage(id.to_string()))?;
        self.messages[index] = message.clone();
        self.publish(StoreEvent::Replaced { index, message });
        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}
