// src/services/mod.rs
pub mod chat_orchestrator;
pub mod message_store;
pub mod reply_extractor;
pub mod session_manager;
pub mod webhook_client;
