// src/routes/mod.rs
pub mod chat;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use chat::{
    clear_reply_target_handler, dismiss_banner_handler, draft_handler, events_handler,
    mount_handler, select_reply_target_handler, submit_handler, teardown_handler, view_handler,
};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(mount_handler))
        .route("/sessions/{id}", get(view_handler).delete(teardown_handler))
        .route("/sessions/{id}/messages", post(submit_handler))
        .route("/sessions/{id}/draft", put(draft_handler))
        .route(
            "/sessions/{id}/reply-target",
            put(select_reply_target_handler).delete(clear_reply_target_handler),
        )
        .route("/sessions/{id}/banner", delete(dismiss_banner_handler))
        .route("/sessions/{id}/events", get(events_handler))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}
