use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{
    error::AppError,
    message::{
        DraftRequest, MountResponse, ReplyTargetRequest, SessionView, SubmitRequest,
        SubmitResponse, UserProfile,
    },
    services::chat_orchestrator::{Banner, ChatOrchestrator},
    state::SharedState,
};

async fn find_session(state: &SharedState, id: &str) -> Result<Arc<ChatOrchestrator>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Unknown session {}", id)))
}

pub async fn mount_handler(
    State(state): State<SharedState>,
    Json(profile): Json<UserProfile>,
) -> Result<(StatusCode, Json<MountResponse>), AppError> {
    if profile.id.trim().is_empty() {
        return Err(AppError::BadRequest("User id cannot be empty".to_string()));
    }

    let orchestrator = ChatOrchestrator::new(&state.config, state.webhook.clone(), profile);
    let orchestrator = state.sessions.insert(orchestrator).await;

    Ok((
        StatusCode::CREATED,
        Json(MountResponse {
            session_id: orchestrator.session_id().to_string(),
            messages: orchestrator.messages().await,
        }),
    ))
}

pub async fn view_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let orchestrator = find_session(&state, &id).await?;
    Ok(Json(orchestrator.snapshot().await))
}

pub async fn submit_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let orchestrator = find_session(&state, &id).await?;

    if payload.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    // Detached so a dropped connection never cancels a cycle halfway.
    let handle = tokio::spawn(async move {
        orchestrator
            .submit(&payload.text, payload.reply_to_id.as_deref())
            .await
    });
    let cycle = handle
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(SubmitResponse {
        user_message: cycle.user_message,
        reply: cycle.reply,
        outcome: cycle.outcome,
    }))
}

pub async fn draft_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<DraftRequest>,
) -> Result<StatusCode, AppError> {
    let orchestrator = find_session(&state, &id).await?;
    orchestrator.set_draft(payload.text).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_reply_target_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ReplyTargetRequest>,
) -> Result<StatusCode, AppError> {
    let orchestrator = find_session(&state, &id).await?;
    orchestrator.select_reply_target(&payload.message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_reply_target_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let orchestrator = find_session(&state, &id).await?;
    orchestrator.clear_reply_target().await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dismiss_banner_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Banner>>, AppError> {
    let orchestrator = find_session(&state, &id).await?;
    Ok(Json(orchestrator.dismiss_banner().await))
}

pub async fn teardown_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Unknown session {}", id)))
    }
}

// Store changes as server-sent events. Lagging subscribers skip what they missed.
pub async fn events_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let orchestrator = find_session(&state, &id).await?;
    let stream = BroadcastStream::new(orchestrator.subscribe().await)
        .filter_map(|event| event.ok())
        .map(|event| Event::default().json_data(event));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
