// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of a single webhook call.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("chat webhook endpoint is not configured")]
    Configuration,

    #[error("could not reach the chat webhook: {0}")]
    Network(#[from] reqwest::Error),

    #[error("chat webhook returned {status} {status_text}: {raw_body}")]
    Status {
        status: u16,
        status_text: String,
        raw_body: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no message with id {0}")]
    UnknownMessage(String),

    #[error("reply target {0} is not in this conversation")]
    UnknownReplyTarget(String),
}

/// Why a submit did not start a send cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message cannot be empty")]
    EmptyInput,

    #[error("a message is already being sent")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid webhook url {url}: {reason}")]
    InvalidWebhookUrl { url: String, reason: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("a message is already being sent")]
    Busy,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::EmptyInput => AppError::BadRequest(err.to_string()),
            SubmitError::Busy => AppError::Busy,
            SubmitError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Busy => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
