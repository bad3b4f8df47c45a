// src/services/webhook_client.rs
use chrono::Utc;
use reqwest::Url;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::WebhookError;

/// Posts chat turns to the workflow webhook.
#[derive(Clone, Debug)]
pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: Option<Url>,
}

impl WebhookClient {
    pub fn new(endpoint: Option<Url>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Send one turn and return the body as JSON, or as a JSON string when the
    /// workflow answered with something that is not JSON.
    pub async fn send(&self, text: &str, session_id: &str) -> Result<Value, WebhookError> {
        let endpoint = self.endpoint.clone().ok_or(WebhookError::Configuration)?;
        let payload = build_payload(text, session_id);
        debug!(session_id, %endpoint, "posting chat turn");

        let response = self.http.post(endpoint).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(session_id, status = status.as_u16(), "chat webhook rejected the turn");
            // The status is what matters here, an unreadable body stays empty.
            let raw_body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                raw_body,
            });
        }

        let raw_body = response.text().await?;
        Ok(serde_json::from_str(&raw_body).unwrap_or(Value::String(raw_body)))
    }
}

/// The receiving workflow decides which field it reads, so the text goes out
/// under every name in common use.
pub fn build_payload(text: &str, session_id: &str) -> Value {
    json!({
        "text": text,
        "chatInput": text,
        "input": text,
        "message": text,
        "payload": { "text": text, "message": text },
        "sessionId": session_id,
        "timestamp": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_repeats_text_under_every_key() {
        let payload = build_payload("When is the exam?", "ses-1");
        for key in ["text", "chatInput", "input", "message"] {
            assert_eq!(payload[key], "When is the exam?");
        }
        assert_eq!(payload["payload"]["text"], "When is the exam?");
        assert_eq!(payload["sessionId"], "ses-1");
        assert!(payload["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn missing_endpoint_fails_before_any_request() {
        let client = WebhookClient::new(None);
        let err = client.send("hi", "ses-1").await.unwrap_err();
        assert!(matches!(err, WebhookError::Configuration));
    }
}
