#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{Json, Router, http::StatusCode, routing::post};
use reqwest::Url;
use serde_json::Value;
use tokio::sync::Notify;

use unichat_client::config::Config;

pub type Received = Arc<Mutex<Vec<Value>>>;

/// Serve `router` on an ephemeral local port and return the webhook url.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{}/webhook", addr)).unwrap()
}

/// A workflow webhook answering every turn with `status` and `body`.
pub async fn webhook(status: StatusCode, body: &'static str) -> (Url, Received) {
    let received: Received = Arc::default();
    let log = received.clone();
    let router = Router::new().route(
        "/webhook",
        post(move |Json(payload): Json<Value>| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(payload);
                (status, body)
            }
        }),
    );
    (serve(router).await, received)
}

/// A webhook that holds each request until `release` is notified.
/// `arrived` is notified as soon as a request comes in.
pub struct SlowWebhook {
    pub url: Url,
    pub arrived: Arc<Notify>,
    pub release: Arc<Notify>,
}

pub async fn slow_webhook(body: &'static str) -> SlowWebhook {
    let arrived = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let (a, r) = (arrived.clone(), release.clone());
    let router = Router::new().route(
        "/webhook",
        post(move || {
            let (a, r) = (a.clone(), r.clone());
            async move {
                a.notify_one();
                r.notified().await;
                (StatusCode::OK, body)
            }
        }),
    );
    SlowWebhook {
        url: serve(router).await,
        arrived,
        release,
    }
}

/// A url nothing is listening on.
pub async fn dead_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/webhook", addr)).unwrap()
}

pub fn config(webhook_url: Option<Url>) -> Config {
    Config {
        webhook_url,
        initial_messages: Vec::new(),
        ..Config::default()
    }
}
