//! Webhook HTTP ingress.
//!
//! A single axum server exposes `POST /webhook` plus two health endpoints.
//! Decoded updates are handed to one long-lived worker task that owns the
//! dispatcher tree; the HTTP handler waits (with a timeout) for that update
//! to finish so every request gets exactly one status code. Building the
//! tree once at startup keeps dispatch state out of the request path.

use std::net::SocketAddr;
use std::ops::ControlFlow;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::Me;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::core::config;
use crate::telegram::handlers::HandlerError;

/// A decoded update awaiting dispatch, with the channel to report back on.
pub struct UpdateJob {
    pub update: Update,
    pub done: oneshot::Sender<Result<(), HandlerError>>,
}

/// Shared state for the webhook server.
#[derive(Clone)]
pub struct WebhookState {
    queue: mpsc::Sender<UpdateJob>,
}

impl WebhookState {
    pub fn new(queue: mpsc::Sender<UpdateJob>) -> Self {
        Self { queue }
    }
}

/// Spawn the dedicated update worker and return its queue handle.
///
/// The worker owns the handler tree for the whole process lifetime and
/// drains updates serially, so per-user session mutations never race.
/// `me` is the bot's own profile from `getMe`; command parsing needs it to
/// strip `/cmd@botname` mentions, so it rides along in every dispatch.
pub fn spawn_update_worker(
    bot: Bot,
    me: Me,
    handler: UpdateHandler<HandlerError>,
) -> mpsc::Sender<UpdateJob> {
    let (tx, mut rx) = mpsc::channel::<UpdateJob>(config::webhook::UPDATE_QUEUE_CAPACITY);

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let update_id = job.update.id.0;
            let deps = dptree::deps![bot.clone(), me.clone(), job.update];
            let result = match handler.dispatch(deps).await {
                ControlFlow::Break(result) => result,
                // No handler claimed the update: an accepted no-op.
                ControlFlow::Continue(_) => Ok(()),
            };
            match &result {
                Ok(()) => log::info!("Processed update {}", update_id),
                Err(e) => log::error!("Error processing update {}: {}", update_id, e),
            }
            let _ = job.done.send(result);
        }
        log::info!("Update worker stopped");
    });

    tx
}

/// Build the webhook router.
pub fn create_webhook_router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Run the webhook server until ctrl_c.
pub async fn run_webhook_server(port: u16, state: WebhookState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = create_webhook_router(state);

    log::info!("Starting webhook server on http://{}", addr);
    log::info!("  POST /webhook - Telegram updates");
    log::info!("  GET  /        - liveness string");
    log::info!("  GET  /health  - health check (JSON)");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// POST /webhook — decode one update and wait for it to be processed.
///
/// Malformed bodies, processing errors, and worker timeouts all map to 500;
/// everything else (including business-level no-ops) is 200 with an empty
/// body.
async fn webhook_handler(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            log::error!("Failed to decode webhook update: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };

    let (done_tx, done_rx) = oneshot::channel();
    if state.queue.send(UpdateJob { update, done: done_tx }).await.is_err() {
        log::error!("Update worker is gone; dropping update");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    match timeout(config::webhook::process_timeout(), done_rx).await {
        Ok(Ok(Ok(()))) => StatusCode::OK,
        Ok(Ok(Err(_))) => StatusCode::INTERNAL_SERVER_ERROR,
        Ok(Err(_)) => {
            log::error!("Update worker dropped a job without replying");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Err(_) => {
            log::error!("Timed out waiting for update processing");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET / — plain-text liveness check.
async fn index_handler() -> &'static str {
    "Telegram Bot is running!"
}

/// GET /health — machine-readable health check.
async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "bot": "running"}))
}
