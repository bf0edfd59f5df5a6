//! Webhook HTTP server and the per-event processing pipeline.
//!
//! `POST /` receives platform event payloads. Verification handshakes are
//! answered inline; file_shared events are processed in a spawned task so the
//! acknowledgment never waits on (or reports) outbound-call failures. The
//! platform must never see a failure status for an event it already delivered.

use crate::config::{self, Config};
use crate::event::{self, InboundEvent};
use crate::moderation;
use crate::ocr::{self, VisionClient};
use crate::slack::SlackClient;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

/// Shared state for the webhook server (clients carry their own credentials).
#[derive(Clone)]
pub struct ServerState {
    pub slack: SlackClient,
    pub vision: VisionClient,
    pub port: u16,
}

/// Run the webhook server; binds to config.server.bind on the resolved port.
/// All three credentials must resolve (config or env) or startup fails.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_server(config: Config) -> Result<()> {
    let user_token = config::resolve_user_token(&config)
        .context("slack user token missing (set slack.userToken or SLACK_USER_TOKEN)")?;
    let bot_token = config::resolve_bot_token(&config)
        .context("slack bot token missing (set slack.botToken or SLACK_BOT_TOKEN)")?;
    let vision_key = config::resolve_vision_key(&config)
        .context("vision api key missing (set vision.apiKey or VISION_API_KEY)")?;
    let port = config.server.port;

    let state = ServerState {
        slack: SlackClient::new(user_token, bot_token, config.slack.api_base.clone()),
        vision: VisionClient::new(vision_key, config.vision.endpoint.clone()),
        port,
    };

    let app = Router::new()
        .route("/", get(health_http).post(webhook))
        .with_state(state);

    let bind_addr = format!("{}:{}", config.server.bind.trim(), port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("webhook listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("webhook stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// POST / — classify the payload; echo verification challenges, spawn the
/// pipeline for file_shared events, acknowledge everything else.
async fn webhook(State(state): State<ServerState>, body: Bytes) -> Response {
    match event::classify(&body) {
        InboundEvent::UrlVerification { challenge } => challenge.into_response(),
        InboundEvent::FileShared { file_id, user_id } => {
            log::info!("file_shared event: file {} from {}", file_id, user_id);
            tokio::spawn(process_file_shared(state, file_id, user_id));
            StatusCode::OK.into_response()
        }
        InboundEvent::Other => StatusCode::OK.into_response(),
    }
}

/// Top of the spawned pipeline task: any stage failure is logged and dropped.
/// The event's 200 acknowledgment has already been sent.
async fn process_file_shared(state: ServerState, file_id: String, user_id: String) {
    if let Err(e) = handle_file_shared(&state, &file_id, &user_id).await {
        log::warn!("file {}: pipeline aborted: {}", file_id, e);
    }
}

/// metadata -> image check -> download -> OCR -> moderation. Sequential, no
/// retries; the first outbound failure aborts this event.
async fn handle_file_shared(state: &ServerState, file_id: &str, user_id: &str) -> Result<()> {
    let info = state.slack.file_info(file_id).await?;
    if !info.mimetype.starts_with("image") {
        log::debug!("file {}: {} is not an image, skipping", file_id, info.mimetype);
        return Ok(());
    }
    let bytes = state.slack.download_file(&info.url_private).await?;
    let encoded = ocr::encode_image(&bytes);
    let text = state.vision.recognize_text(&encoded).await?;
    moderation::apply(&state.slack, file_id, user_id, &text).await;
    Ok(())
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "decaf",
        "port": state.port,
    }))
}
