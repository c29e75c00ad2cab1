//! Webhook front door
//!
//! `POST /webhook` accepts a Telegram update as JSON, acknowledges it at once and
//! handles it on its own task. `GET /health` answers `OK`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use teloxide::types::Update;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::bot::telegram::inbound_from_update;
use crate::bot::{process_inbound, BotContext};

/// Create the webhook router
pub fn create_router(ctx: BotContext) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/health", get(health_check))
        .with_state(ctx)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn receive_update(State(ctx): State<BotContext>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "Rejected malformed webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    debug!(update_id = ?update.id, "Received webhook update");
    let inbound = inbound_from_update(&update);
    tokio::spawn(async move {
        process_inbound(&ctx, inbound).await;
    });

    StatusCode::OK
}

/// Serve the webhook router until Ctrl+C
pub async fn serve(ctx: BotContext, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Webhook server listening");

    axum::serve(listener, create_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    info!("Webhook server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
