// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook endpoint handlers.
//!
//! The POST handler answers 200 "OK" for every delivery it could parse,
//! even when individual events fail: a non-200 makes Facebook retry the
//! whole delivery, and retries are only wanted for transport-level
//! problems. 400 is reserved for bodies that are not JSON at all, 403 for
//! failed signature or handshake checks.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use muabot_chatbot::Dispatcher;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::events::{self, WebhookDelivery};
use crate::signature;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Expected handshake token. The server refuses to start while empty.
    pub verify_token: String,
    /// App secret for delivery signatures; `None` accepts unsigned bodies.
    pub app_secret: Option<String>,
    pub started_at: Instant,
}

/// Query parameters of the verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode", default)]
    pub mode: String,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: String,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: String,
}

/// GET /social/facebook/webhook
///
/// Echoes the challenge iff the mode is "subscribe" and the token matches.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    if params.mode == "subscribe" && signature::tokens_match(&state.verify_token, &params.verify_token)
    {
        debug!("webhook verification handshake accepted");
        (StatusCode::OK, params.challenge).into_response()
    } else {
        warn!(mode = %params.mode, "webhook verification handshake rejected");
        (StatusCode::FORBIDDEN, "Forbidden").into_response()
    }
}

/// POST /social/facebook/webhook
///
/// Entries and their messaging events are processed sequentially in array
/// order; a failing event is logged and the rest of the delivery still
/// runs.
pub async fn receive_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(app_secret) = &state.app_secret {
        let header_value = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !signature::verify_delivery(app_secret, &body, header_value) {
            warn!("delivery rejected: X-Hub-Signature-256 verification failed");
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }
    }

    let delivery: WebhookDelivery = match serde_json::from_slice(&body) {
        Ok(delivery) => delivery,
        Err(err) => {
            warn!(%err, "delivery body is not JSON");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    if delivery.object != "page" {
        debug!(object = %delivery.object, "ignoring non-page delivery");
        return (StatusCode::OK, "OK").into_response();
    }

    for entry in &delivery.entry {
        for event in &entry.messaging {
            let Some(incoming) = events::to_incoming(event) else {
                continue;
            };
            if let Err(err) = state.dispatcher.handle(incoming).await {
                error!(page_id = %entry.id, %err, "messaging event failed, continuing");
            }
        }
    }

    (StatusCode::OK, "OK").into_response()
}

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
