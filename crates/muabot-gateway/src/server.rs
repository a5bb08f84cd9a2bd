// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! One route pair does all the Messenger work: GET for the verification
//! handshake, POST for deliveries. `/health` stays open for probes.

use axum::routing::get;
use axum::Router;
use muabot_config::model::ServerConfig;
use muabot_core::MuabotError;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::webhook::{self, AppState};

/// Build the webhook router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/social/facebook/webhook",
            get(webhook::verify_webhook).post(webhook::receive_delivery),
        )
        .route("/health", get(webhook::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the token is cancelled.
///
/// In-flight requests finish before the server returns; a delivery being
/// processed at shutdown still gets its 200.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), MuabotError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MuabotError::Gateway {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    info!("webhook server listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MuabotError::Gateway {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

/// Install handlers for SIGTERM and SIGINT.
///
/// Returns a token cancelled on the first signal; the handler task exits
/// after cancelling.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), shutting down");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, shutting down");
        }

        token_clone.cancel();
        debug!("signal handler task finished");
    });

    token
}
