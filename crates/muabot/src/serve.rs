// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `muabot serve` command implementation.
//!
//! Opens the database (running migrations), builds the Graph client and
//! dispatch pipeline, and runs the webhook server until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Instant;

use muabot_chatbot::Dispatcher;
use muabot_config::model::MuabotConfig;
use muabot_core::MuabotError;
use muabot_gateway::{install_signal_handler, AppState};
use muabot_graph::GraphClient;
use muabot_storage::Database;
use tracing::{error, info, warn};

/// Runs the `muabot serve` command.
///
/// Refuses to start while `facebook.verify_token` is empty: Facebook's
/// verification handshake would be unanswerable and an empty expected token
/// must never compare equal to anything.
pub async fn run_serve(config: MuabotConfig) -> Result<(), MuabotError> {
    init_tracing(&config.server.log_level);

    info!("starting muabot serve");

    if config.facebook.verify_token.is_empty() {
        error!("facebook.verify_token is not configured");
        eprintln!(
            "error: webhook verify token required. Set facebook.verify_token \
             in muabot.toml or the MUABOT_FACEBOOK__VERIFY_TOKEN env var."
        );
        return Err(MuabotError::Config(
            "facebook.verify_token is empty".to_string(),
        ));
    }

    if config.facebook.app_secret.is_none() {
        warn!("facebook.app_secret unset; delivery signatures will not be checked");
    }
    if !config.chatbot.enabled {
        warn!("chatbot.enabled is false; deliveries will be acknowledged and dropped");
    }

    let db = Database::open_from_config(&config.storage).await?;
    info!(
        path = config.storage.database_path.as_str(),
        "database ready"
    );

    let graph = Arc::new(GraphClient::new(&config.facebook)?);
    let dispatcher = Arc::new(Dispatcher::new(
        db.clone(),
        graph,
        config.chatbot.clone(),
    ));

    let state = AppState {
        dispatcher,
        verify_token: config.facebook.verify_token.clone(),
        app_secret: config.facebook.app_secret.clone(),
        started_at: Instant::now(),
    };

    let cancel = install_signal_handler();
    muabot_gateway::serve(&config.server, state, cancel).await?;

    db.close().await?;
    info!("muabot serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("muabot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
