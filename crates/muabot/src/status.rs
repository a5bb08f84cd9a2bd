// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `muabot status` command implementation.
//!
//! Probes the webhook health endpoint to display server state and uptime,
//! then reads storage counts (accounts, conversations, orders). Falls back
//! gracefully when the server is not running or the database is absent.

use std::io::IsTerminal;
use std::time::Duration;

use muabot_config::model::MuabotConfig;
use muabot_core::MuabotError;
use muabot_storage::queries::{accounts, conversations, orders};
use muabot_storage::Database;
use serde::{Deserialize, Serialize};

/// Health endpoint response from the webhook server.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

/// Storage row counts, absent when the database file does not exist.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StorageCounts {
    pub accounts: i64,
    pub conversations: i64,
    pub orders: i64,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub status: String,
    pub uptime_secs: Option<u64>,
    pub uptime_human: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub counts: Option<StorageCounts>,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Read row counts from the configured database, if it exists.
async fn read_counts(config: &MuabotConfig) -> Option<StorageCounts> {
    if !std::path::Path::new(&config.storage.database_path).exists() {
        return None;
    }
    let db = Database::open_from_config(&config.storage).await.ok()?;
    let account_count = accounts::list_accounts(&db).await.ok()?.len() as i64;
    let conversation_count = conversations::count_conversations(&db).await.ok()?;
    let order_count = orders::count_orders(&db).await.ok()?;
    let _ = db.close().await;
    Some(StorageCounts {
        accounts: account_count,
        conversations: conversation_count,
        orders: order_count,
    })
}

/// Run the `muabot status` command.
///
/// Connects to the health endpoint on the webhook server and displays its
/// state. If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &MuabotConfig, json: bool, plain: bool) -> Result<(), MuabotError> {
    let host = &config.server.host;
    let port = config.server.port;
    let url = format!("http://{host}:{port}/health");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| MuabotError::Internal(format!("failed to create HTTP client: {e}")))?;

    let health = match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => resp.json::<HealthResponse>().await.ok(),
        _ => None,
    };
    let counts = read_counts(config).await;

    if json {
        let response = match &health {
            Some(h) => StatusResponse {
                running: true,
                status: h.status.clone(),
                uptime_secs: Some(h.uptime_secs),
                uptime_human: Some(format_uptime(h.uptime_secs)),
                server_host: host.clone(),
                server_port: port,
                counts,
            },
            None => StatusResponse {
                running: false,
                status: "not running".to_string(),
                uptime_secs: None,
                uptime_human: None,
                server_host: host.clone(),
                server_port: port,
                counts,
            },
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    println!();
    println!("  muabot status");
    println!("  {}", "-".repeat(35));

    match &health {
        Some(h) => {
            let uptime = format_uptime(h.uptime_secs);
            if use_color {
                use colored::Colorize;
                println!(
                    "    Server:        {} {} (uptime: {uptime})",
                    "✓".green(),
                    h.status.green()
                );
            } else {
                println!("    Server:        [OK] {} (uptime: {uptime})", h.status);
            }
        }
        None => {
            if use_color {
                use colored::Colorize;
                println!("    Server:        {} {}", "✗".red(), "not running".red());
            } else {
                println!("    Server:        [FAIL] not running");
            }
            println!("    Endpoint:      {url}");
        }
    }

    match counts {
        Some(c) => {
            println!("    Accounts:      {}", c.accounts);
            println!("    Conversations: {}", c.conversations);
            println!("    Orders:        {}", c.orders);
        }
        None => {
            println!(
                "    Database:      not found at {}",
                config.storage.database_path
            );
        }
    }

    println!();
    if health.is_none() {
        println!("  Start with: muabot serve");
        println!();
    }

    Ok(())
}
