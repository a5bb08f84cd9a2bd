// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `muabot doctor` command implementation.
//!
//! Runs diagnostic checks against the muabot environment: configuration,
//! database health, and a Graph API connection test for every registered
//! page account. Connection test results are written back to each
//! account's status column.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use muabot_config::model::MuabotConfig;
use muabot_core::{AccountStatus, MuabotError};
use muabot_graph::GraphClient;
use muabot_storage::queries::accounts;
use muabot_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `muabot doctor` command.
///
/// With `--plain`, disables colored output.
pub async fn run_doctor(config: &MuabotConfig, plain: bool) -> Result<(), MuabotError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    results.push(check_config().await);
    results.push(check_database(&config.storage.database_path).await);
    results.push(check_db_integrity(&config.storage.database_path).await);
    results.push(check_page_connections(config).await);

    println!();
    println!("  muabot doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line = match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "✓".green(),
                        result.name,
                        result.message
                    )
                } else {
                    format!(
                        "    [OK]   {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "!".yellow(),
                        result.name,
                        result.message.yellow()
                    )
                } else {
                    format!(
                        "    [WARN] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "✗".red(),
                        result.name,
                        result.message.red()
                    )
                } else {
                    format!(
                        "    [FAIL] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
        };
        println!("{line}");
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

/// Check configuration loads without errors.
async fn check_config() -> CheckResult {
    let start = Instant::now();
    match muabot_config::load_and_validate() {
        Ok(_) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Pass,
            message: "valid".to_string(),
            duration: start.elapsed(),
        },
        Err(errors) => CheckResult {
            name: "Configuration".to_string(),
            status: CheckStatus::Fail,
            message: format!("{} error(s)", errors.len()),
            duration: start.elapsed(),
        },
    }
}

/// Check database file exists and can be opened.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let path = std::path::Path::new(db_path);

    if !path.exists() {
        return CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Warn,
            message: format!("not found: {db_path} (will be created on first serve)"),
            duration: start.elapsed(),
        };
    }

    match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => {
            let query_result: Result<(), tokio_rusqlite::Error> = conn
                .call(|conn| {
                    conn.execute_batch("SELECT 1")?;
                    Ok(())
                })
                .await;

            match query_result {
                Ok(()) => CheckResult {
                    name: "Database".to_string(),
                    status: CheckStatus::Pass,
                    message: "connected".to_string(),
                    duration: start.elapsed(),
                },
                Err(e) => CheckResult {
                    name: "Database".to_string(),
                    status: CheckStatus::Fail,
                    message: format!("query failed: {e}"),
                    duration: start.elapsed(),
                },
            }
        }
        Err(e) => CheckResult {
            name: "Database".to_string(),
            status: CheckStatus::Fail,
            message: format!("open failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// SQLite integrity check.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let path = std::path::Path::new(db_path);

    if !path.exists() {
        return CheckResult {
            name: "DB integrity".to_string(),
            status: CheckStatus::Warn,
            message: "database not found (skipped)".to_string(),
            duration: start.elapsed(),
        };
    }

    match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => {
            let result: Result<Vec<String>, tokio_rusqlite::Error> = conn
                .call(|conn| {
                    let mut stmt = conn.prepare("PRAGMA integrity_check")?;
                    let rows: Vec<String> = stmt
                        .query_map([], |row| row.get(0))?
                        .filter_map(|r| r.ok())
                        .collect();
                    Ok(rows)
                })
                .await;

            match result {
                Ok(rows) if rows.len() == 1 && rows[0] == "ok" => CheckResult {
                    name: "DB integrity".to_string(),
                    status: CheckStatus::Pass,
                    message: "ok".to_string(),
                    duration: start.elapsed(),
                },
                Ok(rows) => CheckResult {
                    name: "DB integrity".to_string(),
                    status: CheckStatus::Fail,
                    message: format!("{} issue(s) found", rows.len()),
                    duration: start.elapsed(),
                },
                Err(e) => CheckResult {
                    name: "DB integrity".to_string(),
                    status: CheckStatus::Fail,
                    message: format!("check failed: {e}"),
                    duration: start.elapsed(),
                },
            }
        }
        Err(e) => CheckResult {
            name: "DB integrity".to_string(),
            status: CheckStatus::Fail,
            message: format!("open failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Graph API connection test for every registered page account.
///
/// Each account's status column records the outcome, so the next
/// `muabot account list` reflects what doctor saw.
async fn check_page_connections(config: &MuabotConfig) -> CheckResult {
    let start = Instant::now();

    if !std::path::Path::new(&config.storage.database_path).exists() {
        return CheckResult {
            name: "Graph API".to_string(),
            status: CheckStatus::Warn,
            message: "database not found (skipped)".to_string(),
            duration: start.elapsed(),
        };
    }

    let db = match Database::open_from_config(&config.storage).await {
        Ok(db) => db,
        Err(e) => {
            return CheckResult {
                name: "Graph API".to_string(),
                status: CheckStatus::Fail,
                message: format!("database open failed: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    let page_accounts = match accounts::list_accounts(&db).await {
        Ok(list) => list,
        Err(e) => {
            let _ = db.close().await;
            return CheckResult {
                name: "Graph API".to_string(),
                status: CheckStatus::Fail,
                message: format!("account listing failed: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    if page_accounts.is_empty() {
        let _ = db.close().await;
        return CheckResult {
            name: "Graph API".to_string(),
            status: CheckStatus::Warn,
            message: "no accounts configured (muabot account add)".to_string(),
            duration: start.elapsed(),
        };
    }

    let graph = match GraphClient::new(&config.facebook) {
        Ok(client) => client,
        Err(e) => {
            let _ = db.close().await;
            return CheckResult {
                name: "Graph API".to_string(),
                status: CheckStatus::Fail,
                message: format!("client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    let mut connected = 0;
    let mut failed = 0;
    for account in &page_accounts {
        let outcome = graph
            .get_page_info(&account.page_id, &account.access_token)
            .await;
        let status = if outcome.is_ok() {
            connected += 1;
            AccountStatus::Connected
        } else {
            failed += 1;
            AccountStatus::Error
        };
        let _ = accounts::update_status(&db, account.id, status).await;
    }
    let _ = db.close().await;

    let message = format!("{connected} connected, {failed} failed");
    let status = if failed == 0 {
        CheckStatus::Pass
    } else if connected > 0 {
        CheckStatus::Warn
    } else {
        CheckStatus::Fail
    };

    CheckResult {
        name: "Graph API".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}
