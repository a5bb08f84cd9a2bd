// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the muabot engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Default Graph API base, version pinned.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v18.0";

/// Top-level muabot configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values. The loaded value is immutable for the lifetime of the process;
/// the only "hot" credential is the page access token, which lives on the
/// Account row, not here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MuabotConfig {
    /// Webhook HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Facebook platform settings (verify token, Graph API).
    #[serde(default)]
    pub facebook: FacebookConfig,

    /// Chatbot behavior settings.
    #[serde(default)]
    pub chatbot: ChatbotConfig,
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind host for the webhook server.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the webhook server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "muabot.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Facebook platform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FacebookConfig {
    /// Token expected in the webhook verification handshake. `serve`
    /// refuses to start while this is empty.
    #[serde(default)]
    pub verify_token: String,

    /// App secret for `X-Hub-Signature-256` delivery verification.
    /// `None` accepts unsigned deliveries.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API base URL, overridable for tests.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,

    /// Per-call timeout for outbound Graph requests, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            verify_token: String::new(),
            app_secret: None,
            graph_base_url: default_graph_base_url(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_graph_base_url() -> String {
    DEFAULT_GRAPH_BASE_URL.to_string()
}

fn default_send_timeout_secs() -> u64 {
    10
}

/// Chatbot behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatbotConfig {
    /// Master switch. When false the dispatcher drops every event without
    /// touching storage.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Cooldown window after a completed order, in minutes.
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,

    /// Salesperson attached to created orders, if any.
    #[serde(default)]
    pub lead_default_user_id: Option<i64>,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cooldown_minutes: default_cooldown_minutes(),
            lead_default_user_id: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_cooldown_minutes() -> i64 {
    5
}
