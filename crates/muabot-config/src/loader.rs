// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./muabot.toml` > `~/.config/muabot/muabot.toml` > `/etc/muabot/muabot.toml`
//! with environment variable overrides via `MUABOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MuabotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/muabot/muabot.toml` (system-wide)
/// 3. `~/.config/muabot/muabot.toml` (user XDG config)
/// 4. `./muabot.toml` (local directory)
/// 5. `MUABOT_*` environment variables
pub fn load_config() -> Result<MuabotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MuabotConfig::default()))
        .merge(Toml::file("/etc/muabot/muabot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("muabot/muabot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("muabot.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MuabotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MuabotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MuabotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MuabotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MUABOT_FACEBOOK_VERIFY_TOKEN` must map
/// to `facebook.verify_token`, not `facebook.verify.token`.
fn env_provider() -> Env {
    Env::prefixed("MUABOT_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped,
        // e.g. MUABOT_CHATBOT_COOLDOWN_MINUTES -> "chatbot_cooldown_minutes".
        let mapped = key
            .as_str()
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("facebook_", "facebook.", 1)
            .replacen("chatbot_", "chatbot.", 1);
        mapped.into()
    })
}
