// SPDX-FileCopyrightText: 2026 Muabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic validation for loaded configuration.
//!
//! Runs after deserialization succeeds. Collects all validation errors
//! rather than stopping at the first, so users can fix everything in one
//! pass.

use crate::diagnostic::ConfigError;
use crate::model::MuabotConfig;

/// Validate a loaded configuration, collecting all errors.
///
/// Returns `Ok(())` when the configuration is semantically valid, or all
/// validation failures at once.
pub fn validate_config(config: &MuabotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be between 1 and 65535".to_string(),
        });
    }

    if !matches!(
        config.server.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::Validation {
            message: format!(
                "server.log_level must be one of trace, debug, info, warn, error (got `{}`)",
                config.server.log_level
            ),
        });
    }

    if config.storage.database_path.is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.facebook.send_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "facebook.send_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.facebook.graph_base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "facebook.graph_base_url must not be empty".to_string(),
        });
    } else if !config.facebook.graph_base_url.starts_with("http://")
        && !config.facebook.graph_base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "facebook.graph_base_url must start with http:// or https:// (got `{}`)",
                config.facebook.graph_base_url
            ),
        });
    }

    if config.chatbot.cooldown_minutes < 0 {
        errors.push(ConfigError::Validation {
            message: "chatbot.cooldown_minutes must not be negative".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
