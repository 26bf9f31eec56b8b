// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers constraints serde cannot express: non-empty paths, numeric ranges,
//! and relationships between fields such as chunk overlap vs chunk size.

use crate::diagnostic::ConfigError;
use crate::model::ColloquyConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing on the first one.
pub fn validate_config(config: &ColloquyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.media.directory.trim().is_empty() {
        errors.push(ConfigError::validation("media.directory must not be empty"));
    }

    let floor = config.retrieval.similarity_floor;
    if !(-1.0..=1.0).contains(&floor) {
        errors.push(ConfigError::validation(format!(
            "retrieval.similarity_floor must be within [-1, 1], got {floor}"
        )));
    }

    if config.retrieval.top_k == 0 {
        errors.push(ConfigError::validation(
            "retrieval.top_k must be at least 1",
        ));
    }

    if config.dialogue.history_window == 0 {
        errors.push(ConfigError::validation(
            "dialogue.history_window must be at least 1",
        ));
    }

    for (key, value) in [
        ("dialogue.freshness_window_secs", config.dialogue.freshness_window_secs),
        ("dialogue.call_timeout_secs", config.dialogue.call_timeout_secs),
        ("whatsapp.send_timeout_secs", config.whatsapp.send_timeout_secs),
        ("whatsapp.media_timeout_secs", config.whatsapp.media_timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!("{key} must be greater than 0")));
        }
    }

    if config.ingest.max_chars == 0 {
        errors.push(ConfigError::validation("ingest.max_chars must be at least 1"));
    } else if config.ingest.overlap >= config.ingest.max_chars {
        errors.push(ConfigError::validation(format!(
            "ingest.overlap ({}) must be smaller than ingest.max_chars ({})",
            config.ingest.overlap, config.ingest.max_chars
        )));
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::validation("gateway.port must not be 0"));
    }

    let host = config.gateway.host.trim();
    let is_ip = host.parse::<std::net::IpAddr>().is_ok();
    let is_hostname = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
    if !is_ip && !is_hostname {
        errors.push(ConfigError::validation(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if let Some(token) = &config.gateway.admin_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "gateway.admin_token must not be blank; omit it to disable admin routes",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = errors.len(), "configuration failed validation");
        Err(errors)
    }
}
