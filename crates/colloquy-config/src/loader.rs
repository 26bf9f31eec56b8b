// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./colloquy.toml` > `~/.config/colloquy/colloquy.toml`
//! > `/etc/colloquy/colloquy.toml` with environment variable overrides via the
//! `COLLOQUY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ColloquyConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/colloquy/colloquy.toml";
pub(crate) const LOCAL_CONFIG: &str = "colloquy.toml";

/// Config sections addressable from the environment. An env key is mapped to
/// `section.rest` when it starts with `section_`.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "dialogue",
    "retrieval",
    "media",
    "gemini",
    "speech",
    "whatsapp",
    "gateway",
    "ingest",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("colloquy/colloquy.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/colloquy/colloquy.toml`
/// 3. `~/.config/colloquy/colloquy.toml`
/// 4. `./colloquy.toml`
/// 5. `COLLOQUY_*` environment variables
pub fn load_config() -> Result<ColloquyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ColloquyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ColloquyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ColloquyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ColloquyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ColloquyConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `COLLOQUY_WHATSAPP_API_KEY` must map to `whatsapp.api_key`,
/// not `whatsapp.api.key`.
fn env_provider() -> Env {
    Env::prefixed("COLLOQUY_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
