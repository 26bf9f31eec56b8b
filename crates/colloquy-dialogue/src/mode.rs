// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide conversation mode.

use std::str::FromStr;

use colloquy_core::types::ConversationMode;
use colloquy_core::{ColloquyError, StorageAdapter};
use tracing::{info, warn};

/// Reads the mode. A missing or unrecognised value reads as the default.
pub async fn current_mode(storage: &dyn StorageAdapter) -> Result<ConversationMode, ColloquyError> {
    let value = storage.get_setting(ConversationMode::SETTING_KEY).await?;
    Ok(match value.as_deref().map(ConversationMode::from_str) {
        Some(Ok(mode)) => mode,
        Some(Err(_)) => {
            warn!(value = ?value, "stored conversation mode is not recognised, using default");
            ConversationMode::default()
        }
        None => ConversationMode::default(),
    })
}

/// Validates and stores a new mode. Unknown values are rejected and leave
/// the stored mode untouched.
pub async fn set_mode(
    storage: &dyn StorageAdapter,
    value: &str,
) -> Result<ConversationMode, ColloquyError> {
    let mode = ConversationMode::from_str(value.trim()).map_err(|_| {
        ColloquyError::InvalidInput(format!(
            "invalid mode '{value}', expected one of: {}",
            ConversationMode::VALUES.join(", ")
        ))
    })?;

    storage
        .set_setting(ConversationMode::SETTING_KEY, &mode.to_string())
        .await?;
    info!(mode = %mode, "conversation mode changed");
    Ok(mode)
}
