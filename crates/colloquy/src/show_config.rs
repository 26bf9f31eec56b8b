// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `colloquy config` command implementation.

use colloquy_config::model::ColloquyConfig;
use colloquy_core::ColloquyError;

const REDACTED: &str = "[redacted]";

/// Copy of `config` with every credential replaced by a marker.
pub fn redacted(config: &ColloquyConfig) -> ColloquyConfig {
    let mut config = config.clone();
    let mask = |secret: &mut Option<String>| {
        if secret.is_some() {
            *secret = Some(REDACTED.to_string());
        }
    };
    mask(&mut config.gemini.api_key);
    mask(&mut config.speech.api_key);
    mask(&mut config.whatsapp.api_key);
    mask(&mut config.gateway.admin_token);
    config
}

/// Prints the effective configuration as TOML.
pub fn print_config(config: &ColloquyConfig) -> Result<(), ColloquyError> {
    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| ColloquyError::Internal(format!("cannot render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked_and_rest_kept() {
        let mut config = ColloquyConfig::default();
        config.gemini.api_key = Some("AIza-secret".into());
        config.gateway.admin_token = Some("token".into());

        let rendered = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(!rendered.contains("AIza-secret"));
        assert!(!rendered.contains("\"token\""));
        assert!(rendered.contains(REDACTED));
        assert!(rendered.contains("[dialogue]"));
    }

    #[test]
    fn unset_secrets_stay_unset() {
        let config = redacted(&ColloquyConfig::default());
        assert!(config.whatsapp.api_key.is_none());
    }
}
