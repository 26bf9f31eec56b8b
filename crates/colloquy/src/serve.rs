// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `colloquy serve` command implementation.
//!
//! Opens SQLite storage, builds the Gemini, Google speech and WhatsApp
//! adapters, rebuilds the contact cache from the durable ledger, and serves
//! the webhook and admin routes until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use colloquy_config::model::ColloquyConfig;
use colloquy_core::{CallBounds, ColloquyError, PluginAdapter, StorageAdapter};
use colloquy_dialogue::{
    BroadcastDispatcher, Collaborators, DialogueEngine, install_signal_handler, recording,
};
use colloquy_gateway::{AuthConfig, GatewayState, ServerConfig, start_server};
use colloquy_gemini::{GeminiProvider, GoogleSpeech};
use colloquy_storage::SqliteStorage;
use colloquy_whatsapp::WhatsAppTransport;
use tracing::{info, warn};

/// Runs the `colloquy serve` command.
pub async fn run_serve(config: ColloquyConfig) -> Result<(), ColloquyError> {
    crate::init_tracing(&config.agent.log_level);
    recording::register_metrics();
    info!(name = %config.agent.name, "starting colloquy serve");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    tokio::fs::create_dir_all(&config.media.directory)
        .await
        .map_err(|e| {
            ColloquyError::Config(format!(
                "cannot create media directory {}: {e}",
                config.media.directory
            ))
        })?;

    let gemini = Arc::new(GeminiProvider::new(&config)?);
    let speech = Arc::new(GoogleSpeech::new(&config)?);
    let transport = Arc::new(WhatsAppTransport::new(&config.whatsapp)?);
    info!(
        generator = gemini.name(),
        speech = speech.name(),
        transport = transport.name(),
        "adapters initialized"
    );

    let cancel = install_signal_handler();
    let bounds = CallBounds::new(
        Duration::from_secs(config.dialogue.call_timeout_secs),
        cancel.clone(),
    );

    let engine = Arc::new(DialogueEngine::new(
        Collaborators {
            storage: storage.clone(),
            generator: gemini.clone(),
            embedder: gemini,
            transcriber: speech.clone(),
            synthesizer: speech,
            transport,
        },
        &config,
        bounds.clone(),
    ));
    let contacts = engine.ledger().load().await?;
    info!(contacts, "contact cache rebuilt");

    let broadcaster = Arc::new(BroadcastDispatcher::new(
        engine.transport(),
        engine.ledger().clone(),
        Duration::from_millis(config.gateway.broadcast_pacing_ms),
        bounds,
    ));

    if config.gateway.admin_token.is_none() {
        warn!("gateway.admin_token is not set; admin routes will reject every request");
    }
    let state = GatewayState::new(
        engine,
        storage.clone(),
        broadcaster,
        AuthConfig {
            bearer_token: config.gateway.admin_token.clone(),
        },
    );

    let served = start_server(&ServerConfig::from(&config.gateway), state, cancel.clone()).await;
    // A bind failure returns before any signal; stop the handler task too.
    cancel.cancel();

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    served?;
    info!("colloquy serve shutdown complete");
    Ok(())
}
