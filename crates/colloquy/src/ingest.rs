// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `colloquy ingest` command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colloquy_config::model::ColloquyConfig;
use colloquy_core::{CallBounds, ColloquyError, StorageAdapter};
use colloquy_dialogue::install_signal_handler;
use colloquy_gemini::GeminiProvider;
use colloquy_knowledge::Ingestor;
use colloquy_storage::SqliteStorage;
use tracing::info;

/// Replaces the knowledge store with the documents under `dir`, or under
/// `ingest.source_dir` when no directory is given.
pub async fn run_ingest(
    config: ColloquyConfig,
    dir: Option<PathBuf>,
) -> Result<(), ColloquyError> {
    crate::init_tracing(&config.agent.log_level);
    let dir = dir.unwrap_or_else(|| PathBuf::from(&config.ingest.source_dir));
    info!(dir = %dir.display(), "starting ingestion");

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    let embedder = Arc::new(GeminiProvider::new(&config)?);

    let cancel = install_signal_handler();
    let bounds = CallBounds::new(
        Duration::from_secs(config.dialogue.call_timeout_secs),
        cancel.clone(),
    );

    let result = Ingestor::new(storage.clone(), embedder, config.ingest.clone(), bounds)
        .run(&dir)
        .await;
    cancel.cancel();
    storage.close().await?;

    let report = result?;
    info!(
        files = report.files_read,
        chunks = report.chunks_stored,
        failed = report.chunks_failed,
        "ingestion complete"
    );
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| ColloquyError::Internal(format!("cannot render ingest report: {e}")))?;
    println!("{rendered}");
    Ok(())
}
