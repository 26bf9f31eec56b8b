// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-replace ingestion of a document directory into the knowledge store.
//!
//! Every run clears the store, then reads `.txt`, `.md` and `.pdf` files in
//! name order, chunks them, embeds each chunk and stores it. Failures on a
//! single file or chunk are logged and counted; they never abort the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use colloquy_config::model::IngestConfig;
use colloquy_core::types::EmbeddingInput;
use colloquy_core::{CallBounds, ColloquyError, EmbeddingAdapter, StorageAdapter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chunker::split_into_chunks;

/// Outcome counters of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub files_read: usize,
    pub files_skipped: usize,
    pub chunks_stored: usize,
    pub chunks_failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    PlainText,
    Pdf,
}

fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" | "md" => Some(SourceKind::PlainText),
        "pdf" => Some(SourceKind::Pdf),
        _ => None,
    }
}

/// Rebuilds the knowledge store from a directory.
pub struct Ingestor {
    storage: Arc<dyn StorageAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: IngestConfig,
    bounds: CallBounds,
}

impl Ingestor {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: IngestConfig,
        bounds: CallBounds,
    ) -> Self {
        Self {
            storage,
            embedder,
            config,
            bounds,
        }
    }

    /// Ingest every supported file directly under `dir`.
    ///
    /// A missing directory is created and left empty; the existing store is
    /// kept in that case so a typo in the path cannot wipe the knowledge base.
    pub async fn run(&self, dir: &Path) -> Result<IngestReport, ColloquyError> {
        let mut report = IngestReport::default();

        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| ColloquyError::InvalidInput(format!("cannot create {}: {e}", dir.display())))?;
            warn!(dir = %dir.display(), "source directory did not exist; created it, add .txt, .md or .pdf files and run again");
            return Ok(report);
        }

        let files = list_files(dir).await?;
        let cleared = self.storage.clear_knowledge().await?;
        info!(cleared, files = files.len(), dir = %dir.display(), "knowledge store cleared, ingesting");

        // Every vector in one store generation has the first vector's length.
        let mut dimensions: Option<usize> = None;

        for path in files {
            if self.bounds.token().is_cancelled() {
                warn!("ingestion cancelled");
                break;
            }

            let Some(kind) = source_kind(&path) else {
                debug!(file = %path.display(), "unsupported file type, skipping");
                report.files_skipped += 1;
                continue;
            };

            let text = match read_source(&path, kind).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => {
                    warn!(file = %path.display(), "no text extracted, skipping");
                    report.files_skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "failed to read file, skipping");
                    report.files_skipped += 1;
                    continue;
                }
            };

            let length = text.chars().count();
            if length > self.config.max_text_chars {
                warn!(file = %path.display(), length, limit = self.config.max_text_chars, "extracted text too large, skipping");
                report.files_skipped += 1;
                continue;
            }

            report.files_read += 1;
            let chunks = split_into_chunks(&text, self.config.max_chars, self.config.overlap);
            info!(file = %path.display(), length, chunks = chunks.len(), "file chunked");

            for (i, chunk) in chunks.iter().enumerate() {
                match self.store_chunk(chunk, &mut dimensions).await {
                    Ok(id) => {
                        debug!(file = %path.display(), chunk = i + 1, id, "chunk stored");
                        report.chunks_stored += 1;
                    }
                    Err(ColloquyError::Cancelled) => {
                        warn!("ingestion cancelled");
                        return Ok(report);
                    }
                    Err(e) => {
                        warn!(file = %path.display(), chunk = i + 1, error = %e, "failed to store chunk");
                        report.chunks_failed += 1;
                    }
                }
                self.pause().await;
            }
        }

        info!(?report, "ingestion finished");
        Ok(report)
    }

    async fn store_chunk(
        &self,
        chunk: &str,
        dimensions: &mut Option<usize>,
    ) -> Result<i64, ColloquyError> {
        let output = self
            .bounds
            .run(self.embedder.embed(EmbeddingInput {
                texts: vec![chunk.to_string()],
            }))
            .await?;
        let vector = output
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ColloquyError::Provider {
                message: "embedding returned no vector".to_string(),
                source: None,
            })?;

        let expected = *dimensions.get_or_insert(vector.len());
        if vector.len() != expected {
            return Err(ColloquyError::Provider {
                message: format!(
                    "embedding has {} dimensions, store uses {expected}",
                    vector.len()
                ),
                source: None,
            });
        }
        self.storage.insert_knowledge(chunk, &vector).await
    }

    /// Rate-limit pause between embedding calls; returns early on shutdown.
    async fn pause(&self) {
        let pause = Duration::from_millis(self.config.pause_ms);
        if pause.is_zero() {
            return;
        }
        tokio::select! {
            _ = self.bounds.token().cancelled() => {}
            _ = tokio::time::sleep(pause) => {}
        }
    }
}

async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ColloquyError> {
    let io_err = |e: std::io::Error| ColloquyError::InvalidInput(format!("cannot read {}: {e}", dir.display()));
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

async fn read_source(path: &Path, kind: SourceKind) -> Result<String, ColloquyError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ColloquyError::InvalidInput(e.to_string()))?;
    match kind {
        SourceKind::PlainText => {
            String::from_utf8(bytes).map_err(|e| ColloquyError::InvalidInput(format!("not UTF-8: {e}")))
        }
        SourceKind::Pdf => tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ColloquyError::Internal(format!("pdf extraction task failed: {e}")))?
            .map_err(|e| ColloquyError::InvalidInput(format!("pdf extraction failed: {e}"))),
    }
}
