// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-time retrieval over the knowledge store.
//!
//! A linear scan: embed the query, score every chunk by cosine similarity,
//! sort descending, keep the top `k` and drop anything at or below the
//! similarity floor. Ties keep insertion order.

use std::sync::Arc;

use colloquy_config::model::RetrievalConfig;
use colloquy_core::types::{EmbeddingInput, KnowledgeChunk};
use colloquy_core::{CallBounds, ColloquyError, EmbeddingAdapter, StorageAdapter};
use tracing::{debug, warn};

use crate::vector::cosine_similarity;

/// Context handed to the retrieval persona when nothing relevant was found.
pub const NO_CONTEXT: &str = "Nenhuma informação interna encontrada.";

/// A chunk together with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub id: i64,
    pub text: String,
    pub similarity: f32,
}

/// Rank `chunks` against `query`.
///
/// `chunks` must be in insertion order; the stable sort then breaks ties by
/// that order. Chunks whose dimensionality differs from the query, or whose
/// similarity is undefined, are skipped.
pub fn rank(query: &[f32], chunks: Vec<KnowledgeChunk>, k: usize, floor: f32) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .filter_map(|chunk| {
            let similarity = cosine_similarity(query, &chunk.embedding)?;
            Some(ScoredChunk {
                id: chunk.id,
                text: chunk.text,
                similarity,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(k);
    scored.retain(|c| c.similarity > floor);
    scored
}

/// Retrieval engine bound to a store and an embedding collaborator.
pub struct Retriever {
    storage: Arc<dyn StorageAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    top_k: usize,
    floor: f32,
    bounds: CallBounds,
}

impl Retriever {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &RetrievalConfig,
        bounds: CallBounds,
    ) -> Self {
        Self {
            storage,
            embedder,
            top_k: config.top_k,
            floor: config.similarity_floor,
            bounds,
        }
    }

    /// Up to `k` chunks most similar to `query`, best first.
    ///
    /// An empty store or a query with no chunk above the floor yields an
    /// empty list, not an error.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, ColloquyError> {
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let chunks = self.storage.knowledge_chunks().await?;
        if chunks.is_empty() {
            debug!("knowledge store is empty");
            return Ok(Vec::new());
        }

        let output = self
            .bounds
            .run(self.embedder.embed(EmbeddingInput {
                texts: vec![query.to_string()],
            }))
            .await?;
        let query_vector = output.embeddings.into_iter().next().ok_or_else(|| {
            ColloquyError::Provider {
                message: "embedding returned no vector".to_string(),
                source: None,
            }
        })?;

        let ranked = rank(&query_vector, chunks, k, self.floor);
        debug!(results = ranked.len(), "retrieval complete");
        Ok(ranked)
    }

    /// Retrieved chunks joined by newlines, or [`NO_CONTEXT`].
    ///
    /// Retrieval failures are logged and degrade to [`NO_CONTEXT`].
    pub async fn context_for(&self, query: &str) -> String {
        match self.retrieve(query, self.top_k).await {
            Ok(chunks) if !chunks.is_empty() => chunks
                .into_iter()
                .map(|c| c.text)
                .collect::<Vec<_>>()
                .join("\n"),
            Ok(_) => NO_CONTEXT.to_string(),
            Err(e) => {
                warn!(error = %e, "retrieval failed, continuing without context");
                metrics::counter!("colloquy_retrieval_failures_total").increment(1);
                NO_CONTEXT.to_string()
            }
        }
    }
}
