// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter returning fixed vectors per input text.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use colloquy_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use colloquy_core::{ColloquyError, EmbeddingAdapter, PluginAdapter};

/// Returns the registered vector for a known text and `fallback` otherwise.
#[derive(Clone)]
pub struct MockEmbedder {
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    fallback: Vec<f32>,
    seen: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl MockEmbedder {
    /// An embedder whose unknown-text vector is `fallback`.
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            vectors: Arc::new(Mutex::new(HashMap::new())),
            fallback,
            seen: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn insert(&self, text: impl Into<String>, vector: Vec<f32>) {
        self.vectors.lock().await.insert(text.into(), vector);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every text passed to `embed`, in call order.
    pub async fn seen(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(vec![0.0, 0.0, 1.0])
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ColloquyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ColloquyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ColloquyError> {
        self.seen.lock().await.extend(input.texts.iter().cloned());
        if self.failing.load(Ordering::SeqCst) {
            return Err(ColloquyError::Provider {
                message: "mock embedder failure".to_string(),
                source: None,
            });
        }
        let vectors = self.vectors.lock().await;
        let embeddings: Vec<Vec<f32>> = input
            .texts
            .iter()
            .map(|t| vectors.get(t).cloned().unwrap_or_else(|| self.fallback.clone()))
            .collect();
        let dimensions = embeddings.first().map_or(self.fallback.len(), Vec::len);
        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
