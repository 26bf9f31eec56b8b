// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring every mock collaborator to a temporary SQLite store.

use std::path::PathBuf;
use std::sync::Arc;

use colloquy_config::model::StorageConfig;
use colloquy_core::{ColloquyError, StorageAdapter};
use colloquy_storage::SqliteStorage;

use crate::mock_embedder::MockEmbedder;
use crate::mock_generator::MockGenerator;
use crate::mock_speech::{MockSynthesizer, MockTranscriber};
use crate::mock_transport::MockTransport;

/// Builder for [`TestHarness`].
#[derive(Default)]
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    transcriber: Option<MockTranscriber>,
    synthesizer: Option<MockSynthesizer>,
}

impl TestHarnessBuilder {
    /// Replies the mock generator hands out, in order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_transcriber(mut self, transcriber: MockTranscriber) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: MockSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Create the temp directory, open storage and assemble the mocks.
    pub async fn build(self) -> Result<TestHarness, ColloquyError> {
        let temp_dir = tempfile::TempDir::new().map_err(ColloquyError::storage)?;
        let storage = SqliteStorage::new(StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await?;

        let media_dir = temp_dir.path().join("media");
        tokio::fs::create_dir_all(&media_dir)
            .await
            .map_err(ColloquyError::storage)?;

        Ok(TestHarness {
            storage: Arc::new(storage),
            generator: MockGenerator::with_responses(self.responses),
            embedder: MockEmbedder::default(),
            transcriber: self.transcriber.unwrap_or_default(),
            synthesizer: self.synthesizer.unwrap_or_default(),
            transport: MockTransport::new(),
            media_dir,
            _temp_dir: temp_dir,
        })
    }
}

/// A temporary store plus one instance of every mock adapter.
///
/// The temp directory lives as long as the harness.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub generator: MockGenerator,
    pub embedder: MockEmbedder,
    pub transcriber: MockTranscriber,
    pub synthesizer: MockSynthesizer,
    pub transport: MockTransport,
    /// Root for media files written during the test.
    pub media_dir: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    pub async fn new() -> Result<Self, ColloquyError> {
        Self::builder().build().await
    }

    /// The store as a trait object, the way the engine consumes it.
    pub fn storage_dyn(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }
}
