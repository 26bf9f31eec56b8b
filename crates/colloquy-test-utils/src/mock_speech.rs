// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock speech adapters.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use colloquy_core::types::{AdapterType, HealthStatus};
use colloquy_core::{ColloquyError, PluginAdapter, SynthesizerAdapter, TranscriberAdapter};

fn speech_failure(what: &str) -> ColloquyError {
    ColloquyError::Speech {
        message: format!("mock {what} failure"),
        source: None,
    }
}

/// Scripted transcription outcome.
#[derive(Debug, Clone)]
pub enum Transcript {
    Text(String),
    Nothing,
    Fail,
}

/// Transcriber returning a scripted outcome for every call.
#[derive(Clone)]
pub struct MockTranscriber {
    outcome: Arc<Mutex<Transcript>>,
    calls: Arc<Mutex<usize>>,
}

impl MockTranscriber {
    pub fn returning(text: impl Into<String>) -> Self {
        Self::with_outcome(Transcript::Text(text.into()))
    }

    pub fn silent() -> Self {
        Self::with_outcome(Transcript::Nothing)
    }

    pub fn failing() -> Self {
        Self::with_outcome(Transcript::Fail)
    }

    fn with_outcome(outcome: Transcript) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(outcome)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn set_outcome(&self, outcome: Transcript) {
        *self.outcome.lock().await = outcome;
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::silent()
    }
}

#[async_trait]
impl PluginAdapter for MockTranscriber {
    fn name(&self) -> &str {
        "mock-transcriber"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transcriber
    }

    async fn health_check(&self) -> Result<HealthStatus, ColloquyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ColloquyError> {
        Ok(())
    }
}

#[async_trait]
impl TranscriberAdapter for MockTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _mime_type: &str,
    ) -> Result<Option<String>, ColloquyError> {
        *self.calls.lock().await += 1;
        match &*self.outcome.lock().await {
            Transcript::Text(text) => Ok(Some(text.clone())),
            Transcript::Nothing => Ok(None),
            Transcript::Fail => Err(speech_failure("transcription")),
        }
    }
}

/// Synthesizer returning fixed bytes, or failing, and capturing its SSML input.
#[derive(Clone, Default)]
pub struct MockSynthesizer {
    failing: Arc<Mutex<bool>>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: Arc::new(Mutex::new(true)),
            inputs: Arc::default(),
        }
    }

    pub async fn inputs(&self) -> Vec<String> {
        self.inputs.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockSynthesizer {
    fn name(&self) -> &str {
        "mock-synthesizer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Synthesizer
    }

    async fn health_check(&self) -> Result<HealthStatus, ColloquyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ColloquyError> {
        Ok(())
    }
}

#[async_trait]
impl SynthesizerAdapter for MockSynthesizer {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, ColloquyError> {
        self.inputs.lock().await.push(ssml.to_string());
        if *self.failing.lock().await {
            return Err(speech_failure("synthesis"));
        }
        Ok(b"ID3mock-mp3".to_vec())
    }
}
