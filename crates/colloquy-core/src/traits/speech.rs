// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech adapter traits (speech-to-text and text-to-speech).

use async_trait::async_trait;

use crate::error::ColloquyError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for speech-to-text engines.
#[async_trait]
pub trait TranscriberAdapter: PluginAdapter {
    /// Transcribes an audio clip. `Ok(None)` means the engine heard nothing
    /// it could transcribe.
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Option<String>, ColloquyError>;
}

/// Adapter for text-to-speech engines.
#[async_trait]
pub trait SynthesizerAdapter: PluginAdapter {
    /// Synthesizes an SSML document into encoded audio bytes (MP3).
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, ColloquyError>;
}
