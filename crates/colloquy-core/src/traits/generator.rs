// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generator adapter trait for the text-generation model.

use async_trait::async_trait;

use crate::error::ColloquyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerationRequest;

/// Adapter for the generative-text model.
///
/// Implementations send the persona, prior turns, the current message and an
/// optional attachment, and return the model's reply text.
#[async_trait]
pub trait GeneratorAdapter: PluginAdapter {
    /// Generates a reply for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, ColloquyError>;
}
