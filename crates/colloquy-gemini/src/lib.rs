// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google adapters for the Colloquy dialogue engine.
//!
//! [`GeminiProvider`] implements text generation and embeddings against the
//! Gemini REST API; [`GoogleSpeech`] implements speech-to-text and
//! text-to-speech against Google Cloud.

pub mod client;
pub mod speech;
pub mod types;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colloquy_config::model::ColloquyConfig;
use colloquy_core::types::{
    AdapterType, Attachment, EmbeddingInput, EmbeddingOutput, GenerationRequest, HealthStatus,
    Speaker,
};
use colloquy_core::{ColloquyError, EmbeddingAdapter, GeneratorAdapter, PluginAdapter};
use tracing::{debug, info, warn};

use crate::client::{GoogleClient, Service, resolve_api_key};
use crate::types::{
    BatchEmbedRequest, BatchEmbedResponse, Content, EmbedContentRequest, GenerateContentRequest,
    GenerateContentResponse, Part, SafetySetting,
};

pub use speech::GoogleSpeech;

/// Gemini generation and embedding provider.
pub struct GeminiProvider {
    client: GoogleClient,
    generation_model: String,
    embedding_model: String,
}

impl GeminiProvider {
    /// Creates a provider from configuration.
    ///
    /// The key comes from `gemini.api_key`, falling back to the
    /// `GEMINI_API_KEY` and `GOOGLE_API_KEY` environment variables.
    pub fn new(config: &ColloquyConfig) -> Result<Self, ColloquyError> {
        let api_key = resolve_api_key(
            &[config.gemini.api_key.as_deref()],
            &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        )?;
        let client = GoogleClient::new(&api_key, &config.gemini.base_url, Service::Gemini)?;

        info!(
            model = %config.gemini.generation_model,
            embedding_model = %config.gemini.embedding_model,
            "Gemini provider initialized"
        );

        Ok(Self {
            client,
            generation_model: config.gemini.generation_model.clone(),
            embedding_model: config.gemini.embedding_model.clone(),
        })
    }

    /// Builds the wire request: persona as system instruction, history as
    /// alternating `user`/`model` contents, then the current message.
    async fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| {
                let role = match turn.speaker {
                    Speaker::User => "user",
                    Speaker::Assistant => "model",
                };
                Content::text(Some(role), turn.text.clone())
            })
            .collect();

        let parts = match &request.attachment {
            Some(attachment) => attachment_parts(attachment, &request.message).await,
            None => vec![Part::text(request.message.clone())],
        };
        contents.push(Content {
            role: Some("user".into()),
            parts,
        });

        GenerateContentRequest {
            system_instruction: (!request.persona.is_empty())
                .then(|| Content::text(None, request.persona.clone())),
            contents,
            safety_settings: SafetySetting::permissive(),
        }
    }
}

/// Portuguese noun for the kind of media named by a MIME type.
fn media_noun(mime_type: &str) -> &'static str {
    if mime_type.starts_with("image/") {
        "imagem"
    } else if mime_type.starts_with("audio/") {
        "áudio"
    } else if mime_type.starts_with("video/") {
        "vídeo"
    } else {
        "arquivo"
    }
}

/// Instruction sent alongside an attachment.
pub fn attachment_prompt(mime_type: &str, message: &str) -> String {
    format!(
        "Analise esta {} fornecida e responda à seguinte instrução do usuário: '{message}'",
        media_noun(mime_type)
    )
}

/// Inline data plus the media-aware prompt, or the bare message when the
/// file cannot be read.
async fn attachment_parts(attachment: &Attachment, message: &str) -> Vec<Part> {
    match tokio::fs::read(&attachment.path).await {
        Ok(bytes) if !bytes.is_empty() => {
            debug!(
                path = %attachment.path.display(),
                mime_type = %attachment.mime_type,
                bytes = bytes.len(),
                "attaching file to generation request"
            );
            vec![
                Part::inline(attachment.mime_type.clone(), STANDARD.encode(&bytes)),
                Part::text(attachment_prompt(&attachment.mime_type, message)),
            ]
        }
        Ok(_) => {
            warn!(path = %attachment.path.display(), "attachment is empty, sending text only");
            vec![Part::text(message.to_string())]
        }
        Err(e) => {
            warn!(
                path = %attachment.path.display(),
                error = %e,
                "attachment unreadable, sending text only"
            );
            vec![Part::text(message.to_string())]
        }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, ColloquyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ColloquyError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl GeneratorAdapter for GeminiProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ColloquyError> {
        let body = self.build_request(&request).await;
        debug!(
            history = request.history.len(),
            attachment = request.attachment.is_some(),
            "sending generation request"
        );

        let path = format!("models/{}:generateContent", self.generation_model);
        let response: GenerateContentResponse = self.client.post_json(&path, &body).await?;

        response.text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".into());
            ColloquyError::Provider {
                message: format!("generation returned no text ({reason})"),
                source: None,
            }
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for GeminiProvider {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ColloquyError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let model = format!("models/{}", self.embedding_model);
        let body = BatchEmbedRequest {
            requests: input
                .texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: model.clone(),
                    content: Content::text(None, text.clone()),
                })
                .collect(),
        };

        let path = format!("{model}:batchEmbedContents");
        let response: BatchEmbedResponse = self.client.post_json(&path, &body).await?;

        if response.embeddings.len() != input.texts.len() {
            return Err(ColloquyError::Provider {
                message: format!(
                    "expected {} embeddings, got {}",
                    input.texts.len(),
                    response.embeddings.len()
                ),
                source: None,
            });
        }

        let embeddings: Vec<Vec<f32>> = response.embeddings.into_iter().map(|e| e.values).collect();
        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(ColloquyError::Provider {
                message: "embedding response has empty or inconsistent vectors".into(),
                source: None,
            });
        }

        Ok(EmbeddingOutput {
            embeddings,
            dimensions,
        })
    }
}
