// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp transport adapter for the Colloquy dialogue engine.
//!
//! Talks to an Evolution API gateway for outbound delivery and media
//! download, and parses the gateway's webhook notifications into
//! [`InboundEvent`](colloquy_core::types::InboundEvent)s.

pub mod client;
pub mod event;

use async_trait::async_trait;
use colloquy_config::model::WhatsAppConfig;
use colloquy_core::types::{AdapterType, HealthStatus, MediaDownload, OutboundPayload};
use colloquy_core::{ColloquyError, PluginAdapter, TransportAdapter};
use tracing::{debug, info};

pub use client::EvolutionClient;
pub use event::{IgnoreReason, WebhookOutcome, parse_webhook};

/// Transport adapter backed by the Evolution API.
pub struct WhatsAppTransport {
    client: EvolutionClient,
}

impl WhatsAppTransport {
    /// Creates the adapter. The gateway key comes from `whatsapp.api_key`,
    /// falling back to the `EVOLUTION_API_KEY` environment variable.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, ColloquyError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = EvolutionClient::new(config, &api_key)?;
        info!(
            base_url = %config.base_url,
            instance = %config.instance,
            "WhatsApp transport initialized"
        );
        Ok(Self { client })
    }
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, ColloquyError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("EVOLUTION_API_KEY").map_err(|_| {
        ColloquyError::Config(
            "gateway API key not found. Set whatsapp.api_key in config or EVOLUTION_API_KEY environment variable.".into(),
        )
    })
}

#[async_trait]
impl PluginAdapter for WhatsAppTransport {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, ColloquyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ColloquyError> {
        debug!("WhatsApp transport shutting down");
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for WhatsAppTransport {
    async fn send(&self, contact: &str, payload: OutboundPayload) -> Result<(), ColloquyError> {
        match payload {
            OutboundPayload::Text(text) => self.client.send_text(contact, &text).await,
            OutboundPayload::Audio {
                data, file_name, ..
            } => self.client.send_voice_note(contact, &data, &file_name).await,
        }
    }

    async fn fetch_media(&self, message_id: &str) -> Result<MediaDownload, ColloquyError> {
        self.client.fetch_media(message_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn configured_key_wins() {
        assert_eq!(resolve_api_key(&Some("k".into())).unwrap(), "k");
    }

    #[tokio::test]
    async fn send_dispatches_by_payload_kind() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/colloquy"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/message/sendMedia/colloquy"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let transport = WhatsAppTransport::new(&WhatsAppConfig {
            base_url: server.uri(),
            instance: "colloquy".into(),
            api_key: Some("secret".into()),
            ..WhatsAppConfig::default()
        })
        .unwrap();

        transport
            .send("n", OutboundPayload::Text("oi".into()))
            .await
            .unwrap();
        transport
            .send(
                "n",
                OutboundPayload::Audio {
                    data: b"mp3".to_vec(),
                    file_name: "r.mp3".into(),
                    mime_type: "audio/mpeg".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(transport.name(), "whatsapp");
    }
}
