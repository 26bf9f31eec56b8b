// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport gateway adapter.
//!
//! Captures outbound payloads for assertion and serves media downloads from
//! an in-memory table keyed by message id.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use colloquy_core::types::{AdapterType, HealthStatus, MediaDownload, OutboundPayload};
use colloquy_core::{ColloquyError, PluginAdapter, TransportAdapter};

/// One captured `send` call.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub contact: String,
    pub payload: OutboundPayload,
}

impl SentMessage {
    /// The text body, if this was a text send.
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            OutboundPayload::Text(text) => Some(text),
            OutboundPayload::Audio { .. } => None,
        }
    }
}

#[derive(Clone, Default)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    media: Arc<Mutex<HashMap<String, MediaDownload>>>,
    unreachable: Arc<Mutex<HashSet<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` for downloads of `message_id`.
    pub async fn put_media(&self, message_id: &str, data: Vec<u8>, mime_type: Option<&str>) {
        self.media.lock().await.insert(
            message_id.to_string(),
            MediaDownload {
                data,
                mime_type: mime_type.map(str::to_string),
            },
        );
    }

    /// Make sends to `contact` fail.
    pub async fn fail_for(&self, contact: &str) {
        self.unreachable.lock().await.insert(contact.to_string());
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Text bodies sent to `contact`, in order.
    pub async fn texts_to(&self, contact: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.contact == contact)
            .filter_map(|m| m.text().map(str::to_string))
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
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
        Ok(())
    }
}

#[async_trait]
impl TransportAdapter for MockTransport {
    async fn send(&self, contact: &str, payload: OutboundPayload) -> Result<(), ColloquyError> {
        if self.unreachable.lock().await.contains(contact) {
            return Err(ColloquyError::Transport {
                message: format!("mock transport refused {contact}"),
                source: None,
            });
        }
        self.sent.lock().await.push(SentMessage {
            contact: contact.to_string(),
            payload,
        });
        Ok(())
    }

    async fn fetch_media(&self, message_id: &str) -> Result<MediaDownload, ColloquyError> {
        self.media
            .lock()
            .await
            .get(message_id)
            .cloned()
            .ok_or_else(|| ColloquyError::Transport {
                message: format!("no media for message {message_id}"),
                source: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_sends_and_refuses_unreachable() {
        let transport = MockTransport::new();
        transport.fail_for("b").await;
        transport
            .send("a", OutboundPayload::Text("oi".into()))
            .await
            .unwrap();
        assert!(transport
            .send("b", OutboundPayload::Text("oi".into()))
            .await
            .is_err());
        assert_eq!(transport.texts_to("a").await, vec!["oi".to_string()]);
        assert_eq!(transport.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn media_is_served_by_message_id() {
        let transport = MockTransport::new();
        transport.put_media("M1", vec![1, 2, 3], Some("image/png")).await;
        let media = transport.fetch_media("M1").await.unwrap();
        assert_eq!(media.data, vec![1, 2, 3]);
        assert!(transport.fetch_media("M2").await.is_err());
    }
}
