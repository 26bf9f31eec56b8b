// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport adapter trait for the outbound message gateway.

use async_trait::async_trait;

use crate::error::ColloquyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MediaDownload, OutboundPayload};

/// Adapter for the message-transport gateway.
///
/// Delivery failures are reported to the caller, which logs them; they never
/// block processing for other contacts.
#[async_trait]
pub trait TransportAdapter: PluginAdapter {
    /// Delivers a payload to a contact.
    async fn send(&self, contact: &str, payload: OutboundPayload) -> Result<(), ColloquyError>;

    /// Fetches the media bytes of an inbound message.
    async fn fetch_media(&self, message_id: &str) -> Result<MediaDownload, ColloquyError>;
}
