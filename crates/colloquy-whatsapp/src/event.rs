// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook payload parsing.
//!
//! Turns a gateway `messages.upsert` notification into an [`InboundEvent`],
//! or explains why the notification carries nothing to answer.

use colloquy_core::ColloquyError;
use colloquy_core::types::{InboundEvent, InboundPayload};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// The only event kind that carries inbound chat messages.
pub const MESSAGES_UPSERT: &str = "messages.upsert";

/// Result of parsing one webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Event(InboundEvent),
    Ignored(IgnoreReason),
}

/// Why a well-formed notification was acknowledged without processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Some event kind other than `messages.upsert`.
    OtherEvent(String),
    /// `data` is not an object.
    MalformedData,
    /// Echo of a message this account sent.
    FromMe,
    MissingMessageId,
    /// No sender address or no message body.
    MissingFields,
}

impl IgnoreReason {
    /// Short label used in logs, metrics and the webhook response.
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::OtherEvent(_) => "other_event",
            IgnoreReason::MalformedData => "malformed_data",
            IgnoreReason::FromMe => "from_me",
            IgnoreReason::MissingMessageId => "missing_message_id",
            IgnoreReason::MissingFields => "missing_fields",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertData {
    #[serde(default)]
    key: MessageKey,
    #[serde(default)]
    push_name: Option<String>,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    message_timestamp: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageKey {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    from_me: bool,
    #[serde(default)]
    remote_jid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    conversation: Option<String>,
    extended_text_message: Option<ExtendedText>,
    image_message: Option<WireMedia>,
    video_message: Option<WireMedia>,
    document_message: Option<WireMedia>,
    audio_message: Option<WireMedia>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtendedText {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMedia {
    caption: Option<String>,
    mimetype: Option<String>,
    file_name: Option<String>,
}

/// Parses a webhook body.
///
/// Returns `InvalidInput` only when the body is not a JSON object; every
/// other oddity is an [`IgnoreReason`].
pub fn parse_webhook(body: &Value) -> Result<WebhookOutcome, ColloquyError> {
    let root = body
        .as_object()
        .ok_or_else(|| ColloquyError::InvalidInput("webhook body must be a JSON object".into()))?;

    let event = root.get("event").and_then(Value::as_str).unwrap_or_default();
    if event != MESSAGES_UPSERT {
        return Ok(WebhookOutcome::Ignored(IgnoreReason::OtherEvent(event.to_string())));
    }

    let data = match root.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => return Ok(WebhookOutcome::Ignored(IgnoreReason::MalformedData)),
    };
    let data: UpsertData = match serde_json::from_value(data.clone()) {
        Ok(data) => data,
        Err(e) => {
            debug!(error = %e, "upsert data did not match the expected shape");
            return Ok(WebhookOutcome::Ignored(IgnoreReason::MalformedData));
        }
    };

    let Some(message_id) = data.key.id.filter(|id| !id.is_empty()) else {
        return Ok(WebhookOutcome::Ignored(IgnoreReason::MissingMessageId));
    };
    if data.key.from_me {
        return Ok(WebhookOutcome::Ignored(IgnoreReason::FromMe));
    }

    let contact = data.key.remote_jid.filter(|jid| !jid.is_empty());
    let message = data
        .message
        .filter(|m| m.as_object().is_some_and(|o| !o.is_empty()));
    let (Some(contact), Some(message)) = (contact, message) else {
        return Ok(WebhookOutcome::Ignored(IgnoreReason::MissingFields));
    };

    let timestamp = data
        .timestamp
        .as_ref()
        .or(data.message_timestamp.as_ref())
        .and_then(timestamp_value);

    Ok(WebhookOutcome::Event(InboundEvent {
        message_id,
        contact,
        timestamp,
        push_name: data.push_name,
        payload: classify_message(&message),
    }))
}

/// Accepts numbers and numeric strings; anything else is treated as absent.
fn timestamp_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Maps the message object to a payload variant. Media shapes win over text.
fn classify_message(message: &Value) -> InboundPayload {
    let wire: WireMessage = serde_json::from_value(message.clone()).unwrap_or_default();

    if let Some(m) = wire.image_message {
        return InboundPayload::Image {
            caption: m.caption,
            mime_type: m.mimetype,
        };
    }
    if let Some(m) = wire.video_message {
        return InboundPayload::Video {
            caption: m.caption,
            mime_type: m.mimetype,
        };
    }
    if let Some(m) = wire.document_message {
        return InboundPayload::Document {
            caption: m.caption,
            mime_type: m.mimetype,
            file_name: m.file_name,
        };
    }
    if let Some(m) = wire.audio_message {
        return InboundPayload::Audio {
            mime_type: m.mimetype,
        };
    }

    let text = wire
        .conversation
        .or_else(|| wire.extended_text_message.and_then(|e| e.text))
        .filter(|t| !t.trim().is_empty());
    match text {
        Some(body) => InboundPayload::Text { body },
        None => InboundPayload::Unsupported {
            kind: message
                .as_object()
                .and_then(|o| o.keys().next().cloned())
                .unwrap_or_else(|| "unknown".into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upsert(data: Value) -> Value {
        json!({"event": "messages.upsert", "instance": "colloquy", "data": data})
    }

    fn event(body: Value) -> InboundEvent {
        match parse_webhook(&body).unwrap() {
            WebhookOutcome::Event(e) => e,
            other => panic!("expected event, got {other:?}"),
        }
    }

    fn ignored(body: Value) -> IgnoreReason {
        match parse_webhook(&body).unwrap() {
            WebhookOutcome::Ignored(r) => r,
            other => panic!("expected ignore, got {other:?}"),
        }
    }

    #[test]
    fn plain_conversation_text() {
        let e = event(upsert(json!({
            "key": {"id": "ABC", "fromMe": false, "remoteJid": "5511999@s.whatsapp.net"},
            "pushName": "João",
            "timestamp": 1_760_000_000,
            "message": {"conversation": "oi"}
        })));
        assert_eq!(e.message_id, "ABC");
        assert_eq!(e.contact, "5511999@s.whatsapp.net");
        assert_eq!(e.push_name.as_deref(), Some("João"));
        assert_eq!(e.timestamp, Some(1_760_000_000));
        assert_eq!(e.payload, InboundPayload::Text { body: "oi".into() });
    }

    #[test]
    fn extended_text_and_string_timestamp() {
        let e = event(upsert(json!({
            "key": {"id": "X1", "remoteJid": "a@s.whatsapp.net"},
            "messageTimestamp": "1760000000123",
            "message": {"extendedTextMessage": {"text": "veja o link"}}
        })));
        assert_eq!(e.timestamp, Some(1_760_000_000_123));
        assert_eq!(
            e.payload,
            InboundPayload::Text {
                body: "veja o link".into()
            }
        );
    }

    #[test]
    fn media_shapes_map_to_variants() {
        let e = event(upsert(json!({
            "key": {"id": "I1", "remoteJid": "a@s.whatsapp.net"},
            "message": {"imageMessage": {"caption": "o que é?", "mimetype": "image/jpeg"}}
        })));
        assert_eq!(
            e.payload,
            InboundPayload::Image {
                caption: Some("o que é?".into()),
                mime_type: Some("image/jpeg".into())
            }
        );

        let e = event(upsert(json!({
            "key": {"id": "D1", "remoteJid": "a@s.whatsapp.net"},
            "message": {"documentMessage": {"mimetype": "application/pdf", "fileName": "extrato.pdf"}}
        })));
        assert!(matches!(
            e.payload,
            InboundPayload::Document { caption: None, ref file_name, .. } if file_name.as_deref() == Some("extrato.pdf")
        ));

        let e = event(upsert(json!({
            "key": {"id": "A1", "remoteJid": "a@s.whatsapp.net"},
            "message": {"audioMessage": {"mimetype": "audio/ogg; codecs=opus", "ptt": true}}
        })));
        assert_eq!(
            e.payload,
            InboundPayload::Audio {
                mime_type: Some("audio/ogg; codecs=opus".into())
            }
        );
    }

    #[test]
    fn unknown_shape_is_unsupported() {
        let e = event(upsert(json!({
            "key": {"id": "S1", "remoteJid": "a@s.whatsapp.net"},
            "message": {"stickerMessage": {"url": "x"}}
        })));
        assert_eq!(
            e.payload,
            InboundPayload::Unsupported {
                kind: "stickerMessage".into()
            }
        );
    }

    #[test]
    fn non_object_body_is_invalid_input() {
        let err = parse_webhook(&json!(["not", "an", "object"])).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn ignore_reasons() {
        assert_eq!(
            ignored(json!({"event": "connection.update", "data": {}})),
            IgnoreReason::OtherEvent("connection.update".into())
        );
        assert_eq!(
            ignored(json!({"event": "messages.upsert", "data": "oops"})),
            IgnoreReason::MalformedData
        );
        assert_eq!(
            ignored(upsert(json!({"key": {"id": "M", "fromMe": true, "remoteJid": "a@x"},
                                  "message": {"conversation": "eco"}}))),
            IgnoreReason::FromMe
        );
        assert_eq!(
            ignored(upsert(json!({"key": {"remoteJid": "a@x"}, "message": {"conversation": "oi"}}))),
            IgnoreReason::MissingMessageId
        );
        assert_eq!(
            ignored(upsert(json!({"key": {"id": "M"}, "message": {"conversation": "oi"}}))),
            IgnoreReason::MissingFields
        );
        assert_eq!(
            ignored(upsert(json!({"key": {"id": "M", "remoteJid": "a@x"}, "message": {}}))),
            IgnoreReason::MissingFields
        );
    }

    #[test]
    fn garbage_timestamp_reads_as_missing() {
        let e = event(upsert(json!({
            "key": {"id": "T", "remoteJid": "a@x"},
            "timestamp": {"low": 1},
            "message": {"conversation": "oi"}
        })));
        assert_eq!(e.timestamp, None);
    }
}
