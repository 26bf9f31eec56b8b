// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Evolution WhatsApp gateway.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colloquy_config::model::WhatsAppConfig;
use colloquy_core::ColloquyError;
use colloquy_core::types::MediaDownload;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Delay the gateway waits before delivering a voice note, in milliseconds.
const VOICE_NOTE_DELAY_MS: u32 = 1200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTextRequest<'a> {
    number: &'a str,
    text_message: TextMessage<'a>,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMediaRequest<'a> {
    number: &'a str,
    options: MediaOptions,
    media_message: MediaMessage<'a>,
}

#[derive(Debug, Serialize)]
struct MediaOptions {
    delay: u32,
    presence: &'static str,
    caption: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MediaMessage<'a> {
    mediatype: &'static str,
    file_name: &'a str,
    /// Base64-encoded bytes.
    media: String,
    ptt: bool,
}

#[derive(Debug, Serialize)]
struct MediaLookup<'a> {
    message: MediaLookupMessage<'a>,
}

#[derive(Debug, Serialize)]
struct MediaLookupMessage<'a> {
    key: MediaLookupKey<'a>,
}

#[derive(Debug, Serialize)]
struct MediaLookupKey<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    #[serde(default)]
    base64: Option<String>,
    #[serde(default)]
    mimetype: Option<String>,
}

/// Evolution API client.
///
/// Sends are not retried: a retried send that actually succeeded the first
/// time would reach the contact twice.
#[derive(Debug, Clone)]
pub struct EvolutionClient {
    client: reqwest::Client,
    base_url: String,
    instance: String,
    send_timeout: Duration,
    media_timeout: Duration,
}

impl EvolutionClient {
    pub fn new(config: &WhatsAppConfig, api_key: &str) -> Result<Self, ColloquyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| ColloquyError::Config(format!("invalid gateway API key: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| transport_err(format!("failed to build HTTP client: {e}"), e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            instance: config.instance.clone(),
            send_timeout: Duration::from_secs(config.send_timeout_secs),
            media_timeout: Duration::from_secs(config.media_timeout_secs),
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{route}/{}", self.base_url, self.instance)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        route: &str,
        body: &T,
        timeout: Duration,
    ) -> Result<reqwest::Response, ColloquyError> {
        let response = self
            .client
            .post(self.url(route))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    transport_err(format!("{route} timed out after {timeout:?}"), e)
                } else {
                    transport_err(format!("{route} request failed: {e}"), e)
                }
            })?;

        let status = response.status();
        debug!(route, status = %status, "gateway response received");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ColloquyError::Transport {
            message: format!("{route} returned {status}: {body}"),
            source: None,
        })
    }

    /// `POST /message/sendText/{instance}`.
    pub async fn send_text(&self, number: &str, text: &str) -> Result<(), ColloquyError> {
        let body = SendTextRequest {
            number,
            text_message: TextMessage { text },
        };
        self.post("message/sendText", &body, self.send_timeout).await?;
        Ok(())
    }

    /// `POST /message/sendMedia/{instance}` as a push-to-talk voice note.
    pub async fn send_voice_note(
        &self,
        number: &str,
        audio: &[u8],
        file_name: &str,
    ) -> Result<(), ColloquyError> {
        let body = SendMediaRequest {
            number,
            options: MediaOptions {
                delay: VOICE_NOTE_DELAY_MS,
                presence: "recording",
                caption: String::new(),
            },
            media_message: MediaMessage {
                mediatype: "audio",
                file_name,
                media: STANDARD.encode(audio),
                ptt: true,
            },
        };
        self.post("message/sendMedia", &body, self.media_timeout).await?;
        Ok(())
    }

    /// `POST /chat/getBase64FromMediaMessage/{instance}`.
    pub async fn fetch_media(&self, message_id: &str) -> Result<MediaDownload, ColloquyError> {
        let body = MediaLookup {
            message: MediaLookupMessage {
                key: MediaLookupKey { id: message_id },
            },
        };
        let response = self
            .post("chat/getBase64FromMediaMessage", &body, self.media_timeout)
            .await?;

        let media: MediaResponse = response
            .json()
            .await
            .map_err(|e| transport_err(format!("invalid media response: {e}"), e))?;

        let encoded = media
            .base64
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ColloquyError::Transport {
                message: format!("media response for {message_id} has no base64 field"),
                source: None,
            })?;
        let data = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| transport_err(format!("media base64 is invalid: {e}"), e))?;

        Ok(MediaDownload {
            data,
            mime_type: media.mimetype.filter(|m| !m.is_empty()),
        })
    }
}

fn transport_err<E>(message: String, source: E) -> ColloquyError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ColloquyError::Transport {
        message,
        source: Some(Box::new(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EvolutionClient {
        let config = WhatsAppConfig {
            base_url: format!("{}/", server.uri()),
            instance: "colloquy".into(),
            ..WhatsAppConfig::default()
        };
        EvolutionClient::new(&config, "secret").unwrap()
    }

    #[tokio::test]
    async fn send_text_posts_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendText/colloquy"))
            .and(header("apikey", "secret"))
            .and(body_json(serde_json::json!({
                "number": "5511@s.whatsapp.net",
                "textMessage": {"text": "olá"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"key": {"id": "out"}})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_text("5511@s.whatsapp.net", "olá")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn send_text_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).send_text("n", "t").await.unwrap_err();
        assert!(matches!(err, ColloquyError::Transport { .. }));
        assert!(err.to_string().contains("500"), "got: {err}");
    }

    #[tokio::test]
    async fn voice_note_is_sent_as_ptt_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/message/sendMedia/colloquy"))
            .and(body_partial_json(serde_json::json!({
                "number": "n",
                "options": {"delay": 1200, "presence": "recording", "caption": ""},
                "mediaMessage": {"mediatype": "audio", "fileName": "reply.mp3", "media": STANDARD.encode(b"mp3"), "ptt": true}
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .send_voice_note("n", b"mp3", "reply.mp3")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fetch_media_decodes_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/getBase64FromMediaMessage/colloquy"))
            .and(body_json(serde_json::json!({"message": {"key": {"id": "MSG1"}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base64": STANDARD.encode(b"\x89PNG"),
                "mimetype": "image/png"
            })))
            .mount(&server)
            .await;

        let media = client_for(&server).fetch_media("MSG1").await.unwrap();
        assert_eq!(media.data, b"\x89PNG");
        assert_eq!(media.mime_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn fetch_media_without_base64_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"mimetype": "image/png"})))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_media("MSG1").await.unwrap_err();
        assert!(err.to_string().contains("no base64"), "got: {err}");
    }
}
