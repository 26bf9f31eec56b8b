// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Cloud Speech-to-Text and Text-to-Speech adapters.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colloquy_config::model::{ColloquyConfig, SpeechConfig};
use colloquy_core::types::{AdapterType, HealthStatus};
use colloquy_core::{ColloquyError, PluginAdapter, SynthesizerAdapter, TranscriberAdapter};
use tracing::{debug, info};

use crate::client::{GoogleClient, Service, resolve_api_key};
use crate::types::{
    AudioConfig, RecognitionAudio, RecognitionConfig, RecognizeRequest, RecognizeResponse,
    SynthesisInput, SynthesizeRequest, SynthesizeResponse, VoiceSelection,
};

/// Speech adapter backed by the Google Cloud REST endpoints.
///
/// One instance serves as both transcriber and synthesizer.
pub struct GoogleSpeech {
    stt: GoogleClient,
    tts: GoogleClient,
    config: SpeechConfig,
}

impl GoogleSpeech {
    /// Creates the adapter. The key is taken from `speech.api_key`, then
    /// `gemini.api_key`, then `GOOGLE_API_KEY`.
    pub fn new(config: &ColloquyConfig) -> Result<Self, ColloquyError> {
        let api_key = resolve_api_key(
            &[
                config.speech.api_key.as_deref(),
                config.gemini.api_key.as_deref(),
            ],
            &["GOOGLE_API_KEY"],
        )?;
        let speech = &config.speech;
        let adapter = Self {
            stt: GoogleClient::new(&api_key, &speech.stt_base_url, Service::Speech)?,
            tts: GoogleClient::new(&api_key, &speech.tts_base_url, Service::Speech)?,
            config: speech.clone(),
        };
        info!(
            language = %speech.language_code,
            voice = %speech.voice_name,
            "speech adapter initialized"
        );
        Ok(adapter)
    }
}

/// Recognition encoding for an inbound voice-note MIME type.
fn recognition_encoding(mime_type: &str) -> &'static str {
    let mime = mime_type.to_ascii_lowercase();
    if mime.contains("webm") {
        "WEBM_OPUS"
    } else {
        "OGG_OPUS"
    }
}

#[async_trait]
impl PluginAdapter for GoogleSpeech {
    fn name(&self) -> &str {
        "google-speech"
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
        debug!("speech adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl TranscriberAdapter for GoogleSpeech {
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<Option<String>, ColloquyError> {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: recognition_encoding(mime_type).to_string(),
                sample_rate_hertz: self.config.sample_rate_hz,
                language_code: self.config.language_code.clone(),
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio),
            },
        };

        debug!(bytes = audio.len(), "sending audio for recognition");
        let response: RecognizeResponse = self.stt.post_json("speech:recognize", &request).await?;
        Ok(response.transcript())
    }
}

#[async_trait]
impl SynthesizerAdapter for GoogleSpeech {
    async fn synthesize(&self, ssml: &str) -> Result<Vec<u8>, ColloquyError> {
        let request = SynthesizeRequest {
            input: SynthesisInput {
                ssml: ssml.to_string(),
            },
            voice: VoiceSelection {
                language_code: self.config.language_code.clone(),
                name: self.config.voice_name.clone(),
                ssml_gender: "FEMALE".into(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".into(),
            },
        };

        let response: SynthesizeResponse = self.tts.post_json("text:synthesize", &request).await?;
        let audio = STANDARD
            .decode(response.audio_content.as_bytes())
            .map_err(|e| ColloquyError::Speech {
                message: format!("invalid audioContent encoding: {e}"),
                source: Some(Box::new(e)),
            })?;
        if audio.is_empty() {
            return Err(ColloquyError::Speech {
                message: "synthesis returned no audio".into(),
                source: None,
            });
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn speech_for(server: &MockServer) -> GoogleSpeech {
        let mut config = ColloquyConfig::default();
        config.speech.api_key = Some("speech-key".into());
        config.speech.stt_base_url = server.uri();
        config.speech.tts_base_url = format!("{}/tts", server.uri());
        GoogleSpeech::new(&config).unwrap()
    }

    #[test]
    fn voice_notes_default_to_ogg_opus() {
        assert_eq!(recognition_encoding("audio/ogg; codecs=opus"), "OGG_OPUS");
        assert_eq!(recognition_encoding(""), "OGG_OPUS");
        assert_eq!(recognition_encoding("audio/webm"), "WEBM_OPUS");
    }

    #[test]
    fn speech_key_falls_back_to_gemini_key() {
        let mut config = ColloquyConfig::default();
        config.gemini.api_key = Some("shared".into());
        assert!(GoogleSpeech::new(&config).is_ok());
    }

    #[tokio::test]
    async fn transcribe_returns_first_alternative() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/speech:recognize"))
            .and(body_partial_json(serde_json::json!({
                "config": {"encoding": "OGG_OPUS", "sampleRateHertz": 16000, "languageCode": "pt-BR"},
                "audio": {"content": "b2dn"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"alternatives": [{"transcript": "qual o preço"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let speech = speech_for(&server);
        let text = speech.transcribe(b"ogg", "audio/ogg").await.unwrap();
        assert_eq!(text.as_deref(), Some("qual o preço"));
    }

    #[tokio::test]
    async fn transcribe_without_results_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/speech:recognize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let speech = speech_for(&server);
        assert_eq!(speech.transcribe(b"ogg", "audio/ogg").await.unwrap(), None);
    }

    #[tokio::test]
    async fn synthesize_decodes_audio_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tts/text:synthesize"))
            .and(body_partial_json(serde_json::json!({
                "input": {"ssml": "<speak>oi</speak>"},
                "voice": {"languageCode": "pt-BR", "name": "pt-BR-Chirp3-HD-Vindemiatrix", "ssmlGender": "FEMALE"},
                "audioConfig": {"audioEncoding": "MP3"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "audioContent": STANDARD.encode(b"ID3data")
            })))
            .mount(&server)
            .await;

        let speech = speech_for(&server);
        let audio = speech.synthesize("<speak>oi</speak>").await.unwrap();
        assert_eq!(audio, b"ID3data");
    }

    #[tokio::test]
    async fn synthesize_with_empty_audio_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"audioContent": ""})))
            .mount(&server)
            .await;

        let speech = speech_for(&server);
        let err = speech.synthesize("<speak>oi</speak>").await.unwrap_err();
        assert!(matches!(err, ColloquyError::Speech { .. }));
    }
}
