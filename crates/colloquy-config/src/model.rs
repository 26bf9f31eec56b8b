// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Colloquy dialogue engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Colloquy configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ColloquyConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session state machine tuning.
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Retrieval engine tuning.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Where inbound media files are kept.
    #[serde(default)]
    pub media: MediaConfig,

    /// Generation and embedding API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Speech-to-text and text-to-speech settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Transport gateway settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// HTTP surface settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Knowledge ingestion settings.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "colloquy".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("colloquy").join("colloquy.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("colloquy.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Session state machine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueConfig {
    /// Inbound events older than this are discarded unanswered.
    #[serde(default = "default_freshness_window_secs")]
    pub freshness_window_secs: u64,

    /// Events up to this far in the future are processed silently; beyond it
    /// they are processed with a warning.
    #[serde(default = "default_future_skew_tolerance_secs")]
    pub future_skew_tolerance_secs: u64,

    /// Number of recent turns handed to the generator.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Upper bound for any single external call.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: default_freshness_window_secs(),
            future_skew_tolerance_secs: default_future_skew_tolerance_secs(),
            history_window: default_history_window(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

fn default_freshness_window_secs() -> u64 {
    300
}

fn default_future_skew_tolerance_secs() -> u64 {
    60
}

fn default_history_window() -> usize {
    20
}

fn default_call_timeout_secs() -> u64 {
    120
}

/// Retrieval engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum chunks returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Chunks at or below this cosine similarity are never returned.
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            similarity_floor: default_similarity_floor(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

fn default_similarity_floor() -> f32 {
    0.5
}

/// Media file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Root directory for downloaded media.
    #[serde(default = "default_media_directory")]
    pub directory: String,

    /// Keep files after they were consumed or displaced from a pending slot.
    #[serde(default)]
    pub retain_consumed_files: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            directory: default_media_directory(),
            retain_consumed_files: false,
        }
    }
}

fn default_media_directory() -> String {
    dirs::data_dir()
        .map(|p| p.join("colloquy").join("media"))
        .unwrap_or_else(|| std::path::PathBuf::from("media"))
        .to_string_lossy()
        .into_owned()
}

/// Generation and embedding API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` requires the `GOOGLE_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            generation_model: default_generation_model(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

/// Speech configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// API key for the speech services. Falls back to the Gemini key.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_stt_base_url")]
    pub stt_base_url: String,

    #[serde(default = "default_tts_base_url")]
    pub tts_base_url: String,

    #[serde(default = "default_language_code")]
    pub language_code: String,

    #[serde(default = "default_voice_name")]
    pub voice_name: String,

    /// Sample rate of inbound voice notes.
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            stt_base_url: default_stt_base_url(),
            tts_base_url: default_tts_base_url(),
            language_code: default_language_code(),
            voice_name: default_voice_name(),
            sample_rate_hz: default_sample_rate_hz(),
        }
    }
}

fn default_stt_base_url() -> String {
    "https://speech.googleapis.com/v1".to_string()
}

fn default_tts_base_url() -> String {
    "https://texttospeech.googleapis.com/v1".to_string()
}

fn default_language_code() -> String {
    "pt-BR".to_string()
}

fn default_voice_name() -> String {
    "pt-BR-Chirp3-HD-Vindemiatrix".to_string()
}

fn default_sample_rate_hz() -> u32 {
    16000
}

/// Transport gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsAppConfig {
    /// Base URL of the gateway API.
    #[serde(default = "default_whatsapp_base_url")]
    pub base_url: String,

    /// Gateway instance name.
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Gateway API key. `None` disables the transport.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeout for text sends.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Timeout for media uploads and downloads.
    #[serde(default = "default_media_timeout_secs")]
    pub media_timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_whatsapp_base_url(),
            instance: default_instance(),
            api_key: None,
            send_timeout_secs: default_send_timeout_secs(),
            media_timeout_secs: default_media_timeout_secs(),
        }
    }
}

fn default_whatsapp_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_instance() -> String {
    "colloquy".to_string()
}

fn default_send_timeout_secs() -> u64 {
    15
}

fn default_media_timeout_secs() -> u64 {
    45
}

/// HTTP surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token for the administrative routes. `None` rejects them all.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Pause between consecutive broadcast sends.
    #[serde(default = "default_broadcast_pacing_ms")]
    pub broadcast_pacing_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            admin_token: None,
            broadcast_pacing_ms: default_broadcast_pacing_ms(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    5001
}

fn default_broadcast_pacing_ms() -> u64 {
    500
}

/// Knowledge ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Directory scanned for `.txt`, `.md` and `.pdf` sources.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Maximum characters per chunk.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Characters shared between consecutive chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Pause between embedding calls.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,

    /// Texts longer than this are skipped.
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            max_chars: default_max_chars(),
            overlap: default_overlap(),
            pause_ms: default_pause_ms(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

fn default_source_dir() -> String {
    "knowledge".to_string()
}

fn default_max_chars() -> usize {
    1000
}

fn default_overlap() -> usize {
    100
}

fn default_pause_ms() -> u64 {
    1000
}

fn default_max_text_chars() -> usize {
    50_000_000
}
