// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Colloquy engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator an adapter wraps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Generator,
    Embedding,
    Transcriber,
    Synthesizer,
    Storage,
}

// --- Contacts ---

/// Conversational status of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    /// Never seen, or seen without any decision about the name yet.
    New,
    /// Asked for a display name, waiting for the answer.
    PendingName,
    /// Name known; every message is answered normally.
    Active,
}

impl ContactStatus {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::PendingName => "pending_name",
            ContactStatus::Active => "active",
        }
    }

    /// Parse from SQLite string. Unknown values read as `New`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "pending_name" => ContactStatus::PendingName,
            "active" => ContactStatus::Active,
            _ => ContactStatus::New,
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable per-contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Opaque routable address (e.g. `5511999999999@s.whatsapp.net`).
    pub address: String,
    /// Display name, `None` until learned.
    pub name: Option<String>,
    pub status: ContactStatus,
    /// Storage handle of a caption-less attachment awaiting a text message.
    pub pending_attachment: Option<String>,
}

impl Contact {
    /// The local part of the address, used when no display name is known.
    pub fn address_local_part(address: &str) -> &str {
        address.split('@').next().unwrap_or(address)
    }
}

// --- Dialogue history ---

/// Who authored a dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }

    /// Parse from SQLite string.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "user" => Speaker::User,
            _ => Speaker::Assistant,
        }
    }
}

/// A turn to be appended to a contact's dialogue history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTurn {
    pub contact: String,
    pub speaker: Speaker,
    pub text: String,
    /// True when the text is a transcription of a voice message.
    pub from_audio: bool,
}

impl NewTurn {
    pub fn user(contact: &str, text: impl Into<String>) -> Self {
        Self {
            contact: contact.to_string(),
            speaker: Speaker::User,
            text: text.into(),
            from_audio: false,
        }
    }

    pub fn user_audio(contact: &str, text: impl Into<String>) -> Self {
        Self {
            from_audio: true,
            ..Self::user(contact, text)
        }
    }

    pub fn assistant(contact: &str, text: impl Into<String>) -> Self {
        Self {
            contact: contact.to_string(),
            speaker: Speaker::Assistant,
            text: text.into(),
            from_audio: false,
        }
    }
}

/// A persisted dialogue turn. `seq` is the logical timestamp that totally
/// orders turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub seq: i64,
    pub contact: String,
    pub speaker: Speaker,
    pub text: String,
    pub from_audio: bool,
    /// ISO 8601 wall-clock time of the write.
    pub created_at: String,
}

// --- Settings ---

/// Process-wide conversational mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    /// General assistant, no retrieval, pending attachments honoured.
    #[default]
    Standard,
    /// Answers constrained to retrieved knowledge.
    Sales,
}

impl ConversationMode {
    /// Settings key under which the mode is stored.
    pub const SETTING_KEY: &'static str = "conversation_mode";

    /// All accepted values, for error messages.
    pub const VALUES: [&'static str; 2] = ["standard", "sales"];

    pub fn uses_retrieval(&self) -> bool {
        matches!(self, ConversationMode::Sales)
    }
}

// --- Media ---

/// Kind of media carried by an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Document,
    Audio,
}

impl MediaKind {
    /// Subfolder of the media directory where files of this kind are kept.
    pub fn folder(&self) -> &'static str {
        match self {
            MediaKind::Image => "imagens",
            MediaKind::Video => "videos",
            MediaKind::Document => "documentos",
            MediaKind::Audio => "audios",
        }
    }

    /// File extension used when the MIME type does not name one.
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpeg",
            MediaKind::Video => "mp4",
            MediaKind::Document => "bin",
            MediaKind::Audio => "ogg",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
        }
    }

    pub fn from_str_value(s: &str) -> Option<Self> {
        match s {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "document" => Some(MediaKind::Document),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }
}

/// Record of a received attachment, keyed by the inbound message identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub message_id: String,
    pub contact: String,
    pub storage_handle: String,
    pub media_kind: MediaKind,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
}

/// Bytes fetched from the transport gateway for a media message.
#[derive(Debug, Clone)]
pub struct MediaDownload {
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

// --- Knowledge ---

/// A stored span of knowledge text with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeChunk {
    /// Insertion-ordered identity.
    pub id: i64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    /// One vector per input text, in input order.
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Inbound events ---

/// One inbound chat event after it has been parsed off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Gateway message identity; idempotency key for attachment records.
    pub message_id: String,
    /// Sender address.
    pub contact: String,
    /// Raw event timestamp, seconds or milliseconds since the epoch.
    pub timestamp: Option<i64>,
    /// Display name advertised by the sender's client, if any.
    pub push_name: Option<String>,
    pub payload: InboundPayload,
}

/// The message carried by an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    Text {
        body: String,
    },
    Audio {
        mime_type: Option<String>,
    },
    Image {
        caption: Option<String>,
        mime_type: Option<String>,
    },
    Video {
        caption: Option<String>,
        mime_type: Option<String>,
    },
    Document {
        caption: Option<String>,
        mime_type: Option<String>,
        file_name: Option<String>,
    },
    /// A message shape the engine does not handle (stickers, reactions, ...).
    Unsupported {
        kind: String,
    },
}

impl InboundPayload {
    /// The media kind, for payloads that reference a downloadable file.
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            InboundPayload::Audio { .. } => Some(MediaKind::Audio),
            InboundPayload::Image { .. } => Some(MediaKind::Image),
            InboundPayload::Video { .. } => Some(MediaKind::Video),
            InboundPayload::Document { .. } => Some(MediaKind::Document),
            InboundPayload::Text { .. } | InboundPayload::Unsupported { .. } => None,
        }
    }

    /// Non-blank caption of a media payload.
    pub fn caption(&self) -> Option<&str> {
        let caption = match self {
            InboundPayload::Image { caption, .. }
            | InboundPayload::Video { caption, .. }
            | InboundPayload::Document { caption, .. } => caption.as_deref(),
            _ => None,
        };
        caption.filter(|c| !c.trim().is_empty())
    }

    /// MIME type advertised by the event itself.
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            InboundPayload::Audio { mime_type }
            | InboundPayload::Image { mime_type, .. }
            | InboundPayload::Video { mime_type, .. }
            | InboundPayload::Document { mime_type, .. } => mime_type.as_deref(),
            _ => None,
        }
    }
}

// --- Generation ---

/// A file handed to the generation model alongside the user's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub mime_type: String,
}

/// A single generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully composed system instruction.
    pub persona: String,
    /// Prior turns, oldest first, excluding `message`.
    pub history: Vec<DialogueTurn>,
    /// The user's current message.
    pub message: String,
    pub attachment: Option<Attachment>,
}

// --- Outbound ---

/// What the engine asks the transport gateway to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundPayload {
    Text(String),
    /// A voice note.
    Audio {
        data: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

// --- Inspection ---

/// Tables exposed through the read-only records view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InspectTable {
    Contacts,
    DialogueTurns,
    Settings,
    ReceivedAttachments,
    KnowledgeChunks,
}

/// One page of rows from an [`InspectTable`].
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub table: InspectTable,
    pub total_records: i64,
    pub limit: i64,
    pub offset: i64,
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
}
