// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue engine.
//!
//! [`DialogueEngine::handle_event`] consumes one inbound event: it applies the
//! freshness window, serializes on the contact, reads the conversation mode
//! and then runs the text, audio or media flow. Every external call is bounded
//! by [`CallBounds`]; failures degrade to fixed replies instead of errors.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use colloquy_config::model::ColloquyConfig;
use colloquy_core::types::{
    Attachment, AttachmentRecord, Contact, ContactStatus, ConversationMode, DialogueTurn,
    GenerationRequest, InboundEvent, InboundPayload, MediaDownload, MediaKind, NewTurn,
    OutboundPayload, Speaker,
};
use colloquy_core::{
    CallBounds, EmbeddingAdapter, GeneratorAdapter, StorageAdapter, SynthesizerAdapter,
    TranscriberAdapter, TransportAdapter,
};
use colloquy_knowledge::Retriever;
use tracing::{debug, info, warn};

use crate::freshness::{Freshness, FreshnessGuard};
use crate::ledger::ContactLedger;
use crate::locks::ContactLocks;
use crate::media::{MediaStore, mime_for_path};
use crate::mode::current_mode;
use crate::name::is_plausible_name;
use crate::pending::PendingAttachments;
use crate::persona::{Persona, Prefix, compose};
use crate::ssml::markdown_to_ssml;
use crate::{recording, replies};

/// File name given to synthesized voice notes.
pub const VOICE_NOTE_FILE_NAME: &str = "resposta.mp3";
const VOICE_NOTE_MIME: &str = "audio/mpeg";
const DEFAULT_AUDIO_MIME: &str = "audio/ogg";

/// External capabilities the engine drives.
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn StorageAdapter>,
    pub generator: Arc<dyn GeneratorAdapter>,
    pub embedder: Arc<dyn EmbeddingAdapter>,
    pub transcriber: Arc<dyn TranscriberAdapter>,
    pub synthesizer: Arc<dyn SynthesizerAdapter>,
    pub transport: Arc<dyn TransportAdapter>,
}

/// What the engine did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A text reply was produced and handed to the transport.
    Answered,
    /// A synthesized voice note was sent.
    AnsweredWithAudio,
    /// A pending contact supplied its name; acknowledged without generation.
    NameRecorded,
    /// A caption-less file now waits for the next text message.
    AttachmentPending,
    /// The audio could not be downloaded or transcribed.
    NotUnderstood,
    /// The message id was already recorded.
    Duplicate,
    /// Older than the freshness window.
    Stale,
    /// The file could not be fetched and there was no caption to answer.
    MediaUnavailable,
    Unsupported,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Answered => "answered",
            Outcome::AnsweredWithAudio => "answered_with_audio",
            Outcome::NameRecorded => "name_recorded",
            Outcome::AttachmentPending => "attachment_pending",
            Outcome::NotUnderstood => "not_understood",
            Outcome::Duplicate => "duplicate",
            Outcome::Stale => "stale",
            Outcome::MediaUnavailable => "media_unavailable",
            Outcome::Unsupported => "unsupported",
        }
    }
}

/// Where the file for a generation call comes from.
enum AttachmentSource {
    None,
    /// Take whatever waits in the contact's pending slot.
    Pending,
    /// A file received together with the message.
    Fresh(Attachment),
}

/// Result of storing a downloaded file.
enum Archived {
    Stored(PathBuf),
    Duplicate,
    /// Written nowhere; the event is still handled without the file.
    Unavailable,
}

/// Per-contact session state machine and media pipeline.
pub struct DialogueEngine {
    storage: Arc<dyn StorageAdapter>,
    generator: Arc<dyn GeneratorAdapter>,
    transcriber: Arc<dyn TranscriberAdapter>,
    synthesizer: Arc<dyn SynthesizerAdapter>,
    transport: Arc<dyn TransportAdapter>,
    ledger: ContactLedger,
    locks: ContactLocks,
    retriever: Retriever,
    media: MediaStore,
    pending: PendingAttachments,
    freshness: FreshnessGuard,
    history_window: usize,
    bounds: CallBounds,
}

impl DialogueEngine {
    pub fn new(collaborators: Collaborators, config: &ColloquyConfig, bounds: CallBounds) -> Self {
        let Collaborators {
            storage,
            generator,
            embedder,
            transcriber,
            synthesizer,
            transport,
        } = collaborators;

        let media = MediaStore::from_config(&config.media);
        Self {
            ledger: ContactLedger::new(Arc::clone(&storage)),
            locks: ContactLocks::new(),
            retriever: Retriever::new(
                Arc::clone(&storage),
                embedder,
                &config.retrieval,
                bounds.clone(),
            ),
            pending: PendingAttachments::new(Arc::clone(&storage), media.clone()),
            media,
            freshness: FreshnessGuard::from_config(&config.dialogue),
            history_window: config.dialogue.history_window,
            storage,
            generator,
            transcriber,
            synthesizer,
            transport,
            bounds,
        }
    }

    /// The contact ledger backing this engine.
    pub fn ledger(&self) -> &ContactLedger {
        &self.ledger
    }

    pub fn transport(&self) -> Arc<dyn TransportAdapter> {
        Arc::clone(&self.transport)
    }

    pub fn bounds(&self) -> &CallBounds {
        &self.bounds
    }

    /// Handles one inbound event against the current wall clock.
    pub async fn handle_event(&self, event: InboundEvent) -> Outcome {
        self.handle_event_at(event, chrono::Utc::now().timestamp())
            .await
    }

    /// Handles one inbound event as if received at `now_secs`.
    pub async fn handle_event_at(&self, event: InboundEvent, now_secs: i64) -> Outcome {
        let freshness = self.freshness.check(event.timestamp, now_secs);
        if !freshness.should_answer() {
            info!(contact = %event.contact, ?freshness, "stale event dropped");
            recording::record_ignored("stale");
            return Outcome::Stale;
        }
        if let Freshness::Future { age_secs } = freshness {
            warn!(contact = %event.contact, age_secs, "event timestamp is in the future");
        }

        let _guard = self.locks.acquire(&event.contact).await;

        let mode = current_mode(self.storage.as_ref())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to read conversation mode, using default");
                ConversationMode::default()
            });
        let contact = self.observe(&event.contact).await;

        let outcome = match &event.payload {
            InboundPayload::Text { body } => self.on_text(&event, &contact, mode, body).await,
            InboundPayload::Audio { mime_type } => {
                self.on_audio(&event, &contact, mode, mime_type.as_deref())
                    .await
            }
            InboundPayload::Image { .. }
            | InboundPayload::Video { .. }
            | InboundPayload::Document { .. } => self.on_media(&event, &contact, mode).await,
            InboundPayload::Unsupported { kind } => {
                debug!(contact = %event.contact, kind = %kind, "unsupported message kind");
                Outcome::Unsupported
            }
        };

        info!(
            contact = %event.contact,
            message_id = %event.message_id,
            mode = %mode,
            outcome = outcome.as_str(),
            "event handled"
        );
        recording::record_event(outcome.as_str());
        outcome
    }

    /// Ledger lookup that never blocks the reply. When the store is down the
    /// contact is treated as active and unnamed.
    async fn observe(&self, address: &str) -> Contact {
        match self.ledger.observe(address).await {
            Ok(contact) => contact,
            Err(e) => {
                warn!(contact = %address, error = %e, "contact lookup failed, answering without state");
                Contact {
                    address: address.to_string(),
                    name: None,
                    status: ContactStatus::Active,
                    pending_attachment: None,
                }
            }
        }
    }

    async fn on_text(
        &self,
        event: &InboundEvent,
        contact: &Contact,
        mode: ConversationMode,
        body: &str,
    ) -> Outcome {
        let address = contact.address.as_str();

        if contact.status == ContactStatus::PendingName && is_plausible_name(Some(body)) {
            let name = body.trim();
            self.record_turn(NewTurn::user(address, body)).await;
            if let Err(e) = self.ledger.activate(address, name).await {
                warn!(contact = %address, error = %e, "failed to record contact name");
            }
            let ack = replies::name_acknowledgement(name);
            self.record_turn(NewTurn::assistant(address, &ack)).await;
            self.deliver_text(address, ack).await;
            return Outcome::NameRecorded;
        }

        self.converse(
            event,
            contact,
            mode,
            body,
            NewTurn::user(address, body),
            AttachmentSource::Pending,
        )
        .await
    }

    /// Answers a text message, running the name flow for contacts that are
    /// not yet active.
    async fn converse(
        &self,
        event: &InboundEvent,
        contact: &Contact,
        mode: ConversationMode,
        message: &str,
        turn: NewTurn,
        source: AttachmentSource,
    ) -> Outcome {
        let address = contact.address.as_str();

        let (prefix, welcome_name) = match contact.status {
            ContactStatus::Active => (None, None),
            ContactStatus::PendingName => (Some(Prefix::NameRequest), None),
            ContactStatus::New => match event.push_name.as_deref() {
                Some(hint) if is_plausible_name(Some(hint)) => {
                    let name = hint.trim();
                    if let Err(e) = self.ledger.activate(address, name).await {
                        warn!(contact = %address, error = %e, "failed to record contact name");
                    }
                    (None, Some(name))
                }
                _ => {
                    if let Err(e) = self.ledger.await_name(address).await {
                        warn!(contact = %address, error = %e, "failed to mark contact pending name");
                    }
                    (Some(Prefix::NameRequest), None)
                }
            },
        };

        let reply = self
            .generate_reply(address, mode, prefix, message, turn, source)
            .await;
        let text = match welcome_name {
            Some(name) => replies::welcome(name, &reply),
            None => reply,
        };
        self.record_turn(NewTurn::assistant(address, &text)).await;
        self.deliver_text(address, text).await;
        Outcome::Answered
    }

    async fn on_audio(
        &self,
        event: &InboundEvent,
        contact: &Contact,
        mode: ConversationMode,
        advertised_mime: Option<&str>,
    ) -> Outcome {
        let address = contact.address.as_str();

        let Some(download) = self.download(event).await else {
            self.deliver_text(address, replies::NOT_UNDERSTOOD.to_string())
                .await;
            return Outcome::NotUnderstood;
        };
        let mime = download
            .mime_type
            .as_deref()
            .or(advertised_mime)
            .unwrap_or(DEFAULT_AUDIO_MIME)
            .to_string();

        let stored = match self
            .archive(event, MediaKind::Audio, Some(&mime), &download.data, None)
            .await
        {
            Archived::Duplicate => return Outcome::Duplicate,
            Archived::Stored(path) => Some(path),
            Archived::Unavailable => None,
        };

        let transcript = self
            .bounds
            .run(self.transcriber.transcribe(&download.data, &mime))
            .await;
        if let Some(path) = stored {
            self.media.discard(&path).await;
        }

        let transcript = match transcript {
            Ok(Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                info!(contact = %address, "transcription came back empty");
                self.deliver_text(address, replies::NOT_UNDERSTOOD.to_string())
                    .await;
                return Outcome::NotUnderstood;
            }
            Err(e) => {
                warn!(contact = %address, error = %e, "transcription failed");
                self.deliver_text(address, replies::NOT_UNDERSTOOD.to_string())
                    .await;
                return Outcome::NotUnderstood;
            }
        };
        debug!(contact = %address, transcript = %transcript, "audio transcribed");

        let turn = NewTurn::user_audio(address, replies::transcribed(&transcript));
        let reply = self
            .generate_reply(address, mode, None, &transcript, turn, AttachmentSource::None)
            .await;
        self.record_turn(NewTurn::assistant(address, &reply)).await;

        let ssml = markdown_to_ssml(&reply);
        match self.bounds.run(self.synthesizer.synthesize(&ssml)).await {
            Ok(audio) if !audio.is_empty() => {
                self.deliver(
                    address,
                    OutboundPayload::Audio {
                        data: audio,
                        file_name: VOICE_NOTE_FILE_NAME.to_string(),
                        mime_type: VOICE_NOTE_MIME.to_string(),
                    },
                )
                .await;
                Outcome::AnsweredWithAudio
            }
            Ok(_) => {
                warn!(contact = %address, "synthesis returned no audio, replying with text");
                recording::record_synthesis_fallback();
                self.deliver_text(address, reply).await;
                Outcome::Answered
            }
            Err(e) => {
                warn!(contact = %address, error = %e, "synthesis failed, replying with text");
                recording::record_synthesis_fallback();
                self.deliver_text(address, reply).await;
                Outcome::Answered
            }
        }
    }

    async fn on_media(
        &self,
        event: &InboundEvent,
        contact: &Contact,
        mode: ConversationMode,
    ) -> Outcome {
        let address = contact.address.as_str();
        let Some(kind) = event.payload.media_kind() else {
            return Outcome::Unsupported;
        };
        let caption = event.payload.caption().map(str::to_string);

        let stored = match self.download(event).await {
            Some(download) => {
                let mime = download
                    .mime_type
                    .clone()
                    .or_else(|| event.payload.mime_type().map(str::to_string));
                match self
                    .archive(event, kind, mime.as_deref(), &download.data, caption.as_deref())
                    .await
                {
                    Archived::Duplicate => return Outcome::Duplicate,
                    Archived::Stored(path) => Some((path, mime)),
                    Archived::Unavailable => None,
                }
            }
            None => None,
        };

        let Some(caption) = caption else {
            let Some((path, _)) = stored else {
                info!(contact = %address, kind = kind.as_str(), "media unavailable and no caption, not answering");
                return Outcome::MediaUnavailable;
            };
            if let Err(e) = self.pending.set(address, Some(path.clone())).await {
                warn!(contact = %address, error = %e, "failed to store pending attachment");
                self.media.discard(&path).await;
            }
            debug!(contact = %address, path = %path.display(), "attachment waiting for a message");
            return Outcome::AttachmentPending;
        };

        let source = match stored {
            Some((path, mime)) => {
                // A captioned file supersedes whatever was pending.
                if let Err(e) = self.pending.set(address, None).await {
                    warn!(contact = %address, error = %e, "failed to clear pending attachment");
                }
                let mime_type = mime.unwrap_or_else(|| mime_for_path(&path).to_string());
                AttachmentSource::Fresh(Attachment { path, mime_type })
            }
            None => AttachmentSource::None,
        };

        self.converse(
            event,
            contact,
            mode,
            &caption,
            NewTurn::user(address, &caption),
            source,
        )
        .await
    }

    /// Persona, retrieval, attachment and generation for one user message.
    /// A failed generation yields the fixed apology.
    ///
    /// The user turn is appended after the history window is read, so the
    /// history handed to the model never contains the current message.
    async fn generate_reply(
        &self,
        address: &str,
        mode: ConversationMode,
        prefix: Option<Prefix>,
        message: &str,
        turn: NewTurn,
        source: AttachmentSource,
    ) -> String {
        let history = match self.storage.recent_turns(address, self.history_window).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(contact = %address, error = %e, "failed to load history");
                Vec::new()
            }
        };
        self.record_turn(turn.clone()).await;

        let persona = if mode.uses_retrieval() {
            let query = retrieval_query(&history, &turn.text);
            Persona::RetrievalConstrained {
                context: self.retriever.context_for(&query).await,
            }
        } else {
            Persona::Standard
        };

        let attachment = match source {
            AttachmentSource::None => None,
            AttachmentSource::Fresh(attachment) => Some(attachment),
            AttachmentSource::Pending => match self.pending.take(address).await {
                Ok(path) => path.map(|path| Attachment {
                    mime_type: mime_for_path(&path).to_string(),
                    path,
                }),
                Err(e) => {
                    warn!(contact = %address, error = %e, "failed to take pending attachment");
                    None
                }
            },
        };
        let attachment = match attachment {
            Some(attachment) if mode.uses_retrieval() => {
                info!(
                    contact = %address,
                    path = %attachment.path.display(),
                    "attachment ignored in retrieval mode"
                );
                self.pending.consume(attachment.path).await;
                None
            }
            other => other,
        };
        let consumed = attachment.as_ref().map(|a| a.path.clone());

        let request = GenerationRequest {
            persona: compose(&persona, prefix),
            history,
            message: message.to_string(),
            attachment,
        };

        let started = Instant::now();
        let result = self.bounds.run(self.generator.generate(request)).await;
        recording::record_generation_latency(started.elapsed().as_secs_f64());

        if let Some(path) = consumed {
            self.pending.consume(path).await;
        }

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!(contact = %address, error = %e, "generation failed, sending apology");
                recording::record_generation_fallback();
                replies::APOLOGY.to_string()
            }
        }
    }

    async fn download(&self, event: &InboundEvent) -> Option<MediaDownload> {
        match self
            .bounds
            .run(self.transport.fetch_media(&event.message_id))
            .await
        {
            Ok(download) if !download.data.is_empty() => Some(download),
            Ok(_) => {
                warn!(contact = %event.contact, message_id = %event.message_id, "media download was empty");
                None
            }
            Err(e) => {
                warn!(contact = %event.contact, message_id = %event.message_id, error = %e, "media download failed");
                None
            }
        }
    }

    /// Records the attachment under its message id, then writes the file.
    /// A repeated message id writes nothing.
    async fn archive(
        &self,
        event: &InboundEvent,
        kind: MediaKind,
        mime_type: Option<&str>,
        data: &[u8],
        caption: Option<&str>,
    ) -> Archived {
        let path = self.media.path_for(kind, mime_type);
        let record = AttachmentRecord {
            message_id: event.message_id.clone(),
            contact: event.contact.clone(),
            storage_handle: path.to_string_lossy().into_owned(),
            media_kind: kind,
            mime_type: mime_type.map(str::to_string),
            caption: caption.map(str::to_string),
        };

        match self.storage.record_attachment(&record).await {
            Ok(true) => {}
            Ok(false) => {
                info!(contact = %event.contact, message_id = %event.message_id, "duplicate delivery ignored");
                return Archived::Duplicate;
            }
            Err(e) => {
                warn!(message_id = %event.message_id, error = %e, "failed to record attachment");
            }
        }

        match self.media.write(&path, data).await {
            Ok(()) => Archived::Stored(path),
            Err(e) => {
                warn!(contact = %event.contact, error = %e, "failed to save media");
                Archived::Unavailable
            }
        }
    }

    async fn record_turn(&self, turn: NewTurn) {
        if let Err(e) = self.storage.append_turn(&turn).await {
            warn!(contact = %turn.contact, speaker = ?turn.speaker, error = %e, "failed to persist turn");
        }
    }

    async fn deliver_text(&self, address: &str, text: String) {
        self.deliver(address, OutboundPayload::Text(text)).await;
    }

    async fn deliver(&self, address: &str, payload: OutboundPayload) {
        if let Err(e) = self.bounds.run(self.transport.send(address, payload)).await {
            warn!(contact = %address, error = %e, "reply delivery failed");
            recording::record_delivery_failure("reply");
        }
    }
}

/// The previous user turn and the current message, joined by a space.
fn retrieval_query(history: &[DialogueTurn], current: &str) -> String {
    match history.iter().rev().find(|t| t.speaker == Speaker::User) {
        Some(previous) => format!("{} {current}", previous.text),
        None => current.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(seq: i64, speaker: Speaker, text: &str) -> DialogueTurn {
        DialogueTurn {
            seq,
            contact: "a@x".into(),
            speaker,
            text: text.into(),
            from_audio: false,
            created_at: String::new(),
        }
    }

    #[test]
    fn query_joins_previous_user_turn_and_current() {
        let history = vec![
            turn(1, Speaker::User, "quero um seguro"),
            turn(2, Speaker::Assistant, "Qual tipo?"),
            turn(3, Speaker::User, "de vida"),
            turn(4, Speaker::Assistant, "Certo."),
        ];
        assert_eq!(retrieval_query(&history, "quanto custa?"), "de vida quanto custa?");
    }

    #[test]
    fn query_without_history_is_current_message() {
        assert_eq!(retrieval_query(&[], "oi"), "oi");
        let only_bot = vec![turn(1, Speaker::Assistant, "Olá")];
        assert_eq!(retrieval_query(&only_bot, "oi"), "oi");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn stale_event_is_logged_and_not_answered() {
        use colloquy_test_utils::TestHarness;

        let harness = TestHarness::new().await.unwrap();
        let mut config = ColloquyConfig::default();
        config.media.directory = harness.media_dir.to_string_lossy().into_owned();
        let engine = DialogueEngine::new(
            Collaborators {
                storage: harness.storage_dyn(),
                generator: Arc::new(harness.generator.clone()),
                embedder: Arc::new(harness.embedder.clone()),
                transcriber: Arc::new(harness.transcriber.clone()),
                synthesizer: Arc::new(harness.synthesizer.clone()),
                transport: Arc::new(harness.transport.clone()),
            },
            &config,
            CallBounds::default(),
        );

        let now = 1_760_000_000;
        let event = InboundEvent {
            message_id: "OLD".into(),
            contact: "a@x".into(),
            timestamp: Some(now - 3_600),
            push_name: None,
            payload: InboundPayload::Text { body: "oi".into() },
        };
        assert_eq!(engine.handle_event_at(event, now).await, Outcome::Stale);
        assert!(logs_contain("stale event dropped"));
        assert!(harness.transport.sent().await.is_empty());
    }

    #[test]
    fn outcome_labels_are_distinct() {
        let all = [
            Outcome::Answered,
            Outcome::AnsweredWithAudio,
            Outcome::NameRecorded,
            Outcome::AttachmentPending,
            Outcome::NotUnderstood,
            Outcome::Duplicate,
            Outcome::Stale,
            Outcome::MediaUnavailable,
            Outcome::Unsupported,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(Outcome::as_str).collect();
        assert_eq!(labels.len(), all.len());
    }
}
