// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::ColloquyError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AttachmentRecord, Contact, ContactStatus, DialogueTurn, InspectTable, KnowledgeChunk,
    NewTurn, TablePage,
};

/// Adapter for storage and persistence backends.
///
/// Holds the durable state of the engine: the contact ledger, dialogue
/// history, process-wide settings, received-attachment records and the
/// knowledge store.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ColloquyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ColloquyError>;

    // --- Contact ledger ---

    async fn get_contact(&self, address: &str) -> Result<Option<Contact>, ColloquyError>;

    /// All contacts, ordered by address.
    async fn list_contacts(&self) -> Result<Vec<Contact>, ColloquyError>;

    /// Creates a contact. Returns `false` when the address already exists.
    async fn insert_contact(
        &self,
        address: &str,
        name: Option<&str>,
        status: ContactStatus,
    ) -> Result<bool, ColloquyError>;

    /// Records the display name and marks the contact active.
    async fn set_contact_name(&self, address: &str, name: &str) -> Result<(), ColloquyError>;

    async fn set_contact_status(
        &self,
        address: &str,
        status: ContactStatus,
    ) -> Result<(), ColloquyError>;

    /// Replaces the pending attachment, returning the handle it displaced.
    async fn replace_pending_attachment(
        &self,
        address: &str,
        handle: Option<&str>,
    ) -> Result<Option<String>, ColloquyError>;

    /// Reads and clears the pending attachment in one step.
    async fn take_pending_attachment(&self, address: &str)
    -> Result<Option<String>, ColloquyError>;

    // --- Dialogue history ---

    async fn append_turn(&self, turn: &NewTurn) -> Result<i64, ColloquyError>;

    /// The last `limit` turns for a contact in chronological order.
    async fn recent_turns(
        &self,
        contact: &str,
        limit: usize,
    ) -> Result<Vec<DialogueTurn>, ColloquyError>;

    // --- Settings ---

    async fn get_setting(&self, key: &str) -> Result<Option<String>, ColloquyError>;

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), ColloquyError>;

    // --- Received attachments ---

    /// Stores an attachment record. Returns `false` when the message identity
    /// was already recorded.
    async fn record_attachment(&self, record: &AttachmentRecord) -> Result<bool, ColloquyError>;

    // --- Knowledge store ---

    /// Deletes every knowledge chunk.
    async fn clear_knowledge(&self) -> Result<usize, ColloquyError>;

    async fn insert_knowledge(&self, text: &str, embedding: &[f32]) -> Result<i64, ColloquyError>;

    /// All chunks in insertion order.
    async fn knowledge_chunks(&self) -> Result<Vec<KnowledgeChunk>, ColloquyError>;

    // --- Inspection ---

    async fn inspect_table(
        &self,
        table: InspectTable,
        limit: i64,
        offset: i64,
    ) -> Result<TablePage, ColloquyError>;
}
