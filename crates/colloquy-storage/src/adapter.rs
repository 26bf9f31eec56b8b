// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use colloquy_config::model::StorageConfig;
use colloquy_core::types::{
    AttachmentRecord, Contact, ContactStatus, DialogueTurn, InspectTable, KnowledgeChunk,
    NewTurn, TablePage,
};
use colloquy_core::{AdapterType, ColloquyError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::{self, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened by [`StorageAdapter::initialize`]; every other
/// method fails with a storage error until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, ColloquyError> {
        self.db.get().ok_or_else(|| ColloquyError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ColloquyError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ColloquyError> {
        if let Some(db) = self.db.get() {
            database::checkpoint(db.connection()).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ColloquyError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ColloquyError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ColloquyError> {
        database::checkpoint(self.db()?.connection()).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Contact ledger ---

    async fn get_contact(&self, address: &str) -> Result<Option<Contact>, ColloquyError> {
        queries::contacts::get_contact(self.db()?, address).await
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, ColloquyError> {
        queries::contacts::list_contacts(self.db()?).await
    }

    async fn insert_contact(
        &self,
        address: &str,
        name: Option<&str>,
        status: ContactStatus,
    ) -> Result<bool, ColloquyError> {
        queries::contacts::insert_contact(self.db()?, address, name, status).await
    }

    async fn set_contact_name(&self, address: &str, name: &str) -> Result<(), ColloquyError> {
        queries::contacts::set_contact_name(self.db()?, address, name).await
    }

    async fn set_contact_status(
        &self,
        address: &str,
        status: ContactStatus,
    ) -> Result<(), ColloquyError> {
        queries::contacts::set_contact_status(self.db()?, address, status).await
    }

    async fn replace_pending_attachment(
        &self,
        address: &str,
        handle: Option<&str>,
    ) -> Result<Option<String>, ColloquyError> {
        queries::contacts::replace_pending_attachment(self.db()?, address, handle).await
    }

    async fn take_pending_attachment(
        &self,
        address: &str,
    ) -> Result<Option<String>, ColloquyError> {
        queries::contacts::take_pending_attachment(self.db()?, address).await
    }

    // --- Dialogue history ---

    async fn append_turn(&self, turn: &NewTurn) -> Result<i64, ColloquyError> {
        queries::history::append_turn(self.db()?, turn).await
    }

    async fn recent_turns(
        &self,
        contact: &str,
        limit: usize,
    ) -> Result<Vec<DialogueTurn>, ColloquyError> {
        queries::history::recent_turns(self.db()?, contact, limit).await
    }

    // --- Settings ---

    async fn get_setting(&self, key: &str) -> Result<Option<String>, ColloquyError> {
        queries::settings::get_setting(self.db()?, key).await
    }

    async fn set_setting(&self, key: &str, value: &str) -> Result<(), ColloquyError> {
        queries::settings::set_setting(self.db()?, key, value).await
    }

    // --- Received attachments ---

    async fn record_attachment(&self, record: &AttachmentRecord) -> Result<bool, ColloquyError> {
        queries::attachments::record_attachment(self.db()?, record).await
    }

    // --- Knowledge store ---

    async fn clear_knowledge(&self) -> Result<usize, ColloquyError> {
        queries::knowledge::clear_knowledge(self.db()?).await
    }

    async fn insert_knowledge(&self, text: &str, embedding: &[f32]) -> Result<i64, ColloquyError> {
        queries::knowledge::insert_knowledge(self.db()?, text, embedding).await
    }

    async fn knowledge_chunks(&self) -> Result<Vec<KnowledgeChunk>, ColloquyError> {
        queries::knowledge::knowledge_chunks(self.db()?).await
    }

    // --- Inspection ---

    async fn inspect_table(
        &self,
        table: InspectTable,
        limit: i64,
        offset: i64,
    ) -> Result<TablePage, ColloquyError> {
        queries::inspect::inspect_table(self.db()?, table, limit, offset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(
            dir.path().join("x.db").to_str().unwrap(),
        ));
        assert!(storage.get_contact("a").await.is_err());
        assert!(storage.health_check().await.is_err());
        // Shutdown of a never-opened store is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn double_initialize_is_rejected() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("twice.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_and_close_after_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("ok.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert!(db_path.exists());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        storage.close().await.unwrap();
    }
}
