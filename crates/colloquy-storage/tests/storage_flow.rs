// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end storage behaviour through the `StorageAdapter` trait object.

use std::sync::Arc;

use colloquy_config::model::StorageConfig;
use colloquy_core::StorageAdapter;
use colloquy_core::types::{ContactStatus, ConversationMode, InspectTable, NewTurn};
use colloquy_storage::SqliteStorage;
use tempfile::tempdir;

async fn storage(dir: &tempfile::TempDir) -> Arc<dyn StorageAdapter> {
    let storage = SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("flow.db").to_string_lossy().into_owned(),
        wal_mode: true,
    });
    storage.initialize().await.unwrap();
    Arc::new(storage)
}

#[tokio::test]
async fn onboarding_and_history_survive_reopen() {
    let dir = tempdir().unwrap();
    {
        let store = storage(&dir).await;
        store
            .insert_contact("5511999@s.whatsapp.net", None, ContactStatus::PendingName)
            .await
            .unwrap();
        store
            .append_turn(&NewTurn::user("5511999@s.whatsapp.net", "oi"))
            .await
            .unwrap();
        store
            .set_contact_name("5511999@s.whatsapp.net", "Maria")
            .await
            .unwrap();
        store.close().await.unwrap();
    }

    let store = storage(&dir).await;
    let contact = store
        .get_contact("5511999@s.whatsapp.net")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(contact.name.as_deref(), Some("Maria"));
    assert_eq!(contact.status, ContactStatus::Active);

    let turns = store
        .recent_turns("5511999@s.whatsapp.net", 20)
        .await
        .unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].text, "oi");
}

#[tokio::test]
async fn mode_setting_defaults_and_persists() {
    let dir = tempdir().unwrap();
    let store = storage(&dir).await;
    let mode = store
        .get_setting(ConversationMode::SETTING_KEY)
        .await
        .unwrap();
    assert_eq!(mode.as_deref(), Some("standard"));

    store
        .set_setting(ConversationMode::SETTING_KEY, "sales")
        .await
        .unwrap();
    let page = store
        .inspect_table(InspectTable::Settings, 10, 0)
        .await
        .unwrap();
    assert_eq!(page.records[0]["value"], "sales");
}
