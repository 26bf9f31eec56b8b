// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Received-attachment records.

use colloquy_core::ColloquyError;
use colloquy_core::types::AttachmentRecord;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Record an attachment. A repeated message id leaves the first record in
/// place and returns `false`.
pub async fn record_attachment(
    db: &Database,
    record: &AttachmentRecord,
) -> Result<bool, ColloquyError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO received_attachments
                    (message_id, contact, storage_handle, media_kind, mime_type, caption)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.message_id,
                    record.contact,
                    record.storage_handle,
                    record.media_kind.as_str(),
                    record.mime_type,
                    record.caption,
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use colloquy_core::types::MediaKind;
    use tempfile::tempdir;

    use super::*;

    fn record(handle: &str) -> AttachmentRecord {
        AttachmentRecord {
            message_id: "MSG-1".to_string(),
            contact: "a".to_string(),
            storage_handle: handle.to_string(),
            media_kind: MediaKind::Image,
            mime_type: Some("image/jpeg".to_string()),
            caption: Some("olha".to_string()),
        }
    }

    #[tokio::test]
    async fn duplicate_message_id_is_ignored() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("a.db").to_str().unwrap())
            .await
            .unwrap();
        assert!(record_attachment(&db, &record("imagens/1.jpeg")).await.unwrap());
        assert!(!record_attachment(&db, &record("imagens/2.jpeg")).await.unwrap());

        let handle: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row(
                    "SELECT storage_handle FROM received_attachments WHERE message_id = 'MSG-1'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(handle, "imagens/1.jpeg");
    }
}
