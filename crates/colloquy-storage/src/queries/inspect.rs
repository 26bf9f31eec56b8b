// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only paging over whitelisted tables for the admin records view.

use colloquy_core::ColloquyError;
use colloquy_core::types::{InspectTable, TablePage};
use rusqlite::params;
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};

use crate::database::{Database, map_tr_err};

/// Column list and ordering per table. Embedding BLOBs are never exposed.
fn select_for(table: InspectTable) -> (&'static str, &'static str, &'static str) {
    match table {
        InspectTable::Contacts => (
            "contacts",
            "address, name, status, pending_attachment, created_at, updated_at",
            "address",
        ),
        InspectTable::DialogueTurns => (
            "dialogue_turns",
            "id, contact, role, text, from_audio, created_at",
            "id DESC",
        ),
        InspectTable::Settings => ("settings", "key, value, updated_at", "key"),
        InspectTable::ReceivedAttachments => (
            "received_attachments",
            "id, message_id, contact, storage_handle, media_kind, mime_type, caption, created_at",
            "created_at DESC, id DESC",
        ),
        InspectTable::KnowledgeChunks => (
            "knowledge_chunks",
            "id, text, dimensions, created_at",
            "id",
        ),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<{} bytes>", b.len())),
    }
}

/// One page of `table`. `limit` and `offset` must already be validated.
pub async fn inspect_table(
    db: &Database,
    table: InspectTable,
    limit: i64,
    offset: i64,
) -> Result<TablePage, ColloquyError> {
    let (name, columns, order) = select_for(table);
    db.connection()
        .call(move |conn| {
            let total_records: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {name}"), [], |row| row.get(0))?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {columns} FROM {name} ORDER BY {order} LIMIT ?1 OFFSET ?2"
            ))?;
            let column_names: Vec<String> =
                stmt.column_names().into_iter().map(str::to_string).collect();
            let records = stmt
                .query_map(params![limit, offset], |row| {
                    let mut record = Map::new();
                    for (i, column) in column_names.iter().enumerate() {
                        record.insert(column.clone(), to_json(row.get_ref(i)?));
                    }
                    Ok(record)
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(TablePage {
                table,
                total_records,
                limit,
                offset,
                records,
            })
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use colloquy_core::types::NewTurn;
    use tempfile::tempdir;

    use super::*;
    use crate::queries::{history, knowledge};

    #[tokio::test]
    async fn turns_page_newest_first_with_total() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("i.db").to_str().unwrap())
            .await
            .unwrap();
        for i in 0..5 {
            history::append_turn(&db, &NewTurn::user("a", format!("m{i}")))
                .await
                .unwrap();
        }
        let page = inspect_table(&db, InspectTable::DialogueTurns, 2, 1)
            .await
            .unwrap();
        assert_eq!(page.total_records, 5);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0]["text"], "m3");
        assert_eq!(page.records[1]["text"], "m2");
    }

    #[tokio::test]
    async fn knowledge_page_omits_embedding() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("i.db").to_str().unwrap())
            .await
            .unwrap();
        knowledge::insert_knowledge(&db, "texto", &[0.5, 0.5, 0.5])
            .await
            .unwrap();
        let page = inspect_table(&db, InspectTable::KnowledgeChunks, 10, 0)
            .await
            .unwrap();
        let record = &page.records[0];
        assert!(!record.contains_key("embedding"));
        assert_eq!(record["dimensions"], 3);
    }

    #[tokio::test]
    async fn offset_past_end_is_empty() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("i.db").to_str().unwrap())
            .await
            .unwrap();
        let page = inspect_table(&db, InspectTable::Settings, 10, 50).await.unwrap();
        assert_eq!(page.total_records, 1);
        assert!(page.records.is_empty());
    }
}
