// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge store: text chunks with their embedding vectors.

use colloquy_core::ColloquyError;
use colloquy_core::types::KnowledgeChunk;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{row_to_chunk, vec_to_blob};

/// Delete every chunk, returning how many were removed.
pub async fn clear_knowledge(db: &Database) -> Result<usize, ColloquyError> {
    db.connection()
        .call(|conn| conn.execute("DELETE FROM knowledge_chunks", []))
        .await
        .map_err(map_tr_err)
}

pub async fn insert_knowledge(
    db: &Database,
    text: &str,
    embedding: &[f32],
) -> Result<i64, ColloquyError> {
    let text = text.to_string();
    let blob = vec_to_blob(embedding);
    let dimensions = embedding.len() as i64;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO knowledge_chunks (text, embedding, dimensions) VALUES (?1, ?2, ?3)",
                params![text, blob, dimensions],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Every chunk in insertion order.
pub async fn knowledge_chunks(db: &Database) -> Result<Vec<KnowledgeChunk>, ColloquyError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, text, embedding FROM knowledge_chunks ORDER BY id")?;
            stmt.query_map([], row_to_chunk)?
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn insert_list_and_clear() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("k.db").to_str().unwrap())
            .await
            .unwrap();
        let first = insert_knowledge(&db, "Entrega em 3 dias.", &[1.0, 0.0])
            .await
            .unwrap();
        let second = insert_knowledge(&db, "Garantia de 1 ano.", &[0.0, 1.0])
            .await
            .unwrap();
        assert!(second > first);

        let chunks = knowledge_chunks(&db).await.unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Entrega em 3 dias.");
        assert_eq!(chunks[1].embedding, vec![0.0, 1.0]);

        assert_eq!(clear_knowledge(&db).await.unwrap(), 2);
        assert!(knowledge_chunks(&db).await.unwrap().is_empty());
    }
}
