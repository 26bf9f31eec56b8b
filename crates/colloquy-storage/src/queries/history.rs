// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue history: append-only turns per contact.

use colloquy_core::ColloquyError;
use colloquy_core::types::{DialogueTurn, NewTurn};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{TURN_COLUMNS, row_to_turn};

/// Append a turn and return its sequence number.
pub async fn append_turn(db: &Database, turn: &NewTurn) -> Result<i64, ColloquyError> {
    let turn = turn.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dialogue_turns (contact, role, text, from_audio) VALUES (?1, ?2, ?3, ?4)",
                params![turn.contact, turn.speaker.as_str(), turn.text, turn.from_audio],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent `limit` turns for `contact`, oldest first.
pub async fn recent_turns(
    db: &Database,
    contact: &str,
    limit: usize,
) -> Result<Vec<DialogueTurn>, ColloquyError> {
    let contact = contact.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM dialogue_turns
                 WHERE contact = ?1 ORDER BY id DESC LIMIT ?2"
            ))?;
            let mut turns = stmt
                .query_map(params![contact, limit], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            turns.reverse();
            Ok(turns)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use colloquy_core::types::Speaker;
    use tempfile::tempdir;

    use super::*;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn recent_turns_are_chronological_and_windowed() {
        let (db, _dir) = setup().await;
        for i in 0..5 {
            append_turn(&db, &NewTurn::user("a", format!("pergunta {i}")))
                .await
                .unwrap();
            append_turn(&db, &NewTurn::assistant("a", format!("resposta {i}")))
                .await
                .unwrap();
        }
        append_turn(&db, &NewTurn::user("b", "outro contato"))
            .await
            .unwrap();

        let turns = recent_turns(&db, "a", 3).await.unwrap();
        let texts: Vec<&str> = turns.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["resposta 3", "pergunta 4", "resposta 4"]);
        assert!(turns.windows(2).all(|w| w[0].seq < w[1].seq));
        assert_eq!(turns[1].speaker, Speaker::User);
    }

    #[tokio::test]
    async fn audio_flag_round_trips() {
        let (db, _dir) = setup().await;
        append_turn(&db, &NewTurn::user_audio("a", "[Áudio transcrito]: oi"))
            .await
            .unwrap();
        let turns = recent_turns(&db, "a", 10).await.unwrap();
        assert!(turns[0].from_audio);
        assert!(!turns[0].created_at.is_empty());
    }

    #[tokio::test]
    async fn sequence_numbers_increase() {
        let (db, _dir) = setup().await;
        let first = append_turn(&db, &NewTurn::user("a", "1")).await.unwrap();
        let second = append_turn(&db, &NewTurn::assistant("a", "2")).await.unwrap();
        assert!(second > first);
    }
}
