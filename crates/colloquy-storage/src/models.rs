// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the domain types in `colloquy-core`.

use colloquy_core::types::{Contact, ContactStatus, DialogueTurn, KnowledgeChunk, Speaker};

/// Serialize an f32 vector to a little-endian byte BLOB.
pub fn vec_to_blob(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize a little-endian byte BLOB into an f32 vector.
///
/// Trailing bytes that do not form a whole f32 are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub(crate) const CONTACT_COLUMNS: &str = "address, name, status, pending_attachment";

pub(crate) fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
    let status: String = row.get(2)?;
    Ok(Contact {
        address: row.get(0)?,
        name: row.get(1)?,
        status: ContactStatus::from_str_value(&status),
        pending_attachment: row.get(3)?,
    })
}

pub(crate) const TURN_COLUMNS: &str = "id, contact, role, text, from_audio, created_at";

pub(crate) fn row_to_turn(row: &rusqlite::Row) -> rusqlite::Result<DialogueTurn> {
    let role: String = row.get(2)?;
    Ok(DialogueTurn {
        seq: row.get(0)?,
        contact: row.get(1)?,
        speaker: Speaker::from_str_value(&role),
        text: row.get(3)?,
        from_audio: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<KnowledgeChunk> {
    let blob: Vec<u8> = row.get(2)?;
    Ok(KnowledgeChunk {
        id: row.get(0)?,
        text: row.get(1)?,
        embedding: blob_to_vec(&blob),
    })
}

/// Extension trait for optional row queries.
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
