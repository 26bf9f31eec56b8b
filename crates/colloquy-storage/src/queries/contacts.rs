// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact ledger operations.

use colloquy_core::ColloquyError;
use colloquy_core::types::{Contact, ContactStatus};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{CONTACT_COLUMNS, OptionalExt, row_to_contact};

pub async fn get_contact(db: &Database, address: &str) -> Result<Option<Contact>, ColloquyError> {
    let address = address.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE address = ?1"),
                params![address],
                row_to_contact,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All contacts ordered by address.
pub async fn list_contacts(db: &Database) -> Result<Vec<Contact>, ColloquyError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY address"
            ))?;
            stmt.query_map([], row_to_contact)?
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a contact unless the address is already known.
///
/// Returns `true` when a row was created.
pub async fn insert_contact(
    db: &Database,
    address: &str,
    name: Option<&str>,
    status: ContactStatus,
) -> Result<bool, ColloquyError> {
    let address = address.to_string();
    let name = name.map(str::to_string);
    let status = status.as_str();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO contacts (address, name, status) VALUES (?1, ?2, ?3)",
                params![address, name, status],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Store the display name and move the contact to `active`, creating the row
/// if it does not exist yet.
pub async fn set_contact_name(db: &Database, address: &str, name: &str) -> Result<(), ColloquyError> {
    let address = address.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO contacts (address, name, status) VALUES (?1, ?2, 'active')
                 ON CONFLICT(address) DO UPDATE SET
                    name = excluded.name,
                    status = 'active',
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![address, name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Set the onboarding status, creating the row if needed.
pub async fn set_contact_status(
    db: &Database,
    address: &str,
    status: ContactStatus,
) -> Result<(), ColloquyError> {
    let address = address.to_string();
    let status = status.as_str();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO contacts (address, status) VALUES (?1, ?2)
                 ON CONFLICT(address) DO UPDATE SET
                    status = excluded.status,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![address, status],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the pending-attachment slot and return what it held before.
///
/// A contact row is created in `new` status if the address is unknown.
pub async fn replace_pending_attachment(
    db: &Database,
    address: &str,
    handle: Option<&str>,
) -> Result<Option<String>, ColloquyError> {
    let address = address.to_string();
    let handle = handle.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO contacts (address) VALUES (?1)",
                params![address],
            )?;
            let previous: Option<String> = tx.query_row(
                "SELECT pending_attachment FROM contacts WHERE address = ?1",
                params![address],
                |row| row.get(0),
            )?;
            tx.execute(
                "UPDATE contacts SET pending_attachment = ?2,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE address = ?1",
                params![address, handle],
            )?;
            tx.commit()?;
            Ok(previous)
        })
        .await
        .map_err(map_tr_err)
}

/// Read and clear the pending-attachment slot in one writer call, so two
/// concurrent takers can never both observe the same handle.
pub async fn take_pending_attachment(
    db: &Database,
    address: &str,
) -> Result<Option<String>, ColloquyError> {
    let address = address.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let pending: Option<String> = tx
                .query_row(
                    "SELECT pending_attachment FROM contacts WHERE address = ?1",
                    params![address],
                    |row| row.get(0),
                )
                .optional()?
                .flatten();
            if pending.is_some() {
                tx.execute(
                    "UPDATE contacts SET pending_attachment = NULL,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE address = ?1",
                    params![address],
                )?;
            }
            tx.commit()?;
            Ok(pending)
        })
        .await
        .map_err(map_tr_err)
}
