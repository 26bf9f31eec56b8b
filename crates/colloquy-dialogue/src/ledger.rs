// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact ledger with an in-process name cache.
//!
//! The durable store is the source of truth. Every mutating call writes the
//! store first and then updates the cache; [`ContactLedger::load`] rebuilds
//! the cache from the store and must run before traffic is served.

use std::collections::BTreeMap;
use std::sync::Arc;

use colloquy_core::types::{Contact, ContactStatus};
use colloquy_core::{ColloquyError, StorageAdapter};
use dashmap::DashMap;
use tracing::{debug, info};

/// Read-through cache of contact display names over the durable ledger.
#[derive(Clone)]
pub struct ContactLedger {
    storage: Arc<dyn StorageAdapter>,
    names: Arc<DashMap<String, Option<String>>>,
}

impl ContactLedger {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            names: Arc::new(DashMap::new()),
        }
    }

    /// Replaces the cache with the durable contact list.
    pub async fn load(&self) -> Result<usize, ColloquyError> {
        let contacts = self.storage.list_contacts().await?;
        self.names.clear();
        for contact in &contacts {
            self.names
                .insert(contact.address.clone(), contact.name.clone());
        }
        info!(contacts = contacts.len(), "contact ledger loaded");
        Ok(contacts.len())
    }

    /// Returns the contact, creating it with status `New` when unseen.
    pub async fn observe(&self, address: &str) -> Result<Contact, ColloquyError> {
        if let Some(contact) = self.storage.get_contact(address).await? {
            self.names
                .entry(contact.address.clone())
                .or_insert_with(|| contact.name.clone());
            return Ok(contact);
        }

        if self
            .storage
            .insert_contact(address, None, ContactStatus::New)
            .await?
        {
            debug!(contact = %address, "new contact registered");
        }
        self.names.entry(address.to_string()).or_insert(None);

        Ok(self
            .storage
            .get_contact(address)
            .await?
            .unwrap_or_else(|| Contact {
                address: address.to_string(),
                name: None,
                status: ContactStatus::New,
                pending_attachment: None,
            }))
    }

    /// Records the display name and marks the contact active.
    pub async fn activate(&self, address: &str, name: &str) -> Result<(), ColloquyError> {
        self.storage.set_contact_name(address, name).await?;
        self.names
            .insert(address.to_string(), Some(name.to_string()));
        info!(contact = %address, "contact name recorded");
        Ok(())
    }

    /// Marks the contact as waiting for its name.
    pub async fn await_name(&self, address: &str) -> Result<(), ColloquyError> {
        self.storage
            .set_contact_status(address, ContactStatus::PendingName)
            .await?;
        self.names.entry(address.to_string()).or_insert(None);
        Ok(())
    }

    /// Every known contact with its display name, ordered by address.
    pub fn directory(&self) -> BTreeMap<String, Option<String>> {
        self.names
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
