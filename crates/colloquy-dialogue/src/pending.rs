// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-attachment correlator.
//!
//! A caption-less file waits in the contact's single pending slot until the
//! next text message. Taking it clears the slot in the same store call, so an
//! attachment is offered to generation at most once.

use std::path::PathBuf;
use std::sync::Arc;

use colloquy_core::{ColloquyError, StorageAdapter};
use tracing::debug;

use crate::media::MediaStore;

/// Binds caption-less attachments to a later text message.
#[derive(Clone)]
pub struct PendingAttachments {
    storage: Arc<dyn StorageAdapter>,
    media: MediaStore,
}

impl PendingAttachments {
    pub fn new(storage: Arc<dyn StorageAdapter>, media: MediaStore) -> Self {
        Self { storage, media }
    }

    /// Sets (or clears, with `None`) the pending attachment. A displaced file
    /// is discarded per the media retention policy.
    pub async fn set(&self, contact: &str, handle: Option<PathBuf>) -> Result<(), ColloquyError> {
        let handle_str = handle.as_ref().map(|p| p.to_string_lossy().into_owned());
        let previous = self
            .storage
            .replace_pending_attachment(contact, handle_str.as_deref())
            .await?;

        if let Some(previous) = previous
            && Some(&previous) != handle_str.as_ref()
        {
            debug!(contact = %contact, displaced = %previous, "pending attachment replaced");
            self.media.discard(&PathBuf::from(previous)).await;
        }
        Ok(())
    }

    /// Reads and clears the pending attachment. A handle whose file is gone
    /// reads as `None`.
    pub async fn take(&self, contact: &str) -> Result<Option<PathBuf>, ColloquyError> {
        let Some(handle) = self.storage.take_pending_attachment(contact).await? else {
            return Ok(None);
        };
        let path = PathBuf::from(handle);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Ok(Some(path))
        } else {
            debug!(contact = %contact, path = %path.display(), "pending attachment file missing");
            Ok(None)
        }
    }

    /// Releases a taken attachment once generation is done with it.
    pub async fn consume(&self, path: PathBuf) {
        self.media.discard(&path).await;
    }
}
