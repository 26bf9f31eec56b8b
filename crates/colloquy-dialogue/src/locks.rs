// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact mutual exclusion.
//!
//! Events for the same contact are processed one at a time; different
//! contacts proceed in parallel. Lock entries are dropped from the map once
//! nobody holds or waits on them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-contact locks.
#[derive(Clone, Default)]
pub struct ContactLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ContactLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `contact`.
    pub async fn acquire(&self, contact: &str) -> ContactGuard {
        let lock = self
            .locks
            .entry(contact.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        ContactGuard {
            guard: Some(guard),
            contact: contact.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of contacts with a live lock entry.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Held while an event for one contact is processed.
pub struct ContactGuard {
    guard: Option<OwnedMutexGuard<()>>,
    contact: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for ContactGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: no holder and no waiter.
        self.locks
            .remove_if(&self.contact, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_contact_is_serialized() {
        let locks = ContactLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire("a@x").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn different_contacts_do_not_block() {
        let locks = ContactLocks::new();
        let _a = locks.acquire("a@x").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b@x")).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn entry_is_removed_after_release() {
        let locks = ContactLocks::new();
        {
            let _guard = locks.acquire("a@x").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
