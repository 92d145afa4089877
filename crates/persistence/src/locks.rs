// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-key write serialization.
//!
//! Every session key gets its own `tokio::sync::Mutex`. Tokio's mutex is
//! fair, so writers for one key are released in the order they queued.
//! Entries are removed from the table as soon as nobody holds or awaits
//! them, which keeps the table bounded by the number of keys in use.

use civdraft_domain::SessionKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OwnedMutexGuard;

type LockTable = HashMap<SessionKey, Arc<tokio::sync::Mutex<()>>>;

/// The table of per-key write locks.
#[derive(Debug, Clone, Default)]
pub struct WriteLocks {
    table: Arc<Mutex<LockTable>>,
}

impl WriteLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `key`.
    ///
    /// Dropping the returned guard releases the key. Dropping the future
    /// before it completes leaves the queue intact.
    pub async fn acquire(&self, key: &SessionKey) -> KeyLockGuard {
        let entry: Arc<tokio::sync::Mutex<()>> = {
            let mut table: MutexGuard<'_, LockTable> =
                self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(key.clone()).or_default())
        };

        // Built before waiting so a cancelled wait still runs the cleanup.
        let mut held: KeyLockGuard = KeyLockGuard {
            key: key.clone(),
            table: Arc::clone(&self.table),
            entry: Arc::clone(&entry),
            guard: None,
        };
        held.guard = Some(entry.lock_owned().await);
        held
    }

    /// Number of keys currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no key is locked or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive write access to one session key.
#[derive(Debug)]
pub struct KeyLockGuard {
    key: SessionKey,
    table: Arc<Mutex<LockTable>>,
    entry: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLockGuard {
    /// The locked key.
    #[must_use]
    pub const fn key(&self) -> &SessionKey {
        &self.key
    }
}

impl Drop for KeyLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table: MutexGuard<'_, LockTable> =
            self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Two references left means only the table and this guard know the
        // entry; any waiter would hold a third.
        if Arc::strong_count(&self.entry) == 2 {
            table.remove(&self.key);
        }
    }
}
