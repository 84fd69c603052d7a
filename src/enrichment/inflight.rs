//! Per-key async locks for collapsing duplicate cache misses.
//!
//! Callers that miss the cache for the same key queue up behind one lock.
//! The first holder talks to the provider and fills the cache; the rest see
//! [`FlightGuard::waited`] and check the cache again before doing anything.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub(crate) struct InFlight {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `key`.
    pub(crate) async fn acquire(&self, key: String) -> FlightGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        // Built before awaiting so a cancelled waiter still cleans up its entry
        let mut guard = FlightGuard {
            table: self,
            key,
            lock: Arc::clone(&lock),
            held: None,
            waited: false,
        };

        match lock.clone().try_lock_owned() {
            Ok(held) => guard.held = Some(held),
            Err(_) => {
                guard.waited = true;
                guard.held = Some(lock.lock_owned().await);
            }
        }
        guard
    }

    /// Number of keys with a live lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

pub(crate) struct FlightGuard<'a> {
    table: &'a InFlight,
    key: String,
    lock: Arc<AsyncMutex<()>>,
    held: Option<OwnedMutexGuard<()>>,
    waited: bool,
}

impl FlightGuard<'_> {
    /// True if another caller held the key while this one queued.
    pub(crate) fn waited(&self) -> bool {
        self.waited
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.held.take();

        let mut locks = self.table.locks.lock();
        // One reference in the map, one here: nobody else is queued
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}
