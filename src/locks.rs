//! Per-key mutual exclusion for cache and derivative writers.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// A set of async locks addressed by string key.
///
/// Entries only live while some request holds or waits on them.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<LockMap>>,
}

/// Holds the lock for one key until dropped.
pub struct KeyGuard {
    key: String,
    locks: KeyedLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    /// Create an empty lock set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: impl Into<String>) -> KeyGuard {
        let key = key.into();
        let mutex = self.inner.lock().entry(key.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;

        KeyGuard {
            key,
            locks: self.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no key is currently held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release the owned guard first so its Arc no longer counts.
        drop(self.guard.take());

        let mut map = self.locks.inner.lock();
        if let Some(mutex) = map.get(&self.key)
            && Arc::strong_count(mutex) == 1
        {
            map.remove(&self.key);
        }
    }
}
