//! Keyed mutual exclusion for remote entities.
//!
//! Resource operations run concurrently inside the plugin process. Two
//! operations that mutate the same remote object (the same VM, the same
//! virtual network) must not interleave their API calls, so each one holds
//! the lock for that object's key for the duration of the mutation.
//!
//! Locks are created on first use and never removed. The map is a sharded
//! [`DashMap`], so inserting a lock for one key never blocks operations on
//! keys that live in other shards, and the per-key critical sections are
//! independent [`tokio::sync::Mutex`]es.
//!
//! Callers that need more than one key in a single operation must always
//! acquire the keys in one fixed global order (for example sorted
//! lexicographically); the registry does not detect lock-order cycles.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Registry mapping arbitrary string keys to exclusive locks.
#[derive(Default)]
pub struct KeyedMutex {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedMutex {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock object for `key`, creating it on first reference.
    ///
    /// Concurrent first references to the same key all observe the same
    /// lock object.
    #[must_use]
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(key) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .locks
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    /// Wait until the lock for `key` is held.
    ///
    /// Waits indefinitely while another operation holds the same key. The
    /// lock is released when the returned guard is dropped or passed to
    /// [`KeyedGuard::release`].
    pub async fn acquire(&self, key: &str) -> KeyedGuard {
        let lock = self.lock_for(key);
        trace!(key, "waiting for keyed lock");
        let guard = lock.lock_owned().await;
        trace!(key, "keyed lock acquired");
        KeyedGuard::new(key, guard)
    }

    /// Blocking variant of [`acquire`](Self::acquire) for synchronous callers.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_acquire(&self, key: &str) -> KeyedGuard {
        let lock = self.lock_for(key);
        trace!(key, "waiting for keyed lock (blocking)");
        let guard = lock.blocking_lock_owned();
        KeyedGuard::new(key, guard)
    }

    /// Take the lock for `key` only if nobody holds it right now.
    #[must_use]
    pub fn try_acquire(&self, key: &str) -> Option<KeyedGuard> {
        let lock = self.lock_for(key);
        lock.try_lock_owned()
            .ok()
            .map(|guard| KeyedGuard::new(key, guard))
    }

    /// Relinquish a lock previously returned by this registry.
    pub fn release(&self, guard: KeyedGuard) {
        guard.release();
    }

    /// Number of keys that have ever been locked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl fmt::Debug for KeyedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMutex")
            .field("keys", &self.locks.len())
            .finish()
    }
}

/// Exclusive hold on one key of a [`KeyedMutex`].
#[must_use = "the keyed lock is released as soon as the guard is dropped"]
pub struct KeyedGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl KeyedGuard {
    fn new(key: &str, guard: OwnedMutexGuard<()>) -> Self {
        Self {
            key: key.to_owned(),
            _guard: guard,
        }
    }

    /// The key this guard holds.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release the lock.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        trace!(key = %self.key, "keyed lock released");
    }
}

impl fmt::Debug for KeyedGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedGuard").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Barrier;

    use super::*;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let registry = Arc::new(KeyedMutex::new());
        let held = registry.acquire("R1").await;

        let contender = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let guard = registry.acquire("R1").await;
                guard.key().to_owned()
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());
        assert!(registry.try_acquire("R1").is_none());

        registry.release(held);
        let key = tokio::time::timeout(Duration::from_secs(5), contender)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key, "R1");
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let registry = KeyedMutex::new();
        let r1 = registry.acquire("R1").await;
        let r2 = tokio::time::timeout(Duration::from_secs(1), registry.acquire("R2"))
            .await
            .unwrap();

        assert_eq!(r1.key(), "R1");
        assert_eq!(r2.key(), "R2");
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_try_acquire_after_release() {
        let registry = KeyedMutex::new();
        let guard = registry.try_acquire("vm-7").unwrap();
        assert!(registry.try_acquire("vm-7").is_none());
        guard.release();
        assert!(registry.try_acquire("vm-7").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_first_use_shares_one_lock() {
        let registry = Arc::new(KeyedMutex::new());
        let barrier = Arc::new(Barrier::new(100));
        let mut handles = Vec::new();

        for _ in 0..100 {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                let lock = registry.lock_for("unseen");
                let _guard = registry.acquire("unseen").await;
                lock
            }));
        }

        let mut locks = Vec::new();
        for handle in handles {
            locks.push(handle.await.unwrap());
        }

        assert_eq!(registry.len(), 1);
        let first = &locks[0];
        assert!(locks.iter().all(|lock| Arc::ptr_eq(first, lock)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_critical_sections_never_overlap() {
        let registry = Arc::new(KeyedMutex::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();

        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = registry.acquire("image-42").await;
                let now = inside.fetch_add(1, Ordering::SeqCst).saturating_add(1);
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blocking_acquire_outside_runtime() {
        let registry = KeyedMutex::new();
        let guard = registry.blocking_acquire("host-1");
        assert_eq!(guard.key(), "host-1");
        assert!(registry.try_acquire("host-1").is_none());
        drop(guard);
        assert!(registry.try_acquire("host-1").is_some());
    }
}
