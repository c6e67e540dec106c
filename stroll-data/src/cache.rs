//! Bounded memoisation of collaborator calls.
//!
//! [`CallCache`] wraps an [`LruCache`] in a [`Mutex`] so several route
//! generations can populate it concurrently. The lock is never held while
//! the wrapped call runs: two threads missing on the same key may both
//! perform the call, and the later result wins.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;

/// Thread-safe least-recently-used cache of successful call results.
///
/// A capacity of zero disables caching entirely.
///
/// # Examples
/// ```
/// use stroll_data::CallCache;
///
/// let cache: CallCache<u32, String> = CallCache::new("squares", 8);
/// let first = cache.get_or_try_insert_with(3, || Ok::<_, ()>("nine".to_owned()));
/// let again = cache.get_or_try_insert_with(3, || Err(()));
/// assert_eq!(first, again);
/// ```
pub struct CallCache<K, V> {
    name: &'static str,
    entries: Option<Mutex<LruCache<K, V>>>,
}

impl<K: Hash + Eq, V> std::fmt::Debug for CallCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

impl<K: Hash + Eq, V: Clone> CallCache<K, V> {
    /// Return the cached value for `key`, or run `call` and cache its
    /// success.
    ///
    /// Errors from `call` are returned unchanged and leave the cache
    /// untouched.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `call`.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        call: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let Some(entries) = &self.entries else {
            return call();
        };
        if let Some(hit) = lock(entries).get(&key).cloned() {
            log::debug!("{} cache hit", self.name);
            return Ok(hit);
        }
        let value = call()?;
        lock(entries).put(key, value.clone());
        Ok(value)
    }
}

impl<K: Hash + Eq, V> CallCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    /// Maximum number of entries; zero when caching is disabled.
    pub fn capacity(&self) -> usize {
        self.entries
            .as_ref()
            .map_or(0, |entries| lock(entries).cap().get())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| lock(entries).len())
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            lock(entries).clear();
        }
    }
}

// Entries are written whole, so a poisoned lock still guards valid data.
fn lock<K: Hash + Eq, V>(entries: &Mutex<LruCache<K, V>>) -> MutexGuard<'_, LruCache<K, V>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
