use duplicate::duplicate_item;
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

/// A hash map behind a reader-writer lock.
///
/// Every operation takes `&self` and holds the lock only for its own duration.
/// Nothing borrowed from the map outlives the call; values and keys are copied out.
pub struct SyncMap<K, V, S = RandomState> {
    inner: RwLock<HashMap<K, V, S>>,
}

impl<K, V> SyncMap<K, V, RandomState> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }
}

impl<K, V, S> SyncMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_hasher(hasher)),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity_and_hasher(capacity, hasher)),
        }
    }

    // A panic inside user Hash/Eq code poisons the lock. The map itself is still
    // memory safe, so the guard is recovered instead of propagating the panic.
    #[duplicate_item(
      method  acquire  mode     guard_type;
      [read]  [read]   ["read"]  [RwLockReadGuard<'_, HashMap<K, V, S>>];
      [write] [write]  ["write"] [RwLockWriteGuard<'_, HashMap<K, V, S>>];
    )]
    pub(crate) fn method(&self) -> guard_type {
        self.inner.acquire().unwrap_or_else(|poisoned| {
            warn!(lock = mode, "recovering poisoned map lock");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }
}

impl<K, V, S> SyncMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.read().get(key).cloned()
    }

    /// Inserts `value` under `key`, returning the value it displaced, if any.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.write().insert(key, value)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key)
    }

    /// Copies the current keys out under a single read lock.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.read().keys().cloned().collect()
    }
}

impl<K, V> Default for SyncMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for SyncMap<K, V, S> {
    fn from(map: HashMap<K, V, S>) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }
}

impl<K, V, S> fmt::Debug for SyncMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.read().iter()).finish()
    }
}
