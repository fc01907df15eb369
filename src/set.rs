//! A reader-writer-locked hash set with set algebra.
//!
//! Operations that involve two sets never hold both locks at once. The receiver's
//! elements are copied out under its own read lock, the lock is dropped, and the
//! copy is then probed against the other set under the other set's read lock.
//! `a.op(&b)` racing `b.op(&a)` therefore cannot deadlock, and `a.op(&a)` is fine.
//!
//! ```
//! use sync_set::SyncSet;
//!
//! let a = SyncSet::from([1, 2, 3]);
//! let b = SyncSet::from([1, 2, 3, 4, 5]);
//!
//! assert!(a.is_subset(&b));
//! assert!(!a.is_disjoint(&b));
//! assert_eq!(a.intersection(&b), a);
//! assert_eq!(a.union(&b), b);
//! assert!(a.difference(&b).is_empty());
//! ```

use crate::map::SyncMap;
use duplicate::duplicate_item;
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::{BitAnd, BitOr, Sub};
use tracing::trace;

pub struct SyncSet<K, S = RandomState> {
    base: SyncMap<K, (), S>,
}

impl<K> SyncSet<K, RandomState> {
    pub fn new() -> Self {
        Self {
            base: SyncMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            base: SyncMap::with_capacity(capacity),
        }
    }
}

impl<K, S> SyncSet<K, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            base: SyncMap::with_hasher(hasher),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            base: SyncMap::with_capacity_and_hasher(capacity, hasher),
        }
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn clear(&self) {
        self.base.clear()
    }
}

impl<K, S> SyncSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns `true` if `key` was not already present.
    pub fn insert(&self, key: K) -> bool {
        self.base.insert(key, ()).is_none()
    }

    /// Inserts every element under one write lock and returns how many were new.
    pub fn add<I>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
    {
        // Drain the caller's iterator before locking so it cannot re-enter the set.
        let keys = keys.into_iter().collect::<Vec<_>>();
        let mut map = self.base.write();
        keys.into_iter()
            .map(|key| map.insert(key, ()).is_none() as usize)
            .sum()
    }

    /// Returns `true` if `key` was present. Removing an absent element is a no-op.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.remove(key).is_some()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.contains_key(key)
    }
}

impl<K, S> SyncSet<K, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Copies the elements out in arbitrary order. Later mutation of the set does
    /// not affect the returned vector.
    pub fn to_vec(&self) -> Vec<K> {
        self.base.keys()
    }

    /// Every element of `self` is in `other`. The empty set is a subset of any set.
    pub fn is_subset<S2>(&self, other: &SyncSet<K, S2>) -> bool
    where
        S2: BuildHasher,
    {
        let mine = self.to_vec();
        let theirs = other.base.read();
        mine.len() <= theirs.len() && mine.iter().all(|key| theirs.contains_key(key))
    }

    pub fn is_superset<S2>(&self, other: &SyncSet<K, S2>) -> bool
    where
        S2: BuildHasher,
    {
        other.is_subset(self)
    }

    /// No element of `self` is in `other`. Vacuously true when either is empty.
    pub fn is_disjoint<S2>(&self, other: &SyncSet<K, S2>) -> bool
    where
        S2: BuildHasher,
    {
        let mine = self.to_vec();
        let theirs = other.base.read();
        !mine.iter().any(|key| theirs.contains_key(key))
    }

    fn filter_by<S2>(&self, other: &SyncSet<K, S2>, keep_shared: bool) -> Self
    where
        S: Default,
        S2: BuildHasher,
    {
        let mine = self.to_vec();
        let kept = {
            let theirs = other.base.read();
            mine.into_iter()
                .filter(|key| theirs.contains_key(key) == keep_shared)
                .collect::<Vec<_>>()
        };
        let result = Self::with_capacity_and_hasher(kept.len(), S::default());
        result.add(kept);
        result
    }

    /// Elements present in both sets, as a new set.
    pub fn intersection<S2>(&self, other: &SyncSet<K, S2>) -> Self
    where
        S: Default,
        S2: BuildHasher,
    {
        let result = self.filter_by(other, true);
        trace!(size = result.len(), "built intersection");
        result
    }

    /// Elements of `self` that are absent from `other`, as a new set.
    pub fn difference<S2>(&self, other: &SyncSet<K, S2>) -> Self
    where
        S: Default,
        S2: BuildHasher,
    {
        let result = self.filter_by(other, false);
        trace!(size = result.len(), "built difference");
        result
    }

    /// Elements present in either set, as a new set.
    pub fn union<S2>(&self, other: &SyncSet<K, S2>) -> Self
    where
        S: Default,
        S2: BuildHasher,
    {
        let mine = self.to_vec();
        let theirs = other.to_vec();
        let result = Self::with_capacity_and_hasher(mine.len().max(theirs.len()), S::default());
        result.add(mine);
        result.add(theirs);
        trace!(size = result.len(), "built union");
        result
    }
}

impl<K> Default for SyncSet<K, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> Clone for SyncSet<K, S>
where
    K: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            base: SyncMap::from(self.base.read().clone()),
        }
    }
}

impl<K, S> PartialEq for SyncSet<K, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl<K, S> Eq for SyncSet<K, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
}

impl<K, S> FromIterator<K> for SyncSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let set = Self::with_hasher(S::default());
        set.add(iter);
        set
    }
}

impl<K, S> Extend<K> for SyncSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl<K, const N: usize> From<[K; N]> for SyncSet<K, RandomState>
where
    K: Eq + Hash,
{
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

#[duplicate_item(
  op_trait  op_method  set_method;
  [BitOr]   [bitor]    [union];
  [BitAnd]  [bitand]   [intersection];
  [Sub]     [sub]      [difference];
)]
impl<K, S> op_trait<&SyncSet<K, S>> for &SyncSet<K, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher + Default,
{
    type Output = SyncSet<K, S>;

    fn op_method(self, other: &SyncSet<K, S>) -> SyncSet<K, S> {
        self.set_method(other)
    }
}

impl<K, S> fmt::Debug for SyncSet<K, S>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.base.read().keys()).finish()
    }
}

/// Renders as `{a, b, c}` in arbitrary order. Not meant to be parsed back.
impl<K, S> fmt::Display for SyncSet<K, S>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.base.read();
        f.write_str("{")?;
        for (i, key) in map.keys().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", key)?;
        }
        f.write_str("}")
    }
}
