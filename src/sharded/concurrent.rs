//! A sharded map that can be shared between threads.
//!
//! Each shard sits behind its own [`parking_lot::Mutex`], so operations on
//! keys in different shards proceed in parallel.  A range query locks every
//! shard in ascending index order, which keeps concurrent range queries from
//! deadlocking each other.

use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};

use parking_lot::{Mutex, MutexGuard};

use super::hash::BuildKnuthHasher;
use crate::collector::RangeCollector;
use crate::config::MapConfig;
use crate::hybrid::{HybridTree, InsertOutcome};
use crate::TreeError;

/// A [`ShardedMap`](crate::ShardedMap) with per-shard locking.
///
/// Every method takes `&self`.  Lookups return clones because a reference
/// into a shard cannot outlive its lock; use
/// [`with_value`](#method.with_value) to inspect a value in place.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use hybrid_collections::ConcurrentShardedMap;
///
/// let m = Arc::new(ConcurrentShardedMap::new(8, None).unwrap());
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let m = Arc::clone(&m);
///         std::thread::spawn(move || {
///             for k in 0..100 {
///                 m.insert(t * 100 + k, t).unwrap();
///             }
///         })
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
/// assert_eq!(m.len(), 400);
/// ```
pub struct ConcurrentShardedMap<K, V, S = BuildKnuthHasher> {
    shards: Box<[Mutex<HybridTree<K, V>>]>,
    hasher: S,
}

impl<K, V> ConcurrentShardedMap<K, V, BuildKnuthHasher> {
    /// Creates a map of `shard_count` locked trees, each bounded by
    /// `shard_capacity` when given.
    pub fn new(shard_count: usize, shard_capacity: Option<usize>) -> Result<Self, TreeError> {
        let mut config = MapConfig::new().shard_count(shard_count);
        config.shard_capacity = shard_capacity;
        Self::with_config(config)
    }

    /// Creates a map from a [`MapConfig`].
    pub fn with_config(config: MapConfig) -> Result<Self, TreeError> {
        Self::with_config_and_hasher(config, BuildKnuthHasher)
    }
}

impl<K, V, S> ConcurrentShardedMap<K, V, S> {
    /// Creates a map of `shard_count` unbounded trees that picks shards with
    /// `hasher`.
    pub fn with_hasher(shard_count: usize, hasher: S) -> Result<Self, TreeError> {
        Self::with_config_and_hasher(MapConfig::new().shard_count(shard_count), hasher)
    }

    /// Creates a map from a [`MapConfig`] that picks shards with `hasher`.
    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, TreeError> {
        let shards = super::build_shards(&config)?
            .into_iter()
            .map(Mutex::new)
            .collect();
        Ok(ConcurrentShardedMap { shards, hasher })
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total number of entries.  Shards are counted one at a time, so the
    /// result may be stale under concurrent updates.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    /// Returns true if every shard was empty when it was looked at.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.lock().is_empty())
    }

    /// Number of entries in each shard, by shard index.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(|s| s.lock().len()).collect()
    }

    /// Drops all entries, one shard at a time.
    pub fn clear(&self) {
        self.shards.iter().for_each(|s| s.lock().clear());
    }

    /// Consumes the map and returns its shards.
    pub fn into_shards(self) -> Vec<HybridTree<K, V>> {
        self.shards
            .into_vec()
            .into_iter()
            .map(Mutex::into_inner)
            .collect()
    }

    fn lock_all(&self) -> Vec<MutexGuard<'_, HybridTree<K, V>>> {
        self.shards.iter().map(|s| s.lock()).collect()
    }
}

impl<K: Ord + Clone, V: Clone, S> ConcurrentShardedMap<K, V, S> {
    /// Clones the entries with `low <= key <= high` out of every shard,
    /// sorted by key.  All shards stay locked while the entries are
    /// gathered, so the result is a consistent snapshot.
    pub fn range<Q>(&self, low: &Q, high: &Q) -> Result<RangeCollector<(K, V)>, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let guards = self.lock_all();
        let mut out = RangeCollector::new();
        for shard in guards.iter() {
            for (k, v) in shard.range(low, high)? {
                out.push((k.clone(), v.clone()))?;
            }
        }
        drop(guards);

        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}

impl<K, V, S> ConcurrentShardedMap<K, V, S>
where
    K: Ord + Hash,
    S: BuildHasher,
{
    /// Index of the shard responsible for `key`.
    pub fn shard_of<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hasher.hash_one(key) % self.shards.len() as u64) as usize
    }

    fn shard<Q>(&self, key: &Q) -> MutexGuard<'_, HybridTree<K, V>>
    where
        Q: Hash + ?Sized,
    {
        self.shards[self.shard_of(key)].lock()
    }

    /// Inserts into the key's shard.
    pub fn insert(&self, key: K, val: V) -> Result<InsertOutcome<V>, TreeError> {
        self.shard(&key).insert(key, val)
    }

    /// Removes a key and returns its value.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shard(key).delete(key)
    }

    /// Returns true if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shard(key).contains_key(key)
    }

    /// Runs `f` on the key's value while its shard is locked.
    pub fn with_value<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.shard(key).get(key).map(f)
    }

    /// Runs `f` on a mutable reference to the key's value.
    pub fn with_value_mut<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        self.shard(key).get_mut(key).map(f)
    }

    /// Number of `search` hits recorded for a key.
    pub fn access_count<Q>(&self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shard(key).access_count(key)
    }
}

impl<K, V, S> ConcurrentShardedMap<K, V, S>
where
    K: Ord + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// Returns a clone of the key's value without counting the hit.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shard(key).get(key).cloned()
    }

    /// Returns a clone of the key's value and counts the hit.
    pub fn search<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shard(key).search(key).cloned()
    }
}

impl<K, V, S> Debug for ConcurrentShardedMap<K, V, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentShardedMap")
            .field("shard_count", &self.shards.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn parallel_inserts_then_range() {
        let m = ConcurrentShardedMap::new(16, None).unwrap();
        thread::scope(|s| {
            for t in 0..4i32 {
                let m = &m;
                s.spawn(move || {
                    for k in (t..1000).step_by(4) {
                        assert!(m.insert(k, k * 2).unwrap().is_inserted());
                    }
                });
            }
        });

        assert_eq!(m.len(), 1000);
        let r = m.range(&100, &199).unwrap().into_vec();
        let want: Vec<_> = (100..200).map(|k| (k, k * 2)).collect();
        assert_eq!(r, want);
    }

    #[test]
    fn mixed_readers_and_writers() {
        let m = ConcurrentShardedMap::new(4, None).unwrap();
        for k in 0..200u32 {
            let _ = m.insert(k, 0u32).unwrap();
        }

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for k in 0..200u32 {
                        m.with_value_mut(&k, |v| *v += 1);
                        assert!(m.search(&k).is_some());
                    }
                });
            }
            s.spawn(|| {
                for k in 200..300u32 {
                    let _ = m.insert(k, 100).unwrap();
                    assert_eq!(m.delete(&k), Some(100));
                }
            });
        });

        assert_eq!(m.len(), 200);
        for k in 0..200u32 {
            assert_eq!(m.get(&k), Some(4));
            assert_eq!(m.access_count(&k), Some(4));
        }
    }

    #[test]
    fn full_shard_reports_error() {
        let m = ConcurrentShardedMap::new(1, Some(1)).unwrap();
        let _ = m.insert("a", 1).unwrap();
        assert_eq!(m.insert("b", 2), Err(TreeError::Full { capacity: 1 }));
        assert!(m.contains_key("a"));
        assert!(!m.contains_key("b"));
        assert_eq!(m.with_value("a", |v| v + 1), Some(2));

        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.into_shards().len(), 1);
    }
}
