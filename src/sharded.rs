use std::borrow::Borrow;
use std::fmt::{Debug, Formatter};
use std::hash::{BuildHasher, Hash};

pub mod concurrent;
pub mod hash;

use hash::BuildKnuthHasher;

use crate::collector::RangeCollector;
use crate::config::MapConfig;
use crate::hybrid::{HybridTree, InsertOutcome};
use crate::TreeError;

fn build_shards<K, V>(config: &MapConfig) -> Result<Vec<HybridTree<K, V>>, TreeError> {
    config.validate()?;

    let mut shards = Vec::new();
    shards.try_reserve_exact(config.shard_count)?;
    for shard in 0..config.shard_count {
        // an early return drops the shards built so far
        match HybridTree::with_config(config.tree_config()) {
            Ok(t) => shards.push(t),
            Err(e) => {
                tracing::error!(shard, error = %e, "shard construction failed");
                return Err(e);
            }
        }
    }

    tracing::debug!(shard_count = config.shard_count, "shards created");
    Ok(shards)
}

/// A map that spreads its keys over a fixed number of independent
/// [`HybridTree`]s.
///
/// The shard holding a key is `hash(key) % shard_count`; the default hasher
/// is [`BuildKnuthHasher`].  Point operations touch a single shard.
/// [`range`](#method.range) visits every shard and sorts the merged result,
/// since no order holds across shards.
///
/// # Examples
/// ```
/// use hybrid_collections::ShardedMap;
///
/// let mut m = ShardedMap::new(4, None).unwrap();
/// for k in [1, 5, 9, 12, 18, 30] {
///     m.insert(k, k * 10).unwrap();
/// }
/// let keys: Vec<_> = m.range(&4, &18).unwrap().iter().map(|e| *e.0).collect();
/// assert_eq!(keys, vec![5, 9, 12, 18]);
/// ```
#[derive(Clone)]
pub struct ShardedMap<K, V, S = BuildKnuthHasher> {
    shards: Vec<HybridTree<K, V>>,
    hasher: S,
}

impl<K, V> ShardedMap<K, V, BuildKnuthHasher> {
    /// Creates a map of `shard_count` trees, each bounded by
    /// `shard_capacity` when given.
    ///
    /// Fails with [`TreeError::InvalidShardCount`] for zero shards,
    /// [`TreeError::InvalidCapacity`] for a zero capacity, and
    /// [`TreeError::Alloc`] when storage cannot be reserved.
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

impl<K, V, S> ShardedMap<K, V, S> {
    /// Creates a map of `shard_count` unbounded trees that picks shards with
    /// `hasher` instead of the Knuth hash.
    ///
    /// # Examples
    /// ```
    /// use std::collections::hash_map::RandomState;
    /// use hybrid_collections::ShardedMap;
    ///
    /// let mut m = ShardedMap::with_hasher(8, RandomState::new()).unwrap();
    /// m.insert("k", 1).unwrap();
    /// assert_eq!(m.get("k"), Some(&1));
    /// ```
    pub fn with_hasher(shard_count: usize, hasher: S) -> Result<Self, TreeError> {
        Self::with_config_and_hasher(MapConfig::new().shard_count(shard_count), hasher)
    }

    /// Creates a map from a [`MapConfig`] that picks shards with `hasher`.
    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, TreeError> {
        Ok(ShardedMap {
            shards: build_shards(&config)?,
            hasher,
        })
    }

    /// Total number of entries over all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Returns true if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.is_empty())
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Number of entries in each shard, by shard index.
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(|s| s.len()).collect()
    }

    /// Average number of entries per shard.
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.shards.len() as f64
    }

    /// The shards themselves, by shard index.
    pub fn shards(&self) -> &[HybridTree<K, V>] {
        &self.shards
    }

    /// Drops all entries from all shards.
    pub fn clear(&mut self) {
        self.shards.iter_mut().for_each(|s| s.clear());
    }

    /// Iterates over all entries shard by shard.  Entries are sorted within
    /// a shard but not across shards.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.shards.iter().flat_map(|s| s.iter())
    }

    /// Hot keys of every shard, shard by shard.
    pub fn hot_keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.shards.iter().flat_map(|s| s.hot_keys())
    }
}

impl<K: Ord, V, S> ShardedMap<K, V, S> {
    /// Collects the entries with `low <= key <= high` from every shard,
    /// sorted by key.
    pub fn range<Q>(&self, low: &Q, high: &Q) -> Result<RangeCollector<(&K, &V)>, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut out = RangeCollector::new();
        for shard in self.shards.iter() {
            shard.range_into(low, high, &mut out)?;
        }
        out.sort_by(|a, b| a.0.cmp(b.0));
        Ok(out)
    }
}

impl<K, V, S> ShardedMap<K, V, S>
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

    /// Inserts into the key's shard.  See [`HybridTree::insert`].
    pub fn insert(&mut self, key: K, val: V) -> Result<InsertOutcome<V>, TreeError> {
        let shard = self.shard_of(&key);
        self.shards[shard].insert(key, val).map_err(|e| {
            tracing::debug!(shard, error = %e, "sharded insert failed");
            e
        })
    }

    /// Removes a key and returns its value.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        let shard = self.shard_of(key);
        self.shards[shard].delete(key)
    }

    /// Removes a key and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        let shard = self.shard_of(key);
        self.shards[shard].remove_entry(key)
    }

    /// Looks up a key, counting the hit.  See [`HybridTree::search`].
    pub fn search<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        let shard = self.shard_of(key);
        self.shards[shard].search(key)
    }

    /// Looks up a key without counting the hit.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shards[self.shard_of(key)].get(key)
    }

    /// Returns a mutable reference to a key's value.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        let shard = self.shard_of(key);
        self.shards[shard].get_mut(key)
    }

    /// Returns true if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shards[self.shard_of(key)].contains_key(key)
    }

    /// Number of `search` hits recorded for a key.
    pub fn access_count<Q>(&self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Hash + Ord + ?Sized,
    {
        self.shards[self.shard_of(key)].access_count(key)
    }
}

impl<K, V, S> Debug for ShardedMap<K, V, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedMap")
            .field("len", &self.len())
            .field("shard_lens", &self.shard_lens())
            .finish()
    }
}
