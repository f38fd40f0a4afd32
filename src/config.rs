//! Construction-time settings for [`HybridTree`](crate::HybridTree) and
//! [`ShardedMap`](crate::ShardedMap).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::TreeError;

/// Access count at which a node is reported as hot.
pub const DEFAULT_HOT_THRESHOLD: u32 = 10;

/// Shard count used by [`MapConfig::default`].
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Settings for a single tree.
///
/// # Examples
/// ```
/// use hybrid_collections::{HybridTree, TreeConfig};
///
/// let cfg = TreeConfig::new().capacity(2).hot_threshold(3);
/// let mut t = HybridTree::with_config(cfg).unwrap();
/// t.insert(1, "a").unwrap();
/// t.insert(2, "b").unwrap();
/// assert!(t.insert(3, "c").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TreeConfig {
    /// Maximum number of entries, or `None` for no limit.
    pub capacity: Option<usize>,
    /// Number of `search` hits after which a node counts as hot.
    pub hot_threshold: u32,
}

impl TreeConfig {
    /// An unbounded configuration with the default hot threshold.
    pub fn new() -> Self {
        TreeConfig {
            capacity: None,
            hot_threshold: DEFAULT_HOT_THRESHOLD,
        }
    }

    /// Limits the tree to `capacity` entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the hot-node threshold.
    pub fn hot_threshold(mut self, hot_threshold: u32) -> Self {
        self.hot_threshold = hot_threshold;
        self
    }

    /// Rejects a zero capacity.
    pub fn validate(&self) -> Result<(), TreeError> {
        match self.capacity {
            Some(0) => Err(TreeError::InvalidCapacity),
            _ => Ok(()),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for a sharded map.
///
/// # Examples
/// ```
/// use hybrid_collections::{MapConfig, ShardedMap};
///
/// let cfg = MapConfig::new().shard_count(4).shard_capacity(100);
/// let m: ShardedMap<i32, ()> = ShardedMap::with_config(cfg).unwrap();
/// assert_eq!(m.shard_count(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapConfig {
    /// Number of independent trees.
    pub shard_count: usize,
    /// Per-shard entry limit, or `None` for unbounded shards.
    pub shard_capacity: Option<usize>,
    /// Hot-node threshold handed to every shard.
    pub hot_threshold: u32,
}

impl MapConfig {
    /// Sixteen unbounded shards with the default hot threshold.
    pub fn new() -> Self {
        MapConfig {
            shard_count: DEFAULT_SHARD_COUNT,
            shard_capacity: None,
            hot_threshold: DEFAULT_HOT_THRESHOLD,
        }
    }

    /// Sets the number of shards.
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Limits every shard to `capacity` entries.
    pub fn shard_capacity(mut self, capacity: usize) -> Self {
        self.shard_capacity = Some(capacity);
        self
    }

    /// Sets the hot-node threshold of every shard.
    pub fn hot_threshold(mut self, hot_threshold: u32) -> Self {
        self.hot_threshold = hot_threshold;
        self
    }

    /// The configuration each shard is built from.
    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            capacity: self.shard_capacity,
            hot_threshold: self.hot_threshold,
        }
    }

    /// Rejects zero shards and zero-capacity shards.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.shard_count == 0 {
            return Err(TreeError::InvalidShardCount);
        }
        self.tree_config().validate()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}
