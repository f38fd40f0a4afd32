//! # Ordered maps built from self-balancing trees
//!
//! `hybrid-collections` provides [`HybridTree`], an ordered map whose
//! shape is kept AVL-balanced and whose nodes also carry a consistent
//! red-black coloring, and [`ShardedMap`], which spreads keys over a fixed
//! number of such trees by hash.  [`ConcurrentShardedMap`] puts each shard
//! behind its own lock so that the shards can be used from many threads.
//!
//! All three report allocation failure and exhausted capacity as
//! [`TreeError`] rather than aborting.  Nodes count how often they are found
//! by `search`; keys found at least `hot_threshold` times are reported by
//! `hot_keys`.
//!
//! ```
//! use hybrid_collections::{HybridTree, ShardedMap};
//!
//! let mut t = HybridTree::new();
//! for k in [5, 1, 9] {
//!     t.insert(k, k * k).unwrap();
//! }
//! assert_eq!(t.get(&9), Some(&81));
//!
//! let mut m = ShardedMap::new(4, None).unwrap();
//! m.insert("apple", 3).unwrap();
//! assert_eq!(m.delete("apple"), Some(3));
//! ```
//!
//! Enabling the `serde` feature adds `Serialize` and `Deserialize` for the
//! trees, the single-threaded sharded map and the configuration types.

mod error;
pub use error::TreeError;

pub mod config;
pub use config::{MapConfig, TreeConfig};

mod collector;
pub use collector::RangeCollector;

mod hybrid;
pub use hybrid::{HybridTree, InsertOutcome, Iter};

pub mod sharded;
pub use sharded::concurrent::ConcurrentShardedMap;
pub use sharded::hash::BuildKnuthHasher;
pub use sharded::ShardedMap;

#[cfg(feature = "serde")]
mod serde;
