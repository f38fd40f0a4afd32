use std::fmt::Formatter;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{HybridTree, ShardedMap, TreeError};

/// Anything a serialized map can be read back into.
trait MapSink<K, V> {
    fn put(&mut self, key: K, val: V) -> Result<(), TreeError>;
}

impl<K: Ord, V> MapSink<K, V> for HybridTree<K, V> {
    fn put(&mut self, key: K, val: V) -> Result<(), TreeError> {
        self.insert(key, val).map(|_| ())
    }
}

impl<K: Ord + Hash, V, S: BuildHasher> MapSink<K, V> for ShardedMap<K, V, S> {
    fn put(&mut self, key: K, val: V) -> Result<(), TreeError> {
        self.insert(key, val).map(|_| ())
    }
}

struct MapVisitor<M, K, V> {
    map: M,
    desc: &'static str,
    marker: PhantomData<fn() -> (K, V)>,
}

impl<'de, M, K, V> Visitor<'de> for MapVisitor<M, K, V>
where
    M: MapSink<K, V>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "a map for {}", self.desc)
    }

    fn visit_map<A>(mut self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while let Some((k, v)) = access.next_entry()? {
            self.map.put(k, v).map_err(serde::de::Error::custom)?;
        }
        Ok(self.map)
    }
}

impl<K: Serialize, V: Serialize> Serialize for HybridTree<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for HybridTree<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(MapVisitor {
            map: HybridTree::new(),
            desc: "hybrid_collections::HybridTree",
            marker: PhantomData,
        })
    }
}

// Entries go out in key order, so the encoding does not depend on the shard
// count or the hasher.
impl<K, V, S> Serialize for ShardedMap<K, V, S>
where
    K: Serialize + Ord,
    V: Serialize,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, K, V> Deserialize<'de> for ShardedMap<K, V>
where
    K: Deserialize<'de> + Ord + Hash,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = ShardedMap::with_config(Default::default())
            .map_err(serde::de::Error::custom)?;
        deserializer.deserialize_map(MapVisitor {
            map,
            desc: "hybrid_collections::ShardedMap",
            marker: PhantomData,
        })
    }
}
