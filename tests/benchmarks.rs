//! Microbenchmarks of HybridTree and ShardedMap against BTreeMap and HashMap.
//!
//! Invoke with
//! ```
//!     cargo +nightly bench [partial_test_name] --test benchmarks \
//!         --features bench
//! ```
//!
//! The "bench" feature gates the benchmark code.  `#[bench]` requires
//! `#![feature(test)]` and so a nightly compiler, which CI does not use.
//!
//! If "partial_test_name" is excluded, all benchmarks are run.  If given, any
//! test name that contains partial_test_name will run.
#![cfg(feature = "bench")]
#![feature(test)]

extern crate test;

// The std maps and our maps differ in their insert and remove signatures, so
// each map type gets a small adapter.
mod adapt {
    use hybrid_collections::{HybridTree, ShardedMap};
    use std::collections::{BTreeMap, HashMap};
    use std::hash::Hash;

    pub trait BenchMap<K, V>: Clone {
        fn make() -> Self;
        fn put(&mut self, k: K, v: V);
        fn lookup(&self, k: &K) -> Option<&V>;
        fn take(&mut self, k: &K) -> Option<V>;
    }

    impl<K: Ord + Clone, V: Clone> BenchMap<K, V> for BTreeMap<K, V> {
        fn make() -> Self {
            BTreeMap::new()
        }
        fn put(&mut self, k: K, v: V) {
            self.insert(k, v);
        }
        fn lookup(&self, k: &K) -> Option<&V> {
            self.get(k)
        }
        fn take(&mut self, k: &K) -> Option<V> {
            self.remove(k)
        }
    }

    impl<K: Hash + Eq + Clone, V: Clone> BenchMap<K, V> for HashMap<K, V> {
        fn make() -> Self {
            HashMap::new()
        }
        fn put(&mut self, k: K, v: V) {
            self.insert(k, v);
        }
        fn lookup(&self, k: &K) -> Option<&V> {
            self.get(k)
        }
        fn take(&mut self, k: &K) -> Option<V> {
            self.remove(k)
        }
    }

    impl<K: Ord + Clone, V: Clone> BenchMap<K, V> for HybridTree<K, V> {
        fn make() -> Self {
            HybridTree::new()
        }
        fn put(&mut self, k: K, v: V) {
            let _ = self.insert(k, v).unwrap();
        }
        fn lookup(&self, k: &K) -> Option<&V> {
            self.get(k)
        }
        fn take(&mut self, k: &K) -> Option<V> {
            self.delete(k)
        }
    }

    impl<K: Ord + Hash + Clone, V: Clone> BenchMap<K, V> for ShardedMap<K, V> {
        fn make() -> Self {
            ShardedMap::new(16, None).unwrap()
        }
        fn put(&mut self, k: K, v: V) {
            let _ = self.insert(k, v).unwrap();
        }
        fn lookup(&self, k: &K) -> Option<&V> {
            self.get(k)
        }
        fn take(&mut self, k: &K) -> Option<V> {
            self.delete(k)
        }
    }
}

// An xmacro that takes the name of another macro and invokes it once for each
// of the map types we are testing.  The passed argument should produce a
// benchmark function.
//
// Rust does not (easily) support token concatenation, so each instantiation
// lives in its own submodule named after the macro and the map type.
macro_rules! for_each_map_type {
    ( $macro_name:ident ) => {
        mod $macro_name {
            mod btreemap {
                use crate::adapt::BenchMap;
                use std::collections::BTreeMap;
                use test::Bencher;

                $macro_name!(BTreeMap);
            }

            mod hashmap {
                use crate::adapt::BenchMap;
                use std::collections::HashMap;
                use test::Bencher;

                $macro_name!(HashMap);
            }

            mod hybrid_tree {
                use crate::adapt::BenchMap;
                use hybrid_collections::HybridTree;
                use test::Bencher;

                $macro_name!(HybridTree);
            }

            mod sharded_map {
                use crate::adapt::BenchMap;
                use hybrid_collections::ShardedMap;
                use test::Bencher;

                $macro_name!(ShardedMap);
            }
        }
    };
}

fn filled<M: adapt::BenchMap<usize, usize>>(len: usize) -> M {
    let mut m = M::make();
    for i in 0..len {
        m.put(i, i);
    }
    m
}

macro_rules! build_500_elems {
    ( $map_t:ident ) => {
        #[bench]
        fn f(b: &mut Bencher) {
            b.iter(|| {
                let mut m: $map_t<usize, usize> = BenchMap::make();
                for i in 0..500 {
                    m.put(i, i);
                }
                m
            });
        }
    };
}

for_each_map_type!(build_500_elems);

macro_rules! get_500_elems {
    ( $map_t:ident ) => {
        const MAP_LEN: usize = 500;

        #[bench]
        fn f(b: &mut Bencher) {
            let m: $map_t<usize, usize> = crate::filled(MAP_LEN);
            b.iter(|| {
                let mut s = 0;
                for i in 0..MAP_LEN {
                    s += m.lookup(&i).unwrap();
                }
                s
            });
        }
    };
}

for_each_map_type!(get_500_elems);

macro_rules! remove_1000_elems {
    ( $map_t: ident ) => {
        const MAP_LEN: usize = 1000;

        #[bench]
        fn f(b: &mut Bencher) {
            let m: $map_t<usize, usize> = crate::filled(MAP_LEN);
            b.iter(|| {
                let mut s = 0;
                let mut m = m.clone();
                for i in 0..MAP_LEN {
                    s += m.take(&i).unwrap();
                }
                (s, m)
            });
        }
    };
}

for_each_map_type!(remove_1000_elems);

#[bench]
fn hybrid_range_100_of_10k(b: &mut test::Bencher) {
    let m: hybrid_collections::HybridTree<usize, usize> = filled(10_000);
    b.iter(|| m.range(&4_000, &4_099).unwrap().len());
}

#[bench]
fn sharded_range_100_of_10k(b: &mut test::Bencher) {
    let m: hybrid_collections::ShardedMap<usize, usize> = filled(10_000);
    b.iter(|| m.range(&4_000, &4_099).unwrap().len());
}

#[bench]
fn hybrid_search_hot_key(b: &mut test::Bencher) {
    let mut m: hybrid_collections::HybridTree<usize, usize> = filled(1_000);
    b.iter(|| *m.search(&500).unwrap());
}
