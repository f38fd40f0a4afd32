use hybrid_collections::{ConcurrentShardedMap, MapConfig};
use std::sync::Arc;
use std::thread;

#[test]
fn writers_on_disjoint_keys() {
    let m = Arc::new(ConcurrentShardedMap::with_config(MapConfig::new().shard_count(8)).unwrap());

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for k in 0..500u32 {
                    let key = t * 500 + k;
                    assert!(m.insert(key, key).unwrap().is_inserted());
                }
                for k in (0..500u32).step_by(5) {
                    assert_eq!(m.delete(&(t * 500 + k)), Some(t * 500 + k));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(m.len(), 8 * 400);
    assert_eq!(m.shard_lens().iter().sum::<usize>(), 3200);

    let all = m.range(&0, &u32::MAX).unwrap();
    assert_eq!(all.len(), 3200);
    assert!(all.windows(2).all(|w| w[0].0 < w[1].0));
    assert!(all.iter().all(|(k, v)| k == v && k % 5 != 0));
}

#[test]
fn range_during_writes_is_sorted() {
    let m = ConcurrentShardedMap::new(4, None).unwrap();
    thread::scope(|s| {
        s.spawn(|| {
            for k in 0..2000i64 {
                let _ = m.insert(k, -k).unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..50 {
                let r = m.range(&0, &2000).unwrap();
                assert!(r.windows(2).all(|w| w[0].0 < w[1].0));
            }
        });
    });
    assert_eq!(m.get(&1999), Some(-1999));
}
