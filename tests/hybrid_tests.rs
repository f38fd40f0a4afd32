extern crate quickcheck;
use hybrid_collections::{HybridTree, InsertOutcome, TreeConfig, TreeError};
use quickcheck::quickcheck;

#[test]
fn rot_rt_regr() {
    let mut tree = HybridTree::new();
    let _ = tree.insert(2, 0).unwrap();
    let _ = tree.insert(0, 0).unwrap();
    let _ = tree.insert(1, 0).unwrap();

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.height(), 2);
    let mut iter = tree.iter();
    assert_eq!(iter.next(), Some((&0, &0)));
    assert_eq!(iter.next(), Some((&1, &0)));
    assert_eq!(iter.next(), Some((&2, &0)));
    assert_eq!(iter.next(), None);
}

#[test]
fn ascending_inserts_stay_shallow() {
    let mut tree = HybridTree::new();
    for i in 1..=7 {
        let _ = tree.insert(i, i * 10).unwrap();
    }
    // 7 sorted inserts give a perfect tree of height 3
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.keys().copied().collect::<Vec<_>>(), (1..=7).collect::<Vec<_>>());
}

#[test]
fn delete_every_other() {
    let mut tree: HybridTree<_, _> = (0..100).map(|i| (i, ())).collect();
    for i in (0..100).step_by(2) {
        assert_eq!(tree.delete(&i), Some(()));
    }
    assert_eq!(tree.len(), 50);
    assert!(tree.height() <= 8);
    assert!(tree.keys().all(|k| k % 2 == 1));
    assert_eq!(tree.first_key_value(), Some((&1, &())));
    assert_eq!(tree.last_key_value(), Some((&99, &())));
}

#[test]
fn missing_keys() {
    let mut tree = HybridTree::from([(1, 'a')]);
    assert_eq!(tree.delete(&2), None);
    assert_eq!(tree.search(&2), None);
    assert_eq!(tree.access_count(&2), None);
    assert_eq!(tree.len(), 1);

    let mut empty: HybridTree<i32, char> = HybridTree::new();
    assert_eq!(empty.delete(&1), None);
    assert_eq!(empty.successor(&1), None);
    assert!(empty.range(&i32::MIN, &i32::MAX).unwrap().is_empty());
}

#[test]
fn bounded_tree() {
    let cfg = TreeConfig::new().capacity(3);
    let mut tree = HybridTree::with_config(cfg).unwrap();
    for k in 0..3 {
        assert_eq!(tree.insert(k, k).unwrap(), InsertOutcome::Inserted);
    }
    assert!(tree.is_full());
    assert_eq!(tree.insert(3, 3), Err(TreeError::Full { capacity: 3 }));
    assert_eq!(tree.insert(1, 10).unwrap(), InsertOutcome::Updated(1));

    assert_eq!(tree.delete(&0), Some(0));
    assert!(!tree.is_full());
    assert!(tree.insert(3, 3).unwrap().is_inserted());
    assert_eq!(tree.capacity(), Some(3));

    assert_eq!(
        HybridTree::<u8, u8>::with_capacity(0).err(),
        Some(TreeError::InvalidCapacity)
    );
}

#[test]
fn hot_keys_follow_searches() {
    let cfg = TreeConfig::new().hot_threshold(3);
    let mut tree = HybridTree::with_config(cfg).unwrap();
    for k in ["alpha", "beta", "gamma"] {
        let _ = tree.insert(k, k.len()).unwrap();
    }
    for _ in 0..3 {
        tree.search("gamma");
    }
    tree.search("beta");

    assert_eq!(tree.hot_keys().collect::<Vec<_>>(), vec![&"gamma"]);
    assert_eq!(tree.access_count("beta"), Some(1));

    // overwriting keeps the node and its count
    let _ = tree.insert("gamma", 0).unwrap();
    assert_eq!(tree.access_count("gamma"), Some(3));
}

quickcheck! {
    fn qc_cmp_with_btree(xs: Vec<(u8, u32)>) -> () {
        let mut btree = std::collections::BTreeMap::new();
        let mut tree = HybridTree::new();

        for (k, v) in xs.iter() {
            assert_eq!(btree.len(), tree.len());
            assert_eq!(btree.insert(*k, *v), tree.insert(*k, *v).unwrap().into_old());
            assert!(btree.iter().cmp(tree.iter()).is_eq());
        }

        for k in 0..=u8::MAX {
            assert_eq!(tree.get(&k), btree.get(&k));
        }
    }

    fn qc_insert_delete(ins: Vec<u8>, del: Vec<u8>) -> () {
        let mut btree = std::collections::BTreeMap::new();
        let mut tree = HybridTree::new();

        for k in ins {
            btree.insert(k, ());
            let _ = tree.insert(k, ()).unwrap();
        }
        for k in del {
            assert_eq!(btree.remove(&k), tree.delete(&k));
        }

        assert_eq!(btree.len(), tree.len());
        assert!(btree.keys().cmp(tree.keys()).is_eq());
    }

    fn qc_neighbors(xs: Vec<i16>, k: i16) -> () {
        let tree: HybridTree<_, _> = xs.iter().map(|&x| (x, ())).collect();
        let set: std::collections::BTreeSet<_> = xs.into_iter().collect();

        assert_eq!(tree.successor(&k).map(|e| *e.0), set.iter().find(|&&x| x > k).copied());
        assert_eq!(tree.predecessor(&k).map(|e| *e.0), set.iter().rev().find(|&&x| x < k).copied());
    }
}
