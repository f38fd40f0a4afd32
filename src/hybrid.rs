#![warn(missing_docs)]
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::replace;
use std::ops::Not;

mod arena;
use arena::{Arena, NodeId};

use crate::collector::RangeCollector;
use crate::config::TreeConfig;
use crate::TreeError;

type OptId = Option<NodeId>;

#[cfg(test)]
macro_rules! chk_tree {
    ( $x:expr ) => {{
        $x.chk();
    }};
}

#[cfg(not(test))]
macro_rules! chk_tree {
    ( $x:expr ) => {{}};
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

use Dir::*;

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Dir {
        match self {
            Left => Right,
            Right => Left,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    key: K,
    val: V,
    color: Color,
    height: i8,
    access_count: u32,
    parent: OptId,
    child: [OptId; 2],
}

impl<K, V> Node<K, V> {
    fn new(key: K, val: V, parent: OptId) -> Self {
        Node {
            key,
            val,
            color: Color::Red,
            height: 1,
            access_count: 0,
            parent,
            child: [None, None],
        }
    }

    fn child(&self, dir: Dir) -> OptId {
        self.child[dir as usize]
    }

    // Which side of self holds `id`?  Only meaningful when `id` is a child.
    fn side_of(&self, id: NodeId) -> Dir {
        if self.child[Left as usize] == Some(id) {
            Left
        } else {
            Right
        }
    }
}

/// What [`HybridTree::insert`] did with the entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum InsertOutcome<V> {
    /// The key was new and a node was created for it.
    Inserted,
    /// The key existed; its previous value is handed back.
    Updated(V),
}

impl<V> InsertOutcome<V> {
    /// True if a new node was created.
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }

    /// The replaced value, if the key already existed.
    pub fn into_old(self) -> Option<V> {
        match self {
            InsertOutcome::Inserted => None,
            InsertOutcome::Updated(v) => Some(v),
        }
    }
}

/// An ordered map kept balanced by AVL rotations while also carrying a valid
/// Red-Black coloring.
///
/// The shape of the tree follows the AVL discipline: after every insert or
/// delete the heights of a node's two subtrees differ by at most one.  The
/// colors are derived from the heights.  A node is red exactly when its
/// height is odd and its parent's height is even, and the root is black.
/// Every AVL tree painted this way satisfies the Red-Black rules (no red node
/// has a red child and all root-to-leaf paths cross the same number of black
/// nodes), so both invariants hold at once and repainting never needs a
/// rotation of its own.
///
/// Nodes live in an index arena and keep a link to their parent, which is
/// what [`successor`](#method.successor) and
/// [`predecessor`](#method.predecessor) walk.
///
/// # Examples
/// ```
/// use hybrid_collections::{HybridTree, InsertOutcome};
///
/// let mut t = HybridTree::new();
/// assert_eq!(t.insert(5, "five").unwrap(), InsertOutcome::Inserted);
/// assert_eq!(t.insert(5, "FIVE").unwrap(), InsertOutcome::Updated("five"));
/// assert_eq!(t.search(&5), Some(&"FIVE"));
/// assert_eq!(t.delete(&5), Some("FIVE"));
/// assert!(t.is_empty());
/// ```
#[derive(Clone)]
pub struct HybridTree<K, V> {
    nodes: Arena<Node<K, V>>,
    root: OptId,
    len: usize,
    capacity: Option<usize>,
    hot_threshold: u32,
}

impl<K, V> HybridTree<K, V> {
    fn ht(&self, id: OptId) -> i8 {
        id.map_or(0, |i| self.nodes[i].height)
    }

    // Balance factor: positive when the right subtree is taller.
    fn bal(&self, id: NodeId) -> i8 {
        let n = &self.nodes[id];
        self.ht(n.child(Right)) - self.ht(n.child(Left))
    }

    fn update_height(&mut self, id: NodeId) {
        let n = &self.nodes[id];
        let h = self.ht(n.child(Left)).max(self.ht(n.child(Right))) + 1;
        self.nodes[id].height = h;
    }

    fn set_child(&mut self, parent: NodeId, dir: Dir, child: OptId) {
        self.nodes[parent].child[dir as usize] = child;
        if let Some(c) = child {
            self.nodes[c].parent = Some(parent);
        }
    }

    fn set_root(&mut self, root: OptId) {
        self.root = root;
        if let Some(r) = root {
            let n = &mut self.nodes[r];
            n.parent = None;
            n.color = Color::Black;
        }
    }

    // Rotates the subtree at `a` in direction `dir`, lifting `a`'s child on
    // the opposite side, and returns the new subtree root:
    //    rotate(a, Left):   a(x, b(y, z))   =>   b(a(x, y), z)
    //    rotate(a, Right):  a(b(x, y), z)   =>   b(x, a(y, z))
    // x and z retain the same parents.
    pub(crate) fn rotate(&mut self, a: NodeId, dir: Dir) -> NodeId {
        let b = match self.nodes[a].child(!dir) {
            Some(b) => b,
            None => return a,
        };

        // move y from b to a
        let y = self.nodes[b].child(dir);
        self.set_child(a, !dir, y);

        // b takes a's place under a's parent (or as the root)
        let up = self.nodes[a].parent;
        self.nodes[b].parent = up;
        match up {
            Some(p) => {
                let side = self.nodes[p].side_of(a);
                self.nodes[p].child[side as usize] = Some(b);
            }
            None => self.root = Some(b),
        }

        self.set_child(b, dir, Some(a));

        // the lifted node inherits the old root's color; the demoted one
        // turns red until the next repaint
        self.nodes[b].color = self.nodes[a].color;
        self.nodes[a].color = Color::Red;

        self.update_height(a);
        self.update_height(b);

        tracing::trace!(?dir, height = self.nodes[b].height, "rotate");
        b
    }

    // Rotates `a`'s child on the `!dir` side in direction `!dir`, then
    // rotates `a` in direction `dir`:
    //    double_rotate(a, Right):  a(b(x, c(y, z)), w)  =>  c(b(x, y), a(z, w))
    pub(crate) fn double_rotate(&mut self, a: NodeId, dir: Dir) -> NodeId {
        if let Some(b) = self.nodes[a].child(!dir) {
            self.rotate(b, !dir);
        }
        self.rotate(a, dir)
    }

    // Colors c red iff its height is odd and its parent's is even.
    fn paint_children(&mut self, p: NodeId) {
        let parent_even = self.nodes[p].height % 2 == 0;
        for dir in [Left, Right] {
            if let Some(c) = self.nodes[p].child(dir) {
                let n = &mut self.nodes[c];
                n.color = if parent_even && n.height % 2 == 1 {
                    Color::Red
                } else {
                    Color::Black
                };
            }
        }
    }

    // Restores both invariants at `id`, whose subtrees are already valid, and
    // returns the root of the rebuilt subtree.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let bal = self.bal(id);

        let top = if bal < -1 {
            let lf = self.nodes[id].child(Left);
            if lf.map_or(0, |l| self.bal(l)) <= 0 {
                self.rotate(id, Right)
            } else {
                self.double_rotate(id, Right)
            }
        } else if bal > 1 {
            let rt = self.nodes[id].child(Right);
            if rt.map_or(0, |r| self.bal(r)) >= 0 {
                self.rotate(id, Left)
            } else {
                self.double_rotate(id, Left)
            }
        } else {
            id
        };

        // Red-Black fixup: nodes moved by a rotation have new parents and
        // heights, so their children need fresh colors too.
        self.paint_children(top);
        if top != id {
            tracing::trace!(bal, "rebalanced");
            for dir in [Left, Right] {
                if let Some(c) = self.nodes[top].child(dir) {
                    self.paint_children(c);
                }
            }
        }

        top
    }

    pub(crate) fn find_minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.nodes[id].child(Left) {
            id = l;
        }
        id
    }

    pub(crate) fn find_maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.nodes[id].child(Right) {
            id = r;
        }
        id
    }

    pub(crate) fn find_successor(&self, id: NodeId) -> OptId {
        if let Some(r) = self.nodes[id].child(Right) {
            return Some(self.find_minimum(r));
        }

        let mut curr = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].child(Right) != Some(curr) {
                break;
            }
            curr = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    pub(crate) fn find_predecessor(&self, id: NodeId) -> OptId {
        if let Some(l) = self.nodes[id].child(Left) {
            return Some(self.find_maximum(l));
        }

        let mut curr = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].child(Left) != Some(curr) {
                break;
            }
            curr = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn entry(&self, id: NodeId) -> (&K, &V) {
        let n = &self.nodes[id];
        (&n.key, &n.val)
    }

    fn for_each_node<F: FnMut(&Node<K, V>)>(&self, id: OptId, g: &mut F) {
        if let Some(id) = id {
            let n = &self.nodes[id];
            self.for_each_node(n.child(Left), g);
            g(n);
            self.for_each_node(n.child(Right), g);
        }
    }

    /// Creates a new, empty, unbounded tree.
    /// # Examples
    /// ```
    /// use hybrid_collections::HybridTree;
    /// let t: HybridTree<usize, usize> = HybridTree::new();
    /// assert!(t.is_empty());
    /// ```
    pub fn new() -> Self {
        HybridTree {
            nodes: Arena::new(),
            root: None,
            len: 0,
            capacity: None,
            hot_threshold: crate::config::DEFAULT_HOT_THRESHOLD,
        }
    }

    /// Creates an empty tree that holds at most `capacity` entries and
    /// reserves room for them up front.
    ///
    /// Fails with [`TreeError::InvalidCapacity`] for a zero capacity and with
    /// [`TreeError::Alloc`] if the reservation fails.
    pub fn with_capacity(capacity: usize) -> Result<Self, TreeError> {
        Self::with_config(TreeConfig::new().capacity(capacity))
    }

    /// Creates an empty tree from a [`TreeConfig`].
    pub fn with_config(config: TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;
        let nodes = match config.capacity {
            Some(capacity) => Arena::with_capacity(capacity)?,
            None => Arena::new(),
        };

        Ok(HybridTree {
            nodes,
            root: None,
            len: 0,
            capacity: config.capacity,
            hot_threshold: config.hot_threshold,
        })
    }

    /// Drops all entries.  The capacity limit stays in force.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The entry limit, if the tree is bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// True if a bounded tree has no room for another key.
    pub fn is_full(&self) -> bool {
        self.capacity.map_or(false, |c| self.len >= c)
    }

    /// Height of the tree: 0 when empty, 1 for a single node.
    pub fn height(&self) -> usize {
        self.ht(self.root) as usize
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|r| self.entry(self.find_minimum(r)))
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|r| self.entry(self.find_maximum(r)))
    }

    /// Creates an iterator over the entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use hybrid_collections::HybridTree;
    ///
    /// let t = HybridTree::from([(2, 'b'), (0, 'a'), (4, 'c')]);
    /// let keys: Vec<_> = t.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, vec![0, 2, 4]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            nodes: &self.nodes,
            work: Vec::new(),
            len: self.len,
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Iterates over the values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Applies `f` to each entry in order of the keys.
    pub fn for_each<F: FnMut((&K, &V))>(&self, mut f: F) {
        self.for_each_node(self.root, &mut |n| f((&n.key, &n.val)));
    }

    /// Keys whose nodes have been found by [`search`](#method.search) at
    /// least as many times as the hot threshold, in key order.
    pub fn hot_keys(&self) -> impl Iterator<Item = &K> + '_ {
        let threshold = self.hot_threshold;
        let mut iter = self.iter();
        std::iter::from_fn(move || loop {
            let n = iter.next_node()?;
            if n.access_count >= threshold {
                return Some(&n.key);
            }
        })
    }

    #[cfg(test)]
    fn chk(&self)
    where
        K: Ord,
    {
        self.chk_links(true);
    }

    // Walks the whole tree asserting order, parent links and heights, and
    // when `strict`, AVL balance and the Red-Black rules too.
    #[cfg(test)]
    fn chk_links(&self, strict: bool)
    where
        K: Ord,
    {
        if let Some(r) = self.root {
            assert_eq!(self.nodes[r].parent, None, "root has a parent");
            if strict {
                assert_eq!(self.nodes[r].color, Color::Black, "red root");
            }
        }

        let (len, _, _, _) = self.chk_node(self.root, None, None, strict);
        assert_eq!(len, self.len);
        assert_eq!(self.nodes.len(), self.len);
    }

    // Returns (node count, height, black count including the null leaf,
    // greatest key seen).
    #[cfg(test)]
    fn chk_node<'a>(
        &'a self,
        id: OptId,
        parent: OptId,
        greatest: Option<&'a K>,
        strict: bool,
    ) -> (usize, i8, usize, Option<&'a K>)
    where
        K: Ord,
    {
        let id = match id {
            None => return (0, 0, 1, greatest),
            Some(id) => id,
        };
        let n = &self.nodes[id];
        assert_eq!(n.parent, parent, "broken parent link");

        let (lf_len, lf_ht, lf_bh, greatest) =
            self.chk_node(n.child(Left), Some(id), greatest, strict);

        // is our node in order with everything before it?
        assert!(greatest.iter().all(|&k| k < &n.key), "out of order");

        let (rt_len, rt_ht, rt_bh, greatest) =
            self.chk_node(n.child(Right), Some(id), Some(&n.key), strict);

        assert_eq!(n.height, lf_ht.max(rt_ht) + 1, "stale height");

        if strict {
            assert!((rt_ht - lf_ht).abs() <= 1, "AVL imbalance");
            assert_eq!(lf_bh, rt_bh, "unequal black heights");
            if n.color == Color::Red {
                for c in n.child.iter().flatten() {
                    assert_eq!(self.nodes[*c].color, Color::Black, "red-red");
                }
            }
        }

        let bh = lf_bh + (n.color == Color::Black) as usize;
        (lf_len + rt_len + 1, n.height, bh, greatest)
    }
}

impl<K: Ord, V> HybridTree<K, V> {
    fn alloc_node(&mut self, key: K, val: V, parent: OptId) -> Result<NodeId, TreeError> {
        if let Some(capacity) = self.capacity {
            if self.len >= capacity {
                tracing::warn!(capacity, "insert rejected: tree is full");
                return Err(TreeError::Full { capacity });
            }
        }

        match self.nodes.alloc(Node::new(key, val, parent)) {
            Ok(id) => {
                tracing::debug!(len = self.len + 1, "node allocated");
                Ok(id)
            }
            Err(e) => {
                tracing::error!(len = self.len, "node allocation failed");
                Err(e)
            }
        }
    }

    // Inserts (key, val) below `slot` and returns the root of the rebuilt
    // subtree.  Nothing is modified until the new node exists, so an error
    // leaves the tree untouched.
    fn ins(
        &mut self,
        slot: OptId,
        parent: OptId,
        key: K,
        val: V,
    ) -> Result<(NodeId, InsertOutcome<V>), TreeError> {
        let id = match slot {
            None => {
                let id = self.alloc_node(key, val, parent)?;
                return Ok((id, InsertOutcome::Inserted)); // *** EARLY RETURN ***
            }
            Some(id) => id,
        };

        let dir = match key.cmp(&self.nodes[id].key) {
            Equal => {
                let old = replace(&mut self.nodes[id].val, val);
                return Ok((id, InsertOutcome::Updated(old)));
            }
            Less => Left,
            Greater => Right,
        };

        let child = self.nodes[id].child(dir);
        let (sub, outcome) = self.ins(child, Some(id), key, val)?;
        match outcome {
            InsertOutcome::Inserted => {
                self.set_child(id, dir, Some(sub));
                Ok((self.rebalance(id), outcome))
            }
            InsertOutcome::Updated(_) => Ok((id, outcome)),
        }
    }

    fn free_node(&mut self, id: NodeId) -> Node<K, V> {
        let n = self.nodes.free(id);
        tracing::debug!(len = self.nodes.len(), "node freed");
        n
    }

    // Unlinks the leftmost node below `id` and returns the rebuilt subtree
    // root together with the unlinked node.
    fn rm_min(&mut self, id: NodeId) -> (OptId, Node<K, V>) {
        match self.nodes[id].child(Left) {
            Some(l) => {
                let (sub, min) = self.rm_min(l);
                self.set_child(id, Left, sub);
                (Some(self.rebalance(id)), min)
            }
            None => {
                let right = self.nodes[id].child(Right);
                (right, self.free_node(id))
            }
        }
    }

    // Removes the node `id` itself, returning the subtree that replaces it.
    fn rm_node(&mut self, id: NodeId) -> (OptId, Option<(K, V)>) {
        let n = &self.nodes[id];
        match (n.child(Left), n.child(Right)) {
            (Some(_), Some(r)) => {
                // both children are populated: take over the successor's entry
                let (sub, succ) = self.rm_min(r);
                self.set_child(id, Right, sub);

                let n = &mut self.nodes[id];
                let old_key = replace(&mut n.key, succ.key);
                let old_val = replace(&mut n.val, succ.val);
                n.access_count = succ.access_count;

                (Some(self.rebalance(id)), Some((old_key, old_val)))
            }

            (only, None) | (None, only) => {
                let old = self.free_node(id);
                (only, Some((old.key, old.val)))
            }
        }
    }

    fn rm<Q>(&mut self, slot: OptId, key: &Q) -> (OptId, Option<(K, V)>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = match slot {
            None => return (None, None), // *** EARLY RETURN ***
            Some(id) => id,
        };

        let dir = match key.cmp(self.nodes[id].key.borrow()) {
            Equal => return self.rm_node(id),
            Less => Left,
            Greater => Right,
        };

        let child = self.nodes[id].child(dir);
        let (sub, removed) = self.rm(child, key);
        if removed.is_none() {
            return (Some(id), None);
        }

        self.set_child(id, dir, sub);
        (Some(self.rebalance(id)), removed)
    }

    fn find<Q>(&self, key: &Q) -> OptId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            curr = match key.cmp(n.key.borrow()) {
                Less => n.child(Left),
                Greater => n.child(Right),
                Equal => return Some(id),
            };
        }
        None
    }

    fn collect_range<'a, Q>(
        &'a self,
        id: OptId,
        low: &Q,
        high: &Q,
        out: &mut RangeCollector<(&'a K, &'a V)>,
    ) -> Result<(), TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = match id {
            None => return Ok(()),
            Some(id) => id,
        };
        let n = &self.nodes[id];
        let k = n.key.borrow();

        if low < k {
            self.collect_range(n.child(Left), low, high, out)?;
        }
        if low <= k && k <= high {
            out.push((&n.key, &n.val))?;
        }
        if k < high {
            self.collect_range(n.child(Right), low, high, out)?;
        }
        Ok(())
    }

    /// Inserts a key-value pair.
    ///
    /// A new key yields [`InsertOutcome::Inserted`]; an existing key keeps
    /// its node, takes the new value and yields
    /// [`InsertOutcome::Updated`] with the old one.  Fails with
    /// [`TreeError::Full`] when a new key would exceed the capacity, or with
    /// [`TreeError::Alloc`]; the tree is unchanged in both cases.
    ///
    /// # Examples
    /// ```
    /// use hybrid_collections::{HybridTree, TreeError};
    ///
    /// let mut t = HybridTree::with_capacity(1).unwrap();
    /// assert!(t.insert(0, "a").unwrap().is_inserted());
    /// assert_eq!(t.insert(0, "b").unwrap().into_old(), Some("a"));
    /// assert_eq!(t.insert(1, "c"), Err(TreeError::Full { capacity: 1 }));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Result<InsertOutcome<V>, TreeError> {
        let (root, outcome) = self.ins(self.root, None, key, val)?;
        if outcome.is_inserted() {
            self.len += 1;
            self.set_root(Some(root));
            chk_tree!(self);
        }
        Ok(outcome)
    }

    /// Removes a key and returns its value, or `None` if it was absent.
    ///
    /// # Examples
    /// ```
    /// use hybrid_collections::HybridTree;
    ///
    /// let mut t = HybridTree::from([(1, 2), (2, 3)]);
    /// assert_eq!(t.delete(&2), Some(3));
    /// assert_eq!(t.delete(&2), None);
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|e| e.1)
    }

    /// Removes a key and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (root, removed) = self.rm(self.root, key);
        if removed.is_some() {
            self.len -= 1;
            self.set_root(root);
            chk_tree!(self);
        }
        removed
    }

    /// Looks up a key and counts the hit toward the node's access count.
    ///
    /// # Examples
    /// ```
    /// use hybrid_collections::HybridTree;
    ///
    /// let mut t = HybridTree::from([(7, "seven")]);
    /// assert_eq!(t.search(&7), Some(&"seven"));
    /// assert_eq!(t.access_count(&7), Some(1));
    /// assert_eq!(t.search(&8), None);
    /// ```
    pub fn search<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        let threshold = self.hot_threshold;
        let n = &mut self.nodes[id];
        n.access_count = n.access_count.saturating_add(1);
        if n.access_count == threshold {
            tracing::debug!(access_count = threshold, "node became hot");
        }
        Some(&n.val)
    }

    /// Looks up a key without touching its access count.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| &self.nodes[id].val)
    }

    /// Looks up a key and returns the stored key along with the value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| self.entry(id))
    }

    /// Returns a mutable reference to a key's value.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.nodes[id].val)
    }

    /// Returns true if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Number of [`search`](#method.search) hits recorded for a key.
    pub fn access_count<Q>(&self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| self.nodes[id].access_count)
    }

    /// Returns the entry with the smallest key strictly greater than `key`.
    /// The key itself need not be present.
    ///
    /// # Examples
    /// ```
    /// use hybrid_collections::HybridTree;
    ///
    /// let t: HybridTree<_, _> = (0..5).map(|i| (i * 10, i)).collect();
    /// assert_eq!(t.successor(&10), Some((&20, &2)));
    /// assert_eq!(t.successor(&15), Some((&20, &2)));
    /// assert_eq!(t.successor(&40), None);
    /// ```
    pub fn successor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        let mut candidate = None;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            curr = match key.cmp(n.key.borrow()) {
                Less => {
                    candidate = Some(id);
                    n.child(Left)
                }
                Greater => n.child(Right),
                Equal => {
                    candidate = self.find_successor(id);
                    break;
                }
            };
        }
        candidate.map(|id| self.entry(id))
    }

    /// Returns the entry with the largest key strictly less than `key`.
    /// The key itself need not be present.
    pub fn predecessor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        let mut candidate = None;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            curr = match key.cmp(n.key.borrow()) {
                Greater => {
                    candidate = Some(id);
                    n.child(Right)
                }
                Less => n.child(Left),
                Equal => {
                    candidate = self.find_predecessor(id);
                    break;
                }
            };
        }
        candidate.map(|id| self.entry(id))
    }

    /// Collects the entries with `low <= key <= high` in ascending key
    /// order.  An inverted range yields nothing.
    ///
    /// # Examples
    /// ```
    /// use hybrid_collections::HybridTree;
    ///
    /// let t: HybridTree<_, _> = (0..10).map(|i| (i, i * i)).collect();
    /// let r = t.range(&3, &5).unwrap();
    /// assert_eq!(&r[..], &[(&3, &9), (&4, &16), (&5, &25)]);
    /// ```
    pub fn range<Q>(&self, low: &Q, high: &Q) -> Result<RangeCollector<(&K, &V)>, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut out = RangeCollector::new();
        self.range_into(low, high, &mut out)?;
        Ok(out)
    }

    /// Appends the entries with `low <= key <= high` to `out`, in ascending
    /// key order.
    pub fn range_into<'a, Q>(
        &'a self,
        low: &Q,
        high: &Q,
        out: &mut RangeCollector<(&'a K, &'a V)>,
    ) -> Result<(), TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if low > high {
            return Ok(());
        }
        self.collect_range(self.root, low, high, out)
    }
}

impl<K, V> Default for HybridTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug> HybridTree<K, V> {
    fn fmt_node(&self, id: OptId, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match id {
            None => return f.write_str("."),
            Some(id) => id,
        };
        let n = &self.nodes[id];
        let c = match n.color {
            Color::Red => 'R',
            Color::Black => 'B',
        };
        write!(f, "({}{} {{{:?}: {:?}}} ", c, n.height, n.key, n.val)?;
        self.fmt_node(n.child(Left), f)?;
        f.write_str(" ")?;
        self.fmt_node(n.child(Right), f)?;
        f.write_str(")")
    }
}

impl<K: Debug, V: Debug> Debug for HybridTree<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.root {
            None => f.write_str("HybridTree(EMPTY)"),
            Some(_) => {
                write!(f, "HybridTree(#{}, ", self.len)?;
                self.fmt_node(self.root, f)?;
                f.write_str(")")
            }
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for HybridTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Eq, V: Eq> Eq for HybridTree<K, V> {}

impl<K, Q, V> std::ops::Index<&Q> for HybridTree<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in HybridTree"),
        }
    }
}

/// Panics if the tree is full or an allocation fails, like the standard
/// collections do when they cannot grow.
impl<K: Ord, V> Extend<(K, V)> for HybridTree<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(e) = self.insert(k, v) {
                panic!("HybridTree::extend: {}", e);
            }
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for HybridTree<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        HybridTree::from_iter(vs)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for HybridTree<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut t = HybridTree::new();
        t.extend(iter);
        t
    }
}

impl<'a, K, V> IntoIterator for &'a HybridTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over the entries of a [`HybridTree`].
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    work: Vec<NodeId>,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut curr: OptId) {
        while let Some(id) = curr {
            self.work.push(id);
            curr = self.nodes[id].child(Left);
        }
    }

    fn next_node(&mut self) -> Option<&'a Node<K, V>> {
        let nodes = self.nodes;
        self.work.pop().map(|id| {
            self.len -= 1;
            let n = &nodes[id];
            self.push_left_spine(n.child(Right));
            n
        })
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().map(|n| (&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}
