//! Slab storage for tree nodes.
//!
//! Nodes refer to each other by [`NodeId`] instead of by pointer, which lets
//! every node carry a parent link without shared ownership.  Freed slots are
//! kept on an intrusive free list and reused by later allocations.

use std::ops::{Index, IndexMut};

use crate::TreeError;

/// Index of a node slot inside an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<NodeId> },
}

#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<NodeId>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, TreeError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        Ok(Arena {
            slots,
            free_head: None,
            len: 0,
        })
    }

    /// Stores `item` and returns its id.  On allocation failure `item` is
    /// dropped and the arena is unchanged.
    pub(crate) fn alloc(&mut self, item: T) -> Result<NodeId, TreeError> {
        if let Some(id) = self.free_head {
            let slot = &mut self.slots[id.0];
            self.free_head = match slot {
                Slot::Vacant { next_free } => *next_free,
                Slot::Occupied(_) => unreachable!("free list names an occupied slot"),
            };
            *slot = Slot::Occupied(item);
            self.len += 1;
            return Ok(id);
        }

        self.slots.try_reserve(1)?;
        self.slots.push(Slot::Occupied(item));
        self.len += 1;
        Ok(NodeId(self.slots.len() - 1))
    }

    /// Vacates the slot and returns what it held.
    pub(crate) fn free(&mut self, id: NodeId) -> T {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[id.0], vacant) {
            Slot::Occupied(item) => {
                self.free_head = Some(id);
                self.len -= 1;
                item
            }
            Slot::Vacant { .. } => panic!("double free of arena slot {}", id.0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match &self.slots[id.0] {
            Slot::Occupied(item) => item,
            Slot::Vacant { .. } => panic!("access to vacant arena slot {}", id.0),
        }
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match &mut self.slots[id.0] {
            Slot::Occupied(item) => item,
            Slot::Vacant { .. } => panic!("access to vacant arena slot {}", id.0),
        }
    }
}
