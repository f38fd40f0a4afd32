use std::fmt::{Debug, Formatter};
use std::ops::Deref;

use crate::TreeError;

const INITIAL_CAPACITY: usize = 4;

/// An append-only, growable sequence that gathers the results of range
/// queries.
///
/// Unlike `Vec::push`, [`push`](#method.push) reports a failed allocation as
/// [`TreeError::Alloc`] instead of aborting.  Capacity starts at four slots
/// and doubles whenever it runs out.
///
/// # Examples
/// ```
/// use hybrid_collections::RangeCollector;
///
/// let mut c = RangeCollector::new();
/// c.push(3).unwrap();
/// c.push(1).unwrap();
/// c.sort_by(|a, b| a.cmp(b));
/// assert_eq!(&c[..], &[1, 3]);
/// ```
pub struct RangeCollector<T> {
    items: Vec<T>,
}

impl<T> RangeCollector<T> {
    /// Creates an empty collector without allocating.
    pub fn new() -> Self {
        RangeCollector { items: Vec::new() }
    }

    /// Creates an empty collector with room for at least `capacity` items.
    pub fn with_capacity(capacity: usize) -> Result<Self, TreeError> {
        let mut items = Vec::new();
        items.try_reserve_exact(capacity.max(INITIAL_CAPACITY))?;
        Ok(RangeCollector { items })
    }

    /// Appends an item, doubling the capacity when full.
    pub fn push(&mut self, item: T) -> Result<(), TreeError> {
        if self.items.len() == self.items.capacity() {
            let extra = self.items.capacity().max(INITIAL_CAPACITY);
            if let Err(e) = self.items.try_reserve_exact(extra) {
                tracing::error!(len = self.items.len(), "range collector growth failed");
                return Err(e.into());
            }
        }
        self.items.push(item);
        Ok(())
    }

    /// Returns the item at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Number of gathered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing has been gathered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items that fit before the next growth.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Forgets all items but keeps the allocation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sorts the gathered items in place.  The sort is stable.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> std::cmp::Ordering,
    {
        self.items.sort_by(compare);
    }

    /// Iterates over the gathered items in insertion (or sorted) order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Hands back the gathered items.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for RangeCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for RangeCollector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: Debug> Debug for RangeCollector<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> IntoIterator for RangeCollector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a RangeCollector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
