//! Dense slot storage with a free list
//!
//! Entities stay at a stable slot index for their whole life. Dead entries are
//! removed in a single `compact` pass per tick and their slots are recycled.
//! Iteration always runs in ascending slot order, which keeps the simulation
//! deterministic.

/// Slot pool for short-lived entities (enemies, bullets, shards)
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Insert an entity, reusing a free slot when possible. Returns its slot.
    pub fn insert(&mut self, item: T) -> usize {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(item);
            slot
        } else {
            self.slots.push(Some(item));
            self.slots.len() - 1
        }
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Iterate with slot indices
    pub fn iter_slots(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|t| (i, t)))
    }

    /// Remove every entry for which `keep` returns false, in slot order.
    /// Removed entries are returned so the caller can emit side effects.
    pub fn compact<F>(&mut self, mut keep: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = Vec::new();
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            let drop_it = matches!(entry, Some(item) if !keep(&*item));
            if drop_it {
                if let Some(item) = entry.take() {
                    removed.push(item);
                    self.free.push(slot);
                }
            }
        }
        self.len -= removed.len();
        // Lowest slots are reused first
        self.free.sort_unstable_by(|a, b| b.cmp(a));
        removed
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_and_reuse() {
        let mut pool = Pool::new();
        let a = pool.insert(1);
        let b = pool.insert(2);
        let c = pool.insert(3);
        assert_eq!((a, b, c), (0, 1, 2));

        let removed = pool.compact(|v| *v != 2);
        assert_eq!(removed, vec![2]);
        assert_eq!(pool.len(), 2);
        assert!(pool.get(1).is_none());

        // Freed slot is recycled
        assert_eq!(pool.insert(4), 1);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![1, 4, 3]);
    }

    #[test]
    fn test_lowest_free_slot_first() {
        let mut pool = Pool::new();
        for i in 0..5 {
            pool.insert(i);
        }
        pool.compact(|v| *v % 2 == 0);
        assert_eq!(pool.insert(10), 1);
        assert_eq!(pool.insert(11), 3);
        assert_eq!(pool.insert(12), 5);
    }

    #[test]
    fn test_clear() {
        let mut pool = Pool::new();
        pool.insert("a");
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.insert("b"), 0);
    }

    proptest! {
        #[test]
        fn compact_removes_exactly_the_rejected(values in prop::collection::vec(0u32..100, 0..64)) {
            let mut pool = Pool::new();
            for v in &values {
                pool.insert(*v);
            }
            let removed = pool.compact(|v| v % 3 != 0);
            let expected_removed = values.iter().filter(|v| *v % 3 == 0).count();
            prop_assert_eq!(removed.len(), expected_removed);
            prop_assert_eq!(pool.len(), values.len() - expected_removed);
            prop_assert!(pool.iter().all(|v| v % 3 != 0));
        }
    }
}
