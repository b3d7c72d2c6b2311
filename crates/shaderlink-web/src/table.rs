//! Integer ids for host objects that only exist as JS references.

use std::collections::HashMap;

/// Maps `u32` ids to objects. Ids start at 1; `0` is never handed out
/// because it means "null" on the host boundary.
#[derive(Debug)]
pub struct ObjectTable<T> {
    entries: HashMap<u32, T>,
    last_id: u32,
}

impl<T> ObjectTable<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            last_id: 0,
        }
    }

    /// Store `value` under a fresh id
    pub fn insert(&mut self, value: T) -> u32 {
        let mut id = self.last_id;
        loop {
            id = id.wrapping_add(1);
            if id != 0 && !self.entries.contains_key(&id) {
                break;
            }
        }
        self.last_id = id;
        self.entries.insert(id, value);
        id
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn remove(&mut self, id: u32) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ObjectTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_start_at_one() {
        let mut table = ObjectTable::new();
        assert_eq!(table.insert("a"), 1);
        assert_eq!(table.insert("b"), 2);
        assert_eq!(table.get(1), Some(&"a"));
        assert_eq!(table.get(0), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut table = ObjectTable::new();
        let first = table.insert(10);
        assert_eq!(table.remove(first), Some(10));
        assert!(!table.contains(first));
        assert_eq!(table.insert(11), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_wraparound_skips_null_and_live_ids() {
        let mut table = ObjectTable::new();
        let kept = table.insert('x');
        table.last_id = u32::MAX - 1;
        assert_eq!(table.insert('y'), u32::MAX);
        // Next id wraps past 0 and the still-live id 1
        assert_eq!(table.insert('z'), 2);
        assert_eq!(table.get(kept), Some(&'x'));
    }
}
