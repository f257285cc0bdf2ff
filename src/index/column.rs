use crate::index::tag::{TagId, TagIter, Tags};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::trace;

/// Value → rows mapping for one indexed column.
///
/// Each distinct value owns one tag list whose head is the first tag ever
/// added for it. Later tags are kept per row so a row can leave its value in
/// O(1).
#[derive(Debug)]
pub struct ColumnIndex<K = String> {
    tags: Tags,
    heads: HashMap<K, TagId>,
    rows: HashMap<usize, (K, TagId)>,
}

impl<K> Default for ColumnIndex<K> {
    fn default() -> Self {
        Self {
            tags: Tags::default(),
            heads: HashMap::new(),
            rows: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone + Debug> ColumnIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct values with at least one row.
    pub fn value_count(&self) -> usize {
        self.heads.len()
    }

    pub fn value_of(&self, row: usize) -> Option<&K> {
        self.rows.get(&row).map(|(value, _)| value)
    }

    /// Rows currently holding `value`, most recently added after the first.
    pub fn rows(&self, value: &K) -> TagIter<'_> {
        self.tags.iter(self.heads.get(value).copied())
    }

    /// Assigns `value` to `row`, moving the row off its previous value.
    pub fn insert(&mut self, value: K, row: usize) {
        if let Some((current, _)) = self.rows.get(&row) {
            if *current == value {
                return;
            }
            self.remove(row);
        }
        let head = self.heads.get(&value).copied();
        let tag = self.tags.add_tag(head, row);
        if head.is_none() {
            self.heads.insert(value.clone(), tag);
        }
        trace!(row, ?value, "index row");
        self.rows.insert(row, (value, tag));
    }

    /// Drops `row` from the index. Returns `false` if it was not indexed.
    pub fn remove(&mut self, row: usize) -> bool {
        let Some((value, tag)) = self.rows.remove(&row) else {
            return false;
        };
        // 머리 태그를 지우면 다음 행이 머리 슬롯으로 옮겨짐
        let slid = match (self.tags.prev(tag), self.tags.next(tag)) {
            (None, Some(next)) => Some(self.tags.idx(next)),
            _ => None,
        };
        if self.tags.remove_tag(tag) {
            self.heads.remove(&value);
        }
        if let Some(moved) = slid
            && let Some(entry) = self.rows.get_mut(&moved)
        {
            entry.1 = tag;
        }
        trace!(row, ?value, "unindex row");
        true
    }

    /// Drops every row holding `value` and returns how many there were.
    pub fn remove_value(&mut self, value: &K) -> usize {
        let Some(head) = self.heads.remove(value) else {
            return 0;
        };
        for row in self.tags.iter(Some(head)) {
            self.rows.remove(&row);
        }
        self.tags.remove_list(head)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
        self.heads.clear();
        self.rows.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn sorted(rows: impl Iterator<Item = usize>) -> Vec<usize> {
        let mut rows: Vec<usize> = rows.collect();
        rows.sort_unstable();
        rows
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut index = ColumnIndex::new();
        index.insert("IBM".to_string(), 0);
        index.insert("MSFT".to_string(), 1);
        index.insert("IBM".to_string(), 2);
        assert_eq!(sorted(index.rows(&"IBM".to_string())), vec![0, 2]);
        assert_eq!(sorted(index.rows(&"MSFT".to_string())), vec![1]);
        assert_eq!(index.rows(&"ORCL".to_string()).count(), 0);
        assert_eq!(index.len(), 3);
        assert_eq!(index.value_count(), 2);
    }

    #[test]
    fn test_update_moves_row() {
        let mut index = ColumnIndex::new();
        index.insert(10, 0);
        index.insert(10, 1);
        index.insert(20, 0);
        assert_eq!(sorted(index.rows(&10)), vec![1]);
        assert_eq!(sorted(index.rows(&20)), vec![0]);
        assert_eq!(index.value_of(0), Some(&20));
        // 같은 값이면 아무 일도 없음
        index.insert(20, 0);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove_head_row_then_moved_row() {
        let mut index = ColumnIndex::new();
        index.insert('a', 1);
        index.insert('a', 2);
        index.insert('a', 3);
        // row 1 is the head; removing it slides row 3 into the head slot
        assert!(index.remove(1));
        assert_eq!(sorted(index.rows(&'a')), vec![2, 3]);
        assert!(index.remove(3));
        assert_eq!(sorted(index.rows(&'a')), vec![2]);
        assert!(index.remove(2));
        assert_eq!(index.value_count(), 0);
        assert!(index.is_empty());
        assert!(!index.remove(2));
    }

    #[test]
    fn test_remove_value() {
        let mut index = ColumnIndex::new();
        for row in 0..5 {
            index.insert(row % 2, row);
        }
        assert_eq!(index.remove_value(&0), 3);
        assert_eq!(index.remove_value(&0), 0);
        assert_eq!(sorted(index.rows(&1)), vec![1, 3]);
        assert_eq!(index.value_of(2), None);
        assert_eq!(index.len(), 2);
        index.insert(0, 2);
        assert_eq!(sorted(index.rows(&0)), vec![2]);
    }

    #[test]
    fn test_clear() {
        let mut index = ColumnIndex::new();
        index.insert(1u8, 0);
        index.insert(2u8, 1);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.value_count(), 0);
        assert_eq!(index.rows(&1).count(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, usize),
        Remove(usize),
        RemoveValue(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..4, 0usize..16).prop_map(|(value, row)| Op::Insert(value, row)),
            2 => (0usize..16).prop_map(Op::Remove),
            1 => (0u8..4).prop_map(Op::RemoveValue),
        ]
    }

    proptest! {
        #[test]
        fn prop_index_matches_model(ops in prop::collection::vec(op_strategy(), 0..96)) {
            let mut index = ColumnIndex::new();
            let mut model: HashMap<usize, u8> = HashMap::new();
            for op in ops {
                match op {
                    Op::Insert(value, row) => {
                        index.insert(value, row);
                        model.insert(row, value);
                    }
                    Op::Remove(row) => {
                        prop_assert_eq!(index.remove(row), model.remove(&row).is_some());
                    }
                    Op::RemoveValue(value) => {
                        let before = model.len();
                        model.retain(|_, v| *v != value);
                        prop_assert_eq!(index.remove_value(&value), before - model.len());
                    }
                }
                for value in 0u8..4 {
                    let mut expected: Vec<usize> = model
                        .iter()
                        .filter(|(_, v)| **v == value)
                        .map(|(row, _)| *row)
                        .collect();
                    expected.sort_unstable();
                    prop_assert_eq!(sorted(index.rows(&value)), expected);
                }
                prop_assert_eq!(index.len(), model.len());
                prop_assert_eq!(index.tags.len(), model.len());
            }
        }
    }
}
