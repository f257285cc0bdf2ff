use tracing::trace;

/// Handle to a tag slot in [`Tags`]. A head handle stays valid for as long as
/// its list is non-empty, even when the row it first held is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tag {
    prev: Option<TagId>,
    next: Option<TagId>,
    idx: usize, // 행 번호
}

/// Arena of doubly linked tag lists, one list per indexed value. Heads are
/// owned by the caller; see [`crate::index::ColumnIndex`].
#[derive(Debug, Default)]
pub struct Tags {
    slots: Vec<Option<Tag>>,
    free: Vec<TagId>,
    len: usize,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tags across all lists.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: TagId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    /// Row ordinal held by `id`.
    ///
    /// # Panics
    /// If `id` was already freed.
    pub fn idx(&self, id: TagId) -> usize {
        self.tag(id).idx
    }

    pub fn next(&self, id: TagId) -> Option<TagId> {
        self.tag(id).next
    }

    pub fn prev(&self, id: TagId) -> Option<TagId> {
        self.tag(id).prev
    }

    /// Walks `next` links from `head`, yielding row ordinals.
    pub fn iter(&self, head: Option<TagId>) -> TagIter<'_> {
        TagIter {
            tags: self,
            cursor: head,
        }
    }

    fn tag(&self, id: TagId) -> &Tag {
        // ! 해제된 태그 접근은 호출자의 잠금 규칙 위반
        match self.slots.get(id.0) {
            Some(Some(tag)) => tag,
            _ => panic!("stale tag {id:?}"),
        }
    }

    fn tag_mut(&mut self, id: TagId) -> &mut Tag {
        match self.slots.get_mut(id.0) {
            Some(Some(tag)) => tag,
            _ => panic!("stale tag {id:?}"),
        }
    }

    fn alloc(&mut self, tag: Tag) -> TagId {
        self.len += 1;
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(tag);
            return id;
        }
        self.slots.push(Some(tag));
        TagId(self.slots.len() - 1)
    }

    fn release(&mut self, id: TagId) {
        self.slots[id.0] = None;
        self.free.push(id);
        self.len -= 1;
    }

    /// Links a new tag for `idx` right after `head` and returns it. With no
    /// head the new tag starts a list of its own.
    pub fn add_tag(&mut self, head: Option<TagId>, idx: usize) -> TagId {
        let id = self.alloc(Tag {
            prev: None,
            next: None,
            idx,
        });
        if let Some(head) = head {
            let next = self.tag(head).next;
            self.tag_mut(head).next = Some(id);
            let tag = self.tag_mut(id);
            tag.prev = Some(head);
            tag.next = next;
            if let Some(next) = next {
                self.tag_mut(next).prev = Some(id);
            }
        }
        trace!(?id, ?head, idx, "add tag");
        id
    }

    /// Unlinks `id` and returns `true` when it was the last tag of its list.
    /// The caller then has to drop its head, which is already freed.
    ///
    /// Removing a head that still has a successor keeps the head slot: the
    /// successor's row and link move into it and the successor slot is freed.
    pub fn remove_tag(&mut self, id: TagId) -> bool {
        let Tag { prev, next, .. } = *self.tag(id);
        let freed = match (prev, next) {
            (Some(prev), next) => {
                self.tag_mut(prev).next = next;
                if let Some(next) = next {
                    self.tag_mut(next).prev = Some(prev);
                }
                id
            }
            (None, None) => {
                trace!(?id, "remove last tag");
                self.release(id);
                return true;
            }
            (None, Some(next)) => {
                // slide
                let Tag {
                    idx, next: after, ..
                } = *self.tag(next);
                let head = self.tag_mut(id);
                head.idx = idx;
                head.next = after;
                if let Some(after) = after {
                    self.tag_mut(after).prev = Some(id);
                }
                next
            }
        };
        trace!(?id, ?freed, "remove tag");
        self.release(freed);
        false
    }

    /// Frees every tag reachable from `head`.
    pub fn remove_list(&mut self, head: TagId) -> usize {
        let mut cursor = Some(head);
        let mut count = 0;
        while let Some(id) = cursor {
            cursor = self.tag(id).next;
            self.release(id);
            count += 1;
        }
        count
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

pub struct TagIter<'a> {
    tags: &'a Tags,
    cursor: Option<TagId>,
}

impl Iterator for TagIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let id = self.cursor?;
        let tag = self.tags.tag(id);
        self.cursor = tag.next;
        Some(tag.idx)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Checks `prev`/`next` agree along the list and that the walk ends.
    fn assert_links(tags: &Tags, head: Option<TagId>) {
        let Some(head) = head else { return };
        assert_eq!(tags.prev(head), None);
        let mut seen = HashSet::new();
        let mut cursor = head;
        seen.insert(cursor);
        while let Some(next) = tags.next(cursor) {
            assert_eq!(tags.prev(next), Some(cursor));
            assert!(seen.insert(next), "cycle at {next:?}");
            cursor = next;
        }
    }

    fn collect(tags: &Tags, head: Option<TagId>) -> Vec<usize> {
        tags.iter(head).collect()
    }

    #[test]
    fn test_add_splices_after_head() {
        let mut tags = Tags::new();
        let head = tags.add_tag(None, 1);
        let t2 = tags.add_tag(Some(head), 2);
        let t3 = tags.add_tag(Some(head), 3);
        assert_eq!(collect(&tags, Some(head)), vec![1, 3, 2]);
        assert_eq!(tags.next(head), Some(t3));
        assert_eq!(tags.prev(t2), Some(t3));
        assert_links(&tags, Some(head));
    }

    #[test]
    fn test_remove_middle_then_all() {
        let mut tags = Tags::new();
        let head = tags.add_tag(None, 1);
        tags.add_tag(Some(head), 2);
        let middle = tags.add_tag(Some(head), 3);
        assert_eq!(collect(&tags, Some(head)), vec![1, 3, 2]);

        assert!(!tags.remove_tag(middle));
        assert_eq!(collect(&tags, Some(head)), vec![1, 2]);
        assert_links(&tags, Some(head));
        assert_eq!(tags.len(), 2);

        assert!(!tags.remove_tag(head));
        assert_eq!(collect(&tags, Some(head)), vec![2]);
        assert!(tags.remove_tag(head));
        assert!(tags.is_empty());
        assert!(!tags.contains(head));
    }

    #[test]
    fn test_head_is_stable() {
        let mut tags = Tags::new();
        let head = tags.add_tag(None, 1);
        for idx in 2..=5 {
            tags.add_tag(Some(head), idx);
        }
        let mut emptied = 0;
        for remaining in (1..=5).rev() {
            assert!(tags.contains(head));
            assert_eq!(collect(&tags, Some(head)).len(), remaining);
            if tags.remove_tag(head) {
                emptied += 1;
                assert_eq!(remaining, 1);
            }
        }
        assert_eq!(emptied, 1);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_remove_tail() {
        let mut tags = Tags::new();
        let head = tags.add_tag(None, 1);
        let tail = tags.add_tag(Some(head), 2);
        assert!(!tags.remove_tag(tail));
        assert_eq!(collect(&tags, Some(head)), vec![1]);
        assert_eq!(tags.next(head), None);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut tags = Tags::new();
        let head = tags.add_tag(None, 1);
        let t2 = tags.add_tag(Some(head), 2);
        tags.remove_tag(t2);
        let t3 = tags.add_tag(Some(head), 3);
        assert_eq!(t2, t3);
        assert_eq!(tags.slots.len(), 2);
    }

    #[test]
    fn test_independent_lists() {
        let mut tags = Tags::new();
        let a = tags.add_tag(None, 1);
        let b = tags.add_tag(None, 2);
        tags.add_tag(Some(a), 3);
        tags.add_tag(Some(b), 4);
        assert_eq!(collect(&tags, Some(a)), vec![1, 3]);
        assert_eq!(collect(&tags, Some(b)), vec![2, 4]);
        assert_eq!(tags.remove_list(a), 2);
        assert_eq!(tags.len(), 2);
        assert_eq!(collect(&tags, Some(b)), vec![2, 4]);
    }

    #[test]
    #[should_panic(expected = "stale tag")]
    fn test_stale_tag_panics() {
        let mut tags = Tags::new();
        let head = tags.add_tag(None, 1);
        tags.remove_tag(head);
        tags.idx(head);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        // 리스트에서 n번째 태그 제거
        Remove(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Add), (0usize..32).prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn prop_list_matches_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut tags = Tags::new();
            let mut head: Option<TagId> = None;
            let mut model: HashSet<usize> = HashSet::new();
            let mut next_idx = 0;
            for op in ops {
                match op {
                    Op::Add => {
                        let id = tags.add_tag(head, next_idx);
                        head.get_or_insert(id);
                        model.insert(next_idx);
                        next_idx += 1;
                    }
                    Op::Remove(n) => {
                        let Some(first) = head else { continue };
                        let count = tags.iter(head).count();
                        let mut target = first;
                        for _ in 0..n % count {
                            target = tags.next(target).unwrap();
                        }
                        model.remove(&tags.idx(target));
                        let emptied = tags.remove_tag(target);
                        prop_assert_eq!(emptied, model.is_empty());
                        if emptied {
                            head = None;
                        } else {
                            prop_assert!(tags.contains(first));
                        }
                    }
                }
                assert_links(&tags, head);
                let walked: Vec<usize> = tags.iter(head).collect();
                prop_assert_eq!(walked.len(), model.len());
                prop_assert_eq!(walked.into_iter().collect::<HashSet<_>>(), model.clone());
                prop_assert_eq!(tags.len(), model.len());
            }
        }
    }
}
