use std::cmp::{Ord, Ordering};
use std::fmt::Debug;
use std::ops::Range;
use std::vec::Vec;

use crate::mediator::MediatorIndex;

/// Smallest supported branching factor. Smaller values are silently raised to it.
pub const MIN_ARITY: usize = 2;

/// Position of an entry inside heap storage.
/// Kept distinct from `MediatorIndex` so the two never get mixed up.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub(crate) struct HeapIndex(usize);

impl HeapIndex {
    pub(crate) const ROOT: HeapIndex = HeapIndex(0);

    #[cfg(test)]
    #[inline(always)]
    pub(crate) fn as_usize(self) -> usize {
        self.0
    }
}

#[derive(Clone)]
pub(crate) struct HeapEntry<TPriority> {
    outer_pos: MediatorIndex,
    priority: TPriority,
}

/// Max-heap laid out as a complete `arity`-ary tree in a flat vector.
///
/// Entries don't own keys, they only point into the key map by `MediatorIndex`.
/// Every relocation of an entry is reported through a change handler
/// `FnMut(MediatorIndex, HeapIndex)` so the owner can keep its key map in sync.
#[derive(Clone)]
pub(crate) struct DaryHeap<TPriority> {
    data: Vec<HeapEntry<TPriority>>,
    arity: usize,
}

impl<TPriority: Ord> DaryHeap<TPriority> {
    #[inline(always)]
    pub(crate) fn with_capacity(arity: usize, capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            arity: arity.max(MIN_ARITY),
        }
    }

    #[inline(always)]
    pub(crate) fn arity(&self) -> usize {
        self.arity
    }

    #[inline(always)]
    pub(crate) fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Appends entry at the end of storage and bubbles it up.
    /// Calls change_handler for every entry that ended on new position,
    /// including the pushed one.
    #[inline(always)]
    pub(crate) fn push<TChangeHandler: FnMut(MediatorIndex, HeapIndex)>(
        &mut self,
        outer_pos: MediatorIndex,
        priority: TPriority,
        change_handler: TChangeHandler,
    ) {
        self.data.push(HeapEntry {
            outer_pos,
            priority,
        });
        self.heapify_up(HeapIndex(self.data.len() - 1), change_handler);
    }

    #[inline(always)]
    pub(crate) fn most_prioritized_idx(&self) -> Option<(MediatorIndex, HeapIndex)> {
        self.data.first().map(|x| (x.outer_pos, HeapIndex::ROOT))
    }

    /// Removes item at position and returns it.
    /// The last entry takes the freed slot and then moves up or down as needed.
    /// Time complexity - O(log n) swaps and change_handler calls
    pub(crate) fn remove<TChangeHandler: FnMut(MediatorIndex, HeapIndex)>(
        &mut self,
        position: HeapIndex,
        change_handler: TChangeHandler,
    ) -> Option<(MediatorIndex, TPriority)> {
        if position >= self.len() {
            return None;
        }
        let removed = self.data.swap_remove(position.0);
        if position < self.len() {
            self.restore_at(position, change_handler);
        }
        Some((removed.outer_pos, removed.priority))
    }

    #[inline(always)]
    pub(crate) fn look_into(&self, position: HeapIndex) -> Option<(MediatorIndex, &TPriority)> {
        let entry = self.data.get(position.0)?;
        Some((entry.outer_pos, &entry.priority))
    }

    /// Changes priority of queue item and returns the old one.
    /// Lowered priority sinks the entry, raised priority lifts it, equal one does nothing.
    pub(crate) fn change_priority<TChangeHandler: FnMut(MediatorIndex, HeapIndex)>(
        &mut self,
        position: HeapIndex,
        updated: TPriority,
        change_handler: TChangeHandler,
    ) -> TPriority {
        assert!(
            position < self.len(),
            "Out of index during changing priority"
        );

        let old = std::mem::replace(&mut self.data[position.0].priority, updated);
        match old.cmp(&self.data[position.0].priority) {
            Ordering::Less => {
                self.heapify_up(position, change_handler);
            }
            Ordering::Equal => {}
            Ordering::Greater => {
                self.heapify_down(position, change_handler);
            }
        }
        old
    }

    /// Repoints entry to another key map slot.
    /// Needed after the key map moved one of its keys during swap removal.
    #[inline(always)]
    pub(crate) fn change_outer_pos(&mut self, outer_pos: MediatorIndex, position: HeapIndex) {
        assert!(position < self.len(), "Out of index during changing outer pos");
        self.data[position.0].outer_pos = outer_pos;
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> HeapIndex {
        HeapIndex(self.data.len())
    }

    #[inline(always)]
    pub(crate) fn usize_len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub(crate) fn clear(&mut self) {
        self.data.clear()
    }

    #[inline(always)]
    pub(crate) fn iter(&self) -> DaryHeapIterator<'_, TPriority> {
        DaryHeapIterator {
            inner: self.data.iter(),
        }
    }

    /// Positions of children of `position` which are currently in use.
    #[inline(always)]
    pub(crate) fn children(
        &self,
        position: HeapIndex,
    ) -> impl ExactSizeIterator<Item = HeapIndex> {
        self.child_range(position.0).map(HeapIndex)
    }

    #[inline(always)]
    fn parent_of(&self, position: usize) -> Option<usize> {
        if position == 0 {
            None
        } else {
            Some((position - 1) / self.arity)
        }
    }

    #[inline(always)]
    fn child_range(&self, position: usize) -> Range<usize> {
        let len = self.data.len();
        match position
            .checked_mul(self.arity)
            .and_then(|x| x.checked_add(1))
        {
            Some(first) if first < len => first..len.min(first.saturating_add(self.arity)),
            _ => len..len,
        }
    }

    // Entry at position was replaced by foreign one, so it may violate order in any direction.
    fn restore_at<TChangeHandler: FnMut(MediatorIndex, HeapIndex)>(
        &mut self,
        position: HeapIndex,
        change_handler: TChangeHandler,
    ) {
        let exceeds_parent = match self.parent_of(position.0) {
            Some(parent) => self.data[parent].priority < self.data[position.0].priority,
            None => false,
        };
        if exceeds_parent {
            self.heapify_up(position, change_handler);
        } else {
            self.heapify_down(position, change_handler);
        }
    }

    fn heapify_up<TChangeHandler: FnMut(MediatorIndex, HeapIndex)>(
        &mut self,
        position: HeapIndex,
        mut change_handler: TChangeHandler,
    ) {
        debug_assert!(position.0 < self.data.len(), "Out of index in heapify_up");
        let mut position = position.0;
        while let Some(parent_pos) = self.parent_of(position) {
            if self.data[parent_pos].priority < self.data[position].priority {
                self.swap_items(parent_pos, position);
                change_handler(self.data[position].outer_pos, HeapIndex(position));
                position = parent_pos;
            } else {
                break;
            }
        }
        change_handler(self.data[position].outer_pos, HeapIndex(position));
    }

    fn heapify_down<TChangeHandler: FnMut(MediatorIndex, HeapIndex)>(
        &mut self,
        position: HeapIndex,
        mut change_handler: TChangeHandler,
    ) {
        debug_assert!(position.0 < self.data.len(), "Out of index in heapify_down");
        let mut position = position.0;
        loop {
            let children = self.child_range(position);
            if children.is_empty() {
                break;
            }
            // First child wins ties, later ones must be strictly bigger.
            let mut max_child_idx = children.start;
            for child in children.skip(1) {
                if self.data[max_child_idx].priority < self.data[child].priority {
                    max_child_idx = child;
                }
            }

            if self.data[position].priority < self.data[max_child_idx].priority {
                self.swap_items(position, max_child_idx);
                change_handler(self.data[position].outer_pos, HeapIndex(position));
                position = max_child_idx;
            } else {
                break;
            }
        }
        change_handler(self.data[position].outer_pos, HeapIndex(position));
    }

    #[inline(always)]
    fn swap_items(&mut self, pos1: usize, pos2: usize) {
        debug_assert!(pos1 < self.data.len(), "Out of index in first pos in swap");
        debug_assert!(pos2 < self.data.len(), "Out of index in second pos in swap");
        self.data.swap(pos1, pos2);
    }

    #[cfg(test)]
    pub(crate) fn is_valid_heap(&self) -> bool {
        self.data.iter().enumerate().skip(1).all(|(i, current)| {
            let parent = &self.data[(i - 1) / self.arity];
            parent.priority >= current.priority
        })
    }
}

/// Unordered iterator over storage.
pub(crate) struct DaryHeapIterator<'a, TPriority> {
    inner: std::slice::Iter<'a, HeapEntry<TPriority>>,
}

impl<'a, TPriority> Iterator for DaryHeapIterator<'a, TPriority> {
    type Item = (MediatorIndex, &'a TPriority);

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|x| (x.outer_pos, &x.priority))
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    #[inline(always)]
    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.inner.count()
    }
}

// Default implementations

impl<TPriority: Debug> Debug for HeapEntry<TPriority> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{{outer_pos: {:?}, priority: {:?}}}",
            &self.outer_pos, &self.priority
        )
    }
}

impl<TPriority: Debug> Debug for DaryHeap<TPriority> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_struct("DaryHeap")
            .field("arity", &self.arity)
            .field("data", &self.data)
            .finish()
    }
}
