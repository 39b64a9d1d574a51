use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt::{Debug, Display};
use std::hash::{BuildHasher, Hash};

use crate::editable_dary_heap::{DaryHeap, DaryHeapIterator, HeapIndex, MIN_ARITY};
use crate::mediator::{Mediator, MediatorEntry, MediatorIndex};

/// A max priority queue laid out as a d-ary heap that supports lookup by key.
///
/// Bigger `TPriority` values will have more priority.
/// Every node of the underlying tree has up to `arity` children; `arity` is
/// chosen at construction and values below 2 are raised to 2.
///
/// Besides [`insert`], [`peek`] and [`top`], any present key can be
/// [`remove`]d or get its priority [`update`]d in ***O(log n)***.
///
/// It is logic error if priority values changes other way than by [`update`] method.
/// It is logic error if key values changes somehow while in queue.
/// This changes normally possible only through `Cell`, `RefCell`, global state, IO, or unsafe code.
///
/// The queue is not synchronized. Wrap it into a `Mutex` to share between threads.
///
/// [`insert`]: struct.DaryPriorityQueue.html#method.insert
/// [`peek`]: struct.DaryPriorityQueue.html#method.peek
/// [`top`]: struct.DaryPriorityQueue.html#method.top
/// [`remove`]: struct.DaryPriorityQueue.html#method.remove
/// [`update`]: struct.DaryPriorityQueue.html#method.update
///
/// # Examples
///
/// ```
/// use dary_priority_queue::{DaryPriorityQueue, PriorityQueueError};
///
/// let mut queue = DaryPriorityQueue::new(2, 0);
///
/// queue.insert("A", 10);
/// queue.insert("B", 5);
/// queue.insert("C", 8);
/// assert_eq!(queue.peek(), Ok((&"A", &10)));
///
/// // Raise priority of B above everyone else
/// assert_eq!(queue.update(&"B", 20), Ok(5));
/// assert_eq!(queue.peek(), Ok((&"B", &20)));
///
/// // Early removal by key
/// assert_eq!(queue.remove(&"A"), Ok(("A", 10)));
/// assert_eq!(queue.peek(), Ok((&"B", &20)));
///
/// assert_eq!(queue.top(), Ok(("B", 20)));
/// assert_eq!(queue.peek(), Ok((&"C", &8)));
/// assert_eq!(queue.top(), Ok(("C", 8)));
///
/// assert_eq!(queue.peek(), Err(PriorityQueueError::EmptyQueue));
/// assert_eq!(queue.top(), Err(PriorityQueueError::EmptyQueue));
/// assert_eq!(queue.remove(&"A"), Err(PriorityQueueError::ElementNotFound));
/// ```
#[derive(Clone)]
pub struct DaryPriorityQueue<TKey, TPriority, S = RandomState>
where
    TKey: Hash + Eq,
    TPriority: Ord,
    S: BuildHasher,
{
    heap: DaryHeap<TPriority>,
    key_to_pos: Mediator<TKey, S>,
}

impl<TKey: Hash + Eq, TPriority: Ord> DaryPriorityQueue<TKey, TPriority, RandomState> {
    /// Creates an empty queue with given `arity` and with allocated memory enough
    /// to keep `capacity` elements without reallocation.
    ///
    /// `arity` less than 2 is silently replaced by 2.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// let mut queue = DaryPriorityQueue::new(0, 16);
    /// assert_eq!(queue.arity(), 2);
    /// queue.insert("Key", 4);
    /// ```
    #[inline]
    pub fn new(arity: usize, capacity: usize) -> Self {
        Self::with_arity_and_hasher(arity, capacity, RandomState::default())
    }

    /// Creates an empty queue with given `arity`.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// let mut queue = DaryPriorityQueue::with_arity(4);
    /// assert_eq!(queue.arity(), 4);
    /// queue.insert("Key", 4);
    /// ```
    #[inline]
    pub fn with_arity(arity: usize) -> Self {
        Self::new(arity, 0)
    }
}

impl<TKey: Hash + Eq, TPriority: Ord, S: BuildHasher> DaryPriorityQueue<TKey, TPriority, S> {
    /// Creates an empty queue with specific Hasher.
    /// Useful when Hasher cannot be defaulted.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// use std::collections::hash_map::RandomState;
    /// let mut queue = DaryPriorityQueue::with_arity_and_hasher(3, 10, RandomState::default());
    /// queue.insert("Key", 4);
    /// ```
    #[inline]
    pub fn with_arity_and_hasher(arity: usize, capacity: usize, hasher: S) -> Self {
        Self {
            heap: DaryHeap::with_capacity(arity, capacity),
            key_to_pos: Mediator::with_capacity_and_hasher(capacity, hasher),
        }
    }

    /// Number of children every node of the heap may have.
    #[inline]
    pub fn arity(&self) -> usize {
        self.heap.arity()
    }

    /// Reserves space for at least `additional` new elements.
    ///
    /// ### Panics
    ///
    /// Panics if the new capacity overflows `usize`.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.heap.reserve(additional);
        self.key_to_pos.reserve(additional);
    }

    /// Number of elements queue can keep without reallocation of its storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Adds new element to queue if key is missing.
    ///
    /// A key is never stored twice: if it is already present, its priority
    /// is replaced like with [`update`] and the old priority is returned.
    /// In that case the stored key is kept and the passed one is dropped.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// let mut queue = DaryPriorityQueue::with_arity(3);
    /// assert_eq!(queue.insert("First", 5), None);
    /// assert_eq!(queue.peek(), Ok((&"First", &5)));
    /// assert_eq!(queue.insert("First", 10), Some(5));
    /// assert_eq!(queue.peek(), Ok((&"First", &10)));
    /// assert_eq!(queue.len(), 1);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Average complexity is ***O(log n)***
    /// If elements inserted in descending order, amortized complexity is ***O(1)***.
    ///
    /// The worst case is when reallocation appears.
    /// In this case complexity of single call is ***O(n)***.
    ///
    /// [`update`]: struct.DaryPriorityQueue.html#method.update
    pub fn insert(&mut self, key: TKey, priority: TPriority) -> Option<TPriority> {
        let heap_len = self.heap.len();
        match self.key_to_pos.entry(key) {
            MediatorEntry::Vacant(entry) => {
                let position = entry.insert(heap_len);
                // Borrow checker treats borrowing a field as borrowing whole structure
                // so we need to get references to fields to borrow them individually.
                let key_to_pos = &mut self.key_to_pos;
                self.heap.push(position, priority, |index, heap_idx| {
                    *key_to_pos.get_index_mut(index) = heap_idx
                });
                None
            }
            MediatorEntry::Occupied(entry) => {
                let position = entry.index();
                Some(self.set_priority_internal(position, priority))
            }
        }
    }

    /// Get reference to the pair with the maximal priority.
    /// Returns [`PriorityQueueError::EmptyQueue`] if there is nothing to peek.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::{DaryPriorityQueue, PriorityQueueError};
    /// let mut queue = DaryPriorityQueue::with_arity(4);
    /// assert_eq!(queue.peek(), Err(PriorityQueueError::EmptyQueue));
    /// for x in 0..5 {
    ///     queue.insert(x, x);
    /// }
    /// assert_eq!(queue.peek(), Ok((&4, &4)));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    ///
    /// [`PriorityQueueError::EmptyQueue`]: enum.PriorityQueueError.html#variant.EmptyQueue
    pub fn peek(&self) -> Result<(&TKey, &TPriority), PriorityQueueError> {
        let (first_idx, heap_idx) = self
            .heap
            .most_prioritized_idx()
            .ok_or(PriorityQueueError::EmptyQueue)?;
        let (key, _) = self.key_to_pos.get_index(first_idx);
        let (_, priority) = self
            .heap
            .look_into(heap_idx)
            .expect("Checked using key_to_pos");
        Ok((key, priority))
    }

    /// Remove and return item with the maximal priority.
    /// Returns [`PriorityQueueError::EmptyQueue`] if queue has no items.
    ///
    /// Items with equal priorities are returned in unspecified order.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::{DaryPriorityQueue, PriorityQueueError};
    /// let mut queue = DaryPriorityQueue::with_arity(3);
    /// for x in 0..3 {
    ///     queue.insert(x, x * 10);
    /// }
    /// assert_eq!(queue.top(), Ok((2, 20)));
    /// assert_eq!(queue.top(), Ok((1, 10)));
    /// assert_eq!(queue.top(), Ok((0, 0)));
    /// assert_eq!(queue.top(), Err(PriorityQueueError::EmptyQueue));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Cost of top is always ***O(d log<sub>d</sub> n)*** comparisons.
    ///
    /// [`PriorityQueueError::EmptyQueue`]: enum.PriorityQueueError.html#variant.EmptyQueue
    pub fn top(&mut self) -> Result<(TKey, TPriority), PriorityQueueError> {
        let (to_remove, _) = self
            .heap
            .most_prioritized_idx()
            .ok_or(PriorityQueueError::EmptyQueue)?;
        Ok(self.remove_internal(to_remove))
    }

    /// Removes item by key and returns it.
    /// Returns [`PriorityQueueError::ElementNotFound`] if key is missing.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::{DaryPriorityQueue, PriorityQueueError};
    /// let mut queue = DaryPriorityQueue::with_arity(2);
    /// for x in 0..5 {
    ///     queue.insert(x, x);
    /// }
    /// assert_eq!(queue.remove(&2), Ok((2, 2)));
    /// assert_eq!(queue.remove(&2), Err(PriorityQueueError::ElementNotFound));
    /// assert_eq!(queue.top(), Ok((4, 4)));
    /// assert_eq!(queue.top(), Ok((3, 3)));
    /// // There is no 2
    /// assert_eq!(queue.top(), Ok((1, 1)));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// On average the function will require ***O(log n)*** operations.
    ///
    /// [`PriorityQueueError::ElementNotFound`]: enum.PriorityQueueError.html#variant.ElementNotFound
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Result<(TKey, TPriority), PriorityQueueError>
    where
        TKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (index, _, _) = self
            .key_to_pos
            .get_full(key)
            .ok_or(PriorityQueueError::ElementNotFound)?;
        Ok(self.remove_internal(index))
    }

    /// Set new priority for existing key and reorder the queue.
    /// Returns old priority if succeeds or [`PriorityQueueError::ElementNotFound`].
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::{DaryPriorityQueue, PriorityQueueError};
    /// let mut queue = DaryPriorityQueue::with_arity(3);
    /// queue.insert("first", 0);
    /// queue.insert("second", 1);
    /// queue.insert("third", 2);
    /// assert_eq!(queue.update(&"second", 5), Ok(1));
    /// assert_eq!(queue.get_priority(&"second"), Some(&5));
    /// assert_eq!(queue.top(), Ok(("second", 5)));
    /// assert_eq!(queue.update(&"missing", 5), Err(PriorityQueueError::ElementNotFound));
    /// ```
    ///
    /// ### Time complexity
    ///
    /// In best case ***O(1)***, in average costs ***O(log n)***.
    ///
    /// [`PriorityQueueError::ElementNotFound`]: enum.PriorityQueueError.html#variant.ElementNotFound
    #[inline]
    pub fn update<Q>(
        &mut self,
        key: &Q,
        priority: TPriority,
    ) -> Result<TPriority, PriorityQueueError>
    where
        TKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (map_pos, _, _) = self
            .key_to_pos
            .get_full(key)
            .ok_or(PriorityQueueError::ElementNotFound)?;
        Ok(self.set_priority_internal(map_pos, priority))
    }

    /// Get reference to the priority by key.
    ///
    /// ### Time complexity
    ///
    /// ***O(1)*** in average (limited by hash map key lookup).
    pub fn get_priority<Q>(&self, key: &Q) -> Option<&TPriority>
    where
        TKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let heap_idx = self.key_to_pos.get(key)?;
        Some(
            self.heap
                .look_into(heap_idx)
                .expect("Must contain if key_to_pos contain")
                .1,
        )
    }

    /// Returns true if queue contains the key.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        TKey: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.key_to_pos.get(key).is_some()
    }

    /// Get the number of elements in queue.
    ///
    /// ### Time complexity
    ///
    /// Always ***O(1)***
    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.key_to_pos.len(), self.heap.usize_len());
        self.key_to_pos.len()
    }

    /// Returns true if queue is empty.
    ///
    /// ```
    /// let mut queue = dary_priority_queue::DaryPriorityQueue::with_arity(2);
    /// assert!(queue.is_empty());
    /// queue.insert(0, 5);
    /// assert!(!queue.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.heap.is_empty(), self.key_to_pos.is_empty());
        self.key_to_pos.is_empty()
    }

    /// Make the queue empty. Arity and allocated memory are kept.
    ///
    /// ### Time complexity
    ///
    /// Always ***O(n)***
    #[inline]
    pub fn clear(&mut self) {
        self.heap.clear();
        self.key_to_pos.clear();
    }

    /// Create readonly borrowing iterator over queue.
    /// Items are visited in storage order, not in priority order.
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// use std::collections::HashMap;
    /// let mut queue = DaryPriorityQueue::with_arity(3);
    /// for x in 0..5 {
    ///     queue.insert(x, x);
    /// }
    /// let entries: HashMap<i32, i32> = queue.iter().map(|(&k, &p)| (k, p)).collect();
    /// let expected: HashMap<i32, i32> = (0..5).map(|x| (x, x)).collect();
    /// assert_eq!(entries, expected);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// Iterating over whole queue is ***O(n)***
    pub fn iter(&self) -> DaryPriorityQueueBorrowIter<'_, TKey, TPriority, S> {
        DaryPriorityQueueBorrowIter {
            key_to_pos: &self.key_to_pos,
            heap_iterator: self.heap.iter(),
        }
    }

    /// Renders storage as a tree, one node per line, for debugging.
    /// Each node is printed as `[priority] key` using their `Debug` forms.
    /// The output format is not stable.
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// let mut queue = DaryPriorityQueue::with_arity(3);
    /// assert_eq!(queue.ascii_tree(), "(empty)\n");
    /// for (key, priority) in [("a", 4), ("b", 3), ("c", 2), ("d", 1), ("e", 0)] {
    ///     queue.insert(key, priority);
    /// }
    /// assert_eq!(
    ///     queue.ascii_tree(),
    ///     "[4] \"a\"\n\
    ///      ├── [3] \"b\"\n\
    ///      │   └── [0] \"e\"\n\
    ///      ├── [2] \"c\"\n\
    ///      └── [1] \"d\"\n"
    /// );
    /// ```
    pub fn ascii_tree(&self) -> String
    where
        TKey: Debug,
        TPriority: Debug,
    {
        let mut out = String::new();
        let root = match self.heap.most_prioritized_idx() {
            Some((_, root)) => root,
            None => {
                out.push_str("(empty)\n");
                return out;
            }
        };
        self.push_node_label(root, &mut out);
        self.push_children(root, "", &mut out);
        out
    }

    fn push_children(&self, position: HeapIndex, prefix: &str, out: &mut String)
    where
        TKey: Debug,
        TPriority: Debug,
    {
        let children = self.heap.children(position);
        let count = children.len();
        for (i, child) in children.enumerate() {
            let is_last = i + 1 == count;
            let (connector, continuation) = if is_last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            out.push_str(prefix);
            out.push_str(connector);
            self.push_node_label(child, out);
            self.push_children(child, &format!("{}{}", prefix, continuation), out);
        }
    }

    fn push_node_label(&self, position: HeapIndex, out: &mut String)
    where
        TKey: Debug,
        TPriority: Debug,
    {
        let (map_idx, priority) = self
            .heap
            .look_into(position)
            .expect("Tree walk stays inside heap");
        let (key, heap_idx) = self.key_to_pos.get_index(map_idx);
        debug_assert_eq!(heap_idx, position);
        out.push_str(&format!("[{:?}] {:?}\n", priority, key));
    }

    // Removes entry from by index of map
    fn remove_internal(&mut self, position: MediatorIndex) -> (TKey, TPriority) {
        // Borrow checker treats borrowing a field as borrowing whole structure
        // so we need to get references to fields to borrow them individually.
        let key_to_pos = &mut self.key_to_pos;
        let heap = &mut self.heap;

        let (_, heap_to_rem) = key_to_pos.get_index(position);

        let (removed_idx, priority) = heap
            .remove(heap_to_rem, |index, heap_idx| {
                *key_to_pos.get_index_mut(index) = heap_idx
            })
            .expect("Checked by key_to_pos");
        debug_assert_eq!(position, removed_idx);

        // Map moves its last key into freed slot, heap must follow it.
        let (removed_key, _) = key_to_pos.swap_remove_index(position);
        if MediatorIndex(key_to_pos.len()) != removed_idx {
            let (_, heap_idx_of_moved) = key_to_pos.get_index(removed_idx);
            heap.change_outer_pos(removed_idx, heap_idx_of_moved);
        }

        (removed_key, priority)
    }

    // Do O(log n) heap updates and by-index map changes
    fn set_priority_internal(&mut self, position: MediatorIndex, priority: TPriority) -> TPriority {
        // Borrow checker treats borrowing a field as borrowing whole structure
        // so we need to get references to fields to borrow them individually.
        let heap = &mut self.heap;
        let key_to_pos = &mut self.key_to_pos;

        let (_, heap_idx) = key_to_pos.get_index(position);

        heap.change_priority(heap_idx, priority, |index, heap_idx| {
            *key_to_pos.get_index_mut(index) = heap_idx
        })
    }
}

impl<TKey: Hash + Eq + Debug, TPriority: Ord + Debug, S: BuildHasher> Debug
    for DaryPriorityQueue<TKey, TPriority, S>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<TKey: Hash + Eq, TPriority: Ord, S: BuildHasher + Default> Default
    for DaryPriorityQueue<TKey, TPriority, S>
{
    /// Creates an empty binary (arity 2) queue.
    #[inline]
    fn default() -> Self {
        Self::with_arity_and_hasher(MIN_ARITY, 0, S::default())
    }
}

impl<TKey: Hash + Eq, TPriority: Ord, S: BuildHasher> IntoIterator
    for DaryPriorityQueue<TKey, TPriority, S>
{
    type Item = (TKey, TPriority);
    type IntoIter = DaryPriorityQueueIterator<TKey, TPriority, S>;

    /// Make iterator that return items in descending order.
    ///
    /// ### Examples
    ///
    /// ```
    /// use dary_priority_queue::DaryPriorityQueue;
    /// let mut queue = DaryPriorityQueue::with_arity(3);
    /// queue.insert("first", 0);
    /// queue.insert("second", 1);
    /// queue.insert("third", 2);
    /// let mut iterator = queue.into_iter();
    /// assert_eq!(iterator.next(), Some(("third", 2)));
    /// assert_eq!(iterator.next(), Some(("second", 1)));
    /// assert_eq!(iterator.next(), Some(("first", 0)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    ///
    /// ### Time complexity
    ///
    /// ***O(n log n)*** for iteration.
    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter { queue: self }
    }
}

/// This is consuming iterator that returns elements in decreasing order
///
/// ### Time complexity
/// Overall complexity of iteration is ***O(n log n)***
pub struct DaryPriorityQueueIterator<TKey, TPriority, S = RandomState>
where
    TKey: Hash + Eq,
    TPriority: Ord,
    S: BuildHasher,
{
    queue: DaryPriorityQueue<TKey, TPriority, S>,
}

impl<TKey: Hash + Eq, TPriority: Ord, S: BuildHasher> Iterator
    for DaryPriorityQueueIterator<TKey, TPriority, S>
{
    type Item = (TKey, TPriority);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.queue.top().ok()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }

    #[inline]
    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.queue.len()
    }
}

/// This is unordered borrowing iterator over queue.
///
/// ### Time complexity
/// Overall complexity of iteration is ***O(n)***
pub struct DaryPriorityQueueBorrowIter<'a, TKey, TPriority, S = RandomState>
where
    TKey: 'a + Hash + Eq,
    TPriority: 'a,
    S: BuildHasher,
{
    heap_iterator: DaryHeapIterator<'a, TPriority>,
    key_to_pos: &'a Mediator<TKey, S>,
}

impl<'a, TKey: 'a + Hash + Eq, TPriority: 'a, S: BuildHasher> Iterator
    for DaryPriorityQueueBorrowIter<'a, TKey, TPriority, S>
{
    type Item = (&'a TKey, &'a TPriority);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let heap_iterator = &mut self.heap_iterator;
        let key_to_pos = &self.key_to_pos;
        heap_iterator.next().map(|(index, priority)| {
            let (key, _) = key_to_pos.get_index(index);
            (key, priority)
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.heap_iterator.size_hint()
    }

    #[inline]
    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.heap_iterator.count()
    }
}

/// Error returned by fallible operations of [`DaryPriorityQueue`].
///
/// [`DaryPriorityQueue`]: struct.DaryPriorityQueue.html
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub enum PriorityQueueError {
    /// [`peek`] or [`top`] was called on a queue without items.
    ///
    /// [`peek`]: struct.DaryPriorityQueue.html#method.peek
    /// [`top`]: struct.DaryPriorityQueue.html#method.top
    EmptyQueue,
    /// [`remove`] or [`update`] was called with a key which is not in queue.
    ///
    /// [`remove`]: struct.DaryPriorityQueue.html#method.remove
    /// [`update`]: struct.DaryPriorityQueue.html#method.update
    ElementNotFound,
}

impl Display for PriorityQueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            PriorityQueueError::EmptyQueue => write!(f, "priority queue is empty"),
            PriorityQueueError::ElementNotFound => {
                write!(f, "element not found in priority queue")
            }
        }
    }
}

impl std::error::Error for PriorityQueueError {}

#[cfg(test)]
mod tests {
    use super::{DaryPriorityQueue, PriorityQueueError};
    use crate::mediator::MediatorIndex;
    use proptest::prelude::*;
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash};

    fn assert_consistent<TK, TP, S>(queue: &DaryPriorityQueue<TK, TP, S>)
    where
        TK: Hash + Eq,
        TP: Ord,
        S: BuildHasher,
    {
        assert!(queue.heap.is_valid_heap(), "Heap order is broken");
        assert_eq!(queue.heap.usize_len(), queue.key_to_pos.len());
        for (map_idx, (_, heap_idx)) in queue.key_to_pos.iter().enumerate() {
            let (outer, _) = queue
                .heap
                .look_into(heap_idx)
                .expect("Key points outside of heap");
            assert_eq!(outer, MediatorIndex(map_idx), "Key and heap disagree");
        }
    }

    #[test]
    fn test_priority() {
        let mut items = [1, 4, 5, 2, 3];
        for arity in 0..6 {
            let mut queue = DaryPriorityQueue::<i32, i32>::new(arity, items.len());
            for (i, &x) in items.iter().enumerate() {
                assert_eq!(queue.insert(x, x), None);
                assert_eq!(queue.len(), i + 1);
                assert_consistent(&queue);
            }
            assert_eq!(queue.len(), items.len());
            items.sort_unstable_by_key(|&x| -x);
            for &x in items.iter() {
                assert_eq!(queue.top(), Ok((x, x)));
                assert_consistent(&queue);
            }
            assert_eq!(queue.top(), Err(PriorityQueueError::EmptyQueue));
        }
    }

    #[test]
    fn test_arity_is_clamped() {
        assert_eq!(DaryPriorityQueue::<i32, i32>::new(0, 0).arity(), 2);
        assert_eq!(DaryPriorityQueue::<i32, i32>::new(1, 0).arity(), 2);
        assert_eq!(DaryPriorityQueue::<i32, i32>::new(3, 0).arity(), 3);
        assert_eq!(DaryPriorityQueue::<i32, i32>::default().arity(), 2);
        assert!(DaryPriorityQueue::<i32, i32>::new(2, 100).capacity() >= 100);
    }

    #[test]
    fn test_concrete_scenario() {
        let mut queue = DaryPriorityQueue::new(2, 0);
        queue.insert('A', 10);
        queue.insert('B', 5);
        queue.insert('C', 8);
        assert_eq!(queue.peek(), Ok((&'A', &10)));
        assert_eq!(queue.update(&'B', 20), Ok(5));
        assert_eq!(queue.peek(), Ok((&'B', &20)));
        assert_eq!(queue.remove(&'A'), Ok(('A', 10)));
        assert_eq!(queue.peek(), Ok((&'B', &20)));
        assert_eq!(queue.get_priority(&'C'), Some(&8));
        assert_eq!(queue.top(), Ok(('B', 20)));
        assert_eq!(queue.peek(), Ok((&'C', &8)));
        assert_eq!(queue.top(), Ok(('C', 8)));
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), Err(PriorityQueueError::EmptyQueue));
    }

    #[test]
    fn test_empty_queue_is_not_mutated() {
        let mut queue = DaryPriorityQueue::<&str, i32>::new(3, 4);
        for _ in 0..3 {
            assert_eq!(queue.peek(), Err(PriorityQueueError::EmptyQueue));
            assert_eq!(queue.top(), Err(PriorityQueueError::EmptyQueue));
            assert_eq!(queue.len(), 0);
            assert_consistent(&queue);
        }
    }

    #[test]
    fn test_missing_keys() {
        let mut queue = DaryPriorityQueue::new(2, 0);
        queue.insert("present", 1);
        assert_eq!(
            queue.remove(&"absent"),
            Err(PriorityQueueError::ElementNotFound)
        );
        assert_eq!(
            queue.update(&"absent", 64),
            Err(PriorityQueueError::ElementNotFound)
        );
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek(), Ok((&"present", &1)));
        assert!(!queue.contains_key(&"absent"));
        assert!(queue.contains_key(&"present"));
    }

    #[test]
    fn test_update_directions() {
        let items = [
            ("first", 5),
            ("second", 4),
            ("third", 3),
            ("fourth", 2),
            ("fifth", 1),
        ];

        for arity in 2..5 {
            let mut queue = DaryPriorityQueue::with_arity(arity);
            for &(k, p) in items.iter() {
                queue.insert(k, p);
            }
            let old_priority = *queue.get_priority(&"fifth").unwrap();
            assert_eq!(queue.update(&"fifth", old_priority + 10), Ok(1));
            assert_consistent(&queue);
            assert_eq!(queue.get_priority(&"fifth"), Some(&11));
            assert_eq!(queue.top(), Ok(("fifth", 11)));

            let old_priority = *queue.get_priority(&"first").unwrap();
            assert_eq!(queue.update(&"first", old_priority - 10), Ok(5));
            assert_consistent(&queue);
            assert_eq!(queue.get_priority(&"first"), Some(&-5));
            assert_eq!(queue.top(), Ok(("second", 4)));
            assert_eq!(queue.top(), Ok(("third", 3)));
            assert_eq!(queue.top(), Ok(("fourth", 2)));
            assert_eq!(queue.top(), Ok(("first", -5)));

            queue.insert("same", 7);
            assert_eq!(queue.update(&"same", 7), Ok(7));
            assert_eq!(queue.peek(), Ok((&"same", &7)));
        }
    }

    #[test]
    fn test_duplicate_insert_replaces_priority() {
        let mut queue = DaryPriorityQueue::with_arity(3);
        queue.insert(0, 1);
        queue.insert(1, 3);
        assert_eq!(queue.peek(), Ok((&1, &3)));
        assert_eq!(queue.insert(0, 5), Some(1));
        assert_eq!(queue.peek(), Ok((&0, &5)));
        assert_eq!(queue.insert(0, 2), Some(5));
        assert_eq!(queue.peek(), Ok((&1, &3)));
        assert_eq!(queue.len(), 2);
        assert_consistent(&queue);
        assert_eq!(queue.top(), Ok((1, 3)));
        assert_eq!(queue.top(), Ok((0, 2)));
        assert_eq!(queue.top(), Err(PriorityQueueError::EmptyQueue));
    }

    #[test]
    fn test_duplicate_insert_keeps_stored_key() {
        #[derive(Debug)]
        struct Tagged(u32, &'static str);
        impl PartialEq for Tagged {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }
        impl Eq for Tagged {}
        impl Hash for Tagged {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.0.hash(state)
            }
        }

        let mut queue = DaryPriorityQueue::with_arity(2);
        queue.insert(Tagged(1, "original"), 1);
        queue.insert(Tagged(1, "replacement"), 2);
        let (key, priority) = queue.top().unwrap();
        assert_eq!((key.1, priority), ("original", 2));
    }

    #[test]
    fn test_remove_items() {
        let mut items = [1, 4, 5, 2, 3];
        for arity in 2..5 {
            let mut queue = DaryPriorityQueue::with_arity(arity);
            for &x in items.iter() {
                queue.insert(x, x);
            }
            assert_eq!(queue.remove(&3), Ok((3, 3)));
            assert_eq!(queue.remove(&20), Err(PriorityQueueError::ElementNotFound));
            assert_eq!(queue.len(), items.len() - 1);
            assert_eq!(queue.get_priority(&3), None);
            assert_consistent(&queue);
            items.sort_unstable_by_key(|&x| -x);
            for x in items.iter().cloned().filter(|&x| x != 3) {
                assert_eq!(queue.top(), Ok((x, x)));
            }
            assert!(queue.top().is_err());
        }
    }

    #[test]
    fn test_remove_change_tree() {
        use std::cmp::Reverse;
        for arity in 2..5 {
            let mut queue = DaryPriorityQueue::with_arity(arity);

            queue.insert(0, Reverse(300));
            queue.insert(1, Reverse(500));
            queue.insert(2, Reverse(400));
            queue.insert(3, Reverse(400));
            queue.insert(4, Reverse(600));
            queue.insert(5, Reverse(100));
            queue.insert(6, Reverse(200));
            assert!(queue.remove(&1).is_ok());
            assert_consistent(&queue);

            let list: Vec<_> = queue.into_iter().map(|(_, p)| p.0).collect();
            assert_eq!(list, [100, 200, 300, 400, 400, 600]);
        }
    }

    #[test]
    fn test_insert_remove_round_trip() {
        let mut queue = DaryPriorityQueue::with_arity(3);
        for x in 0..20 {
            queue.insert(x, (x * 7) % 11);
        }
        let mut with_extra = queue.clone();
        with_extra.insert(100, 5);
        assert_eq!(with_extra.remove(&100), Ok((100, 5)));
        assert_consistent(&with_extra);
        let before: Vec<i32> = queue.into_iter().map(|(_, p)| p).collect();
        let after: Vec<i32> = with_extra.into_iter().map(|(_, p)| p).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_borrow_keys() {
        let mut queue: DaryPriorityQueue<String, i32> = DaryPriorityQueue::with_arity(2);
        queue.insert("Hello".to_string(), 5);
        let string = "Hello".to_string();
        let string_ref: &String = &string;
        let str_ref: &str = &string;
        assert_eq!(queue.get_priority(string_ref), Some(&5));
        assert_eq!(queue.get_priority(str_ref), Some(&5));
        assert_eq!(queue.update(str_ref, 6), Ok(5));
        assert_eq!(queue.remove(str_ref), Ok(("Hello".to_string(), 6)));
    }

    #[test]
    fn test_borrow_iter() {
        use std::collections::HashMap;
        let items = [
            ("first", 5i32),
            ("third", 3),
            ("second", 4),
            ("fifth", 1),
            ("fourth", 2),
        ];

        let mut queue: DaryPriorityQueue<String, i32> = DaryPriorityQueue::with_arity(4);
        for &(k, p) in items.iter() {
            queue.insert(k.to_owned(), p);
        }

        let map: HashMap<&str, i32> = queue.iter().map(|(k, &p)| (k.as_str(), p)).collect();
        assert_eq!(queue.iter().count(), items.len());
        assert_eq!(queue.iter().size_hint(), (items.len(), Some(items.len())));
        let other_map: HashMap<_, _> = items.iter().cloned().collect();
        assert_eq!(map, other_map);
    }

    #[test]
    fn test_clear_keeps_arity() {
        let mut queue = DaryPriorityQueue::with_arity(5);
        for x in 0..10 {
            queue.insert(x, x);
        }
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.arity(), 5);
        queue.insert(1, 1);
        assert_eq!(queue.peek(), Ok((&1, &1)));
    }

    #[test]
    fn test_not_clone_works() {
        #[derive(Hash, PartialEq, Eq)]
        struct Key(u32);

        let vals = [0u32, 1, 2, 4, 5];
        let mut queue: DaryPriorityQueue<Key, u32> = DaryPriorityQueue::with_arity(3);
        for &v in vals.iter() {
            queue.insert(Key(v), v);
        }
        queue.update(&Key(1), 10).unwrap();
        let mut res = Vec::with_capacity(5);
        while let Ok((Key(k), p)) = queue.top() {
            res.push((k, p));
        }
        assert_eq!(&res, &[(1, 10), (5, 5), (4, 4), (2, 2), (0, 0)]);
    }

    #[test]
    fn test_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<DaryPriorityQueue<i32, i32>>();
    }

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<DaryPriorityQueue<i32, i32>>();
    }

    #[test]
    fn test_fmt() {
        let items = [
            ("first", 5i32),
            ("second", 4),
            ("third", 3),
            ("fourth", 2),
            ("fifth", 1),
        ];

        let mut queue = DaryPriorityQueue::with_arity(2);
        for &(k, p) in items.iter() {
            queue.insert(k, p);
        }

        assert_eq!(
            format!("{:?}", queue),
            "[(\"first\", 5), (\"second\", 4), (\"third\", 3), (\"fourth\", 2), (\"fifth\", 1)]"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PriorityQueueError::EmptyQueue.to_string(),
            "priority queue is empty"
        );
        assert_eq!(
            PriorityQueueError::ElementNotFound.to_string(),
            "element not found in priority queue"
        );
        let boxed: Box<dyn std::error::Error> = Box::new(PriorityQueueError::EmptyQueue);
        assert_eq!(boxed.to_string(), "priority queue is empty");
    }

    #[test]
    fn test_ascii_tree_binary() {
        let mut queue = DaryPriorityQueue::with_arity(2);
        for (k, p) in [(1, 6), (2, 5), (3, 4), (4, 3), (5, 2), (6, 1)] {
            queue.insert(k, p);
        }
        let expected = "[6] 1\n\
                        ├── [5] 2\n\
                        │   ├── [3] 4\n\
                        │   └── [2] 5\n\
                        └── [4] 3\n\
                        \x20   └── [1] 6\n";
        assert_eq!(queue.ascii_tree(), expected);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8, i16),
        Top,
        Remove(u8),
        Update(u8, i16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u8..40, -50i16..50).prop_map(|(k, p)| Op::Insert(k, p)),
            1 => Just(Op::Top),
            2 => (0u8..40).prop_map(Op::Remove),
            2 => (0u8..40, -50i16..50).prop_map(|(k, p)| Op::Update(k, p)),
        ]
    }

    proptest! {
        #[test]
        fn structure_stays_consistent(
            arity in 0usize..6,
            ops in prop::collection::vec(op_strategy(), 0..200),
        ) {
            let mut queue: DaryPriorityQueue<u8, i16, RandomState> =
                DaryPriorityQueue::new(arity, 0);
            for op in ops {
                match op {
                    Op::Insert(k, p) => {
                        queue.insert(k, p);
                    }
                    Op::Top => {
                        let _ = queue.top();
                    }
                    Op::Remove(k) => {
                        let _ = queue.remove(&k);
                    }
                    Op::Update(k, p) => {
                        let _ = queue.update(&k, p);
                    }
                }
                assert_consistent(&queue);
            }
        }
    }
}
