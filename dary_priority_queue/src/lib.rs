//! This is d-ary max priority queue that supports elements priority modification and early removal.
//!
//! It uses IndexMap and own implementation of d-ary heap to achieve this.
//!
//! Each entry has associated *key* and *priority*.
//! Keys must be unique, and hashable; priorities must implement Ord trait.
//! Number of children of every heap node (*arity*) is chosen when queue is created.
//!
//! Top returns element with biggest priority.
//! Insert adds element to queue.
//! Also it is possible to update priority or remove item by key.
//!
//! Top, insert, update, remove by key have ***O(log n)*** time complexity;
//! peek, lookup by key are ***O(1)***.
//!
//! Bigger arity makes the tree shallower so insertions and priority raises get cheaper,
//! while removals compare more children on every level.
//!
//! # Examples
//!
//! This is implementation of [Dijkstra's algorithm][dijkstra] on a small weighted graph.
//! Distances to vertices in the open set get smaller when shorter paths are found,
//! so their priorities are updated in place instead of pushing duplicates.
//!
//! [dijkstra]: https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm
//!
//! ```
//! use dary_priority_queue::DaryPriorityQueue;
//! use std::cmp::Reverse;
//! use std::collections::HashMap;
//!
//! fn shortest_distances(edges: &[(u32, u32, u32)], start: u32) -> HashMap<u32, u32> {
//!     let mut done = HashMap::new();
//!     // Min-queue required so Reverse struct used as priority.
//!     let mut open = DaryPriorityQueue::with_arity(4);
//!     open.insert(start, Reverse(0u32));
//!     while let Ok((vertex, Reverse(distance))) = open.top() {
//!         done.insert(vertex, distance);
//!         for &(_, to, weight) in edges.iter().filter(|e| e.0 == vertex) {
//!             if done.contains_key(&to) {
//!                 continue;
//!             }
//!             let candidate = distance + weight;
//!             match open.get_priority(&to) {
//!                 None => {
//!                     open.insert(to, Reverse(candidate));
//!                 }
//!                 Some(&Reverse(known)) if candidate < known => {
//!                     open.update(&to, Reverse(candidate)).unwrap();
//!                 }
//!                 Some(_) => { /* Have found worse path. */ }
//!             }
//!         }
//!     }
//!     done
//! }
//!
//! let edges = [(0, 1, 4), (0, 2, 1), (2, 1, 2), (1, 3, 1), (2, 3, 5)];
//! let distances = shortest_distances(&edges, 0);
//! assert_eq!(distances[&0], 0);
//! assert_eq!(distances[&1], 3);
//! assert_eq!(distances[&2], 1);
//! assert_eq!(distances[&3], 4);
//! ```
//!

mod dary_priority_queue;
mod editable_dary_heap;
mod mediator;

pub use crate::dary_priority_queue::{
    DaryPriorityQueue, DaryPriorityQueueBorrowIter, DaryPriorityQueueIterator,
    PriorityQueueError,
};
pub use crate::editable_dary_heap::MIN_ARITY;

#[doc = include_str!("../../Readme.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
