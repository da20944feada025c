//! Bounded-key priority frontier for the capforest
//!
//! Keys never exceed the current cut bound, so a bucket array indexed by key
//! gives O(1) insert, increase-key and amortized delete-max. For very large
//! bounds (heavy weighted graphs) a binary heap with lazy deletion is used
//! instead.

use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MinCutError, Result};
use crate::graph::{EdgeWeight, NodeId};

/// Largest key bound served by a bucket queue
pub const BUCKET_QUEUE_LIMIT: EdgeWeight = 1 << 16;

const NOT_QUEUED: usize = usize::MAX;

/// Frontier implementation selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueType {
    /// Bucket array over `[0, bound]`
    #[default]
    BucketQueue,
    /// Binary max-heap
    Heap,
}

impl FromStr for QueueType {
    type Err = MinCutError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bqueue" | "bucket" => Ok(QueueType::BucketQueue),
            "heap" => Ok(QueueType::Heap),
            other => Err(MinCutError::InvalidParameter(format!(
                "unknown queue type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueType::BucketQueue => f.write_str("bqueue"),
            QueueType::Heap => f.write_str("heap"),
        }
    }
}

/// Monotone bucket priority queue over keys `0..=bound`
#[derive(Debug, Clone)]
pub struct BucketQueue {
    buckets: Vec<Vec<NodeId>>,
    index: Vec<usize>,
    keys: Vec<EdgeWeight>,
    max_key: usize,
    len: usize,
}

impl BucketQueue {
    /// Queue for vertices `0..n` with keys up to `bound`
    pub fn new(n: usize, bound: EdgeWeight) -> Self {
        Self {
            buckets: vec![Vec::new(); bound as usize + 1],
            index: vec![NOT_QUEUED; n],
            keys: vec![0; n],
            max_key: 0,
            len: 0,
        }
    }

    /// Number of queued vertices
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no vertex is queued
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `v` is queued
    pub fn contains(&self, v: NodeId) -> bool {
        self.index[v as usize] != NOT_QUEUED
    }

    /// Current key of a queued vertex
    pub fn key(&self, v: NodeId) -> EdgeWeight {
        self.keys[v as usize]
    }

    /// Insert `v` with `key`
    pub fn insert(&mut self, v: NodeId, key: EdgeWeight) {
        debug_assert!(!self.contains(v));
        let k = key as usize;
        debug_assert!(k < self.buckets.len(), "key above queue bound");
        self.index[v as usize] = self.buckets[k].len();
        self.keys[v as usize] = key;
        self.buckets[k].push(v);
        self.max_key = self.max_key.max(k);
        self.len += 1;
    }

    /// Raise the key of a queued vertex
    pub fn increase_key(&mut self, v: NodeId, key: EdgeWeight) {
        debug_assert!(key >= self.keys[v as usize]);
        self.remove(v);
        self.insert(v, key);
    }

    /// Remove and return a vertex with the largest key
    pub fn delete_max(&mut self) -> Option<NodeId> {
        if self.len == 0 {
            return None;
        }
        while self.buckets[self.max_key].is_empty() {
            self.max_key -= 1;
        }
        let v = self.buckets[self.max_key].pop()?;
        self.index[v as usize] = NOT_QUEUED;
        self.len -= 1;
        Some(v)
    }

    fn remove(&mut self, v: NodeId) {
        let k = self.keys[v as usize] as usize;
        let pos = self.index[v as usize];
        let bucket = &mut self.buckets[k];
        bucket.swap_remove(pos);
        if let Some(&moved) = bucket.get(pos) {
            self.index[moved as usize] = pos;
        }
        self.index[v as usize] = NOT_QUEUED;
        self.len -= 1;
    }
}

/// Binary max-heap with lazy deletion of outdated entries
#[derive(Debug, Clone)]
pub struct HeapQueue {
    heap: BinaryHeap<(EdgeWeight, NodeId)>,
    keys: Vec<EdgeWeight>,
    queued: Vec<bool>,
    len: usize,
}

impl HeapQueue {
    /// Queue for vertices `0..n`
    pub fn new(n: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            keys: vec![0; n],
            queued: vec![false; n],
            len: 0,
        }
    }

    /// Number of queued vertices
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no vertex is queued
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `v` is queued
    pub fn contains(&self, v: NodeId) -> bool {
        self.queued[v as usize]
    }

    /// Current key of a queued vertex
    pub fn key(&self, v: NodeId) -> EdgeWeight {
        self.keys[v as usize]
    }

    /// Insert `v` with `key`
    pub fn insert(&mut self, v: NodeId, key: EdgeWeight) {
        debug_assert!(!self.contains(v));
        self.queued[v as usize] = true;
        self.keys[v as usize] = key;
        self.heap.push((key, v));
        self.len += 1;
    }

    /// Raise the key of a queued vertex
    pub fn increase_key(&mut self, v: NodeId, key: EdgeWeight) {
        debug_assert!(key >= self.keys[v as usize]);
        self.keys[v as usize] = key;
        self.heap.push((key, v));
    }

    /// Remove and return a vertex with the largest key
    pub fn delete_max(&mut self) -> Option<NodeId> {
        while let Some((key, v)) = self.heap.pop() {
            if self.queued[v as usize] && self.keys[v as usize] == key {
                self.queued[v as usize] = false;
                self.len -= 1;
                return Some(v);
            }
        }
        None
    }
}

/// Frontier chosen per capforest run
#[derive(Debug, Clone)]
pub enum Frontier {
    /// Bucket array
    Bucket(BucketQueue),
    /// Binary heap
    Heap(HeapQueue),
}

impl Frontier {
    /// Frontier for `n` vertices and keys up to `bound`.
    ///
    /// Falls back to the heap when the bound is above [`BUCKET_QUEUE_LIMIT`].
    pub fn new(queue_type: QueueType, n: usize, bound: EdgeWeight) -> Self {
        match queue_type {
            QueueType::BucketQueue if bound <= BUCKET_QUEUE_LIMIT => {
                Frontier::Bucket(BucketQueue::new(n, bound))
            }
            _ => Frontier::Heap(HeapQueue::new(n)),
        }
    }

    /// Number of queued vertices
    pub fn len(&self) -> usize {
        match self {
            Frontier::Bucket(q) => q.len(),
            Frontier::Heap(q) => q.len(),
        }
    }

    /// Whether no vertex is queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `v` is queued
    pub fn contains(&self, v: NodeId) -> bool {
        match self {
            Frontier::Bucket(q) => q.contains(v),
            Frontier::Heap(q) => q.contains(v),
        }
    }

    /// Insert `v` with `key`
    pub fn insert(&mut self, v: NodeId, key: EdgeWeight) {
        match self {
            Frontier::Bucket(q) => q.insert(v, key),
            Frontier::Heap(q) => q.insert(v, key),
        }
    }

    /// Raise the key of a queued vertex
    pub fn increase_key(&mut self, v: NodeId, key: EdgeWeight) {
        match self {
            Frontier::Bucket(q) => q.increase_key(v, key),
            Frontier::Heap(q) => q.increase_key(v, key),
        }
    }

    /// Insert or raise, whichever applies
    pub fn push_or_raise(&mut self, v: NodeId, key: EdgeWeight) {
        if self.contains(v) {
            self.increase_key(v, key);
        } else {
            self.insert(v, key);
        }
    }

    /// Remove and return a vertex with the largest key
    pub fn delete_max(&mut self) -> Option<NodeId> {
        match self {
            Frontier::Bucket(q) => q.delete_max(),
            Frontier::Heap(q) => q.delete_max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_queue_order() {
        let mut q = BucketQueue::new(5, 10);
        q.insert(0, 3);
        q.insert(1, 7);
        q.insert(2, 0);
        q.insert(3, 7);
        assert_eq!(q.len(), 4);

        let first = q.delete_max().unwrap();
        let second = q.delete_max().unwrap();
        assert_eq!(q.key(first), 7);
        assert!([1, 3].contains(&first) && [1, 3].contains(&second));
        assert_eq!(q.delete_max(), Some(0));
        assert_eq!(q.delete_max(), Some(2));
        assert_eq!(q.delete_max(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_bucket_increase_key_fixes_positions() {
        let mut q = BucketQueue::new(4, 5);
        q.insert(0, 1);
        q.insert(1, 1);
        q.insert(2, 1);
        // moving 0 swaps 2 into its slot
        q.increase_key(0, 4);
        q.increase_key(2, 3);
        assert_eq!(q.delete_max(), Some(0));
        assert_eq!(q.delete_max(), Some(2));
        assert_eq!(q.delete_max(), Some(1));
        assert!(!q.contains(1));
    }

    #[test]
    fn test_heap_queue_lazy_deletion() {
        let mut q = HeapQueue::new(3);
        q.insert(0, 1);
        q.insert(1, 2);
        q.increase_key(0, 5);
        assert_eq!(q.len(), 2);
        assert_eq!(q.delete_max(), Some(0));
        assert_eq!(q.delete_max(), Some(1));
        assert_eq!(q.delete_max(), None);
    }

    #[test]
    fn test_frontier_falls_back_to_heap() {
        let small = Frontier::new(QueueType::BucketQueue, 4, 100);
        assert!(matches!(small, Frontier::Bucket(_)));
        let large = Frontier::new(QueueType::BucketQueue, 4, BUCKET_QUEUE_LIMIT + 1);
        assert!(matches!(large, Frontier::Heap(_)));
        let heap = Frontier::new(QueueType::Heap, 4, 1);
        assert!(matches!(heap, Frontier::Heap(_)));
    }

    #[test]
    fn test_push_or_raise() {
        let mut f = Frontier::new(QueueType::BucketQueue, 3, 9);
        f.push_or_raise(2, 1);
        f.push_or_raise(1, 4);
        f.push_or_raise(2, 9);
        assert_eq!(f.len(), 2);
        assert_eq!(f.delete_max(), Some(2));
        assert!(f.contains(1));
    }

    #[test]
    fn test_queue_type_parse() {
        assert_eq!("bqueue".parse::<QueueType>().unwrap(), QueueType::BucketQueue);
        assert_eq!("heap".parse::<QueueType>().unwrap(), QueueType::Heap);
        assert!("fifo".parse::<QueueType>().is_err());
        assert_eq!(QueueType::Heap.to_string(), "heap");
    }
}
