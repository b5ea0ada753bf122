// Minimum-priority frontier for the path search
//
// Entries are never updated in place; the search pushes a fresh copy whenever
// it finds a cheaper route and skips the stale ones as they surface.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry<T> {
    priority: u32,
    seq: u64,
    element: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the smallest priority, earliest insert first
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue without decrease-key
#[derive(Debug)]
pub struct PriorityFrontier<T> {
    heap: BinaryHeap<Entry<T>>,
    seq: u64,
}

impl<T> PriorityFrontier<T> {
    pub fn new() -> Self {
        PriorityFrontier {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn enqueue(&mut self, element: T, priority: u32) {
        self.heap.push(Entry {
            priority,
            seq: self.seq,
            element,
        });
        self.seq += 1;
    }

    /// Removes the element with the smallest priority
    pub fn dequeue(&mut self) -> Option<T> {
        self.heap.pop().map(|e| e.element)
    }

    pub fn empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<T> Default for PriorityFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dequeues_in_priority_order() {
        let mut frontier = PriorityFrontier::new();
        frontier.enqueue("c", 7);
        frontier.enqueue("a", 1);
        frontier.enqueue("b", 4);
        frontier.enqueue("z", 0);

        let order: Vec<_> = std::iter::from_fn(|| frontier.dequeue()).collect();
        assert_eq!(order, vec!["z", "a", "b", "c"]);
        assert!(frontier.empty());
    }

    #[test]
    fn test_equal_priorities_come_out_in_insertion_order() {
        let mut frontier = PriorityFrontier::new();
        for i in 0..5 {
            frontier.enqueue(i, 3);
        }
        let order: Vec<_> = std::iter::from_fn(|| frontier.dequeue()).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut frontier = PriorityFrontier::new();
        frontier.enqueue('x', 9);
        frontier.enqueue('x', 2);
        assert_eq!(frontier.len(), 2);
        assert_eq!(frontier.dequeue(), Some('x'));
        assert_eq!(frontier.dequeue(), Some('x'));
        assert_eq!(frontier.dequeue(), None);
    }
}
