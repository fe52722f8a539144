//! FIFO buffer for items no lane would admit.
//!
//! There is no drop policy: under sustained overload the queue grows without
//! bound, so callers needing bounded memory must rate-limit upstream.

use std::collections::VecDeque;

use crate::options::ItemOptions;

/// An accepted submission waiting for capacity
#[derive(Debug, Clone)]
pub struct PendingItem {
    pub content: String,
    pub options: ItemOptions,
}

#[derive(Debug, Default)]
pub struct OverflowQueue {
    items: VecDeque<PendingItem>,
}

impl OverflowQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, item: PendingItem) {
        self.items.push_back(item);
    }

    pub fn dequeue_one(&mut self) -> Option<PendingItem> {
        self.items.pop_front()
    }

    /// Put back an item whose replay was vetoed, keeping it first in line
    pub fn requeue_front(&mut self, item: PendingItem) {
        self.items.push_front(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingItem> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(content: &str) -> PendingItem {
        PendingItem {
            content: content.to_string(),
            options: ItemOptions::default(),
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = OverflowQueue::new();
        queue.enqueue(pending("a"));
        queue.enqueue(pending("b"));
        assert_eq!(queue.dequeue_one().unwrap().content, "a");
        assert_eq!(queue.dequeue_one().unwrap().content, "b");
        assert!(queue.dequeue_one().is_none());
    }

    #[test]
    fn test_requeue_front_preserves_order() {
        let mut queue = OverflowQueue::new();
        queue.enqueue(pending("a"));
        queue.enqueue(pending("b"));
        let first = queue.dequeue_one().unwrap();
        queue.requeue_front(first);
        let order: Vec<&str> = queue.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
