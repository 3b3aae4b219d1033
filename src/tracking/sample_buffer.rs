//! Bounded FIFO Buffers
//!
//! The pipeline keeps three bounded windows: the smoothing window (small,
//! default 5), the classifier's sample window (up to 100), and the finalized
//! event history (up to 500). Eviction is FIFO and lossy by design so that
//! long-running sessions stay within a fixed memory envelope.
//!
//! The core is single-threaded by contract, so a plain `VecDeque` with a
//! capacity cap is sufficient; there is no producer/consumer thread pair to
//! decouple.

use std::collections::VecDeque;

/// A FIFO buffer that evicts its oldest entry once capacity is exceeded.
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
    /// Total number of evictions since creation (or the last clear)
    evicted: u64,
}

impl<T> BoundedBuffer<T> {
    /// Create a buffer holding at most `capacity` items.
    ///
    /// A zero capacity is clamped to 1 so that `push` always retains the
    /// newest item.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            evicted: 0,
        }
    }

    /// Append an item, evicting the oldest if the buffer is full.
    /// Returns the evicted item, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.evicted += 1;
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items dropped to the FIFO eviction policy
    pub fn evicted_count(&self) -> u64 {
        self.evicted
    }

    /// Oldest-to-newest iteration
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.evicted = 0;
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Snapshot the buffer contents oldest-to-newest.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut buf = BoundedBuffer::new(3);
        assert_eq!(buf.push(1), None);
        assert_eq!(buf.push(2), None);
        assert_eq!(buf.len(), 2);
        assert!(!buf.is_empty());
        assert_eq!(buf.evicted_count(), 0);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buf = BoundedBuffer::new(3);
        buf.push(1);
        buf.push(2);
        buf.push(3);
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.push(5), Some(2));
        assert_eq!(buf.to_vec(), vec![3, 4, 5]);
        assert_eq!(buf.evicted_count(), 2);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_front_and_back() {
        let mut buf = BoundedBuffer::new(2);
        assert!(buf.front().is_none());
        buf.push(10);
        buf.push(20);
        assert_eq!(buf.front(), Some(&10));
        assert_eq!(buf.back(), Some(&20));
    }

    #[test]
    fn test_clear_resets_eviction_count() {
        let mut buf = BoundedBuffer::new(1);
        buf.push(1);
        buf.push(2);
        assert_eq!(buf.evicted_count(), 1);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.evicted_count(), 0);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut buf = BoundedBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
        buf.push(1);
        assert_eq!(buf.push(2), Some(1));
        assert_eq!(buf.to_vec(), vec![2]);
    }

    #[test]
    fn test_iter_order() {
        let mut buf = BoundedBuffer::new(4);
        for i in 0..4 {
            buf.push(i);
        }
        let collected: Vec<_> = buf.iter().copied().collect();
        assert_eq!(collected, vec![0, 1, 2, 3]);
    }
}
