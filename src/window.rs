//! Fixed-capacity FIFO series for short-horizon trend display.

use std::collections::VecDeque;

/// Append-only sequence that never grows past its capacity; the oldest
/// element is dropped on overflow. Push is O(1) amortized.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
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

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> SlidingWindow<T> {
    /// A window pre-populated to capacity, e.g. a trend series seeded with
    /// zeros so the display starts at full width.
    pub fn filled(capacity: usize, value: T) -> Self {
        let mut window = Self::new(capacity);
        for _ in 0..capacity {
            window.push(value.clone());
        }
        window
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_below_capacity_keeps_everything() {
        let mut window = SlidingWindow::new(5);
        for n in 0..3 {
            window.push(n);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec![0, 1, 2]);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        // N + 5 appends into a capacity-N window keep the last N in order.
        let n = 30;
        let mut window = SlidingWindow::new(n);
        for v in 0..(n + 5) {
            window.push(v);
        }
        assert_eq!(window.len(), n);
        assert_eq!(window.to_vec(), (5..n + 5).collect::<Vec<_>>());
    }

    #[test]
    fn filled_starts_at_capacity() {
        let mut window = SlidingWindow::filled(30, 0u64);
        assert_eq!(window.len(), 30);
        window.push(7);
        assert_eq!(window.len(), 30);
        assert_eq!(window.to_vec()[29], 7);
        assert_eq!(window.to_vec()[..29], vec![0u64; 29]);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_is_refused() {
        let _ = SlidingWindow::<u8>::new(0);
    }
}
