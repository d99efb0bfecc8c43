//! Bounded history of poll samples
//!
//! A fixed-capacity FIFO ring: appending beyond capacity evicts from the
//! front, so the buffer always holds the most recent samples in
//! chronological order.

use std::collections::VecDeque;

use super::metrics::HistoryPoint;

/// Fixed-capacity ring of timestamped samples
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Creates an empty buffer holding at most `capacity` points.
    ///
    /// A capacity of 0 admits nothing; a capacity of 1 keeps only the most
    /// recent point.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(512)),
            capacity,
        }
    }

    /// Appends a point, evicting from the front while over capacity
    pub fn push(&mut self, point: HistoryPoint) {
        if self.capacity == 0 {
            return;
        }
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Removes every point unconditionally
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of retained points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the buffer holds no points
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of retained points
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent point, if any
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    /// Snapshot of the retained points, oldest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }
}
