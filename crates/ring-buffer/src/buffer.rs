//! Bounded Rolling Window of Readings

use crate::{Channel, SensorReading};
use std::collections::VecDeque;

/// Default window capacity, the number of readings used for history checks
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity window holding the most recent readings (oldest evicted)
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// Stored readings, oldest at the front
    storage: VecDeque<SensorReading>,
    /// Capacity of the buffer
    capacity: usize,
    /// Total readings pushed, including evicted ones
    total_written: usize,
}

impl RingBuffer {
    /// Create a new ring buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Create a buffer with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a reading into the buffer (overwrites oldest if full)
    pub fn push(&mut self, reading: SensorReading) {
        if self.storage.len() == self.capacity {
            self.storage.pop_front();
        }
        self.storage.push_back(reading);
        self.total_written += 1;
    }

    /// Get the number of readings currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read the last N readings (most recent first)
    pub fn read_last(&self, count: usize) -> Vec<SensorReading> {
        self.storage.iter().rev().take(count).copied().collect()
    }

    /// Values of one channel across the window, oldest first
    pub fn values(&self, channel: Channel) -> Vec<f64> {
        self.storage.iter().map(|r| r.value(channel)).collect()
    }

    /// Get total readings written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.storage.clear();
        self.total_written = 0;
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl Extend<SensorReading> for RingBuffer {
    fn extend<I: IntoIterator<Item = SensorReading>>(&mut self, iter: I) {
        for reading in iter {
            self.push(reading);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reading(temp: f64) -> SensorReading {
        SensorReading {
            engine_temp: temp,
            ..Default::default()
        }
    }

    #[test]
    fn test_push_and_read() {
        let mut buffer = RingBuffer::new(10);

        for i in 0..5 {
            buffer.push(reading(i as f64 * 10.0));
        }

        assert_eq!(buffer.len(), 5);

        let readings = buffer.read_last(3);
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].engine_temp, 40.0); // Most recent
        assert_eq!(readings[2].engine_temp, 20.0);
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = RingBuffer::new(5);

        for i in 0..12 {
            buffer.push(reading(i as f64));
        }

        assert_eq!(buffer.len(), 5);
        assert!(buffer.is_full());
        assert_eq!(buffer.total_written(), 12);
        assert_eq!(
            buffer.values(Channel::EngineTemp),
            vec![7.0, 8.0, 9.0, 10.0, 11.0]
        );
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut buffer = RingBuffer::new(0);
        buffer.push(reading(1.0));
        buffer.push(reading(2.0));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.values(Channel::EngineTemp), vec![2.0]);
    }

    proptest! {
        #[test]
        fn window_matches_slice_tail(temps in prop::collection::vec(0.0f64..150.0, 0..40)) {
            let mut buffer = RingBuffer::with_default_capacity();
            buffer.extend(temps.iter().map(|&t| reading(t)));

            let start = temps.len().saturating_sub(DEFAULT_CAPACITY);
            prop_assert_eq!(buffer.values(Channel::EngineTemp), temps[start..].to_vec());
            prop_assert_eq!(buffer.total_written(), temps.len());
        }
    }
}
