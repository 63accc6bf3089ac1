//! Bounded sample history kept while waiting for speech to begin

use parking_lot::Mutex;
use ringbuf::{traits::*, HeapRb};
use std::sync::Arc;

/// Fixed-capacity sample buffer that overwrites its oldest samples
///
/// Cloning shares the underlying storage.
#[derive(Clone)]
pub struct AudioRingBuffer {
    buffer: Arc<Mutex<HeapRb<f32>>>,
}

impl AudioRingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(HeapRb::new(capacity.max(1)))),
        }
    }

    /// Append samples, evicting the oldest ones once full
    pub fn write(&self, samples: &[f32]) {
        let mut buffer = self.buffer.lock();
        for &sample in samples {
            buffer.push_overwrite(sample);
        }
    }

    /// Take every buffered sample, oldest first
    pub fn drain(&self) -> Vec<f32> {
        let mut buffer = self.buffer.lock();
        let mut samples = Vec::with_capacity(buffer.occupied_len());
        while let Some(sample) = buffer.try_pop() {
            samples.push(sample);
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_oldest_first() {
        let buffer = AudioRingBuffer::new(8);
        buffer.write(&[0.1, 0.2, 0.3]);
        assert_eq!(buffer.drain(), vec![0.1, 0.2, 0.3]);
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn test_keeps_most_recent_samples() {
        let buffer = AudioRingBuffer::new(4);
        let data: Vec<f32> = (0..10).map(|i| i as f32).collect();
        buffer.write(&data);
        assert_eq!(buffer.drain(), vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let buffer = AudioRingBuffer::new(0);
        buffer.write(&[1.0, 2.0]);
        assert_eq!(buffer.drain(), vec![2.0]);
    }

    #[test]
    fn test_clones_share_storage() {
        let writer = AudioRingBuffer::new(16);
        let reader = writer.clone();
        writer.write(&[1.0, 2.0]);
        assert_eq!(reader.drain(), vec![1.0, 2.0]);
        assert!(writer.drain().is_empty());
    }
}
