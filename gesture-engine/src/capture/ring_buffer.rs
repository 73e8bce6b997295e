//! Lock-Free Centroid Hand-Off
//!
//! SPSC (Single Producer, Single Consumer) ring buffer between a vision
//! front end running on its own thread and the engine thread.
//!
//! Architecture:
//! - Producer (vision thread): never blocks on a full buffer; the sample is
//!   handed back so the caller can retry instead of losing it
//! - Consumer (engine thread): polls, and ends the stream once the producer
//!   is gone and the buffer is drained
//!
//! The core ring buffer is the `rtrb` crate; this module adds frame
//! numbering, statistics and the [`CentroidSource`] adapter.

use super::types::{CentroidSample, CentroidSource};
use crate::geometry::Point;
use crate::{Error, Result};
use rtrb::{Consumer, Producer, PushError, RingBuffer};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default ring buffer capacity (must be power of 2)
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default consumer poll interval while the buffer is empty
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Ring buffer statistics for monitoring
#[derive(Debug, Default)]
pub struct RingBufferStats {
    /// Samples accepted by the buffer
    pub samples_pushed: AtomicU64,
    /// Push attempts refused because the buffer was full
    pub pushes_refused: AtomicU64,
    /// Samples handed to the consumer
    pub samples_consumed: AtomicU64,
    /// Peak buffer occupancy
    pub peak_occupancy: AtomicU64,
}

/// Centroid ring buffer, split once into its two halves
pub struct CentroidRingBuffer {
    producer: Producer<CentroidSample>,
    consumer: Consumer<CentroidSample>,
    stats: Arc<RingBufferStats>,
    capacity: usize,
}

impl CentroidRingBuffer {
    /// Create a ring buffer with default capacity
    pub fn new() -> Self {
        let (producer, consumer) = RingBuffer::new(DEFAULT_CAPACITY);
        Self {
            producer,
            consumer,
            stats: Arc::new(RingBufferStats::default()),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Create a ring buffer with the given capacity (a power of 2)
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if !capacity.is_power_of_two() {
            return Err(Error::Config(format!(
                "ring buffer capacity must be a power of 2, got {}",
                capacity
            )));
        }
        let (producer, consumer) = RingBuffer::new(capacity);
        Ok(Self {
            producer,
            consumer,
            stats: Arc::new(RingBufferStats::default()),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Split into the producer (vision thread) and consumer (engine thread)
    pub fn split(self) -> (CentroidProducer, CentroidConsumer) {
        (
            CentroidProducer {
                inner: self.producer,
                stats: Arc::clone(&self.stats),
                capacity: self.capacity,
                next_frame: 0,
            },
            CentroidConsumer {
                inner: self.consumer,
                stats: self.stats,
                stop: None,
                poll_interval: DEFAULT_POLL_INTERVAL,
            },
        )
    }

    pub fn stats(&self) -> Arc<RingBufferStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for CentroidRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half of the ring buffer
pub struct CentroidProducer {
    inner: Producer<CentroidSample>,
    stats: Arc<RingBufferStats>,
    capacity: usize,
    next_frame: u64,
}

impl CentroidProducer {
    /// Push a sample; when the buffer is full the sample is returned
    /// untouched so the caller can retry.
    #[inline]
    pub fn push(&mut self, sample: CentroidSample) -> std::result::Result<(), CentroidSample> {
        match self.inner.push(sample) {
            Ok(()) => {
                self.stats.samples_pushed.fetch_add(1, Ordering::Relaxed);
                self.next_frame = self.next_frame.max(sample.frame.saturating_add(1));
                let occupied = (self.capacity - self.inner.slots()) as u64;
                self.stats.peak_occupancy.fetch_max(occupied, Ordering::Relaxed);
                Ok(())
            }
            Err(PushError::Full(sample)) => {
                self.stats.pushes_refused.fetch_add(1, Ordering::Relaxed);
                Err(sample)
            }
        }
    }

    /// Push a bare position, numbering frames in push order
    pub fn push_point(&mut self, position: Point) -> std::result::Result<u64, Point> {
        let frame = self.next_frame;
        self.push(CentroidSample::new(frame, position))
            .map(|()| frame)
            .map_err(|s| s.position)
    }

    /// Retry until the sample fits or `stop` is raised.
    ///
    /// Returns false only if stopped before the sample was accepted.
    pub fn push_waiting(&mut self, mut sample: CentroidSample, stop: &AtomicBool) -> bool {
        loop {
            match self.push(sample) {
                Ok(()) => return true,
                Err(returned) => {
                    if stop.load(Ordering::SeqCst) {
                        return false;
                    }
                    sample = returned;
                    std::thread::sleep(DEFAULT_POLL_INTERVAL);
                }
            }
        }
    }

    /// Frame index the next `push_point` will use
    pub fn next_frame(&self) -> u64 {
        self.next_frame
    }

    #[inline]
    pub fn available_slots(&self) -> usize {
        self.inner.slots()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

/// Consumer half of the ring buffer
pub struct CentroidConsumer {
    inner: Consumer<CentroidSample>,
    stats: Arc<RingBufferStats>,
    stop: Option<Arc<AtomicBool>>,
    poll_interval: Duration,
}

impl CentroidConsumer {
    /// End the stream early when `stop` is raised
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Pop the oldest sample without waiting
    #[inline]
    pub fn pop(&mut self) -> Option<CentroidSample> {
        match self.inner.pop() {
            Ok(sample) => {
                self.stats.samples_consumed.fetch_add(1, Ordering::Relaxed);
                Some(sample)
            }
            Err(_) => None,
        }
    }

    /// Pop up to `max_count` samples
    pub fn pop_batch(&mut self, max_count: usize) -> Vec<CentroidSample> {
        let mut batch = Vec::with_capacity(max_count.min(self.available()));
        while batch.len() < max_count {
            match self.pop() {
                Some(sample) => batch.push(sample),
                None => break,
            }
        }
        batch
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of samples waiting
    #[inline]
    pub fn available(&self) -> usize {
        self.inner.slots()
    }

    /// True once the producer half has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.inner.is_abandoned()
    }

    fn stopped(&self) -> bool {
        self.stop.as_ref().map_or(false, |s| s.load(Ordering::SeqCst))
    }
}

impl CentroidSource for CentroidConsumer {
    /// Waits for the next sample. Ends when the stop flag is raised, or when
    /// the producer is gone and nothing is left to drain.
    fn next_centroid(&mut self) -> Option<CentroidSample> {
        loop {
            if self.stopped() {
                return None;
            }
            if let Some(sample) = self.pop() {
                return Some(sample);
            }
            if self.is_abandoned() {
                // The producer may have pushed right before dropping
                return self.pop();
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_ring_buffer_creation() {
        let buffer = CentroidRingBuffer::new();
        assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_capacity_must_be_power_of_two() {
        assert!(CentroidRingBuffer::with_capacity(1000).is_err());
        assert!(CentroidRingBuffer::with_capacity(0).is_err());
        assert!(CentroidRingBuffer::with_capacity(64).is_ok());
    }

    #[test]
    fn test_push_and_pop() {
        let buffer = CentroidRingBuffer::with_capacity(8).unwrap();
        let stats = buffer.stats();
        let (mut producer, mut consumer) = buffer.split();

        assert!(consumer.is_empty());
        assert!(producer.push(CentroidSample::at(0, 1.0, 2.0)).is_ok());
        assert_eq!(consumer.available(), 1);

        assert_eq!(consumer.pop(), Some(CentroidSample::at(0, 1.0, 2.0)));
        assert_eq!(consumer.pop(), None);
        assert_eq!(stats.samples_pushed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.samples_consumed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.peak_occupancy.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_full_buffer_hands_sample_back() {
        let buffer = CentroidRingBuffer::with_capacity(2).unwrap();
        let stats = buffer.stats();
        let (mut producer, mut consumer) = buffer.split();

        assert!(producer.push(CentroidSample::at(0, 0.0, 0.0)).is_ok());
        assert!(producer.push(CentroidSample::at(1, 1.0, 0.0)).is_ok());
        assert!(producer.is_full());

        let refused = producer.push(CentroidSample::at(2, 2.0, 0.0)).unwrap_err();
        assert_eq!(refused, CentroidSample::at(2, 2.0, 0.0));
        assert_eq!(stats.pushes_refused.load(Ordering::Relaxed), 1);

        consumer.pop();
        assert!(producer.push(refused).is_ok());
        let frames: Vec<u64> = consumer.pop_batch(10).iter().map(|s| s.frame).collect();
        assert_eq!(frames, vec![1, 2]);
    }

    #[test]
    fn test_push_point_numbers_frames() {
        let buffer = CentroidRingBuffer::with_capacity(8).unwrap();
        let (mut producer, mut consumer) = buffer.split();

        assert_eq!(producer.push_point(Point::new(1.0, 1.0)), Ok(0));
        assert_eq!(producer.push_point(Point::new(2.0, 2.0)), Ok(1));
        assert_eq!(producer.next_frame(), 2);

        let batch = consumer.pop_batch(8);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1], CentroidSample::at(1, 2.0, 2.0));
    }

    #[test]
    fn test_last_frame_index_does_not_overflow() {
        let buffer = CentroidRingBuffer::with_capacity(8).unwrap();
        let (mut producer, mut consumer) = buffer.split();

        assert!(producer.push(CentroidSample::at(u64::MAX, 3.0, 4.0)).is_ok());
        assert_eq!(producer.next_frame(), u64::MAX);
        assert_eq!(consumer.pop(), Some(CentroidSample::at(u64::MAX, 3.0, 4.0)));
    }

    #[test]
    fn test_source_ends_when_producer_dropped() {
        let buffer = CentroidRingBuffer::with_capacity(4).unwrap();
        let (mut producer, consumer) = buffer.split();
        let mut consumer = consumer.with_poll_interval(Duration::from_micros(100));

        let handle = thread::spawn(move || {
            let stop = AtomicBool::new(false);
            for i in 0..100 {
                assert!(producer.push_waiting(CentroidSample::at(i, i as f64, 0.0), &stop));
            }
        });

        let mut frames = Vec::new();
        while let Some(sample) = consumer.next_centroid() {
            frames.push(sample.frame);
        }
        handle.join().unwrap();

        assert_eq!(frames, (0..100).collect::<Vec<u64>>());
    }

    #[test]
    fn test_source_ends_on_stop_flag() {
        let buffer = CentroidRingBuffer::with_capacity(4).unwrap();
        let (_producer, consumer) = buffer.split();
        let stop = Arc::new(AtomicBool::new(true));
        let mut consumer = consumer.with_stop_flag(Arc::clone(&stop));
        assert_eq!(consumer.next_centroid(), None);
    }

    #[test]
    fn test_push_waiting_gives_up_when_stopped() {
        let buffer = CentroidRingBuffer::with_capacity(1).unwrap();
        let (mut producer, _consumer) = buffer.split();
        let stop = AtomicBool::new(false);
        assert!(producer.push_waiting(CentroidSample::at(0, 0.0, 0.0), &stop));
        stop.store(true, Ordering::SeqCst);
        assert!(!producer.push_waiting(CentroidSample::at(1, 0.0, 0.0), &stop));
    }
}
