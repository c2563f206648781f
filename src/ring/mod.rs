// src/ring/mod.rs

//! Interrupt-fed receive buffer.
//!
//! The serial receive interrupt owns the [`RxProducer`] half and the main loop owns
//! the [`RxConsumer`] half. `split` takes `&mut self`, so each half exists exactly
//! once and no second producer can be created while they are alive.

use crate::common::error::NodeError;
use core::sync::atomic::{AtomicBool, Ordering};
use heapless::spsc::{Consumer, Producer, Queue};

/// Receive buffer size in slots. One slot stays empty, so 127 bytes fit.
pub const RX_BUFFER_SIZE: usize = 128;

/// Fixed-capacity circular byte queue with an overflow flag.
///
/// Head equal to tail means empty; the buffer is full when advancing the head
/// would make it equal to the tail. Bytes arriving while full are dropped and
/// the overflow flag is raised.
pub struct ByteRingBuffer<const N: usize = RX_BUFFER_SIZE> {
    queue: Queue<u8, N>,
    overflow: AtomicBool,
}

impl<const N: usize> ByteRingBuffer<N> {
    pub const fn new() -> Self {
        ByteRingBuffer {
            queue: Queue::new(),
            overflow: AtomicBool::new(false),
        }
    }

    /// Number of bytes the buffer can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Splits the buffer into its interrupt-side and main-loop-side handles.
    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            RxProducer { inner: producer, overflow: &self.overflow },
            RxConsumer { inner: consumer, overflow: &self.overflow },
        )
    }
}

impl<const N: usize> Default for ByteRingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write handle, used only from the serial receive interrupt.
pub struct RxProducer<'a, const N: usize> {
    inner: Producer<'a, u8, N>,
    overflow: &'a AtomicBool,
}

impl<'a, const N: usize> RxProducer<'a, N> {
    /// Queues a received byte. Never blocks.
    ///
    /// When the buffer is full the byte is dropped, the overflow flag is set and
    /// `NodeError::BufferOverflow` is returned; queued bytes are untouched.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Result<(), NodeError<()>> {
        match self.inner.enqueue(byte) {
            Ok(()) => Ok(()),
            Err(_) => {
                self.overflow.store(true, Ordering::Relaxed);
                Err(NodeError::BufferOverflow)
            }
        }
    }

    /// True if there is room for at least one more byte.
    #[inline]
    pub fn ready(&self) -> bool {
        self.inner.ready()
    }
}

/// Read handle, used only from the main loop.
pub struct RxConsumer<'a, const N: usize> {
    inner: Consumer<'a, u8, N>,
    overflow: &'a AtomicBool,
}

impl<'a, const N: usize> RxConsumer<'a, N> {
    /// Returns the oldest queued byte, or `None` if the buffer is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<u8> {
        self.inner.dequeue()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }

    /// True if a byte has been dropped since the flag was last taken.
    pub fn overflowed(&self) -> bool {
        self.overflow.load(Ordering::Relaxed)
    }

    /// Reads and clears the overflow flag.
    pub fn take_overflow(&self) -> bool {
        self.overflow.swap(false, Ordering::Relaxed)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_pop() {
        let mut ring: ByteRingBuffer<8> = ByteRingBuffer::new();
        let (_producer, mut consumer) = ring.split();
        assert_eq!(consumer.pop(), None);
        assert!(consumer.is_empty());
        assert!(!consumer.overflowed());
    }

    #[test]
    fn test_capacity_reserves_one_slot() {
        let ring: ByteRingBuffer = ByteRingBuffer::new();
        assert_eq!(ring.capacity(), RX_BUFFER_SIZE - 1);
    }

    #[test]
    fn test_overflow_drops_new_bytes_only() {
        let mut ring: ByteRingBuffer<4> = ByteRingBuffer::new();
        let (mut producer, mut consumer) = ring.split();

        assert!(producer.push(1).is_ok());
        assert!(producer.push(2).is_ok());
        assert!(producer.push(3).is_ok());
        assert!(!producer.ready());
        assert_eq!(producer.push(4), Err(NodeError::BufferOverflow));
        assert!(consumer.overflowed());

        assert_eq!(consumer.pop(), Some(1));
        assert_eq!(consumer.pop(), Some(2));
        assert_eq!(consumer.pop(), Some(3));
        assert_eq!(consumer.pop(), None);

        assert!(consumer.take_overflow());
        assert!(!consumer.overflowed());
    }

    #[test]
    fn test_wraps_around() {
        let mut ring: ByteRingBuffer<4> = ByteRingBuffer::new();
        let (mut producer, mut consumer) = ring.split();
        for round in 0u8..10 {
            producer.push(round).unwrap();
            producer.push(round.wrapping_add(100)).unwrap();
            assert_eq!(consumer.len(), 2);
            assert_eq!(consumer.pop(), Some(round));
            assert_eq!(consumer.pop(), Some(round.wrapping_add(100)));
        }
        assert!(!consumer.overflowed());
    }

    proptest! {
        #[test]
        fn prop_fifo_order_within_capacity(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let mut ring: ByteRingBuffer<128> = ByteRingBuffer::new();
            let (mut producer, mut consumer) = ring.split();
            let bytes = &bytes[..bytes.len().min(127)];

            for byte in bytes {
                prop_assert!(producer.push(*byte).is_ok());
            }
            for byte in bytes {
                prop_assert_eq!(consumer.pop(), Some(*byte));
            }
            prop_assert_eq!(consumer.pop(), None);
            prop_assert!(!consumer.overflowed());
        }

        #[test]
        fn prop_excess_bytes_never_overwrite(extra in 1usize..32) {
            let mut ring: ByteRingBuffer<16> = ByteRingBuffer::new();
            let (mut producer, mut consumer) = ring.split();

            for i in 0..(15 + extra) {
                let _ = producer.push(i as u8);
            }
            prop_assert!(consumer.overflowed());
            for i in 0..15u8 {
                prop_assert_eq!(consumer.pop(), Some(i));
            }
            prop_assert_eq!(consumer.pop(), None);
        }
    }
}
