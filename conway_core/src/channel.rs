// channel.rs - Bounded single-producer / single-consumer ring buffer
//
// Moves whole values (diff batches) from the worker to the render thread
// without locks. `head` is written only by the producer, `tail` only by the
// consumer; each lives on its own cache line.
//
// One slot is always left empty so that `head == tail` means empty and
// `next(head) == tail` means full: a ring of capacity `N` holds `N - 1`
// values.

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Cache-line aligned wrapper to prevent false sharing between producer and consumer.
#[repr(C, align(64))]
struct CachePadded<T>(T);

struct Ring<T> {
    /// Next slot the producer writes
    head: CachePadded<AtomicUsize>,
    /// Next slot the consumer reads
    tail: CachePadded<AtomicUsize>,
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// SAFETY: a slot is only touched by the producer while it lies in
// [head, tail) (free) and only by the consumer while it lies in [tail, head)
// (filled). Ownership of a slot changes hands through the Release store /
// Acquire load pairs on head and tail.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) % self.buffer.len()
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let head = *self.head.0.get_mut();
        let mut tail = *self.tail.0.get_mut();
        // Drop everything pushed but never popped
        while tail != head {
            // SAFETY: we have &mut self (exclusive access). All slots in
            // [tail, head) were written by the producer and not yet consumed.
            unsafe {
                self.buffer[tail].get_mut().assume_init_drop();
            }
            tail = self.next(tail);
        }
    }
}

/// Writing half. Not `Clone`: there is exactly one producer.
pub struct Producer<T> {
    ring: Arc<Ring<T>>,
}

/// Reading half. Not `Clone`: there is exactly one consumer.
pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
}

/// Create a ring with `capacity` slots, `capacity - 1` of them usable.
///
/// # Panics
///
/// If `capacity < 2`, since such a ring could never hold a value.
pub fn bounded<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(capacity >= 2, "ring capacity must be at least 2, got {capacity}");
    let buffer = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect::<Vec<_>>()
        .into_boxed_slice();
    let ring = Arc::new(Ring {
        head: CachePadded(AtomicUsize::new(0)),
        tail: CachePadded(AtomicUsize::new(0)),
        buffer,
    });
    (Producer { ring: ring.clone() }, Consumer { ring })
}

impl<T> Producer<T> {
    /// Try to enqueue `value`. Never blocks; hands the value back if the
    /// ring is full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        let ring = &*self.ring;
        let head = ring.head.0.load(Ordering::Relaxed);
        let next_head = ring.next(head);

        // buffer full
        if next_head == ring.tail.0.load(Ordering::Acquire) {
            return Err(value);
        }

        // SAFETY: `head` is outside [tail, head) so the consumer will not
        // read it until the Release store below publishes it.
        unsafe {
            (*ring.buffer[head].get()).write(value);
        }
        ring.head.0.store(next_head, Ordering::Release);
        Ok(())
    }

    /// Usable capacity (`slots - 1`).
    pub fn capacity(&self) -> usize {
        self.ring.buffer.len() - 1
    }

    pub fn is_full(&self) -> bool {
        let ring = &*self.ring;
        ring.next(ring.head.0.load(Ordering::Relaxed)) == ring.tail.0.load(Ordering::Acquire)
    }
}

impl<T> Consumer<T> {
    /// Take the oldest value, or `None` if nothing is pending. Never blocks.
    pub fn pop(&mut self) -> Option<T> {
        let ring = &*self.ring;
        let tail = ring.tail.0.load(Ordering::Relaxed);

        // buffer empty
        if tail == ring.head.0.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: `tail` is in [tail, head): the producer wrote it and made it
        // visible with the Release store on head that we just Acquired.
        let value = unsafe { (*ring.buffer[tail].get()).assume_init_read() };
        ring.tail.0.store(ring.next(tail), Ordering::Release);
        Some(value)
    }

    /// Number of values waiting to be popped.
    pub fn pending(&self) -> usize {
        let ring = &*self.ring;
        let head = ring.head.0.load(Ordering::Acquire);
        let tail = ring.tail.0.load(Ordering::Relaxed);
        (head + ring.buffer.len() - tail) % ring.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("capacity", &self.capacity()).finish()
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("pending", &self.pending()).finish()
    }
}
