//! Bounded frame queue with drop-oldest backpressure.
//!
//! Producers (capture paths) must never stall on downstream work.
//! When the queue is full, the oldest queued item is discarded in
//! favour of the incoming one and a drop counter is incremented;
//! consumers drain with [`FrameQueue::pop`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct FrameQueue<T> {
    inner: Mutex<VecDeque<T>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl<T> FrameQueue<T> {
    /// Create a queue holding at most `capacity` items; `capacity`
    /// must be at least 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue an item, evicting the oldest one when full.
    ///
    /// Returns the evicted item, if any. Never blocks beyond the
    /// internal lock.
    pub fn push(&self, item: T) -> Option<T> {
        let mut q = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let evicted = if q.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            log::debug!("frame queue full, dropping oldest item");
            q.pop_front()
        } else {
            None
        };
        q.push_back(item);
        evicted
    }

    /// Take the oldest queued item.
    pub fn pop(&self) -> Option<T> {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of items discarded due to backpressure.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
