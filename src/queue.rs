//! Bounded MPMC queue with blocking operations and one-time close.
//!
//! This module provides the channel primitive both stages of the pool run
//! on: a fixed-capacity FIFO that supports concurrent senders and
//! receivers, blocks on full/empty, and can be closed exactly once by its
//! designated owner.
//!
//! # Semantics
//!
//! - `enqueue` blocks while the queue is at capacity and fails with
//!   [`QueueError::Closed`] once the queue has been closed, including for
//!   callers already blocked waiting for space.
//! - `dequeue` blocks while the queue is empty and open, returns
//!   `Some(item)` while items remain, and returns `None` only once the
//!   queue is closed **and** drained. Items buffered at close time stay
//!   drainable.
//! - Each item is delivered to exactly one receiver (competing-consumers).
//!
//! # Construction
//!
//! A `VecDeque` behind a `tokio::sync::Mutex`, with two `Notify` instances
//! standing in for the classic not-empty/not-full condition variables.
//! Waiters register interest (`Notified::enable`) before re-checking state
//! under the lock, so a close or a send that lands between the check and
//! the await cannot be missed. The lock is never held across an await, so
//! a blocked receiver does not starve its peers.

use std::collections::VecDeque;

use thiserror::Error;
use tokio::sync::{Mutex, Notify};

/// Errors that can occur during queue operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Enqueue was attempted on a queue that has been closed.
    ///
    /// This indicates a violation of ownership discipline: only the
    /// designated closer may close a queue, and only after all writers
    /// have finished. Callers must treat it as fatal, not retry.
    #[error("queue is closed")]
    Closed,
}

/// Mutable queue state, guarded by a single mutex.
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A fixed-capacity concurrent FIFO with blocking enqueue/dequeue and
/// one-time close.
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,
    /// Signalled when an item is enqueued or the queue is closed.
    item_available: Notify,
    /// Signalled when an item is dequeued or the queue is closed.
    space_available: Notify,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a new queue with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. A zero-capacity rendezvous handoff is
    /// not supported; small capacities (e.g. 10) bound memory and create
    /// backpressure between stages.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");

        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            item_available: Notify::new(),
            space_available: Notify::new(),
            capacity,
        }
    }

    /// Enqueues an item, blocking while the queue is at capacity.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if the queue has been closed, whether
    /// at call time or while blocked waiting for space.
    pub async fn enqueue(&self, item: T) -> Result<(), QueueError> {
        loop {
            let notified = self.space_available.notified();
            tokio::pin!(notified);
            // Register before checking state so a concurrent dequeue or
            // close cannot slip between the check and the await.
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if state.closed {
                    return Err(QueueError::Closed);
                }
                if state.items.len() < self.capacity {
                    state.items.push_back(item);
                    drop(state);
                    self.item_available.notify_one();
                    return Ok(());
                }
            }

            notified.await;
        }
    }

    /// Dequeues the next item, blocking while the queue is empty and open.
    ///
    /// Returns `None` only once the queue is closed and fully drained,
    /// which is the normal terminal signal for receivers, not an error.
    pub async fn dequeue(&self) -> Option<T> {
        loop {
            let notified = self.item_available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if let Some(item) = state.items.pop_front() {
                    drop(state);
                    self.space_available.notify_one();
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Closes the queue, waking every blocked sender and receiver.
    ///
    /// Must be called by the single designated owner, after all writers
    /// have finished. Subsequent enqueues fail with
    /// [`QueueError::Closed`]; items already buffered remain drainable.
    /// Closing an already-closed queue is a no-op.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            state.closed = true;
        }
        // Blocked receivers must observe the terminal state, blocked
        // senders must fail rather than wait forever.
        self.item_available.notify_waiters();
        self.space_available.notify_waiters();
    }

    /// Returns the number of items currently buffered.
    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    /// Returns whether the queue is currently empty.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items.is_empty()
    }

    /// Returns whether the queue has been closed.
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Returns the fixed capacity the queue was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_dequeue_fifo() {
        let queue = BoundedQueue::new(4);

        queue.enqueue(1).await.expect("enqueue should succeed");
        queue.enqueue(2).await.expect("enqueue should succeed");
        queue.enqueue(3).await.expect("enqueue should succeed");

        assert_eq!(queue.len().await, 3);
        assert_eq!(queue.dequeue().await, Some(1));
        assert_eq!(queue.dequeue().await, Some(2));
        assert_eq!(queue.dequeue().await, Some(3));
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_enqueue_after_close_fails() {
        let queue = BoundedQueue::new(2);
        queue.close().await;

        assert_eq!(queue.enqueue(1).await, Err(QueueError::Closed));
        assert!(queue.is_closed().await);
    }

    #[tokio::test]
    async fn test_buffered_items_drainable_after_close() {
        let queue = BoundedQueue::new(4);
        queue.enqueue(5).await.expect("enqueue should succeed");
        queue.enqueue(6).await.expect("enqueue should succeed");
        queue.close().await;

        assert_eq!(queue.dequeue().await, Some(5));
        assert_eq!(queue.dequeue().await, Some(6));
        assert_eq!(queue.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let queue = BoundedQueue::<u32>::new(1);
        queue.close().await;
        queue.close().await;

        assert_eq!(queue.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_capacity_is_fixed() {
        let queue = BoundedQueue::<u32>::new(10);
        assert_eq!(queue.capacity(), 10);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 1")]
    fn test_zero_capacity_panics() {
        let _ = BoundedQueue::<u32>::new(0);
    }

    #[test]
    fn test_queue_error_display() {
        let err = QueueError::Closed;
        assert!(err.to_string().contains("closed"));
    }
}
