//! Intake-side glue: turn an external payload source into jobs.

use std::sync::Arc;

use tracing::{debug, info};

use crate::job::Job;
use crate::queue::{BoundedQueue, QueueError};

/// Feeds the intake queue from a payload source, then closes it.
///
/// One job is created per payload, with ids assigned sequentially in
/// iteration order, and enqueued in that order. The intake queue is closed
/// exactly once, after the last enqueue, to signal workers that no more
/// work is coming. The producer is agnostic to how payloads are generated
/// and must run concurrently with the pool: with a bounded intake it will
/// block on a full queue until workers start draining.
///
/// Returns the number of jobs submitted.
///
/// # Errors
///
/// Returns [`QueueError::Closed`] if the intake queue was closed out from
/// under the producer, which happens when the pool tears down after a
/// handler failure. The queue is not touched again on that path.
pub async fn produce<P, I>(
    payloads: I,
    intake: Arc<BoundedQueue<Job<P>>>,
) -> Result<u64, QueueError>
where
    I: IntoIterator<Item = P>,
{
    let mut next_id: u64 = 0;
    for payload in payloads {
        intake.enqueue(Job::new(next_id, payload)).await?;
        debug!(job_id = next_id, "job submitted");
        next_id += 1;
    }

    intake.close().await;
    info!(jobs_submitted = next_id, "intake queue closed");
    Ok(next_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_produce_assigns_sequential_ids_and_closes() {
        let intake = Arc::new(BoundedQueue::new(10));

        let submitted = produce(vec!["a", "b", "c"], Arc::clone(&intake))
            .await
            .expect("produce should succeed");

        assert_eq!(submitted, 3);
        assert!(intake.is_closed().await);

        assert_eq!(intake.dequeue().await, Some(Job::new(0, "a")));
        assert_eq!(intake.dequeue().await, Some(Job::new(1, "b")));
        assert_eq!(intake.dequeue().await, Some(Job::new(2, "c")));
        assert_eq!(intake.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_produce_empty_source_still_closes() {
        let intake = Arc::new(BoundedQueue::<Job<u32>>::new(4));

        let submitted = produce(Vec::new(), Arc::clone(&intake))
            .await
            .expect("produce should succeed");

        assert_eq!(submitted, 0);
        assert!(intake.is_closed().await);
        assert_eq!(intake.dequeue().await, None);
    }

    #[tokio::test]
    async fn test_produce_fails_fast_on_closed_intake() {
        let intake = Arc::new(BoundedQueue::new(4));
        intake.close().await;

        let result = produce(vec![1, 2, 3], Arc::clone(&intake)).await;
        assert_eq!(result, Err(QueueError::Closed));
    }
}
