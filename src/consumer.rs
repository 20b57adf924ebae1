//! Output-side glue: drain results into a sink and signal completion.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::job::JobResult;
use crate::queue::BoundedQueue;

/// Drains the output queue into a sink, then fires the completion signal.
///
/// The sink is invoked once per result, in arrival order. Arrival order is
/// deliberately unordered relative to submission order: workers complete
/// at different rates, and results are not reordered to match. Once the
/// output queue reports closed-and-drained, the completion signal carries
/// the number of results delivered.
///
/// The send can only fail if the orchestrator dropped its receiver, in
/// which case nobody is waiting and the count is discarded.
pub async fn consume<P, O, S>(
    output: Arc<BoundedQueue<JobResult<P, O>>>,
    mut sink: S,
    done: oneshot::Sender<u64>,
) where
    S: FnMut(JobResult<P, O>),
{
    let mut received: u64 = 0;
    while let Some(result) = output.dequeue().await {
        debug!(job_id = result.job_id(), "result received");
        sink(result);
        received += 1;
    }

    info!(results_delivered = received, "output queue drained");
    let _ = done.send(received);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;

    #[tokio::test]
    async fn test_consume_drains_and_signals_count() {
        let output = Arc::new(BoundedQueue::new(4));
        for id in 0..3u64 {
            output
                .enqueue(JobResult::new(Job::new(id, id as u32), id as u32 * 2))
                .await
                .expect("enqueue should succeed");
        }
        output.close().await;

        let (done_tx, done_rx) = oneshot::channel();
        let mut seen = Vec::new();
        consume(output, |result| seen.push(result.job_id()), done_tx).await;

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(done_rx.await, Ok(3));
    }

    #[tokio::test]
    async fn test_consume_empty_closed_queue_signals_zero() {
        let output = Arc::new(BoundedQueue::<JobResult<u32, u32>>::new(1));
        output.close().await;

        let (done_tx, done_rx) = oneshot::channel();
        consume(output, |_| {}, done_tx).await;

        assert_eq!(done_rx.await, Ok(0));
    }
}
