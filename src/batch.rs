//! Batch orchestration: wire producer, workers and consumer together.
//!
//! # Data flow
//!
//! ```text
//!  Producer ──▶ intake queue ──▶ Workers (1..N) ──▶ output queue ──▶ Consumer
//! ```
//!
//! The producer and consumer are spawned before the pool coordinator runs,
//! so every stage executes concurrently. This is a by-construction
//! deadlock guarantee: a bounded queue whose writer can outpace its
//! capacity always has a live reader on the other side. The orchestrator
//! returns only after the consumer signals that the output queue has been
//! fully drained.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::consumer::consume;
use crate::job::JobResult;
use crate::pool::{run_pool, PoolConfig, PoolError, PoolStats};
use crate::producer::produce;
use crate::queue::{BoundedQueue, QueueError};

/// Summary of a completed batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Number of jobs the producer submitted.
    pub jobs_submitted: u64,
    /// Number of results the consumer delivered to the sink.
    pub results_delivered: u64,
    /// Pool statistics at the end of the run.
    pub stats: PoolStats,
}

/// Runs a full batch through the worker pool and waits for completion.
///
/// Constructs the intake and output queues, starts the producer and the
/// consumer concurrently, runs the pool coordinator, and blocks on the
/// consumer's completion signal before returning. Skipping that wait would
/// risk returning while results are still undelivered.
///
/// The sink is invoked once per result in arrival order; across multiple
/// workers that order is nondeterministic relative to submission order.
///
/// # Errors
///
/// Returns the first error from whichever stage failed: handler failures
/// as `PoolError::JobFailed` (results delivered before the failure stay
/// delivered), panics as `PoolError::TaskPanicked`, configuration problems
/// as `PoolError::InvalidConfig`.
pub async fn run_batch<P, O, I, F, Fut, S>(
    config: PoolConfig,
    payloads: I,
    handler: F,
    sink: S,
) -> Result<BatchSummary, PoolError>
where
    P: Clone + Send + 'static,
    O: Send + 'static,
    I: IntoIterator<Item = P> + Send + 'static,
    I::IntoIter: Send,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, String>> + Send + 'static,
    S: FnMut(JobResult<P, O>) + Send + 'static,
{
    config.validate()?;

    let intake = Arc::new(BoundedQueue::new(config.intake_capacity));
    let output = Arc::new(BoundedQueue::new(config.output_capacity));
    let (done_tx, done_rx) = oneshot::channel();

    let producer_handle = tokio::spawn(produce(payloads, Arc::clone(&intake)));
    let consumer_handle = tokio::spawn(consume(Arc::clone(&output), sink, done_tx));

    let pool_result = run_pool(&config, handler, Arc::clone(&intake), Arc::clone(&output)).await;

    let jobs_submitted = match producer_handle.await {
        Ok(Ok(count)) => count,
        Ok(Err(QueueError::Closed)) if pool_result.is_err() => {
            // Pool teardown closed the intake under the producer.
            warn!("producer stopped early, intake closed during pool teardown");
            0
        }
        Ok(Err(e)) => return Err(PoolError::Queue(e)),
        Err(e) => return Err(PoolError::TaskPanicked(e.to_string())),
    };

    // The coordinator has closed the output queue, so the consumer drains
    // whatever is buffered and then signals.
    let results_delivered = match done_rx.await {
        Ok(count) => count,
        Err(_) => {
            return Err(PoolError::TaskPanicked(
                "consumer dropped the completion signal".to_string(),
            ))
        }
    };
    if let Err(e) = consumer_handle.await {
        return Err(PoolError::TaskPanicked(e.to_string()));
    }

    let stats = pool_result?;
    info!(jobs_submitted, results_delivered, "batch complete");

    Ok(BatchSummary {
        jobs_submitted,
        results_delivered,
        stats,
    })
}
