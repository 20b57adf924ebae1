//! Worker pool coordinator: fan-out over the intake queue, fan-in to the
//! output queue.
//!
//! This module spawns a fixed number of workers that compete for jobs on a
//! shared intake queue and write results to a shared output queue. The
//! coordinator joins every worker before closing the output queue, which
//! is the central correctness property of the pool: closing earlier could
//! fail a live worker's enqueue, closing later (or never) would leave the
//! consumer blocked after the last real result.
//!
//! # Features
//!
//! - Configurable worker count and queue capacities
//! - Join-then-close shutdown ordering
//! - Fatal propagation of handler errors with fast producer teardown
//! - Pool statistics tracking

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::job::{Job, JobResult};
use crate::queue::{BoundedQueue, QueueError};

/// Errors that can occur in the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Pool configuration failed validation.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// A job handler returned an error. Fatal to the whole pool.
    #[error("job {job_id} failed: {message}")]
    JobFailed {
        /// Id of the job whose handler failed.
        job_id: u64,
        /// Error message reported by the handler.
        message: String,
    },

    /// A spawned task panicked.
    #[error("task panicked: {0}")]
    TaskPanicked(String),

    /// A queue operation failed, indicating an ownership-discipline
    /// violation somewhere (e.g. enqueue on a closed queue).
    #[error("queue operation failed: {0}")]
    Queue(#[from] QueueError),
}

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker tasks to spawn.
    pub num_workers: usize,
    /// Capacity of the intake (job) queue.
    pub intake_capacity: usize,
    /// Capacity of the output (result) queue.
    pub output_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            intake_capacity: 10,
            output_capacity: 10,
        }
    }
}

impl PoolConfig {
    /// Creates a new configuration with the specified number of workers.
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Sets the intake queue capacity.
    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }

    /// Sets the output queue capacity.
    pub fn with_output_capacity(mut self, capacity: usize) -> Self {
        self.output_capacity = capacity;
        self
    }

    /// Sets both queue capacities to the same value.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self.output_capacity = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the worker count or either
    /// queue capacity is zero.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.num_workers == 0 {
            return Err(PoolError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.intake_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "intake queue capacity must be at least 1".to_string(),
            ));
        }
        if self.output_capacity == 0 {
            return Err(PoolError::InvalidConfig(
                "output queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Statistics about a pool run.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Total number of workers in the pool.
    pub num_workers: usize,
    /// Number of workers processing a job at observation time.
    pub active_workers: usize,
    /// Total number of jobs completed successfully.
    pub jobs_completed: u64,
}

/// Shared state for tracking pool statistics.
///
/// Workers run concurrently, so every counter is an atomic; a plain shared
/// integer here would be a data race.
struct SharedPoolStats {
    jobs_completed: AtomicU64,
    active_workers: AtomicU64,
}

impl SharedPoolStats {
    fn new() -> Self {
        Self {
            jobs_completed: AtomicU64::new(0),
            active_workers: AtomicU64::new(0),
        }
    }

    fn record_completion(&self) {
        self.jobs_completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_active(&self) {
        self.active_workers.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement_active(&self) {
        self.active_workers.fetch_sub(1, Ordering::SeqCst);
    }

    fn to_pool_stats(&self, num_workers: usize) -> PoolStats {
        PoolStats {
            num_workers,
            active_workers: self.active_workers.load(Ordering::SeqCst) as usize,
            jobs_completed: self.jobs_completed.load(Ordering::SeqCst),
        }
    }
}

/// Runs a pool of workers until the intake queue is closed and drained.
///
/// Spawns `config.num_workers` workers, each independently pulling jobs
/// from `intake`, invoking `handler` on the payload, and pushing the
/// result to `output`. The output queue is closed only after every worker
/// has exited.
///
/// A handler error stops its worker and is fatal to the pool. The
/// coordinator closes the intake queue once the join observes the
/// failure, so a producer still submitting at that point fails fast
/// instead of blocking forever; a producer that finished first is
/// unaffected. Workers that did not fail keep draining the intake until
/// it is closed and drained. The first error is returned after the join
/// completes.
///
/// # Errors
///
/// - `PoolError::InvalidConfig` if the configuration fails validation
/// - `PoolError::JobFailed` if a handler returned an error
/// - `PoolError::TaskPanicked` if a worker task panicked
/// - `PoolError::Queue` if a queue operation failed
pub async fn run_pool<P, O, F, Fut>(
    config: &PoolConfig,
    handler: F,
    intake: Arc<BoundedQueue<Job<P>>>,
    output: Arc<BoundedQueue<JobResult<P, O>>>,
) -> Result<PoolStats, PoolError>
where
    P: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, String>> + Send + 'static,
{
    config.validate()?;

    let handler = Arc::new(handler);
    let stats = Arc::new(SharedPoolStats::new());

    let mut handles = Vec::with_capacity(config.num_workers);
    for worker_id in 0..config.num_workers {
        let worker = WorkerContext {
            worker_id,
            intake: Arc::clone(&intake),
            output: Arc::clone(&output),
            handler: Arc::clone(&handler),
            stats: Arc::clone(&stats),
        };
        handles.push(tokio::spawn(worker.run()));
    }
    info!(num_workers = config.num_workers, "worker pool started");

    // Counting join: every worker must have permanently stopped producing
    // before the output queue may be closed.
    let mut first_error: Option<PoolError> = None;
    for handle in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "worker task panicked");
                Err(PoolError::TaskPanicked(e.to_string()))
            }
        };

        if let Err(e) = outcome {
            if first_error.is_none() {
                // Unblock a producer still submitting: further jobs would
                // never be processed. Surviving workers keep draining the
                // intake until closed-and-drained.
                warn!(error = %e, "pool failure, closing intake queue");
                intake.close().await;
                first_error = Some(e);
            }
        }
    }

    output.close().await;
    debug!("all workers joined, output queue closed");

    match first_error {
        Some(e) => Err(e),
        None => Ok(stats.to_pool_stats(config.num_workers)),
    }
}

/// Everything one worker needs to run.
struct WorkerContext<P, O, F> {
    worker_id: usize,
    intake: Arc<BoundedQueue<Job<P>>>,
    output: Arc<BoundedQueue<JobResult<P, O>>>,
    handler: Arc<F>,
    stats: Arc<SharedPoolStats>,
}

impl<P, O, F, Fut> WorkerContext<P, O, F>
where
    P: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, String>> + Send + 'static,
{
    /// Main worker loop.
    ///
    /// Pulls jobs until the intake queue reports closed-and-drained, then
    /// exits. Never closes either queue.
    async fn run(self) -> Result<(), PoolError> {
        info!(worker_id = self.worker_id, "worker started");

        while let Some(job) = self.intake.dequeue().await {
            let job_id = job.id;
            debug!(worker_id = self.worker_id, job_id, "processing job");

            self.stats.increment_active();
            let outcome = (self.handler)(job.payload.clone()).await;
            self.stats.decrement_active();

            match outcome {
                Ok(output_value) => {
                    self.stats.record_completion();
                    self.output
                        .enqueue(JobResult::new(job, output_value))
                        .await?;
                }
                Err(message) => {
                    error!(
                        worker_id = self.worker_id,
                        job_id,
                        %message,
                        "job failed, stopping worker"
                    );
                    return Err(PoolError::JobFailed { job_id, message });
                }
            }
        }

        info!(worker_id = self.worker_id, "worker finished");
        Ok(())
    }
}
