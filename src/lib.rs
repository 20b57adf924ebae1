//! workforge: bounded worker pool with fan-in result aggregation.
//!
//! This library provides an in-process coordination primitive: a fixed
//! pool of workers draining a bounded intake queue and merging their
//! outputs into a bounded result queue, with backpressure at both ends and
//! an ordered shutdown sequence for downstream consumers.
//!
//! # Architecture
//!
//! ```text
//!  Producer ──▶ intake queue ──▶ Workers (1..N) ──▶ output queue ──▶ Consumer
//! ```
//!
//! Jobs are delivered to workers in FIFO order; result arrival order is
//! deliberately unordered across workers. The output queue is closed only
//! after every worker has exited, and the consumer signals completion only
//! after the output queue is closed and drained.

// Core modules
pub mod batch;
pub mod cli;
pub mod consumer;
pub mod job;
pub mod pool;
pub mod producer;
pub mod queue;

// Re-export commonly used types
pub use batch::{run_batch, BatchSummary};
pub use consumer::consume;
pub use job::{Job, JobResult};
pub use pool::{run_pool, PoolConfig, PoolError, PoolStats};
pub use producer::produce;
pub use queue::{BoundedQueue, QueueError};
