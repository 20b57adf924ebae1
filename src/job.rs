//! Job and result definitions for the worker pool.
//!
//! This module defines the value types that flow through the pool:
//!
//! - `Job`: A unit of work submitted for processing
//! - `JobResult`: The output of processing one job
//!
//! Both types are immutable once created. Ownership transfers through the
//! queues: a job is created by the producer, moved through the intake queue
//! to exactly one worker, and carried inside the result through the output
//! queue to the consumer. Nothing is shared.

/// A unit of work to be processed by exactly one worker.
///
/// Ids are assigned sequentially by the producer in submission order, which
/// makes result sets checkable against the submitted batch even though
/// results arrive in nondeterministic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job<P> {
    /// Sequential identifier assigned at submission time.
    pub id: u64,
    /// The work item itself.
    pub payload: P,
}

impl<P> Job<P> {
    /// Creates a new job with the given id and payload.
    pub fn new(id: u64, payload: P) -> Self {
        Self { id, payload }
    }
}

/// The output of processing one job.
///
/// Created by exactly one worker and consumed by exactly one sink call.
/// Carries the originating job so the consumer can correlate output with
/// input without any shared lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult<P, O> {
    /// The job this result was computed from.
    pub job: Job<P>,
    /// The computed output.
    pub output: O,
}

impl<P, O> JobResult<P, O> {
    /// Creates a new result for the given job.
    pub fn new(job: Job<P>, output: O) -> Self {
        Self { job, output }
    }

    /// Returns the id of the originating job.
    pub fn job_id(&self) -> u64 {
        self.job.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_new() {
        let job = Job::new(7, "payload");

        assert_eq!(job.id, 7);
        assert_eq!(job.payload, "payload");
    }

    #[test]
    fn test_job_result_new() {
        let job = Job::new(3, 589u32);
        let result = JobResult::new(job.clone(), 22u32);

        assert_eq!(result.job, job);
        assert_eq!(result.output, 22);
        assert_eq!(result.job_id(), 3);
    }

    #[test]
    fn test_job_equality() {
        let a = Job::new(1, 10);
        let b = Job::new(1, 10);
        let c = Job::new(2, 10);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
