//! Error types for the elastic pool.
//!
//! This module defines the central `Error` enum covering every reportable
//! failure in the pool's lifecycle.
//!
//! ## Error Cases
//! - `InvalidCapacity`: A queue or pool was constructed with a zero
//!   capacity.
//! - `QueueClosed`: A job was submitted after the pool was finished.
//! - `JobsFailed`: One or more transforms failed; the run as a whole is
//!   reported failed.
//! - `Incomplete`: Results were collected before every submitted job was
//!   recorded.
//!
//! Queue exhaustion as observed by a worker (`take()` returning `None` on a
//! closed, empty queue) is the expected exit signal for the worker loop and
//! is deliberately *not* represented here.

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Error payload produced by a caller-supplied transform.
pub type TransformError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A single failed job: which submission it was, and what the transform
/// reported.
#[derive(Debug, thiserror::Error)]
#[error("job {index}: {source}")]
pub struct JobFailure {
    /// Submission index of the job that failed.
    pub index: usize,
    /// The error returned by the transform.
    pub source: TransformError,
}

/// Unified error type for the elastic pool.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A bounded queue requires a capacity greater than zero.
    #[error("queue capacity must be greater than zero")]
    InvalidCapacity,

    /// The queue has been closed; no further submissions are accepted.
    #[error("queue is closed")]
    QueueClosed,

    /// One or more transforms failed. No job is silently dropped: the whole
    /// run is reported failed, carrying every recorded failure.
    #[error("{} job(s) failed during processing", failures.len())]
    JobsFailed { failures: Vec<JobFailure> },

    /// Collection ran before every expected index was recorded. This
    /// signals a coordination bug, such as collecting results without
    /// waiting for the pool to stop first.
    #[error("results incomplete: recorded {recorded} of {expected}")]
    Incomplete { expected: usize, recorded: usize },
}

impl Error {
    /// Convenience accessor for the failure list carried by
    /// [`Error::JobsFailed`].
    pub fn job_failures(&self) -> &[JobFailure] {
        match self {
            Self::JobsFailed { failures } => failures,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_failed_reports_count() {
        let err = Error::JobsFailed {
            failures: vec![
                JobFailure {
                    index: 3,
                    source: "boom".into(),
                },
                JobFailure {
                    index: 7,
                    source: "bang".into(),
                },
            ],
        };
        assert_eq!(err.to_string(), "2 job(s) failed during processing");
        assert_eq!(err.job_failures().len(), 2);
        assert_eq!(err.job_failures()[0].to_string(), "job 3: boom");
    }

    #[test]
    fn incomplete_reports_counts() {
        let err = Error::Incomplete {
            expected: 10,
            recorded: 4,
        };
        assert_eq!(err.to_string(), "results incomplete: recorded 4 of 10");
        assert!(err.job_failures().is_empty());
    }
}
