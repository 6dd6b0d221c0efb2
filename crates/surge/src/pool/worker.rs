use super::Shared;
use crate::{Completed, JobFailure};
use std::sync::Arc;

/// The worker loop: take a job, apply the transform, record the result.
///
/// Runs until the queue reports exhaustion (closed and fully drained),
/// which is the expected exit signal rather than an error. Workers race on
/// the shared queue; which worker processes which job is unspecified.
///
/// A transform failure aborts this worker after recording a [`JobFailure`]
/// for the run. Sibling workers keep draining the backlog so no queued job
/// is silently dropped; the failure surfaces when the caller awaits pool
/// completion.
pub(super) async fn worker_loop<T, U>(_worker_id: usize, shared: Arc<Shared<T, U>>)
where
    T: Send + 'static,
    U: Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} started");

    while let Some(job) = shared.queue.take().await {
        let index = job.index;
        match (shared.transform)(job.payload).await {
            Ok(value) => shared.results.record(Completed { index, value }),
            Err(source) => {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {_worker_id} failed on job {index}: {source}");

                shared.failures.lock().push(JobFailure { index, source });
                break;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} stopped");
}
