//! The elastic worker pool: bounded fan-out, ordered fan-in.
//!
//! [`ElasticPool`] owns every moving part of one run: the bounded job
//! queue, the worker fleet, the occupancy-driven scaler, the result store
//! and the shutdown coordinator. Nothing is process-global; dropping the
//! pool tears the whole thing down.
//!
//! ## Structure
//!
//! - `worker` - the per-worker take → transform → record loop.
//! - `scaler` - the occupancy sampling loop that grows the fleet.

mod scaler;
mod worker;


use crate::{
    Error, Job, JobFailure, JobQueue, PoolConfig, PoolState, Result, ResultSet, ScaleConfig,
    ShutdownCoordinator, TransformError,
};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Boxed caller-supplied transform, stored once and shared by every worker.
type Transform<T, U> =
    Arc<dyn Fn(T) -> BoxFuture<'static, Result<U, TransformError>> + Send + Sync>;

/// State shared between the pool handle, its workers and the scaler loop.
pub(crate) struct Shared<T, U> {
    pub(crate) queue: JobQueue<T>,
    pub(crate) results: ResultSet<U>,
    pub(crate) transform: Transform<T, U>,
    pub(crate) tracker: TaskTracker,
    pub(crate) shutdown: ShutdownCoordinator,
    pub(crate) scale: ScaleConfig,
    pub(crate) failures: Mutex<Vec<JobFailure>>,
    /// Workers launched over the pool's lifetime. Doubles as the id source
    /// for worker log lines; never decremented (the policy is grow-only).
    pub(crate) workers: AtomicUsize,
}

/// Launches `count` additional workers reading from the shared queue.
///
/// Every worker, whenever spawned, is registered with the shared tracker so
/// [`ElasticPool::wait`] cannot return before it exits.
pub(crate) fn spawn_workers<T, U>(shared: &Arc<Shared<T, U>>, count: usize)
where
    T: Send + 'static,
    U: Send + 'static,
{
    for _ in 0..count {
        let worker_id = shared.workers.fetch_add(1, Ordering::Relaxed);
        shared
            .tracker
            .spawn(worker::worker_loop(worker_id, Arc::clone(shared)));
    }
}

/// An autoscaling worker pool that fans jobs out over a bounded queue and
/// fans results back in, ordered by submission.
///
/// One pool instance represents one run: submit jobs, [`finish`] to close
/// the queue, [`wait`] for the drain, then [`into_results`] for the ordered
/// output. See the crate docs for a complete example.
///
/// [`finish`]: Self::finish
/// [`wait`]: Self::wait
/// [`into_results`]: Self::into_results
pub struct ElasticPool<T, U> {
    shared: Arc<Shared<T, U>>,
    scaler: Mutex<Option<JoinHandle<()>>>,
    /// Jobs accepted so far; owned by the single submitter (`&mut self`).
    submitted: usize,
}

impl<T, U> ElasticPool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    /// Creates a pool, launches the initial workers and starts the scaler
    /// loop.
    ///
    /// The transform is applied to every job's payload by whichever worker
    /// dequeues it. It must be independently runnable per job; a returned
    /// error is fatal for the whole run (reported by [`wait`](Self::wait)).
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if the configured queue capacity
    /// is zero.
    pub fn new<F, Fut>(config: PoolConfig, transform: F) -> Result<Self>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, TransformError>> + Send + 'static,
    {
        config.validate()?;

        let results = match config.expected_jobs {
            Some(expected) => ResultSet::with_capacity(expected),
            None => ResultSet::new(),
        };
        let transform: Transform<T, U> = Arc::new(move |payload| {
            Box::pin(transform(payload))
                as BoxFuture<'static, Result<U, TransformError>>
        });

        let shared = Arc::new(Shared {
            queue: JobQueue::bounded(config.queue_capacity)?,
            results,
            transform,
            tracker: TaskTracker::new(),
            shutdown: ShutdownCoordinator::new(),
            scale: config.scale,
            failures: Mutex::new(Vec::new()),
            workers: AtomicUsize::new(0),
        });

        spawn_workers(&shared, config.initial_workers);
        let scaler = tokio::spawn(scaler::scaler_loop(Arc::clone(&shared)));
        shared.shutdown.mark_running();

        Ok(Self {
            shared,
            scaler: Mutex::new(Some(scaler)),
            submitted: 0,
        })
    }

    /// Submits one job, returning its submission index.
    ///
    /// Suspends while the queue is at capacity; a blocked submission is
    /// released as soon as a worker dequeues.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] once [`finish`](Self::finish) has been
    /// called.
    pub async fn submit(&mut self, payload: T) -> Result<usize> {
        let index = self.submitted;
        self.shared.queue.submit(Job { index, payload }).await?;
        self.submitted += 1;
        Ok(index)
    }

    /// Launches `count` additional workers on the shared queue.
    ///
    /// The scaler calls this on its own; it is exposed for hosts that want
    /// to pre-warm the fleet beyond `initial_workers`.
    pub fn spawn_workers(&self, count: usize) {
        spawn_workers(&self.shared, count);
    }

    /// Workers launched over the pool's lifetime. The scaling policy never
    /// retires workers, so while the pool is running this is also the live
    /// fleet size.
    pub fn worker_count(&self) -> usize {
        self.shared.workers.load(Ordering::Relaxed)
    }

    /// Jobs currently waiting in the queue.
    pub fn occupancy(&self) -> usize {
        self.shared.queue.occupancy()
    }

    /// Fixed capacity of the job queue.
    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.shared.shutdown.state()
    }

    /// Signals that no more jobs will be submitted.
    ///
    /// Closes the queue - idle workers observe exhaustion and exit once the
    /// backlog is drained - and sets the termination flag that stops the
    /// scaler loop. Idempotent: repeated calls do nothing.
    pub fn finish(&self) {
        if self.shared.shutdown.finish() {
            self.shared.queue.close();
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "Pool draining: queue closed with {} job(s) pending",
                self.shared.queue.occupancy()
            );
        }
    }

    /// Blocks until every launched worker has exited and the scaler loop
    /// has stopped, then reports the run's outcome.
    ///
    /// Workers spawned by the scaler after pool creation are tracked like
    /// the initial fleet, so this cannot return while any of them is still
    /// running. Call [`finish`](Self::finish) first; without it the workers
    /// never observe exhaustion and this suspends indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobsFailed`] if any transform failed. The failure
    /// list is handed out once, by the first caller.
    pub async fn wait(&self) -> Result<()> {
        // Join the scaler first so the fleet cannot grow once the tracker
        // is closed.
        let scaler = self.scaler.lock().take();
        if let Some(handle) = scaler {
            let _ = handle.await;
        }

        self.shared.tracker.close();
        self.shared.tracker.wait().await;
        self.shared.shutdown.mark_stopped();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Pool stopped: {} worker(s) exited, {} result(s) recorded",
            self.worker_count(),
            self.shared.results.recorded()
        );

        let failures = core::mem::take(&mut *self.shared.failures.lock());
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::JobsFailed { failures })
        }
    }

    /// Consumes the pool and returns every result in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incomplete`] if any submitted job has no recorded
    /// result - typically because [`wait`](Self::wait) was not awaited
    /// first, or because the run failed.
    pub fn into_results(self) -> Result<Vec<U>> {
        self.shared.results.collect(self.submitted)
    }
}
