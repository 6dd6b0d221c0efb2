//! Bounded job queue shared by every worker in the pool.
//!
//! Producers suspend in [`JobQueue::submit`] while the queue is at
//! capacity, and are released only when a worker dequeues. Workers suspend
//! in [`JobQueue::take`] while the queue is empty and not yet closed.
//! Closing the queue never discards queued jobs: takes keep draining until
//! the buffer is empty, and only then report exhaustion.
//!
//! Both halves are cheaply clonable, so any number of producers and workers
//! can share one queue without wrapping a receiver in a lock.

use crate::{Error, Job, Result};

/// A fixed-capacity buffer of pending [`Job`]s with blocking submit/take
/// and close-then-drain semantics.
///
/// Capacity is fixed for the queue's lifetime and must be greater than
/// zero.
#[derive(Debug)]
pub struct JobQueue<T> {
    tx: async_channel::Sender<Job<T>>,
    rx: async_channel::Receiver<Job<T>>,
    capacity: usize,
}

impl<T> Clone for JobQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T> JobQueue<T> {
    /// Creates a queue holding at most `capacity` pending jobs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapacity`] if `capacity` is zero.
    pub fn bounded(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        let (tx, rx) = async_channel::bounded(capacity);
        Ok(Self { tx, rx, capacity })
    }

    /// Enqueues a job, suspending the caller while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the queue was closed before the
    /// job could be enqueued.
    pub async fn submit(&self, job: Job<T>) -> Result<()> {
        self.tx.send(job).await.map_err(|_| Error::QueueClosed)
    }

    /// Dequeues the next job, suspending the caller while the queue is
    /// empty and still open.
    ///
    /// Returns `None` once the queue is closed *and* fully drained. That is
    /// the expected exit signal for a worker loop, not an error.
    pub async fn take(&self) -> Option<Job<T>> {
        self.rx.recv().await.ok()
    }

    /// Closes the queue: future submissions fail and takes that find the
    /// queue empty return `None` instead of suspending forever.
    ///
    /// Jobs already enqueued remain observable by [`take`](Self::take)
    /// until the buffer is empty. Returns `true` on the call that actually
    /// closed the queue, `false` if it was closed already.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    /// Number of jobs currently waiting in the queue. Always within
    /// `[0, capacity]`.
    pub fn occupancy(&self) -> usize {
        self.rx.len()
    }

    /// The fixed capacity this queue was created with.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use tokio::time::timeout;

    fn job(index: usize) -> Job<u32> {
        Job {
            index,
            payload: index as u32,
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            JobQueue::<u32>::bounded(0),
            Err(Error::InvalidCapacity)
        ));
    }

    #[tokio::test]
    async fn submit_blocks_until_a_take_frees_a_slot() {
        let queue = JobQueue::bounded(1).unwrap();
        queue.submit(job(0)).await.unwrap();
        assert_eq!(queue.occupancy(), 1);

        // The queue is full: a second submit must suspend.
        let blocked = queue.clone();
        let submit = tokio::spawn(async move { blocked.submit(job(1)).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!submit.is_finished());

        assert!(
            timeout(Duration::from_millis(50), queue.take())
                .await
                .is_ok()
        );

        submit.await.unwrap().unwrap();
        assert_eq!(queue.occupancy(), 1);
        assert_eq!(queue.take().await.unwrap().index, 1);
    }

    #[tokio::test]
    async fn close_drains_before_reporting_exhaustion() {
        let queue = JobQueue::bounded(4).unwrap();
        for i in 0..3 {
            queue.submit(job(i)).await.unwrap();
        }

        assert!(queue.close());
        assert!(!queue.close());

        for i in 0..3 {
            assert_eq!(queue.take().await.unwrap().index, i);
        }
        assert!(queue.take().await.is_none());
    }

    #[tokio::test]
    async fn submit_after_close_is_rejected() {
        let queue = JobQueue::bounded(2).unwrap();
        queue.close();
        assert!(matches!(queue.submit(job(0)).await, Err(Error::QueueClosed)));
    }

    #[tokio::test]
    async fn occupancy_tracks_submits_and_takes() {
        let queue = JobQueue::bounded(8).unwrap();
        assert_eq!(queue.capacity(), 8);
        assert_eq!(queue.occupancy(), 0);

        for i in 0..5 {
            queue.submit(job(i)).await.unwrap();
        }
        assert_eq!(queue.occupancy(), 5);

        queue.take().await.unwrap();
        queue.take().await.unwrap();
        assert_eq!(queue.occupancy(), 3);
    }
}
