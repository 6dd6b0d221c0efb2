//! Index-keyed fan-in of worker results.
//!
//! Workers finish in whatever order the scheduler lets them; the caller is
//! promised results in submission order. [`ResultSet`] decouples the two:
//! each result lands in the slot named by its job index, and collection
//! walks the slots in order.

use crate::{Completed, Error, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe, index-keyed store of per-job results.
///
/// [`record`](Self::record) may be called concurrently by any number of
/// workers as long as no two calls carry the same index - the pool
/// guarantees that by assigning each index exactly once at submission.
/// Writes are serialized through a short-lived lock around the slot store.
#[derive(Debug, Default)]
pub struct ResultSet<U> {
    slots: Mutex<Vec<Option<U>>>,
    recorded: AtomicUsize,
}

impl<U> ResultSet<U> {
    /// Creates an empty result set whose slot store grows on demand.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            recorded: AtomicUsize::new(0),
        }
    }

    /// Creates a result set pre-sized for `expected` jobs, avoiding slot
    /// store growth while workers are recording.
    pub fn with_capacity(expected: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(expected, || None);
        Self {
            slots: Mutex::new(slots),
            recorded: AtomicUsize::new(0),
        }
    }

    /// Stores one completed result in the slot named by its index.
    ///
    /// Each index must be recorded at most once; the pool guarantees this
    /// by construction since indices are assigned by a single submission
    /// counter.
    pub fn record(&self, done: Completed<U>) {
        let mut slots = self.slots.lock();
        if done.index >= slots.len() {
            slots.resize_with(done.index + 1, || None);
        }
        debug_assert!(slots[done.index].is_none(), "index recorded twice");
        if slots[done.index].replace(done.value).is_none() {
            self.recorded.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of results recorded so far.
    pub fn recorded(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Drains the set, returning all `expected` values ordered by
    /// submission index.
    ///
    /// Intended to be called once, after every worker has exited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incomplete`] if any index in `0..expected` was
    /// never recorded.
    pub fn collect(&self, expected: usize) -> Result<Vec<U>> {
        let slots = core::mem::take(&mut *self.slots.lock());
        let recorded = slots.iter().filter(|slot| slot.is_some()).count();
        if recorded < expected || slots.len() < expected {
            return Err(Error::Incomplete { expected, recorded });
        }

        let mut values = Vec::with_capacity(expected);
        for slot in slots.into_iter().take(expected) {
            match slot {
                Some(value) => values.push(value),
                None => return Err(Error::Incomplete { expected, recorded }),
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn collects_in_index_order_regardless_of_record_order() {
        let set = ResultSet::new();
        for index in [3usize, 0, 2, 1] {
            set.record(Completed {
                index,
                value: index * 10,
            });
        }
        assert_eq!(set.collect(4).unwrap(), vec![0, 10, 20, 30]);
    }

    #[test]
    fn missing_index_is_reported() {
        let set = ResultSet::new();
        set.record(Completed {
            index: 0,
            value: 'a',
        });
        set.record(Completed {
            index: 2,
            value: 'c',
        });
        assert!(matches!(
            set.collect(3),
            Err(Error::Incomplete {
                expected: 3,
                recorded: 2
            })
        ));
    }

    #[test]
    fn pre_sized_set_accepts_all_indices() {
        let set = ResultSet::with_capacity(16);
        for index in 0..16 {
            set.record(Completed { index, value: index });
        }
        assert_eq!(set.recorded(), 16);
        let values = set.collect(16).unwrap();
        assert_eq!(values.len(), 16);
        assert!(values.iter().enumerate().all(|(i, v)| i == *v));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_recording_is_lossless() {
        const JOBS: usize = 512;
        let set = Arc::new(ResultSet::with_capacity(JOBS));

        let mut tasks = Vec::with_capacity(8);
        for chunk in 0..8 {
            let set = Arc::clone(&set);
            tasks.push(tokio::spawn(async move {
                for index in (chunk * 64)..((chunk + 1) * 64) {
                    set.record(Completed {
                        index,
                        value: index as u64,
                    });
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let values = set.collect(JOBS).unwrap();
        assert_eq!(values.len(), JOBS);
        assert!(values.iter().enumerate().all(|(i, v)| i as u64 == *v));
    }
}
