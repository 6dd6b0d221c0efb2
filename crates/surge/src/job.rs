/// One unit of work flowing through the pool, tagged with its position in
/// the original submission order.
///
/// The index is assigned once at submission and never changes; it is the
/// key the pool uses to put results back into submission order after the
/// workers have raced for jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job<T> {
    /// Position of this job in the submission order, starting at 0.
    pub index: usize,
    /// The caller-supplied payload handed to the transform.
    pub payload: T,
}

/// The output of processing one [`Job`], carrying the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed<U> {
    /// Submission index of the originating job.
    pub index: usize,
    /// The value produced by the transform.
    pub value: U,
}
