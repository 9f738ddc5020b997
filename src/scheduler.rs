//! Fork-join batch scheduler
//!
//! Splits seeker indices into contiguous batches, runs each batch on a rayon
//! worker and blocks until all of them have finished. Every batch owns a
//! disjoint slice of the result buffer, so no locking is needed.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use glam::Vec3;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{QueryError, Result};

/// Default batch size for `seeker_count` seekers spread over `worker_count` workers
///
/// Returns `ceil(seeker_count / worker_count)`, never less than 1. A worker
/// count of 0 is treated as 1.
///
/// # Example
///
/// ```
/// use nearest_target::batch_size;
///
/// assert_eq!(batch_size(4, 10), 3);
/// assert_eq!(batch_size(4, 0), 1);
/// ```
pub fn batch_size(worker_count: usize, seeker_count: usize) -> usize {
    seeker_count.div_ceil(worker_count.max(1)).max(1)
}

/// Worker pool that runs batches of seekers to completion
pub struct QueryScheduler {
    /// Dedicated pool, or `None` to use rayon's global pool
    pool: Option<ThreadPool>,
}

impl QueryScheduler {
    /// Create a scheduler
    ///
    /// `worker_count` of 0 shares rayon's global pool; anything else builds a
    /// dedicated pool with that many threads.
    pub fn new(worker_count: usize) -> Result<Self> {
        let pool = if worker_count > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(worker_count)
                .thread_name(|i| format!("nearest-worker-{}", i))
                .build()?;
            Some(pool)
        } else {
            None
        };
        Ok(Self { pool })
    }

    /// Number of threads batches are spread across
    pub fn worker_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `f` inside this scheduler's pool
    pub fn install<R, F>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    /// Run `job` over `seekers` in batches of `batch`, writing into `results`
    ///
    /// `job` receives the batch's seekers and the matching result slice.
    /// Returns once every batch has finished. If any batch returns an error or
    /// panics, the error of the lowest-numbered failing batch is returned.
    pub fn dispatch<F>(
        &self,
        seekers: &[Vec3],
        results: &mut [Vec3],
        batch: usize,
        job: F,
    ) -> Result<()>
    where
        F: Fn(&[Vec3], &mut [Vec3]) -> Result<()> + Sync,
    {
        debug_assert_eq!(seekers.len(), results.len());
        if seekers.is_empty() {
            return Ok(());
        }
        let batch = batch.max(1);

        let failures: Vec<QueryError> = self.install(|| {
            seekers
                .par_chunks(batch)
                .zip(results.par_chunks_mut(batch))
                .enumerate()
                .filter_map(|(index, (input, output))| {
                    run_batch(index, &job, input, output).err()
                })
                .collect()
        });

        match failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run `job` over all seekers as a single batch on the calling thread
    pub fn run_inline<F>(&self, seekers: &[Vec3], results: &mut [Vec3], job: F) -> Result<()>
    where
        F: Fn(&[Vec3], &mut [Vec3]) -> Result<()>,
    {
        debug_assert_eq!(seekers.len(), results.len());
        run_batch(0, &job, seekers, results)
    }
}

impl std::fmt::Debug for QueryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryScheduler")
            .field("dedicated", &self.pool.is_some())
            .field("workers", &self.worker_count())
            .finish()
    }
}

fn run_batch<F>(index: usize, job: &F, input: &[Vec3], output: &mut [Vec3]) -> Result<()>
where
    F: Fn(&[Vec3], &mut [Vec3]) -> Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| job(input, output))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(QueryError::WorkerFailure { message, .. })) => Err(QueryError::WorkerFailure {
            batch: index,
            message,
        }),
        Ok(Err(err)) => Err(QueryError::WorkerFailure {
            batch: index,
            message: err.to_string(),
        }),
        Err(payload) => Err(QueryError::WorkerFailure {
            batch: index,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
