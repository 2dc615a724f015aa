//! Chunk dispatch onto workers.
//!
//! A [`ChunkDispatcher`] runs every task of a plan and returns one output per
//! task, or the first failure. Two implementations are provided:
//!
//! - [`WorkerPool`]: an owned Rayon thread pool created once and reused for
//!   every simulation until [`WorkerPool::shutdown`]
//! - [`SequentialDispatcher`]: runs chunks in order on the calling thread
//!
//! A failing chunk raises the shared [`CancelFlag`] so the remaining chunks
//! stop at their next path boundary.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::SimulationError;
use crate::gbm::ChunkOutput;
use crate::partition::ChunkTask;

/// Cooperative cancellation flag shared by every chunk of one simulation.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the flag has been raised.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Work executed for each chunk.
pub type ChunkJob<'a> =
    dyn Fn(&ChunkTask, &CancelFlag) -> Result<ChunkOutput, SimulationError> + Sync + 'a;

/// Executes a chunk plan.
pub trait ChunkDispatcher: Send + Sync {
    /// Number of chunks the partitioner should produce.
    fn concurrency(&self) -> usize;

    /// Runs `job` for every task.
    ///
    /// On success the outputs are returned in task order. If any chunk fails
    /// the whole dispatch fails; a root-cause error is preferred over the
    /// `Cancelled` errors of the chunks it stopped.
    fn dispatch(
        &self,
        tasks: &[ChunkTask],
        cancel: &CancelFlag,
        job: &ChunkJob<'_>,
    ) -> Result<Vec<ChunkOutput>, SimulationError>;
}

/// Owned Rayon worker pool.
///
/// # Examples
///
/// ```rust
/// use risk_simulation::dispatch::{ChunkDispatcher, WorkerPool};
///
/// let pool = WorkerPool::new(2).unwrap();
/// assert_eq!(pool.concurrency(), 2);
/// pool.shutdown();
/// ```
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Starts a pool of `threads` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::PoolBuild` if the threads cannot be spawned.
    pub fn new(threads: usize) -> Result<Self, SimulationError> {
        let threads = threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("risk-worker-{i}"))
            .build()
            .map_err(|e| SimulationError::PoolBuild(e.to_string()))?;
        tracing::debug!(threads, "worker pool started");
        Ok(Self { pool, threads })
    }

    /// Stops the pool. Worker threads exit once in-flight chunks finish.
    pub fn shutdown(self) {
        tracing::debug!(threads = self.threads, "worker pool shut down");
        drop(self.pool);
    }
}

impl ChunkDispatcher for WorkerPool {
    fn concurrency(&self) -> usize {
        self.threads
    }

    fn dispatch(
        &self,
        tasks: &[ChunkTask],
        cancel: &CancelFlag,
        job: &ChunkJob<'_>,
    ) -> Result<Vec<ChunkOutput>, SimulationError> {
        let results: Vec<Result<ChunkOutput, SimulationError>> = self.pool.install(|| {
            tasks
                .par_iter()
                .map(|task| run_guarded(task, cancel, job))
                .collect()
        });
        collect_outputs(results)
    }
}

/// Runs chunks one after another on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialDispatcher;

impl ChunkDispatcher for SequentialDispatcher {
    fn concurrency(&self) -> usize {
        1
    }

    fn dispatch(
        &self,
        tasks: &[ChunkTask],
        cancel: &CancelFlag,
        job: &ChunkJob<'_>,
    ) -> Result<Vec<ChunkOutput>, SimulationError> {
        let results = tasks
            .iter()
            .map(|task| run_guarded(task, cancel, job))
            .collect();
        collect_outputs(results)
    }
}

/// Runs one chunk, turning a panic into an error and raising `cancel` on
/// failure.
fn run_guarded(
    task: &ChunkTask,
    cancel: &CancelFlag,
    job: &ChunkJob<'_>,
) -> Result<ChunkOutput, SimulationError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| job(task, cancel)))
        .unwrap_or_else(|payload| {
            Err(SimulationError::WorkerPanic {
                chunk: task.index,
                message: panic_message(payload.as_ref()),
            })
        });

    if let Err(err) = &result {
        if *err != SimulationError::Cancelled {
            tracing::warn!(chunk = task.index, error = %err, "chunk failed");
        }
        cancel.cancel();
    }
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn collect_outputs(
    results: Vec<Result<ChunkOutput, SimulationError>>,
) -> Result<Vec<ChunkOutput>, SimulationError> {
    let mut outputs = Vec::with_capacity(results.len());
    let mut cancelled = false;
    let mut root_cause = None;

    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(SimulationError::Cancelled) => cancelled = true,
            Err(err) => {
                root_cause.get_or_insert(err);
            }
        }
    }

    match (root_cause, cancelled) {
        (Some(err), _) => Err(err),
        (None, true) => Err(SimulationError::Cancelled),
        (None, false) => Ok(outputs),
    }
}
