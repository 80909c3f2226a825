//! Bounded-concurrency batch execution.
//!
//! Every job of a batch runs on a fixed-size worker pool and reports its own
//! outcome. A failing job never stops its siblings; the batch result is the
//! full set of per-job outcomes. Jobs depend on each other only through the
//! filesystem, so no ordering is imposed inside a batch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chorus_spec::{JobBatch, RenderJob, Stage, TransformError};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::EngineResult;

/// Runs one job against the external engine.
///
/// Implementations must leave nothing at `job.destination` unless the job
/// succeeded.
pub trait Transformer: Sync {
    fn transform(&self, job: &RenderJob) -> Result<(), TransformError>;
}

/// Outcome of a single job.
#[derive(Debug)]
pub struct JobResult {
    pub stage: Stage,
    pub destination: PathBuf,
    pub elapsed: Duration,
    pub outcome: Result<(), TransformError>,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&TransformError> {
        self.outcome.as_ref().err()
    }
}

/// Outcomes of every job of one batch, in batch order.
#[derive(Debug)]
pub struct BatchResult {
    pub stage: Stage,
    pub results: Vec<JobResult>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Destinations of the jobs that succeeded.
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.destination.clone())
            .collect()
    }

    /// Jobs that failed.
    pub fn failures(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Flag that stops an executor from starting further jobs.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    /// Jobs already running finish; jobs not yet started are cancelled.
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-width batch executor.
#[derive(Debug, Clone)]
pub struct Executor {
    width: usize,
    shutdown: ShutdownHandle,
}

impl Executor {
    /// Creates an executor running at most `width` jobs at once.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Creates an executor sharing an existing shutdown flag.
    pub fn with_shutdown(width: usize, shutdown: ShutdownHandle) -> Self {
        Self {
            width: width.max(1),
            shutdown,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Runs every job in `batch` and collects all outcomes.
    ///
    /// Returns once the whole batch has settled.
    pub fn execute<T: Transformer + ?Sized>(
        &self,
        batch: &JobBatch,
        engine: &T,
    ) -> EngineResult<BatchResult> {
        let stage = batch.stage;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.width)
            .thread_name(move |i| format!("chorus-{}-{}", stage, i))
            .build()?;

        info!(stage = %stage, jobs = batch.len(), width = self.width, "dispatching batch");
        let results: Vec<JobResult> =
            pool.install(|| batch.jobs.par_iter().map(|job| self.run_job(job, engine)).collect());

        let result = BatchResult { stage, results };
        info!(
            stage = %stage,
            succeeded = result.succeeded(),
            failed = result.failed(),
            "batch settled"
        );
        Ok(result)
    }

    fn run_job<T: Transformer + ?Sized>(&self, job: &RenderJob, engine: &T) -> JobResult {
        let start = Instant::now();
        let outcome = if self.shutdown.is_shutdown() {
            Err(TransformError::Cancelled)
        } else {
            engine.transform(job)
        };
        let elapsed = start.elapsed();

        match &outcome {
            Ok(()) => debug!(
                destination = %job.destination.display(),
                elapsed_ms = elapsed.as_millis() as u64,
                "job succeeded"
            ),
            Err(e) => warn!(
                destination = %job.destination.display(),
                error = %e,
                "job failed"
            ),
        }

        JobResult {
            stage: job.stage,
            destination: job.destination.clone(),
            elapsed,
            outcome,
        }
    }
}
