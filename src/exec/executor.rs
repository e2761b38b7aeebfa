// src/exec/executor.rs

//! The dependency-gated executor and the worker pool that backs it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;
use crate::errors::ScheduleError;
use crate::exec::in_flight::InFlight;
use crate::exec::job_runner::run_submission;
use crate::exec::request::{ScheduleRequest, SubmissionHandle};
use crate::exec::wait::WaitPolicy;
use crate::future::DynDependency;
use crate::job::Job;

struct Shared {
    config: ExecutorConfig,
    in_flight: InFlight,
}

/// Cheap-clone handle for scheduling jobs.
///
/// Jobs may hold a clone and schedule child jobs from inside `step()`.
#[derive(Clone)]
pub struct Executor {
    handle: Handle,
    shared: Arc<Shared>,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.shared.config)
            .field("in_flight", &self.shared.in_flight.snapshot())
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Build an executor that spawns submissions onto `handle`.
    pub fn new(handle: Handle, config: ExecutorConfig) -> Self {
        Self {
            handle,
            shared: Arc::new(Shared {
                config,
                in_flight: InFlight::new(),
            }),
        }
    }

    /// Attach to the Tokio runtime the caller is running on.
    pub fn current(config: ExecutorConfig) -> Result<Self> {
        let handle = Handle::try_current().context("no Tokio runtime to attach the executor to")?;
        Ok(Self::new(handle, config))
    }

    /// Whether a submission for `label` is currently live.
    pub fn is_in_flight(&self, label: &str) -> bool {
        self.shared.in_flight.contains(label)
    }

    /// Labels of all live submissions, sorted.
    pub fn in_flight(&self) -> Vec<String> {
        self.shared.in_flight.snapshot()
    }

    /// Schedule `job` to run once every future in `deps` has succeeded.
    pub fn schedule<J: Job>(
        &self,
        job: J,
        deps: impl IntoIterator<Item = DynDependency>,
    ) -> std::result::Result<SubmissionHandle, ScheduleError> {
        self.submit(ScheduleRequest::new(job).after_all(deps))
    }

    /// Submit a fully specified request.
    ///
    /// Refused if a submission with the same label is still live.
    pub fn submit<J: Job>(
        &self,
        request: ScheduleRequest<J>,
    ) -> std::result::Result<SubmissionHandle, ScheduleError> {
        let ScheduleRequest {
            job,
            dependencies,
            round_limit,
        } = request;
        let label = job.label().to_string();

        let Some(guard) = self.shared.in_flight.claim(&label) else {
            warn!(job = %label, "job already in flight; refusing overlapping submission");
            return Err(ScheduleError::AlreadyInFlight(label));
        };

        let policy = WaitPolicy {
            poll_window: self.shared.config.poll_window,
            round_limit: round_limit.unwrap_or(self.shared.config.round_limit),
        };

        debug!(
            job = %label,
            dependencies = ?crate::future::dependency::names(&dependencies),
            round_limit = %policy.round_limit,
            "job scheduled"
        );

        let join = self.handle.spawn(async move {
            let _guard = guard;
            run_submission(job, dependencies, policy).await
        });

        Ok(SubmissionHandle::new(label, join))
    }
}

/// Fixed-size pool of worker threads owning the runtime an [`Executor`]
/// spawns onto.
pub struct WorkerPool {
    runtime: Runtime,
    executor: Executor,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl WorkerPool {
    /// Start `config.worker_threads` async workers and cap the blocking pool
    /// that runs `step()` at the same size.
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        let threads = config.worker_threads.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(threads)
            .max_blocking_threads(threads)
            .thread_name("bootgate-worker")
            .enable_all()
            .build()
            .context("building worker pool runtime")?;

        info!(
            worker_threads = threads,
            poll_window = ?config.poll_window,
            round_limit = %config.round_limit,
            "worker pool started"
        );

        let executor = Executor::new(runtime.handle().clone(), config);
        Ok(Self { runtime, executor })
    }

    pub fn executor(&self) -> Executor {
        self.executor.clone()
    }

    /// Drive `future` to completion on the pool.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Stop the pool, giving running steps up to `timeout` to return.
    pub fn shutdown(self, timeout: Duration) {
        let in_flight = self.executor.in_flight();
        if !in_flight.is_empty() {
            info!(?in_flight, "shutting down with jobs still in flight");
        }
        self.runtime.shutdown_timeout(timeout);
    }
}
