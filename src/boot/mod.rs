// src/boot/mod.rs

//! Boot orchestration built on the executor.
//!
//! Every configured job becomes a [`ProbeJob`] owning a ready-future; jobs
//! wait on the futures of the jobs in their `after` list. A single
//! [`BootReporter`] waits on every required job and emits the boot status
//! lines.

pub mod probe;
pub mod reporter;
pub mod status;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::ConfigFile;
use crate::exec::{Executor, SubmissionHandle};
use crate::future::{DynDependency, SettableFuture};

pub use probe::ProbeJob;
pub use reporter::{BootReporter, REPORTER_LABEL};
pub use status::{BootStatus, StatusSink, StdoutSink};

/// Everything a caller needs to follow a launched boot.
#[derive(Debug)]
pub struct BootSequence {
    /// Resolved on boot completion; failed if a required job failed.
    pub outcome: SettableFuture<()>,
    /// Ready-future of every job, keyed by job name.
    pub ready: BTreeMap<String, SettableFuture<bool>>,
    /// One handle per scheduled job, reporter last.
    pub submissions: Vec<SubmissionHandle>,
}

/// Schedule every configured job plus the boot reporter.
pub fn launch(
    executor: &Executor,
    cfg: &ConfigFile,
    sink: Arc<dyn StatusSink>,
) -> Result<BootSequence> {
    let jobs: Vec<ProbeJob> = cfg.jobs_in_order().cloned().map(ProbeJob::new).collect();
    let ready: BTreeMap<String, SettableFuture<bool>> = jobs
        .iter()
        .map(|job| (job.spec().name.clone(), job.ready()))
        .collect();

    let mut submissions = Vec::with_capacity(jobs.len() + 1);
    let mut required: Vec<DynDependency> = Vec::new();

    for job in jobs {
        let deps = dependencies_of(&job, &ready);
        if job.spec().required {
            required.push(job.ready().dependency());
        }
        submissions.push(executor.schedule(job, deps)?);
    }

    info!(
        jobs = submissions.len(),
        required = required.len(),
        "boot jobs scheduled"
    );

    let reporter = BootReporter::new(sink);
    let outcome = reporter.outcome();
    submissions.push(executor.schedule(reporter, required)?);

    Ok(BootSequence {
        outcome,
        ready,
        submissions,
    })
}

fn dependencies_of(
    job: &ProbeJob,
    ready: &BTreeMap<String, SettableFuture<bool>>,
) -> Vec<DynDependency> {
    job.spec()
        .after
        .iter()
        .filter_map(|name| ready.get(name))
        .map(SettableFuture::dependency)
        .collect()
}
