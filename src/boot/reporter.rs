// src/boot/reporter.rs

//! Orchestrating job that turns the required jobs' futures into the single
//! boot-complete signal.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::boot::status::{BootStatus, StatusSink};
use crate::errors::DependencyError;
use crate::future::{DynDependency, SettableFuture, dependency};
use crate::job::{Continuation, Job};

pub const REPORTER_LABEL: &str = "boot-reporter";

/// Scheduled after every required job's future; reports pending, completed
/// or failed boot through a [`StatusSink`].
pub struct BootReporter {
    sink: Arc<dyn StatusSink>,
    outcome: SettableFuture<()>,
    pending_reports: u32,
}

impl BootReporter {
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self {
            sink,
            outcome: SettableFuture::new("boot complete"),
            pending_reports: 0,
        }
    }

    /// Resolved on boot completion, failed when a required job failed.
    pub fn outcome(&self) -> SettableFuture<()> {
        self.outcome.clone()
    }
}

impl Job for BootReporter {
    fn label(&self) -> &str {
        REPORTER_LABEL
    }

    fn step(&mut self) -> Result<Continuation> {
        if self.outcome.is_done() {
            return Ok(Continuation::Done);
        }

        info!(pending_reports = self.pending_reports, "all required jobs ready");
        self.sink.report(&BootStatus::Completed);
        self.outcome.resolve(());
        Ok(Continuation::Done)
    }

    fn on_dependency_failed(&mut self, error: DependencyError) {
        error!(error = %error, "boot failed");
        self.sink.report(&BootStatus::Failed(error.to_string()));
        self.outcome.fail(error);
    }

    fn on_dependency_straggling(&mut self, pending: &[DynDependency]) {
        self.pending_reports += 1;
        self.sink
            .report(&BootStatus::Pending(dependency::names(pending)));
    }
}
