// src/boot/probe.rs

//! Simulated boot check driven by a [`JobSpec`].
//!
//! Each step is one attempt. The check passes on attempt `succeed_after`,
//! gives up after `max_attempts`, and otherwise asks to be stepped again
//! after `retry_interval`. Whatever happens, the outcome lands in the job's
//! own future so dependents can react.

use anyhow::{Result, anyhow};
use tracing::info;

use crate::config::JobSpec;
use crate::errors::DependencyError;
use crate::future::{DynDependency, SettableFuture};
use crate::job::{self, Continuation, Job};

#[derive(Debug)]
pub struct ProbeJob {
    spec: JobSpec,
    ready: SettableFuture<bool>,
    attempts: u32,
    reported_waiting: bool,
}

impl ProbeJob {
    pub fn new(spec: JobSpec) -> Self {
        let ready = SettableFuture::new(format!("{} ready", spec.name));
        Self {
            spec,
            ready,
            attempts: 0,
            reported_waiting: false,
        }
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// Future resolved with `true` once the check passed.
    pub fn ready(&self) -> SettableFuture<bool> {
        self.ready.clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Job for ProbeJob {
    fn label(&self) -> &str {
        &self.spec.name
    }

    fn step(&mut self) -> Result<Continuation> {
        // Could be cancelled or failed by a dependency.
        if self.ready.is_done() {
            return Ok(Continuation::Done);
        }

        if self.spec.fail {
            self.ready.fail(anyhow!(
                "{} check '{}' failed",
                self.spec.kind,
                self.spec.name
            ));
            return Ok(Continuation::Done);
        }

        self.attempts += 1;

        if self.attempts >= self.spec.succeed_after {
            info!(
                job = %self.spec.name,
                kind = %self.spec.kind,
                attempts = self.attempts,
                "check passed"
            );
            self.ready.resolve(true);
            return Ok(Continuation::Done);
        }

        if self.attempts >= self.spec.max_attempts {
            self.ready.fail(anyhow!(
                "unable to complete '{}' after {} attempts",
                self.spec.name,
                self.spec.max_attempts
            ));
            return Ok(Continuation::Done);
        }

        if !self.reported_waiting {
            info!(job = %self.spec.name, kind = %self.spec.kind, "check not ready yet");
            self.reported_waiting = true;
        }

        Ok(Continuation::After(self.spec.retry_interval))
    }

    fn on_dependency_failed(&mut self, error: DependencyError) {
        job::log_dependency_failure(&self.spec.name, &error);
        self.ready.fail(error);
    }

    fn on_dependency_straggling(&mut self, pending: &[DynDependency]) {
        job::log_stragglers(&self.spec.name, pending);
    }
}
