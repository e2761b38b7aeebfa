//! Scripted jobs and sinks that record what the executor did to them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use bootgate::boot::{BootStatus, StatusSink};
use bootgate::{Continuation, DependencyError, DynDependency, Job, SettableFuture};

/// One scripted `step()` result.
#[derive(Debug, Clone)]
pub enum Scripted {
    Return(Continuation),
    Fail(String),
    Panic,
}

#[derive(Debug, Default)]
struct Record {
    steps: u32,
    failures: Vec<DependencyError>,
    straggler_rounds: Vec<Vec<String>>,
}

/// Read side of a [`RecordingJob`], usable after the job moved into the
/// executor.
#[derive(Debug, Clone, Default)]
pub struct JobHistory {
    record: Arc<Mutex<Record>>,
}

impl JobHistory {
    pub fn steps(&self) -> u32 {
        self.record.lock().unwrap().steps
    }

    pub fn failures(&self) -> Vec<DependencyError> {
        self.record.lock().unwrap().failures.clone()
    }

    /// Pending dependency names passed to each straggler callback.
    pub fn straggler_rounds(&self) -> Vec<Vec<String>> {
        self.record.lock().unwrap().straggler_rounds.clone()
    }
}

/// A job that plays back a script of step results and records every
/// callback. Once the script is exhausted every step returns `Done`.
pub struct RecordingJob {
    label: String,
    script: VecDeque<Scripted>,
    resolves: Option<SettableFuture<bool>>,
    history: JobHistory,
}

impl RecordingJob {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            script: VecDeque::new(),
            resolves: None,
            history: JobHistory::default(),
        }
    }

    pub fn then(mut self, step: Scripted) -> Self {
        self.script.push_back(step);
        self
    }

    /// Resolve `fut` with `true` on the first step.
    pub fn resolving(mut self, fut: &SettableFuture<bool>) -> Self {
        self.resolves = Some(fut.clone());
        self
    }

    pub fn history(&self) -> JobHistory {
        self.history.clone()
    }
}

impl Job for RecordingJob {
    fn label(&self) -> &str {
        &self.label
    }

    fn step(&mut self) -> anyhow::Result<Continuation> {
        self.history.record.lock().unwrap().steps += 1;

        if let Some(fut) = self.resolves.take() {
            fut.resolve(true);
        }

        match self.script.pop_front() {
            None => Ok(Continuation::Done),
            Some(Scripted::Return(c)) => Ok(c),
            Some(Scripted::Fail(msg)) => Err(anyhow!(msg)),
            Some(Scripted::Panic) => panic!("scripted panic in {}", self.label),
        }
    }

    fn on_dependency_failed(&mut self, error: DependencyError) {
        self.history.record.lock().unwrap().failures.push(error);
    }

    fn on_dependency_straggling(&mut self, pending: &[DynDependency]) {
        let names = pending.iter().map(|d| d.name().to_string()).collect();
        self.history.record.lock().unwrap().straggler_rounds.push(names);
    }
}

/// Status sink that keeps every reported line.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<BootStatus>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<BootStatus> {
        self.reports.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn report(&self, status: &BootStatus) {
        self.reports.lock().unwrap().push(status.clone());
    }
}
