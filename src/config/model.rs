// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::types::RoundLimit;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [executor]
/// worker_threads = 4
/// poll_window = "10s"
/// max_straggler_rounds = 0
///
/// [job.network]
/// kind = "connectivity"
/// succeed_after = 2
/// retry_interval = "1s"
///
/// [job.wifi]
/// kind = "radio"
/// after = ["network"]
/// ```
///
/// All sections are optional and have reasonable defaults, but validation
/// requires at least one job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Worker pool and wait protocol settings from `[executor]`.
    #[serde(default)]
    pub executor: ExecutorSection,

    /// All jobs from `[job.<name>]`, keyed by job name.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[executor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSection {
    /// Number of worker threads; also caps concurrently running steps.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Length of one dependency polling round, e.g. `"10s"`.
    #[serde(default = "default_poll_window")]
    pub poll_window: String,

    /// Straggler rounds tolerated before dependencies are declared failed.
    /// `0` means unlimited.
    #[serde(default)]
    pub max_straggler_rounds: RoundLimit,
}

fn default_worker_threads() -> usize {
    4
}

fn default_poll_window() -> String {
    "10s".to_string()
}

impl Default for ExecutorSection {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            poll_window: default_poll_window(),
            max_straggler_rounds: RoundLimit::default(),
        }
    }
}

/// `[job.<name>]` section: one simulated boot check.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Free-form kind shown in logs (`"connectivity"`, `"storage"`, ...).
    #[serde(default)]
    pub kind: Option<String>,

    /// Attempt on which the simulated check starts passing.
    #[serde(default = "default_succeed_after")]
    pub succeed_after: u32,

    /// Delay between attempts, e.g. `"3s"`.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: String,

    /// Attempts after which the job gives up and fails its future.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fail on the first attempt regardless of `succeed_after`.
    #[serde(default)]
    pub fail: bool,

    /// Jobs whose result must be available before this one starts.
    #[serde(default)]
    pub after: Vec<String>,

    /// Whether this job gates the boot-complete signal.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_succeed_after() -> u32 {
    1
}

fn default_retry_interval() -> String {
    "3s".to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_required() -> bool {
    true
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            kind: None,
            succeed_after: default_succeed_after(),
            retry_interval: default_retry_interval(),
            max_attempts: default_max_attempts(),
            fail: false,
            after: Vec::new(),
            required: default_required(),
        }
    }
}

/// Validated executor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub worker_threads: usize,
    /// Budget of one dependency polling round.
    pub poll_window: Duration,
    pub round_limit: RoundLimit,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            poll_window: Duration::from_secs(10),
            round_limit: RoundLimit::Unlimited,
        }
    }
}

impl ExecutorConfig {
    pub fn with_poll_window(mut self, poll_window: Duration) -> Self {
        self.poll_window = poll_window;
        self
    }

    pub fn with_round_limit(mut self, round_limit: RoundLimit) -> Self {
        self.round_limit = round_limit;
        self
    }
}

/// Validated job settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    pub kind: String,
    pub succeed_after: u32,
    pub retry_interval: Duration,
    pub max_attempts: u32,
    pub fail: bool,
    pub after: Vec<String>,
    pub required: bool,
}

/// A validated configuration.
///
/// Obtained from a [`RawConfigFile`] via `TryFrom`, which checks durations,
/// dependency references and acyclicity.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    executor: ExecutorConfig,
    jobs: BTreeMap<String, JobSpec>,
    /// Job names in dependency order (dependencies first).
    order: Vec<String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        executor: ExecutorConfig,
        jobs: BTreeMap<String, JobSpec>,
        order: Vec<String>,
    ) -> Self {
        Self {
            executor,
            jobs,
            order,
        }
    }

    pub fn executor(&self) -> &ExecutorConfig {
        &self.executor
    }

    pub fn job(&self, name: &str) -> Option<&JobSpec> {
        self.jobs.get(name)
    }

    /// Jobs in dependency order: every job comes after everything in its
    /// `after` list.
    pub fn jobs_in_order(&self) -> impl Iterator<Item = &JobSpec> {
        self.order.iter().filter_map(|name| self.jobs.get(name))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
