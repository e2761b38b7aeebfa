// crates/test-utils/src/builders.rs

use std::collections::BTreeMap;

use bootgate::RoundLimit;
use bootgate::config::{ConfigFile, ExecutorSection, JobConfig, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                executor: ExecutorSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, name: &str, job: JobConfig) -> Self {
        self.config.job.insert(name.to_string(), job);
        self
    }

    pub fn with_poll_window(mut self, window: &str) -> Self {
        self.config.executor.poll_window = window.to_string();
        self
    }

    pub fn with_max_straggler_rounds(mut self, rounds: u32) -> Self {
        self.config.executor.max_straggler_rounds = RoundLimit::from(rounds);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(kind: &str) -> Self {
        Self {
            job: JobConfig {
                kind: Some(kind.to_string()),
                retry_interval: "1s".to_string(),
                ..JobConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.job.after.push(dep.to_string());
        self
    }

    pub fn succeed_after(mut self, attempts: u32) -> Self {
        self.job.succeed_after = attempts;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.job.max_attempts = attempts;
        self
    }

    pub fn retry_interval(mut self, interval: &str) -> Self {
        self.job.retry_interval = interval.to_string();
        self
    }

    pub fn failing(mut self) -> Self {
        self.job.fail = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.job.required = false;
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
