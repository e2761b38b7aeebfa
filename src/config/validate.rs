// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::boot::REPORTER_LABEL;
use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, ExecutorConfig, JobSpec, RawConfigFile};
use crate::errors::{BootgateError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BootgateError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_jobs(&raw)?;
        ensure_no_reserved_names(&raw)?;
        let executor = validate_executor(&raw)?;
        let jobs = validate_jobs(&raw)?;
        validate_job_dependencies(&raw)?;
        let order = dependency_order(&raw)?;
        Ok(ConfigFile::new_unchecked(executor, jobs, order))
    }
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(BootgateError::ConfigError(
            "config must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// The boot reporter claims its own in-flight label; a job sharing it would
/// race the reporter for it.
fn ensure_no_reserved_names(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.contains_key(REPORTER_LABEL) {
        return Err(BootgateError::ConfigError(format!(
            "job name '{REPORTER_LABEL}' is reserved for the boot reporter"
        )));
    }
    Ok(())
}

fn validate_executor(cfg: &RawConfigFile) -> Result<ExecutorConfig> {
    let section = &cfg.executor;

    if section.worker_threads == 0 {
        return Err(BootgateError::ConfigError(
            "[executor].worker_threads must be >= 1 (got 0)".to_string(),
        ));
    }

    let poll_window = positive_duration("[executor].poll_window", &section.poll_window)?;

    Ok(ExecutorConfig {
        worker_threads: section.worker_threads,
        poll_window,
        round_limit: section.max_straggler_rounds,
    })
}

fn validate_jobs(cfg: &RawConfigFile) -> Result<BTreeMap<String, JobSpec>> {
    let mut jobs = BTreeMap::new();

    for (name, job) in cfg.job.iter() {
        if job.succeed_after == 0 {
            return Err(BootgateError::ConfigError(format!(
                "[job.{name}].succeed_after must be >= 1 (got 0)"
            )));
        }
        if job.max_attempts == 0 {
            return Err(BootgateError::ConfigError(format!(
                "[job.{name}].max_attempts must be >= 1 (got 0)"
            )));
        }

        let retry_interval =
            positive_duration(&format!("[job.{name}].retry_interval"), &job.retry_interval)?;

        jobs.insert(
            name.clone(),
            JobSpec {
                name: name.clone(),
                kind: job.kind.clone().unwrap_or_else(|| name.clone()),
                succeed_after: job.succeed_after,
                retry_interval,
                max_attempts: job.max_attempts,
                fail: job.fail,
                after: job.after.clone(),
                required: job.required,
            },
        );
    }

    Ok(jobs)
}

fn validate_job_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        for dep in job.after.iter() {
            if dep == name {
                return Err(BootgateError::ConfigError(format!(
                    "job '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !cfg.job.contains_key(dep) {
                return Err(BootgateError::ConfigError(format!(
                    "job '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

/// Topologically sort the jobs; fails on cycles.
fn dependency_order(cfg: &RawConfigFile) -> Result<Vec<String>> {
    // Edge direction: dep -> job. For
    //   [job.wifi]
    //   after = ["network"]
    // we add edge network -> wifi.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.job.keys() {
        graph.add_node(name.as_str());
    }

    for (name, job) in cfg.job.iter() {
        for dep in job.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(BootgateError::DagCycle(format!(
            "cycle detected in job graph involving job '{}'",
            cycle.node_id()
        ))),
    }
}

fn positive_duration(field: &str, value: &str) -> Result<Duration> {
    let parsed = parse_duration(value)
        .map_err(|e| BootgateError::ConfigError(format!("{field}: {e}")))?;
    if parsed.is_zero() {
        return Err(BootgateError::ConfigError(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(parsed)
}
