// src/lib.rs

pub mod boot;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod future;
pub mod job;
pub mod logging;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::boot::StdoutSink;
use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::exec::WorkerPool;

pub use crate::errors::{BootgateError, DependencyError, ScheduleError, WaitError};
pub use crate::exec::{Executor, ScheduleRequest, SubmissionHandle, SubmissionOutcome};
pub use crate::future::{Dependency, DynDependency, SettableFuture};
pub use crate::job::{Continuation, Job};
pub use crate::types::RoundLimit;

/// How long running steps get to return once the boot outcome is known.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the worker pool and executor
/// - the boot jobs and reporter
/// - Ctrl-C handling
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config from {:?}", config_path))?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let pool = WorkerPool::new(cfg.executor().clone())?;
    let executor = pool.executor();

    let result = pool.block_on(boot_until_done(&executor, &cfg));

    pool.shutdown(SHUTDOWN_GRACE);
    result
}

/// Launch the boot jobs and wait for the boot outcome or Ctrl-C.
async fn boot_until_done(executor: &Executor, cfg: &ConfigFile) -> Result<()> {
    let sequence = boot::launch(executor, cfg, Arc::new(StdoutSink))?;
    info!(jobs = sequence.ready.len(), "boot sequence launched");

    tokio::select! {
        outcome = sequence.outcome.wait_async(None) => {
            outcome.context("boot did not complete")
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl+C")?;
            Err(anyhow!("interrupted before boot completed"))
        }
    }
}

/// Simple dry-run output: print executor settings, jobs and dependencies.
fn print_dry_run(cfg: &ConfigFile) {
    let executor = cfg.executor();
    println!("bootgate dry-run");
    println!("  executor.worker_threads = {}", executor.worker_threads);
    println!("  executor.poll_window = {:?}", executor.poll_window);
    println!("  executor.max_straggler_rounds = {}", executor.round_limit);
    println!();

    println!("jobs ({}), in start order:", cfg.len());
    for job in cfg.jobs_in_order() {
        println!("  - {} ({})", job.name, job.kind);
        println!(
            "      succeed_after: {}, max_attempts: {}, retry_interval: {:?}",
            job.succeed_after, job.max_attempts, job.retry_interval
        );
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
        if job.fail {
            println!("      fail: true");
        }
        if !job.required {
            println!("      required: false");
        }
    }

    debug!("dry-run complete (no execution)");
}
