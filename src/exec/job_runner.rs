// src/exec/job_runner.rs

//! Drives a single submission: wait protocol, then step, then reschedules.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::exec::request::SubmissionOutcome;
use crate::exec::wait::{WaitPolicy, wait_for_dependencies};
use crate::future::DynDependency;
use crate::job::{Continuation, Job};

/// Run one submission to completion.
///
/// Only this first pass waits on `deps`; periodic re-invocations requested by
/// `step()` go straight back to `step()`. A reschedule only starts after the
/// previous `step()` returned, so a job is never re-entered by itself.
pub(crate) async fn run_submission<J: Job>(
    mut job: J,
    deps: Vec<DynDependency>,
    policy: WaitPolicy,
) -> SubmissionOutcome {
    let label = job.label().to_string();

    if deps.is_empty() {
        debug!(job = %label, "no dependencies; ready");
    } else {
        match wait_for_dependencies(&mut job, deps, policy).await {
            Ok(rounds) => debug!(job = %label, rounds, "dependencies satisfied"),
            Err(err) => {
                warn!(job = %label, error = %err, "dependency failed; job will not run");
                job.on_dependency_failed(err.clone());
                return SubmissionOutcome::DependencyFailed(err);
            }
        }
    }

    let mut steps = 0u32;
    loop {
        steps += 1;

        // `step()` may block on external side effects; keep it off the
        // async workers. A panic surfaces here as a JoinError.
        let joined = tokio::task::spawn_blocking(move || {
            let result = job.step();
            (job, result)
        })
        .await;

        let (returned, result) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                error!(job = %label, steps, error = %err, "job step panicked; not rescheduling");
                return SubmissionOutcome::Panicked;
            }
        };
        job = returned;

        match result {
            Ok(Continuation::Done) => {
                info!(job = %label, steps, "job finished");
                return SubmissionOutcome::Finished { steps };
            }
            Ok(Continuation::After(delay)) => {
                debug!(job = %label, steps, ?delay, "job rescheduled");
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                error!(job = %label, steps, error = %err, "job step failed; not rescheduling");
                return SubmissionOutcome::StepFailed(Arc::new(err));
            }
        }
    }
}
