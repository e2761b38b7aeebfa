// src/exec/wait.rs

//! Dependency wait protocol.
//!
//! Dependencies are polled in rounds of a fixed budget (`poll_window`). Each
//! round waits on all still-pending futures at once until the round deadline.
//! The first one to settle with an error ends the wait immediately. Whatever
//! is still pending at the deadline is a straggler and is reported to the job,
//! in declaration order, before the next round starts. Settled futures are
//! never checked again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, trace};

use crate::errors::DependencyError;
use crate::future::{DynDependency, dependency};
use crate::job::Job;
use crate::types::RoundLimit;

/// Round budget and limit for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_window: Duration,
    pub round_limit: RoundLimit,
}

/// Wait until every dependency has succeeded.
///
/// Returns the number of rounds that were needed (`0` if everything had
/// already settled). The first failure or cancellation observed short-circuits
/// the remaining checks.
pub(crate) async fn wait_for_dependencies<J: Job + ?Sized>(
    job: &mut J,
    deps: Vec<DynDependency>,
    policy: WaitPolicy,
) -> Result<u32, DependencyError> {
    let mut pending = deps;
    let mut round = 0u32;

    loop {
        // Pick up anything that settled since the last round, failures first.
        pending = drop_settled(pending)?;
        if pending.is_empty() {
            return Ok(round);
        }

        round += 1;
        let deadline = round_deadline(policy.poll_window);

        // Race every pending dependency so a failure anywhere ends the round
        // at once; declaration order only matters for the straggler report.
        let mut settling = JoinSet::new();
        for (idx, dep) in pending.iter().enumerate() {
            let dep = Arc::clone(dep);
            settling.spawn(async move {
                dep.settled().await;
                idx
            });
        }

        let mut settled = vec![false; pending.len()];
        while let Ok(Some(joined)) = timeout_at(deadline, settling.join_next()).await {
            let Ok(idx) = joined else { continue };
            let dep = &pending[idx];
            if let Some(Err(err)) = dep.check() {
                debug!(
                    job = %job.label(),
                    dependency = %dep.name(),
                    round,
                    "dependency settled with an error"
                );
                return Err(err);
            }
            trace!(job = %job.label(), dependency = %dep.name(), round, "dependency ready");
            settled[idx] = true;
        }
        drop(settling);

        let stragglers: Vec<DynDependency> = pending
            .into_iter()
            .zip(settled)
            .filter_map(|(dep, done)| (!done).then_some(dep))
            .collect();

        if stragglers.is_empty() {
            return Ok(round);
        }

        let names = dependency::names(&stragglers);
        info!(
            job = %job.label(),
            round,
            pending = ?names,
            "dependencies not ready after poll window"
        );
        job.on_dependency_straggling(&stragglers);

        if policy.round_limit.is_exhausted(round) {
            return Err(DependencyError::NotReady {
                rounds: round,
                pending: names,
            });
        }

        pending = stragglers;
    }
}

/// Deadlines past what the clock can represent are clamped to roughly thirty
/// years out, which is as good as never for a boot.
fn round_deadline(window: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(window)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

/// Non-blocking pass: keep pending dependencies, fail on the first error.
fn drop_settled(deps: Vec<DynDependency>) -> Result<Vec<DynDependency>, DependencyError> {
    let mut pending = Vec::with_capacity(deps.len());
    for dep in deps {
        match dep.check() {
            None => pending.push(dep),
            Some(Ok(())) => {}
            Some(Err(err)) => return Err(err),
        }
    }
    Ok(pending)
}
