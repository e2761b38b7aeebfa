// tests/executor_scenarios.rs

use std::error::Error;
use std::time::Duration;

use tokio::time::Instant;

use bootgate::config::ExecutorConfig;
use bootgate::{
    Continuation, DependencyError, Executor, RoundLimit, ScheduleError, ScheduleRequest,
    SettableFuture, SubmissionOutcome,
};
use bootgate_test_utils::fake_jobs::{RecordingJob, Scripted};
use bootgate_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const WINDOW: Duration = Duration::from_secs(1);

fn executor() -> Result<Executor, Box<dyn Error>> {
    let config = ExecutorConfig::default().with_poll_window(WINDOW);
    Ok(Executor::current(config)?)
}

/// Resolve `fut` after `delay` of (virtual) time.
fn resolve_later(fut: &SettableFuture<bool>, delay: Duration) {
    let fut = fut.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        fut.resolve(true);
    });
}

#[tokio::test(start_paused = true)]
async fn job_without_dependencies_runs_once() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let job = RecordingJob::new("A");
    let history = job.history();
    let start = Instant::now();

    let outcome = with_timeout(executor.schedule(job, [])?.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::Finished { steps: 1 }));
    assert_eq!(history.steps(), 1);
    assert!(history.straggler_rounds().is_empty());
    assert!(history.failures().is_empty());
    assert!(start.elapsed() < WINDOW, "no polling round should run");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dependent_runs_within_one_round_of_resolution() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let a_ready = SettableFuture::<bool>::new("A ready");
    let a = RecordingJob::new("A").resolving(&a_ready);
    let b = RecordingJob::new("B");
    let b_history = b.history();

    let b_handle = executor.schedule(b, [a_ready.dependency()])?;
    let a_handle = executor.schedule(a, [])?;

    assert!(with_timeout(a_handle.join()).await.is_finished());
    assert!(with_timeout(b_handle.join()).await.is_finished());

    assert_eq!(b_history.steps(), 1);
    assert!(b_history.straggler_rounds().is_empty());
    assert!(a_ready.wait(Some(Duration::ZERO))?);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancelled_dependency_reaches_the_failure_hook() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let radio = SettableFuture::<bool>::new("radio ready");
    let c = RecordingJob::new("C");
    let history = c.history();

    let handle = executor.schedule(c, [radio.dependency()])?;
    radio.cancel();

    let outcome = with_timeout(handle.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::DependencyFailed(ref e) if e.is_cancelled()));
    assert_eq!(history.steps(), 0);
    let failures = history.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].is_cancelled());
    assert!(radio.is_cancelled());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failure_during_first_round_skips_step() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let storage = SettableFuture::<bool>::new("storage verified");
    let job = RecordingJob::new("mount");
    let history = job.history();
    let handle = executor.schedule(job, [storage.dependency()])?;

    {
        let storage = storage.clone();
        tokio::spawn(async move {
            tokio::time::sleep(WINDOW / 2).await;
            storage.fail(anyhow::anyhow!("checksum mismatch"));
        });
    }

    let outcome = with_timeout(handle.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::DependencyFailed(_)));
    assert_eq!(history.steps(), 0);
    assert!(history.straggler_rounds().is_empty());
    match history.failures().as_slice() {
        [DependencyError::Failed { dependency, cause }] => {
            assert_eq!(dependency, "storage verified");
            assert!(cause.to_string().contains("checksum mismatch"));
        }
        other => panic!("expected exactly one failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn known_failure_short_circuits_pending_dependencies() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let slow = SettableFuture::<bool>::new("slow");
    let broken = SettableFuture::<bool>::new("broken");
    broken.fail(anyhow::anyhow!("boom"));

    let job = RecordingJob::new("consumer");
    let history = job.history();
    let start = Instant::now();

    let handle = executor.schedule(job, [slow.dependency(), broken.dependency()])?;
    let outcome = with_timeout(handle.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::DependencyFailed(_)));
    assert!(start.elapsed() < WINDOW, "should not wait out the round budget");
    assert_eq!(history.failures().len(), 1);
    assert!(!slow.is_done());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failure_mid_round_ends_the_wait_early() -> TestResult {
    init_tracing();
    let config = ExecutorConfig::default().with_poll_window(Duration::from_secs(10));
    let executor = Executor::current(config)?;

    let slow = SettableFuture::<bool>::new("slow");
    let broken = SettableFuture::<bool>::new("broken");
    {
        let broken = broken.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            broken.fail(anyhow::anyhow!("radio offline"));
        });
    }

    let job = RecordingJob::new("consumer");
    let history = job.history();
    let start = Instant::now();

    let handle = executor.schedule(job, [slow.dependency(), broken.dependency()])?;
    let outcome = with_timeout(handle.join()).await;

    match outcome {
        SubmissionOutcome::DependencyFailed(DependencyError::Failed { dependency, .. }) => {
            assert_eq!(dependency, "broken")
        }
        other => panic!("expected dependency failure, got {other:?}"),
    }
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(history.steps(), 0);
    assert_eq!(history.failures().len(), 1);
    assert!(history.straggler_rounds().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn oversized_poll_window_still_waits() -> TestResult {
    init_tracing();
    let config = ExecutorConfig::default().with_poll_window(Duration::MAX);
    let executor = Executor::current(config)?;

    let network = SettableFuture::<bool>::new("network ready");
    let job = RecordingJob::new("wifi");
    let history = job.history();

    let handle = executor.schedule(job, [network.dependency()])?;
    resolve_later(&network, Duration::from_secs(5));

    let outcome = with_timeout(handle.join()).await;

    assert!(outcome.is_finished(), "got {outcome:?}");
    assert_eq!(history.steps(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn straggler_hook_runs_once_per_round() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let metadata = SettableFuture::<bool>::new("metadata ready");
    let job = RecordingJob::new("wifi");
    let history = job.history();

    let handle = executor.schedule(job, [metadata.dependency()])?;
    resolve_later(&metadata, WINDOW * 2 + WINDOW / 2);

    let outcome = with_timeout(handle.join()).await;

    assert!(outcome.is_finished());
    assert_eq!(
        history.straggler_rounds(),
        vec![vec!["metadata ready".to_string()]; 2]
    );
    assert_eq!(history.steps(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn resolved_dependencies_drop_out_of_straggler_reports() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let network = SettableFuture::<bool>::new("network");
    let storage = SettableFuture::<bool>::new("storage");
    let job = RecordingJob::new("reporter");
    let history = job.history();

    let handle = executor.schedule(job, [network.dependency(), storage.dependency()])?;
    resolve_later(&network, WINDOW / 2);
    resolve_later(&storage, WINDOW + WINDOW / 2);

    assert!(with_timeout(handle.join()).await.is_finished());
    assert_eq!(history.straggler_rounds(), vec![vec!["storage".to_string()]]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn round_limit_turns_stragglers_into_failure() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let never = SettableFuture::<bool>::new("never ready");
    let job = RecordingJob::new("limited");
    let history = job.history();

    let request = ScheduleRequest::new(job)
        .after(&never)
        .round_limit(RoundLimit::rounds(2));
    let outcome = with_timeout(executor.submit(request)?.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::DependencyFailed(_)));
    assert_eq!(history.straggler_rounds().len(), 2);
    assert_eq!(history.steps(), 0);

    let failures = history.failures();
    assert_eq!(failures.len(), 1);
    match &failures[0] {
        DependencyError::NotReady { rounds, pending } => {
            assert_eq!(*rounds, 2);
            assert_eq!(pending, &vec!["never ready".to_string()]);
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
    assert!(failures[0].to_string().contains("never ready"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn executor_round_limit_applies_when_request_sets_none() -> TestResult {
    init_tracing();
    let config = ExecutorConfig::default()
        .with_poll_window(WINDOW)
        .with_round_limit(RoundLimit::rounds(1));
    let executor = Executor::current(config)?;

    let never = SettableFuture::<bool>::new("never ready");
    let job = RecordingJob::new("impatient");
    let history = job.history();

    let outcome = with_timeout(executor.schedule(job, [never.dependency()])?.join()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::DependencyFailed(DependencyError::NotReady { rounds: 1, .. })
    ));
    assert_eq!(history.straggler_rounds().len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn positive_continuation_reschedules_without_rewaiting() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let dep = SettableFuture::<bool>::new("config ready");
    let first_step = SettableFuture::<bool>::new("first step");
    let job = RecordingJob::new("poller")
        .resolving(&first_step)
        .then(Scripted::Return(Continuation::from_secs(5)));
    let history = job.history();

    let handle = executor.schedule(job, [dep.dependency()])?;
    resolve_later(&dep, WINDOW + WINDOW / 2);

    first_step.wait_async(None).await?;
    let resolved_at = Instant::now();
    let rounds_before = history.straggler_rounds().len();

    let outcome = with_timeout(handle.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::Finished { steps: 2 }));
    assert_eq!(history.steps(), 2);
    assert!(resolved_at.elapsed() >= Duration::from_secs(5));
    assert_eq!(rounds_before, 1);
    assert_eq!(history.straggler_rounds().len(), rounds_before);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn step_error_ends_submission_without_reschedule() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let job = RecordingJob::new("flaky")
        .then(Scripted::Fail("supplicant unreachable".to_string()))
        .then(Scripted::Return(Continuation::from_secs(1)));
    let history = job.history();

    let outcome = with_timeout(executor.schedule(job, [])?.join()).await;

    match outcome {
        SubmissionOutcome::StepFailed(cause) => {
            assert!(cause.to_string().contains("supplicant unreachable"))
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
    assert_eq!(history.steps(), 1);
    assert!(!executor.is_in_flight("flaky"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn step_panic_is_contained() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let job = RecordingJob::new("explodes").then(Scripted::Panic);
    let outcome = with_timeout(executor.schedule(job, [])?.join()).await;

    assert!(matches!(outcome, SubmissionOutcome::Panicked));
    assert!(!executor.is_in_flight("explodes"));

    // The executor keeps working afterwards.
    let again = RecordingJob::new("explodes");
    assert!(with_timeout(executor.schedule(again, [])?.join()).await.is_finished());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn overlapping_submission_of_same_label_is_refused() -> TestResult {
    init_tracing();
    let executor = executor()?;

    let gate = SettableFuture::<bool>::new("gate");
    let first = RecordingJob::new("ConfigureWifi");
    let first_history = first.history();
    let handle = executor.schedule(first, [gate.dependency()])?;

    assert!(executor.is_in_flight("ConfigureWifi"));
    let second = RecordingJob::new("ConfigureWifi");
    let err = executor.schedule(second, []).unwrap_err();
    assert_eq!(err, ScheduleError::AlreadyInFlight("ConfigureWifi".to_string()));

    gate.resolve(true);
    assert!(with_timeout(handle.join()).await.is_finished());
    assert_eq!(first_history.steps(), 1);
    assert!(executor.in_flight().is_empty());
    Ok(())
}
