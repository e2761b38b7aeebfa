// src/exec/mod.rs

//! Job execution layer.
//!
//! - [`executor`] holds the [`Executor`] handle and the [`WorkerPool`] that
//!   owns its threads.
//! - [`wait`] implements the round-based dependency wait with straggler
//!   reporting.
//! - [`job_runner`] drives one submission through wait, step and reschedule.
//! - [`in_flight`] tracks which job labels have a live submission.
//! - [`request`] defines submission inputs and outcomes.

pub mod executor;
pub mod in_flight;
pub mod job_runner;
pub mod request;
pub mod wait;

pub use executor::{Executor, WorkerPool};
pub use request::{ScheduleRequest, SubmissionHandle, SubmissionOutcome};
pub use wait::WaitPolicy;
